//! Template AST node types.
//!
//! Every node produced by the parser lives in a bumpalo arena. Leaf nodes
//! (text, comments, expressions) own their strings; container nodes borrow
//! the arena for their child lists.

use gesso_carton::{Box, Bump, String, Vec};
use serde::{Serialize, Serializer};

/// Node type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum NodeType {
    Root = 0,
    Element = 1,
    Text = 2,
    Comment = 3,
    SimpleExpression = 4,
    Interpolation = 5,
    Attribute = 6,
    Directive = 7,
}

/// Element type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[repr(u8)]
pub enum ElementType {
    #[default]
    Element = 0,
    Component = 1,
    Slot = 2,
    Template = 3,
}

/// Namespace for elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[repr(u8)]
pub enum Namespace {
    #[default]
    Html = 0,
    Svg = 1,
    MathMl = 2,
}

/// Constant type levels for static analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Default)]
#[repr(u8)]
pub enum ConstantType {
    #[default]
    NotConstant = 0,
    CanSkipPatch = 1,
    CanCache = 2,
    CanStringify = 3,
}

/// Source position in the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub struct Position {
    /// Byte offset from start of file
    pub offset: u32,
    /// 1-indexed line number
    pub line: u32,
    /// 1-indexed column number, counted in characters
    pub column: u32,
}

impl Position {
    /// Position of the first character of a file.
    pub const START: Self = Self {
        offset: 0,
        line: 1,
        column: 1,
    };

    pub const fn new(offset: u32, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

/// Source location span [start, end)
///
/// `source` is always sliced out of the original template, never out of
/// whatever input happened to be left when the node was built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
    pub source: String,
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::STUB
    }
}

impl SourceLocation {
    /// Stub location for synthesized nodes
    pub const STUB: Self = Self {
        start: Position::START,
        end: Position::START,
        source: String::const_new(""),
    };

    pub fn new(start: Position, end: Position, source: impl Into<String>) -> Self {
        Self {
            start,
            end,
            source: source.into(),
        }
    }

    /// Zero-width location, used by diagnostics.
    pub fn point(at: Position) -> Self {
        Self::new(at, at, "")
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }
}

fn arena_seq<T, S>(items: &Vec<'_, T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    serializer.collect_seq(items.iter())
}

// ============================================================================
// Template Nodes
// ============================================================================

/// Root AST node
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename = "Root")]
pub struct RootNode<'a> {
    #[serde(serialize_with = "arena_seq")]
    pub children: Vec<'a, TemplateChildNode<'a>>,
    pub loc: SourceLocation,
}

impl<'a> RootNode<'a> {
    pub fn new(allocator: &'a Bump) -> Self {
        Self {
            children: Vec::new_in(allocator),
            loc: SourceLocation::STUB,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Root
    }
}

/// All template child node types
#[derive(Debug)]
pub enum TemplateChildNode<'a> {
    Element(Box<'a, ElementNode<'a>>),
    Text(Box<'a, TextNode>),
    Comment(Box<'a, CommentNode>),
    Interpolation(Box<'a, InterpolationNode>),
}

impl<'a> TemplateChildNode<'a> {
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Element(_) => NodeType::Element,
            Self::Text(_) => NodeType::Text,
            Self::Comment(_) => NodeType::Comment,
            Self::Interpolation(_) => NodeType::Interpolation,
        }
    }

    pub fn loc(&self) -> &SourceLocation {
        match self {
            Self::Element(n) => &n.loc,
            Self::Text(n) => &n.loc,
            Self::Comment(n) => &n.loc,
            Self::Interpolation(n) => &n.loc,
        }
    }

    pub fn as_element(&self) -> Option<&ElementNode<'a>> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Serialize for TemplateChildNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Element(n) => (**n).serialize(serializer),
            Self::Text(n) => (**n).serialize(serializer),
            Self::Comment(n) => (**n).serialize(serializer),
            Self::Interpolation(n) => (**n).serialize(serializer),
        }
    }
}

/// Element node
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename = "Element", rename_all = "camelCase")]
pub struct ElementNode<'a> {
    pub ns: Namespace,
    pub tag: String,
    pub tag_type: ElementType,
    #[serde(serialize_with = "arena_seq")]
    pub props: Vec<'a, PropNode<'a>>,
    #[serde(serialize_with = "arena_seq")]
    pub children: Vec<'a, TemplateChildNode<'a>>,
    pub is_self_closing: bool,
    pub loc: SourceLocation,
}

impl<'a> ElementNode<'a> {
    pub fn new(allocator: &'a Bump, tag: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            ns: Namespace::Html,
            tag: tag.into(),
            tag_type: ElementType::Element,
            props: Vec::new_in(allocator),
            children: Vec::new_in(allocator),
            is_self_closing: false,
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Element
    }

    /// Static attribute by exact name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeNode> {
        self.props.iter().find_map(|p| match p {
            PropNode::Attribute(attr) if attr.name == name => Some(&**attr),
            _ => None,
        })
    }

    /// Directive by normalized name (`"if"`, `"bind"`, ...).
    pub fn directive(&self, name: &str) -> Option<&DirectiveNode<'a>> {
        self.props.iter().find_map(|p| match p {
            PropNode::Directive(dir) if dir.name == name => Some(&**dir),
            _ => None,
        })
    }

    pub fn has_directive(&self, name: &str) -> bool {
        self.directive(name).is_some()
    }
}

/// Prop node (attribute or directive)
#[derive(Debug)]
pub enum PropNode<'a> {
    Attribute(Box<'a, AttributeNode>),
    Directive(Box<'a, DirectiveNode<'a>>),
}

impl<'a> PropNode<'a> {
    pub fn loc(&self) -> &SourceLocation {
        match self {
            Self::Attribute(n) => &n.loc,
            Self::Directive(n) => &n.loc,
        }
    }

    /// Attribute name, or the normalized name for a directive.
    pub fn name(&self) -> &str {
        match self {
            Self::Attribute(n) => &n.name,
            Self::Directive(n) => &n.name,
        }
    }
}

impl Serialize for PropNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Attribute(n) => (**n).serialize(serializer),
            Self::Directive(n) => (**n).serialize(serializer),
        }
    }
}

/// Attribute node
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename = "Attribute", rename_all = "camelCase")]
pub struct AttributeNode {
    pub name: String,
    pub name_loc: SourceLocation,
    pub value: Option<TextNode>,
    pub loc: SourceLocation,
}

impl AttributeNode {
    pub fn new(name: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            name: name.into(),
            name_loc: loc.clone(),
            value: None,
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Attribute
    }
}

/// Directive node (v-if, v-for, v-bind, etc.)
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename = "Directive", rename_all = "camelCase")]
pub struct DirectiveNode<'a> {
    /// Normalized directive name without prefix (e.g., "if", "for", "bind")
    pub name: String,
    /// Raw attribute name including shorthand (e.g., "@click", ":class")
    pub raw_name: String,
    /// Bound expression
    pub exp: Option<SimpleExpressionNode>,
    /// Directive argument (e.g., "click" in @click)
    pub arg: Option<SimpleExpressionNode>,
    /// Directive modifiers (e.g., ["stop", "prevent"] in @click.stop.prevent)
    #[serde(serialize_with = "arena_seq")]
    pub modifiers: Vec<'a, SimpleExpressionNode>,
    pub loc: SourceLocation,
}

impl<'a> DirectiveNode<'a> {
    pub fn new(
        allocator: &'a Bump,
        name: impl Into<String>,
        raw_name: impl Into<String>,
        loc: SourceLocation,
    ) -> Self {
        Self {
            name: name.into(),
            raw_name: raw_name.into(),
            exp: None,
            arg: None,
            modifiers: Vec::new_in(allocator),
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Directive
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m.content == modifier)
    }

    /// `true` when the argument is the static name `name`.
    pub fn is_static_arg(&self, name: &str) -> bool {
        self.arg
            .as_ref()
            .is_some_and(|arg| arg.is_static && arg.content == name)
    }
}

/// Text node
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "Text")]
pub struct TextNode {
    pub content: String,
    pub loc: SourceLocation,
}

impl TextNode {
    pub fn new(content: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            content: content.into(),
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Text
    }
}

/// Comment node
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "Comment")]
pub struct CommentNode {
    pub content: String,
    pub loc: SourceLocation,
}

impl CommentNode {
    pub fn new(content: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            content: content.into(),
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Comment
    }
}

/// Interpolation node ({{ expr }})
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "Interpolation")]
pub struct InterpolationNode {
    pub content: SimpleExpressionNode,
    pub loc: SourceLocation,
}

impl InterpolationNode {
    pub fn node_type(&self) -> NodeType {
        NodeType::Interpolation
    }
}

/// Simple expression node
///
/// The parser never looks inside expressions; `content` is the raw
/// (entity-decoded) text and `const_type` is only a placeholder for later
/// analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "SimpleExpression", rename_all = "camelCase")]
pub struct SimpleExpressionNode {
    pub content: String,
    pub is_static: bool,
    pub const_type: ConstantType,
    pub loc: SourceLocation,
}

impl SimpleExpressionNode {
    pub fn new(content: impl Into<String>, is_static: bool, loc: SourceLocation) -> Self {
        Self {
            content: content.into(),
            is_static,
            const_type: if is_static {
                ConstantType::CanStringify
            } else {
                ConstantType::NotConstant
            },
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::SimpleExpression
    }
}
