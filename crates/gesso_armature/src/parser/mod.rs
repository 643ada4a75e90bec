//! Template parser.
//!
//! A hand-written parser over a single [`Cursor`]. Children are parsed by a
//! dispatcher that depends on the current [`TextMode`]; open elements live on
//! an explicit ancestor stack, so nesting depth costs heap rather than call
//! frames. Diagnostics are collected as data and never interrupt parsing.

mod compat;
mod element;
mod text;

use gesso_carton::{
    condense_whitespace, is_whitespace_only, smallvec, Box, Bump, SmallVec, String, Vec,
};
use gesso_relief::ast::*;
use gesso_relief::{
    CompilerError, CompilerWarning, ErrorCode, ParserOptions, TextMode, WhitespaceStrategy,
};

use crate::cursor::{char_codes::*, is_tag_start_char, starts_with_end_tag_open, Cursor};

/// Output of a full parse.
#[derive(Debug)]
pub struct ParseResult<'a> {
    pub root: RootNode<'a>,
    pub errors: Vec<'a, CompilerError>,
    pub warnings: Vec<'a, CompilerWarning>,
}

/// Parser context for building AST
pub struct Parser<'a> {
    /// Arena allocator
    allocator: &'a Bump,
    /// Read position in the source
    cursor: Cursor<'a>,
    /// Parser options
    options: ParserOptions,
    /// Open elements, innermost last
    stack: Vec<'a, ParserStackEntry<'a>>,
    /// Whether in pre block
    in_pre: bool,
    /// Whether in v-pre block
    in_v_pre: bool,
    /// Errors collected during parsing
    errors: Vec<'a, CompilerError>,
    /// Deprecation warnings collected during parsing
    warnings: Vec<'a, CompilerWarning>,
}

/// Stack entry for tracking parent elements
#[derive(Debug)]
struct ParserStackEntry<'a> {
    element: ElementNode<'a>,
    /// How the element's content is tokenized
    mode: TextMode,
    /// Children parsed so far
    children: Vec<'a, TemplateChildNode<'a>>,
    /// `in_pre` outside this element
    in_pre: bool,
    /// `in_v_pre` outside this element
    in_v_pre: bool,
}

/// What one dispatcher step produced.
enum Parsed<'a> {
    Node(TemplateChildNode<'a>),
    /// Spliced into the parent (CDATA content, unwrapped templates).
    Nodes(Vec<'a, TemplateChildNode<'a>>),
    /// Input consumed without a node.
    Skip,
}

/// Action to take for a text node during the post-pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WhitespaceAction {
    Keep,
    Remove,
    /// Whitespace-only node becomes a single space
    Collapse,
    /// Runs of whitespace become single spaces
    Condense,
    /// `\r\n` becomes `\n`
    NormalizeNewlines,
}

impl<'a> Parser<'a> {
    /// Create a new parser
    pub fn new(allocator: &'a Bump, source: &'a str) -> Self {
        Self::with_options(allocator, source, ParserOptions::default())
    }

    /// Create a new parser with options
    pub fn with_options(allocator: &'a Bump, source: &'a str, options: ParserOptions) -> Self {
        Self {
            allocator,
            cursor: Cursor::new(source),
            options,
            stack: Vec::new_in(allocator),
            in_pre: false,
            in_v_pre: false,
            errors: Vec::new_in(allocator),
            warnings: Vec::new_in(allocator),
        }
    }

    /// Parse the whole source.
    ///
    /// Configured `on_error` / `on_warn` callbacks see every diagnostic once,
    /// in order, after the tree is complete.
    pub fn parse(mut self) -> ParseResult<'a> {
        let start = self.cursor.position();
        let children = self.parse_children(TextMode::Data);

        let mut root = RootNode::new(self.allocator);
        root.children = children;
        root.loc = self.cursor.selection(start);

        tracing::debug!(
            bytes = self.cursor.source().len(),
            nodes = root.children.len(),
            errors = self.errors.len(),
            warnings = self.warnings.len(),
            "parsed template"
        );

        if let Some(on_error) = self.options.on_error {
            self.errors.iter().cloned().for_each(on_error);
        }
        if let Some(on_warn) = self.options.on_warn {
            self.warnings.iter().cloned().for_each(on_warn);
        }

        ParseResult {
            root,
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    #[inline]
    fn parent(&self) -> Option<&ElementNode<'a>> {
        self.stack.last().map(|entry| &entry.element)
    }

    /// Report `code` `offset` bytes ahead of the cursor.
    fn emit_error(&mut self, code: ErrorCode, offset: usize) {
        let at = self.cursor.position_ahead(offset);
        self.emit_error_at(code, at);
    }

    fn emit_error_at(&mut self, code: ErrorCode, at: Position) {
        tracing::trace!(?code, offset = at.offset, "parse error");
        self.errors
            .push(CompilerError::new(code, Some(SourceLocation::point(at))));
    }

    /// Parse siblings until `mode` ends at the current depth.
    ///
    /// Elements opened on the way are kept on the ancestor stack and
    /// collect their own children there, so nesting never recurses.
    fn parse_children(&mut self, mode: TextMode) -> Vec<'a, TemplateChildNode<'a>> {
        let base = self.stack.len();
        let mut nodes = Vec::new_in(self.allocator);

        loop {
            let current = match self.stack.get(base..).and_then(|open| open.last()) {
                Some(entry) => entry.mode,
                None => mode,
            };
            let parsed = if self.is_end(current) {
                if self.stack.len() == base {
                    break;
                }
                self.close_element()
            } else {
                self.parse_node(current)
            };
            let target = match self.stack.get_mut(base..).and_then(|open| open.last_mut()) {
                Some(entry) => &mut entry.children,
                None => &mut nodes,
            };
            match parsed {
                Parsed::Node(node) => push_node(target, node),
                Parsed::Nodes(list) => {
                    for node in list {
                        push_node(target, node);
                    }
                }
                Parsed::Skip => {}
            }
        }

        if !matches!(mode, TextMode::RawText | TextMode::RcData) {
            let pre_parent = self
                .parent()
                .is_some_and(|parent| (self.options.is_pre_tag)(&parent.tag));
            self.condense_children(&mut nodes, pre_parent);
        }
        nodes
    }

    fn parse_node(&mut self, mode: TextMode) -> Parsed<'a> {
        if matches!(mode, TextMode::Data | TextMode::RcData) {
            let open = self.options.delimiters.0.as_str();
            if !self.in_v_pre && !open.is_empty() && self.cursor.starts_with(open) {
                if let Some(node) = self.parse_interpolation(mode) {
                    return Parsed::Node(TemplateChildNode::Interpolation(Box::new_in(
                        node,
                        self.allocator,
                    )));
                }
            } else if mode == TextMode::Data && self.cursor.starts_with("<") {
                if let Some(parsed) = self.parse_markup() {
                    return parsed;
                }
            }
        }

        let text = self.parse_text(mode);
        Parsed::Node(TemplateChildNode::Text(Box::new_in(text, self.allocator)))
    }

    /// Everything starting with `<` in DATA mode. `None` hands the `<` over
    /// to text parsing.
    fn parse_markup(&mut self) -> Option<Parsed<'a>> {
        let rest = self.cursor.rest().as_bytes();
        match rest.get(1).copied() {
            None => {
                self.emit_error(ErrorCode::EofBeforeTagName, 1);
                None
            }
            Some(EXCLAMATION_MARK) => {
                let comment = if rest.starts_with(b"<!--") {
                    self.parse_comment()
                } else if rest.starts_with(b"<!DOCTYPE") {
                    self.parse_bogus_comment()
                } else if rest.starts_with(b"<![CDATA[") {
                    let ns = self.parent().map_or(Namespace::Html, |parent| parent.ns);
                    if ns != Namespace::Html {
                        return Some(Parsed::Nodes(self.parse_cdata()));
                    }
                    self.emit_error(ErrorCode::CdataInHtmlContent, 0);
                    self.parse_bogus_comment()
                } else {
                    self.emit_error(ErrorCode::IncorrectlyOpenedComment, 0);
                    self.parse_bogus_comment()
                };
                Some(self.comment_node(comment))
            }
            Some(SLASH) => match rest.get(2).copied() {
                None => {
                    self.emit_error(ErrorCode::EofBeforeTagName, 2);
                    None
                }
                Some(GT) => {
                    self.emit_error(ErrorCode::MissingEndTagName, 2);
                    self.cursor.advance_by(3);
                    Some(Parsed::Skip)
                }
                Some(c) if is_tag_start_char(c) => {
                    self.emit_error(ErrorCode::InvalidEndTag, 0);
                    self.skip_end_tag();
                    Some(Parsed::Skip)
                }
                Some(_) => {
                    self.emit_error(ErrorCode::InvalidFirstCharacterOfTagName, 2);
                    let comment = self.parse_bogus_comment();
                    Some(self.comment_node(comment))
                }
            },
            Some(c) if is_tag_start_char(c) => Some(self.open_element()),
            Some(QUESTION_MARK) => {
                self.emit_error(ErrorCode::UnexpectedQuestionMarkInsteadOfTagName, 1);
                let comment = self.parse_bogus_comment();
                Some(self.comment_node(comment))
            }
            Some(_) => {
                self.emit_error(ErrorCode::InvalidFirstCharacterOfTagName, 1);
                None
            }
        }
    }

    fn comment_node(&self, comment: CommentNode) -> Parsed<'a> {
        Parsed::Node(TemplateChildNode::Comment(Box::new_in(
            comment,
            self.allocator,
        )))
    }

    fn is_end(&self, mode: TextMode) -> bool {
        let rest = self.cursor.rest();
        let closes = match mode {
            TextMode::Data => {
                rest.starts_with("</")
                    && self
                        .stack
                        .iter()
                        .rev()
                        .any(|entry| starts_with_end_tag_open(rest, &entry.element.tag))
            }
            TextMode::RcData | TextMode::RawText => self
                .parent()
                .is_some_and(|parent| starts_with_end_tag_open(rest, &parent.tag)),
            TextMode::CData => rest.starts_with("]]>"),
            TextMode::AttributeValue => false,
        };
        closes || rest.is_empty()
    }

    /// Whitespace and comment post-pass over a finished child list.
    ///
    /// Every decision looks at the list as it was parsed; removals are
    /// applied afterwards in one go.
    fn condense_children(&self, nodes: &mut Vec<'a, TemplateChildNode<'a>>, pre_parent: bool) {
        let condense = self.options.whitespace == WhitespaceStrategy::Condense;
        let mut removed: SmallVec<[bool; 16]> = smallvec![false; nodes.len()];

        for i in 0..nodes.len() {
            let action = match &nodes[i] {
                TemplateChildNode::Text(_) if self.in_pre => WhitespaceAction::NormalizeNewlines,
                TemplateChildNode::Text(text) if is_whitespace_only(&text.content) => {
                    let prev = i.checked_sub(1).map(|j| nodes[j].node_type());
                    let next = nodes.get(i + 1).map(|node| node.node_type());
                    match (prev, next) {
                        (Some(prev), Some(next))
                            if !(condense && is_removable_whitespace(prev, next, &text.content)) =>
                        {
                            WhitespaceAction::Collapse
                        }
                        _ => WhitespaceAction::Remove,
                    }
                }
                TemplateChildNode::Text(_) if condense => WhitespaceAction::Condense,
                TemplateChildNode::Comment(_) if !self.options.comments => {
                    WhitespaceAction::Remove
                }
                _ => WhitespaceAction::Keep,
            };

            if action == WhitespaceAction::Remove {
                removed[i] = true;
                continue;
            }
            if let TemplateChildNode::Text(text) = &mut nodes[i] {
                match action {
                    WhitespaceAction::Collapse => text.content = String::const_new(" "),
                    WhitespaceAction::Condense => {
                        text.content = condense_whitespace(&text.content);
                    }
                    WhitespaceAction::NormalizeNewlines if text.content.contains('\r') => {
                        text.content = String::from(text.content.replace("\r\n", "\n"));
                    }
                    _ => {}
                }
            }
        }

        // A newline right after `<pre>` is not content.
        if self.in_pre && pre_parent && removed.first() == Some(&false) {
            if let Some(TemplateChildNode::Text(first)) = nodes.first_mut() {
                let stripped = first
                    .content
                    .strip_prefix("\r\n")
                    .or_else(|| first.content.strip_prefix('\n'))
                    .map(String::from);
                if let Some(stripped) = stripped {
                    first.content = stripped;
                }
            }
        }

        let kept = removed.iter().filter(|&&gone| !gone).count();
        let parsed = std::mem::replace(nodes, Vec::with_capacity_in(kept, self.allocator));
        let mut merged = false;
        for (node, gone) in parsed.into_iter().zip(removed) {
            if gone {
                continue;
            }
            if let (TemplateChildNode::Text(text), Some(TemplateChildNode::Text(prev))) =
                (&node, nodes.last_mut())
            {
                prev.content.push_str(&text.content);
                prev.loc.end = text.loc.end;
                merged = true;
                continue;
            }
            if merged {
                self.finish_merged_text(nodes);
                merged = false;
            }
            nodes.push(node);
        }
        if merged {
            self.finish_merged_text(nodes);
        }
    }

    /// Settle the last node after text siblings that removal or splicing
    /// left side by side were joined into it.
    fn finish_merged_text(&self, nodes: &mut Vec<'a, TemplateChildNode<'a>>) {
        let condense = self.options.whitespace == WhitespaceStrategy::Condense && !self.in_pre;
        if let Some(TemplateChildNode::Text(text)) = nodes.last_mut() {
            text.loc = self.cursor.selection_between(text.loc.start, text.loc.end);
            if condense {
                text.content = condense_whitespace(&text.content);
            }
        }
    }
}

/// Append `node`, extending the previous text node when the two touch.
fn push_node<'a>(nodes: &mut Vec<'a, TemplateChildNode<'a>>, node: TemplateChildNode<'a>) {
    if let TemplateChildNode::Text(text) = &node {
        if let Some(TemplateChildNode::Text(prev)) = nodes.last_mut() {
            if prev.loc.end.offset == text.loc.start.offset {
                prev.content.push_str(&text.content);
                prev.loc.end = text.loc.end;
                prev.loc.source.push_str(&text.loc.source);
                return;
            }
        }
    }
    nodes.push(node);
}

/// Whitespace between these siblings carries no meaning in condense mode.
fn is_removable_whitespace(prev: NodeType, next: NodeType, content: &str) -> bool {
    match (prev, next) {
        (NodeType::Comment, NodeType::Comment)
        | (NodeType::Comment, NodeType::Element)
        | (NodeType::Element, NodeType::Comment) => true,
        (NodeType::Element, NodeType::Element) => {
            content.bytes().any(|c| c == NEWLINE || c == CARRIAGE_RETURN)
        }
        _ => false,
    }
}

/// Parse a template
pub fn parse<'a>(allocator: &'a Bump, source: &'a str) -> (RootNode<'a>, Vec<'a, CompilerError>) {
    let result = Parser::new(allocator, source).parse();
    (result.root, result.errors)
}

/// Parse a template with options
pub fn parse_with_options<'a>(
    allocator: &'a Bump,
    source: &'a str,
    options: ParserOptions,
) -> (RootNode<'a>, Vec<'a, CompilerError>) {
    let result = Parser::with_options(allocator, source, options).parse();
    (result.root, result.errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesso_relief::{CompatConfig, CompatMode, DeprecationType, DEFAULT_MAX_DEPTH};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn texts<'b>(children: &'b [TemplateChildNode<'_>]) -> std::vec::Vec<&'b str> {
        children
            .iter()
            .filter_map(|c| c.as_text())
            .map(|t| t.content.as_str())
            .collect()
    }

    #[test]
    fn test_parse_simple_element() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, "<div></div>");

        assert!(errors.is_empty());
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.loc.source, "<div></div>");

        if let TemplateChildNode::Element(el) = &root.children[0] {
            assert_eq!(el.tag.as_str(), "div");
            assert_eq!(el.tag_type, ElementType::Element);
            assert_eq!(el.ns, Namespace::Html);
            assert!(el.children.is_empty());
        } else {
            panic!("Expected element");
        }
    }

    #[test]
    fn test_parse_nested_elements() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, "<div><span>hello</span></div>");
        assert!(errors.is_empty());
        if let TemplateChildNode::Element(div) = &root.children[0] {
            if let TemplateChildNode::Element(span) = &div.children[0] {
                assert_eq!(span.tag.as_str(), "span");
                assert_eq!(texts(&span.children), ["hello"]);
                assert_eq!(span.loc.start.offset, 5);
                assert_eq!(span.loc.end.offset, 23);
            } else {
                panic!("Expected span");
            }
        } else {
            panic!("Expected div");
        }
    }

    #[test]
    fn test_parse_mixed_children() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, "<div>text<span></span>{{ msg }}</div>");
        assert!(errors.is_empty());
        if let TemplateChildNode::Element(el) = &root.children[0] {
            assert_eq!(el.children.len(), 3);
            assert!(matches!(&el.children[0], TemplateChildNode::Text(_)));
            assert!(matches!(&el.children[1], TemplateChildNode::Element(_)));
            assert!(matches!(
                &el.children[2],
                TemplateChildNode::Interpolation(_)
            ));
        }
    }

    #[test]
    fn test_whitespace_between_elements() {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, "<div><a></a> <b></b>\n  <c></c></div>");
        let div = root.children[0].as_element().unwrap();
        let kinds: std::vec::Vec<_> = div.children.iter().map(|c| c.node_type()).collect();
        assert_eq!(
            kinds,
            [
                NodeType::Element,
                NodeType::Text,
                NodeType::Element,
                NodeType::Element
            ]
        );
        assert_eq!(texts(&div.children), [" "]);
    }

    #[test]
    fn test_whitespace_condense_text() {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, "<div>  hello  <span>world</span>  </div>");
        let div = root.children[0].as_element().unwrap();
        assert_eq!(div.children.len(), 2);
        assert_eq!(texts(&div.children), [" hello "]);
        assert_eq!(div.children[0].loc().source, "  hello  ");
    }

    #[test]
    fn test_whitespace_at_edges_is_removed() {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, "  <div></div>  ");
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_whitespace_around_comments() {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, "<div></div> <!-- c --> <p></p> {{ a }} <!-- d -->x");
        let kinds: std::vec::Vec<_> = root.children.iter().map(|c| c.node_type()).collect();
        assert_eq!(
            kinds,
            [
                NodeType::Element,
                NodeType::Comment,
                NodeType::Element,
                NodeType::Text,
                NodeType::Interpolation,
                NodeType::Text,
                NodeType::Comment,
                NodeType::Text
            ]
        );
    }

    #[test]
    fn test_whitespace_preserve() {
        let allocator = Bump::new();
        let options = ParserOptions {
            whitespace: WhitespaceStrategy::Preserve,
            ..Default::default()
        };
        let (root, _) = parse_with_options(
            &allocator,
            "<div>  a   b  <i></i>\n<b></b></div>",
            options,
        );
        let div = root.children[0].as_element().unwrap();
        assert_eq!(texts(&div.children), ["  a   b  ", " "]);
    }

    #[test]
    fn test_pre_keeps_whitespace() {
        let allocator = Bump::new();
        let options = ParserOptions {
            is_pre_tag: |tag| tag == "pre",
            ..Default::default()
        };
        let (root, _) = parse_with_options(
            &allocator,
            "<pre>\r\n  a\r\n   <b>  </b></pre>  <p>  x  </p>",
            options,
        );
        let pre = root.children[0].as_element().unwrap();
        assert_eq!(texts(&pre.children), ["  a\n   "]);
        let b = pre.children[1].as_element().unwrap();
        assert_eq!(texts(&b.children), ["  "]);

        // The flag is scoped to the <pre> element.
        assert_eq!(texts(&root.children), [" "]);
        let p = root.children[2].as_element().unwrap();
        assert_eq!(texts(&p.children), [" x "]);
    }

    #[test]
    fn test_comments_dropped_and_text_merged() {
        let allocator = Bump::new();
        let options = ParserOptions {
            comments: false,
            ..Default::default()
        };
        let (root, _) = parse_with_options(&allocator, "a<!-- x -->b", options);
        assert_eq!(root.children.len(), 1);
        let text = root.children[0].as_text().unwrap();
        assert_eq!(text.content, "ab");
        assert_eq!(text.loc.source, "a<!-- x -->b");
    }

    #[test]
    fn test_adjacent_text_is_merged() {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, "a < b < c");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].loc().source, "a < b < c");
    }

    #[test]
    fn test_markup_errors() {
        let allocator = Bump::new();
        let cases = [
            ("<", ErrorCode::EofBeforeTagName, 1),
            ("</", ErrorCode::EofBeforeTagName, 2),
            ("</>", ErrorCode::MissingEndTagName, 2),
            ("</ x>", ErrorCode::InvalidFirstCharacterOfTagName, 2),
            ("< x", ErrorCode::InvalidFirstCharacterOfTagName, 1),
            ("</x>", ErrorCode::InvalidEndTag, 0),
            ("<!x>", ErrorCode::IncorrectlyOpenedComment, 0),
        ];
        for (source, code, offset) in cases {
            let (_, errors) = parse(&allocator, source);
            assert_eq!(errors.len(), 1, "{source}");
            assert_eq!(errors[0].code, code, "{source}");
            assert_eq!(
                errors[0].loc.as_ref().unwrap().start.offset,
                offset,
                "{source}"
            );
        }
    }

    #[test]
    fn test_missing_end_tag_name_produces_nothing() {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, "a</>b");
        assert_eq!(texts(&root.children), ["ab"]);
        assert_eq!(root.children[0].loc().source, "a</>b");
    }

    #[test]
    fn test_raw_text_mode() {
        let allocator = Bump::new();
        let options = ParserOptions {
            get_text_mode: |el, _| {
                if el.tag == "script" {
                    TextMode::RawText
                } else if el.tag == "textarea" {
                    TextMode::RcData
                } else {
                    TextMode::Data
                }
            },
            ..Default::default()
        };
        let (root, errors) = parse_with_options(
            &allocator,
            "<script>if (a < b) x = '</div>' &amp; {{ y }}</script><textarea>&lt;{{ z }}</textarea>",
            options,
        );
        assert!(errors.is_empty());
        let script = root.children[0].as_element().unwrap();
        assert_eq!(
            texts(&script.children),
            ["if (a < b) x = '</div>' &amp; {{ y }}"]
        );
        let textarea = root.children[1].as_element().unwrap();
        assert_eq!(textarea.children.len(), 2);
        assert_eq!(texts(&textarea.children), ["<"]);
        assert!(matches!(
            &textarea.children[1],
            TemplateChildNode::Interpolation(_)
        ));
    }

    #[test]
    fn test_unterminated_script_comment() {
        let allocator = Bump::new();
        let options = ParserOptions {
            get_text_mode: |el, _| {
                if el.tag == "script" {
                    TextMode::RawText
                } else {
                    TextMode::Data
                }
            },
            ..Default::default()
        };
        let (_, errors) = parse_with_options(&allocator, "<script><!-- x", options);
        let codes: std::vec::Vec<_> = errors.iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            [ErrorCode::MissingEndTag, ErrorCode::EofInScriptHtmlCommentLikeText]
        );
    }

    #[test]
    fn test_cdata_in_foreign_content() {
        let allocator = Bump::new();
        let options = ParserOptions {
            get_namespace: |tag, parent| match parent {
                Some(parent) => parent.ns,
                None if tag == "svg" => Namespace::Svg,
                None => Namespace::Html,
            },
            ..Default::default()
        };
        let (root, errors) =
            parse_with_options(&allocator, "<svg>a<![CDATA[<b>x</b>]]>c</svg>", options);
        assert!(errors.is_empty());
        let svg = root.children[0].as_element().unwrap();
        assert_eq!(svg.ns, Namespace::Svg);
        assert_eq!(svg.children.len(), 1);
        let text = svg.children[0].as_text().unwrap();
        assert_eq!(text.content, "a<b>x</b>c");
        assert_eq!(text.loc.source, "a<![CDATA[<b>x</b>]]>c");
    }

    #[test]
    fn test_unterminated_cdata() {
        let allocator = Bump::new();
        let options = ParserOptions {
            get_namespace: |_, _| Namespace::Svg,
            ..Default::default()
        };
        let (root, errors) = parse_with_options(&allocator, "<svg><![CDATA[x", options);
        let codes: std::vec::Vec<_> = errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, [ErrorCode::EofInCdata, ErrorCode::MissingEndTag]);
        let svg = root.children[0].as_element().unwrap();
        assert_eq!(texts(&svg.children), ["x"]);
    }

    #[test]
    fn test_custom_delimiters() {
        let allocator = Bump::new();
        let options = ParserOptions {
            delimiters: (String::from("${"), String::from("}")),
            ..Default::default()
        };
        let (root, errors) = parse_with_options(&allocator, "{{ a }} ${ b }", options);
        assert!(errors.is_empty());
        assert_eq!(texts(&root.children), ["{{ a }} "]);
        if let TemplateChildNode::Interpolation(interp) = &root.children[1] {
            assert_eq!(interp.content.content, "b");
        } else {
            panic!("Expected interpolation");
        }
    }

    #[test]
    fn test_compat_native_template_unwrapped() {
        let allocator = Bump::new();
        let options = ParserOptions {
            compat: Some(CompatConfig::new(CompatMode::V2)),
            ..Default::default()
        };
        let result = Parser::with_options(
            &allocator,
            "<div><template><span/></template><template v-if=\"a\"/></div>",
            options,
        )
        .parse();
        let div = result.root.children[0].as_element().unwrap();
        assert_eq!(div.children.len(), 2);
        assert_eq!(div.children[0].as_element().unwrap().tag, "span");
        assert_eq!(div.children[1].as_element().unwrap().tag, "template");
        assert_eq!(result.warnings[0].code, DeprecationType::NativeTemplate);
    }

    #[test]
    fn test_compat_v3_mode_is_opt_in() {
        let allocator = Bump::new();
        let options = ParserOptions {
            compat: Some(CompatConfig::new(CompatMode::V3)),
            ..Default::default()
        };
        let result =
            Parser::with_options(&allocator, "<template><span/></template>", options).parse();
        assert_eq!(result.root.children[0].as_element().unwrap().tag, "template");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_nesting_limit() {
        let allocator = Bump::new();
        let options = ParserOptions {
            max_depth: 2,
            ..Default::default()
        };
        let (root, errors) =
            parse_with_options(&allocator, "<a><b><c>x</c></b></a>", options);
        assert_eq!(errors[0].code, ErrorCode::NestingTooDeep);
        assert_eq!(errors[0].loc.as_ref().unwrap().start.offset, 6);

        let b = root.children[0].as_element().unwrap().children[0]
            .as_element()
            .unwrap();
        let c = b.children[0].as_element().unwrap();
        assert!(c.children.is_empty());
        assert_eq!(c.loc.source, "<c>");
        assert_eq!(texts(&b.children), ["x"]);
    }

    #[test]
    fn test_default_nesting_limit_is_total() {
        let allocator = Bump::new();
        let source = "<div>".repeat(DEFAULT_MAX_DEPTH + 100);
        let (root, errors) = parse(&allocator, &source);

        let too_deep = errors
            .iter()
            .filter(|e| e.code == ErrorCode::NestingTooDeep)
            .count();
        assert_eq!(too_deep, 100);

        let mut depth = 0;
        let mut children = &root.children;
        while let Some(el) = children.first().and_then(|c| c.as_element()) {
            depth += 1;
            children = &el.children;
        }
        assert_eq!(depth, DEFAULT_MAX_DEPTH + 1);
    }

    #[test]
    fn test_many_siblings() {
        let allocator = Bump::new();
        let count = 20_000;

        let source = "<b></b>\n".repeat(count);
        let (root, errors) = parse(&allocator, &source);
        assert!(errors.is_empty());
        assert_eq!(root.children.len(), count);

        let source = "a</>".repeat(count);
        let (root, errors) = parse(&allocator, &source);
        assert_eq!(errors.len(), count);
        assert_eq!(root.children.len(), 1);
        let text = root.children[0].as_text().unwrap();
        assert_eq!(text.content, "a".repeat(count));
        assert_eq!(text.loc.source, &source[..source.len() - 3]);
    }

    #[test]
    fn test_merged_text_is_condensed() {
        let allocator = Bump::new();
        let options = ParserOptions {
            comments: false,
            ..Default::default()
        };
        let (root, _) = parse_with_options(&allocator, "a <!--x--> b", options.clone());
        let text = root.children[0].as_text().unwrap();
        assert_eq!(text.content, "a b");
        assert_eq!(text.loc.source, "a <!--x--> b");

        let options = ParserOptions {
            whitespace: WhitespaceStrategy::Preserve,
            ..options
        };
        let (root, _) = parse_with_options(&allocator, "a <!--x--> b", options);
        assert_eq!(root.children[0].as_text().unwrap().content, "a  b");
    }

    static ERRORS_SEEN: AtomicUsize = AtomicUsize::new(0);
    static WARNINGS_SEEN: AtomicUsize = AtomicUsize::new(0);

    #[test]
    fn test_callbacks_receive_every_diagnostic() {
        let allocator = Bump::new();
        let options = ParserOptions {
            on_error: Some(|_| {
                ERRORS_SEEN.fetch_add(1, Ordering::SeqCst);
            }),
            on_warn: Some(|_| {
                WARNINGS_SEEN.fetch_add(1, Ordering::SeqCst);
            }),
            compat: Some(CompatConfig::new(CompatMode::V2)),
            ..Default::default()
        };
        let result = Parser::with_options(
            &allocator,
            "<div :a.sync=\"b\" a a><span>",
            options,
        )
        .parse();
        assert_eq!(ERRORS_SEEN.load(Ordering::SeqCst), result.errors.len());
        assert_eq!(WARNINGS_SEEN.load(Ordering::SeqCst), result.warnings.len());
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_positions_track_lines() {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, "<div>\n  <p>é</p>\n</div>");
        let p = root.children[0].as_element().unwrap().children[0]
            .as_element()
            .unwrap();
        assert_eq!(p.loc.start, Position::new(8, 2, 3));
        assert_eq!(p.loc.end, Position::new(17, 2, 11));
        assert_eq!(p.loc.source, "<p>é</p>");
    }

    #[test]
    fn test_parse_result_serializes() {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, r#"<div :a="b">{{ c }}</div>"#);
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["children"][0]["type"], "Element");
        assert_eq!(json["children"][0]["tagType"], "Element");
        assert_eq!(json["children"][0]["props"][0]["type"], "Directive");
        assert_eq!(json["children"][0]["children"][0]["type"], "Interpolation");
    }
}
