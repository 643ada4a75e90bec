//! Human-readable output: AST trees, statistics and diagnostics.

use std::fmt::{self, Write};

use serde::Serialize;

use gesso_relief::ast::*;
use gesso_relief::{CompilerError, CompilerWarning};

/// Render the tree with one node per line, children indented by two spaces.
pub fn render_tree(root: &RootNode<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Root {}", span(&root.loc));
    for child in root.children.iter() {
        write_node(&mut out, child, 1);
    }
    out
}

fn span(loc: &SourceLocation) -> String {
    format!("{}..{}", loc.start.offset, loc.end.offset)
}

fn write_node(out: &mut String, node: &TemplateChildNode<'_>, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        TemplateChildNode::Element(el) => {
            let _ = write!(out, "{indent}Element <{}> {}", el.tag, span(&el.loc));
            if el.tag_type != ElementType::Element {
                let _ = write!(out, " {:?}", el.tag_type);
            }
            if el.ns != Namespace::Html {
                let _ = write!(out, " ns={:?}", el.ns);
            }
            if el.is_self_closing {
                out.push_str(" self-closing");
            }
            out.push('\n');
            for prop in el.props.iter() {
                let _ = writeln!(out, "{indent}  {}", PropLine(prop));
            }
            for child in el.children.iter() {
                write_node(out, child, depth + 1);
            }
        }
        TemplateChildNode::Text(text) => {
            let _ = writeln!(out, "{indent}Text {:?} {}", text.content.as_str(), span(&text.loc));
        }
        TemplateChildNode::Comment(comment) => {
            let _ = writeln!(
                out,
                "{indent}Comment {:?} {}",
                comment.content.as_str(),
                span(&comment.loc)
            );
        }
        TemplateChildNode::Interpolation(interp) => {
            let _ = writeln!(
                out,
                "{indent}Interpolation {:?} {}",
                interp.content.content.as_str(),
                span(&interp.loc)
            );
        }
    }
}

struct PropLine<'p, 'a>(&'p PropNode<'a>);

impl fmt::Display for PropLine<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            PropNode::Attribute(attr) => {
                write!(f, "Attribute {}", attr.name)?;
                if let Some(value) = &attr.value {
                    write!(f, "={:?}", value.content.as_str())?;
                }
                write!(f, " {}", span(&attr.loc))
            }
            PropNode::Directive(dir) => {
                write!(f, "Directive v-{}", dir.name)?;
                if let Some(arg) = &dir.arg {
                    if arg.is_static {
                        write!(f, ":{}", arg.content)?;
                    } else {
                        write!(f, ":[{}]", arg.content)?;
                    }
                }
                for modifier in dir.modifiers.iter() {
                    write!(f, ".{}", modifier.content)?;
                }
                if let Some(exp) = &dir.exp {
                    write!(f, "={:?}", exp.content.as_str())?;
                }
                write!(f, " {}", span(&dir.loc))
            }
        }
    }
}

/// Node counts for one template.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateStats {
    pub elements: usize,
    pub components: usize,
    pub attributes: usize,
    pub directives: usize,
    pub texts: usize,
    pub comments: usize,
    pub interpolations: usize,
}

impl TemplateStats {
    pub fn collect(root: &RootNode<'_>) -> Self {
        let mut stats = Self::default();
        stats.visit(&root.children);
        stats
    }

    fn visit(&mut self, children: &[TemplateChildNode<'_>]) {
        for child in children {
            match child {
                TemplateChildNode::Element(el) => {
                    self.elements += 1;
                    if el.tag_type == ElementType::Component {
                        self.components += 1;
                    }
                    for prop in el.props.iter() {
                        match prop {
                            PropNode::Attribute(_) => self.attributes += 1,
                            PropNode::Directive(_) => self.directives += 1,
                        }
                    }
                    self.visit(&el.children);
                }
                TemplateChildNode::Text(_) => self.texts += 1,
                TemplateChildNode::Comment(_) => self.comments += 1,
                TemplateChildNode::Interpolation(_) => self.interpolations += 1,
            }
        }
    }
}

impl fmt::Display for TemplateStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} elements ({} components), {} attributes, {} directives, {} texts, {} comments, {} interpolations",
            self.elements,
            self.components,
            self.attributes,
            self.directives,
            self.texts,
            self.comments,
            self.interpolations
        )
    }
}

/// `file:line:column: error[Ecode]: message`
pub fn format_error(filename: &str, error: &CompilerError) -> String {
    format!(
        "{}error[E{:02}]: {}",
        location_prefix(filename, error.loc.as_ref()),
        error.code.code(),
        error.message
    )
}

/// `file:line:column: warning[KEY]: message`
pub fn format_warning(filename: &str, warning: &CompilerWarning) -> String {
    format!(
        "{}warning[{}]: {}",
        location_prefix(filename, warning.loc.as_ref()),
        warning.code.key(),
        warning.message
    )
}

fn location_prefix(filename: &str, loc: Option<&SourceLocation>) -> String {
    match loc {
        Some(loc) => format!("{}:{}:{}: ", filename, loc.start.line, loc.start.column),
        None => format!("{}: ", filename),
    }
}
