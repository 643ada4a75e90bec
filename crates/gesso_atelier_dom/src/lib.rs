//! Gesso template parsing for the DOM platform.
//!
//! This crate configures the platform-neutral parser with browser rules:
//! - HTML void elements and native tag recognition
//! - SVG / MathML namespace resolution
//! - Raw text and RCDATA elements (`script`, `style`, `textarea`, ...)
//! - Full HTML character reference decoding

pub mod options;

pub use options::*;

// Re-export core types
pub use gesso_armature::{ParseResult, Parser};
pub use gesso_relief::{ast, CompilerError, CompilerWarning, Namespace, RootNode, TemplateChildNode};

use gesso_armature::parse_with_options;
use gesso_carton::{Bump, String, Vec};
use gesso_relief::{ElementNode, ParserOptions, PropNode, TextMode};

/// Parser options implementing the DOM parsing rules
pub fn parser_options() -> ParserOptions {
    ParserOptions {
        is_void_tag: gesso_carton::is_void_tag,
        is_native_tag: Some(is_native_tag),
        is_pre_tag: |tag| tag == "pre",
        is_built_in_component: Some(element_checks::is_built_in_component),
        get_namespace,
        get_text_mode,
        decode_entities: decode_html,
        ..ParserOptions::default()
    }
}

/// Parse a template with the DOM rules and default options
pub fn parse_template<'a>(
    allocator: &'a Bump,
    source: &'a str,
) -> (RootNode<'a>, Vec<'a, CompilerError>) {
    parse_template_with_options(allocator, source, DomParserOptions::default())
}

/// Parse a template with the DOM rules and custom options
pub fn parse_template_with_options<'a>(
    allocator: &'a Bump,
    source: &'a str,
    options: DomParserOptions,
) -> (RootNode<'a>, Vec<'a, CompilerError>) {
    tracing::debug!(
        whitespace = ?options.whitespace,
        comments = options.comments,
        compat = options.compat.is_some(),
        "parsing template with DOM rules"
    );
    parse_with_options(allocator, source, options.apply(parser_options()))
}

fn is_native_tag(tag: &str) -> bool {
    gesso_carton::is_html_tag(tag)
        || gesso_carton::is_svg_tag(tag)
        || gesso_carton::is_math_ml_tag(tag)
}

/// Resolve the namespace of `tag` from its parent.
///
/// Foreign content inherits its parent's namespace except at the HTML
/// integration points.
pub fn get_namespace(tag: &str, parent: Option<&ElementNode<'_>>) -> Namespace {
    let mut ns = parent.map_or(Namespace::Html, |p| p.ns);

    if let Some(parent) = parent {
        match ns {
            Namespace::MathMl if parent.tag == "annotation-xml" => {
                if tag == "svg" {
                    return Namespace::Svg;
                }
                if parent.props.iter().any(is_html_encoding) {
                    ns = Namespace::Html;
                }
            }
            Namespace::MathMl => {
                if element_checks::MATH_ML_TEXT_INTEGRATION_POINTS.contains(parent.tag.as_str())
                    && tag != "mglyph"
                    && tag != "malignmark"
                {
                    ns = Namespace::Html;
                }
            }
            Namespace::Svg => {
                if element_checks::SVG_HTML_INTEGRATION_POINTS.contains(parent.tag.as_str()) {
                    ns = Namespace::Html;
                }
            }
            Namespace::Html => {}
        }
    }

    if ns == Namespace::Html {
        match tag {
            "svg" => return Namespace::Svg,
            "math" => return Namespace::MathMl,
            _ => {}
        }
    }
    ns
}

fn is_html_encoding(prop: &PropNode<'_>) -> bool {
    let PropNode::Attribute(attr) = prop else {
        return false;
    };
    attr.name == "encoding"
        && attr.value.as_ref().is_some_and(|v| {
            v.content == "text/html" || v.content == "application/xhtml+xml"
        })
}

/// How the content of `element` is tokenized.
pub fn get_text_mode(element: &ElementNode<'_>, _parent: Option<&ElementNode<'_>>) -> TextMode {
    if element.ns != Namespace::Html {
        return TextMode::Data;
    }
    if element_checks::is_rcdata_element(&element.tag) {
        TextMode::RcData
    } else if element_checks::is_raw_text_element(&element.tag) {
        TextMode::RawText
    } else {
        TextMode::Data
    }
}

/// Decode named and numeric character references.
///
/// Attribute values follow the legacy rule that a reference without `;`
/// followed by an alphanumeric or `=` is left as written.
pub fn decode_html(raw: &str, as_attr: bool) -> String {
    let decoded = if as_attr {
        htmlize::unescape_attribute(raw)
    } else {
        htmlize::unescape(raw)
    };
    String::from(decoded.as_ref())
}
