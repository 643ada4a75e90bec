//! Parser options.

use std::fmt;

use gesso_carton::String;
use serde::{Deserialize, Serialize};

use crate::ast::{ElementNode, Namespace};
use crate::compat::CompatConfig;
use crate::errors::{CompilerError, CompilerWarning};

/// Text mode for different contexts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TextMode {
    /// Elements, entities, ends at any ancestor's end tag (default)
    #[default]
    Data,
    /// Entities only, ends at the parent's end tag (e.g., textarea, title)
    RcData,
    /// Nothing but raw text, ends at the parent's end tag (e.g., script, style)
    RawText,
    /// CDATA section
    CData,
    /// Attribute value
    AttributeValue,
}

/// Whitespace handling strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhitespaceStrategy {
    /// Condense whitespace (default)
    #[default]
    Condense,
    /// Preserve all whitespace
    Preserve,
}

/// Parser options
#[derive(Clone)]
pub struct ParserOptions {
    /// Custom delimiters for interpolation (default: ["{{", "}}"])
    pub delimiters: (String, String),
    /// Whether to trim whitespace
    pub whitespace: WhitespaceStrategy,
    /// Keep comment nodes in the output
    pub comments: bool,
    /// Resolve the namespace of a tag from its parent
    pub get_namespace: fn(&str, Option<&ElementNode<'_>>) -> Namespace,
    /// Resolve how an element's content is tokenized
    pub get_text_mode: fn(&ElementNode<'_>, Option<&ElementNode<'_>>) -> TextMode,
    /// Whether is a void tag
    pub is_void_tag: fn(&str) -> bool,
    /// Whether whitespace inside the tag is kept verbatim
    pub is_pre_tag: fn(&str) -> bool,
    /// Whether is a custom element (never a component)
    pub is_custom_element: Option<fn(&str) -> bool>,
    /// Whether is a native tag
    pub is_native_tag: Option<fn(&str) -> bool>,
    /// Platform built-in components
    pub is_built_in_component: Option<fn(&str) -> bool>,
    /// Decode character references; the flag is set for attribute values
    pub decode_entities: fn(&str, bool) -> String,
    /// Error handler
    pub on_error: Option<fn(CompilerError)>,
    /// Warning handler
    pub on_warn: Option<fn(CompilerWarning)>,
    /// Legacy syntax emulation, off when `None`
    pub compat: Option<CompatConfig>,
    /// Deepest element nesting parsed as a tree
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            delimiters: (String::from("{{"), String::from("}}")),
            whitespace: WhitespaceStrategy::Condense,
            comments: true,
            get_namespace: |_, _| Namespace::Html,
            get_text_mode: |_, _| TextMode::Data,
            is_void_tag: |_| false,
            is_pre_tag: |_| false,
            is_custom_element: None,
            is_native_tag: None,
            is_built_in_component: None,
            decode_entities: decode_basic_entities,
            on_error: None,
            on_warn: None,
            compat: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl fmt::Debug for ParserOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserOptions")
            .field("delimiters", &self.delimiters)
            .field("whitespace", &self.whitespace)
            .field("comments", &self.comments)
            .field("compat", &self.compat)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Default decoder: only the characters reserved by the template syntax.
///
/// Anything else (including numeric references) is left untouched.
pub fn decode_basic_entities(raw: &str, _as_attr: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = [
            ("&gt;", '>'),
            ("&lt;", '<'),
            ("&amp;", '&'),
            ("&apos;", '\''),
            ("&quot;", '"'),
        ]
        .into_iter()
        .find(|(name, _)| tail.starts_with(name));
        match decoded {
            Some((name, c)) => {
                out.push(c);
                rest = &tail[name.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_basic_entities() {
        assert_eq!(decode_basic_entities("a &lt; b &amp;&amp; c", false), "a < b && c");
        assert_eq!(decode_basic_entities("&quot;x&apos;", true), "\"x'");
        assert_eq!(decode_basic_entities("&amp;lt;", false), "&lt;");
    }

    #[test]
    fn test_decode_leaves_unknown_references() {
        assert_eq!(decode_basic_entities("&nbsp;&#38;&", false), "&nbsp;&#38;&");
        assert_eq!(decode_basic_entities("&gt", false), "&gt");
    }

    #[test]
    fn test_default_options() {
        let options = ParserOptions::default();
        assert_eq!(options.delimiters.0, "{{");
        assert_eq!(options.delimiters.1, "}}");
        assert!(options.comments);
        assert!(!(options.is_void_tag)("input"));
        assert_eq!((options.get_namespace)("svg", None), Namespace::Html);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
    }
}
