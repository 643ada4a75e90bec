//! DOM parser options.

use gesso_carton::String;
use gesso_relief::{CompatConfig, ParserOptions, WhitespaceStrategy, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};

/// DOM parser options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomParserOptions {
    /// Whitespace handling
    #[serde(default)]
    pub whitespace: WhitespaceStrategy,

    /// Whether to keep comment nodes
    #[serde(default = "default_comments")]
    pub comments: bool,

    /// Interpolation delimiters, `{{` `}}` when absent
    #[serde(default)]
    pub delimiters: Option<(String, String)>,

    /// Legacy syntax emulation
    #[serde(default)]
    pub compat: Option<CompatConfig>,

    /// Deepest element nesting parsed as a tree
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_comments() -> bool {
    true
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for DomParserOptions {
    fn default() -> Self {
        Self {
            whitespace: WhitespaceStrategy::Condense,
            comments: true,
            delimiters: None,
            compat: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DomParserOptions {
    /// Apply these settings on top of `base`.
    pub fn apply(self, base: ParserOptions) -> ParserOptions {
        ParserOptions {
            whitespace: self.whitespace,
            comments: self.comments,
            delimiters: self.delimiters.unwrap_or(base.delimiters),
            compat: self.compat,
            max_depth: self.max_depth,
            ..base
        }
    }
}

/// Tag tables consulted by the DOM parsing rules
pub mod element_checks {
    use phf::phf_set;

    /// Elements whose content is raw text (no markup, no entities)
    pub static RAW_TEXT_ELEMENTS: phf::Set<&'static str> = phf_set! {
        "style", "iframe", "script", "noscript"
    };

    /// Elements whose content is escapable raw text (entities only)
    pub static RCDATA_ELEMENTS: phf::Set<&'static str> = phf_set! {
        "textarea", "title"
    };

    /// MathML elements whose children are HTML
    pub static MATH_ML_TEXT_INTEGRATION_POINTS: phf::Set<&'static str> = phf_set! {
        "mi", "mo", "mn", "ms", "mtext"
    };

    /// SVG elements whose children are HTML
    pub static SVG_HTML_INTEGRATION_POINTS: phf::Set<&'static str> = phf_set! {
        "foreignObject", "desc", "title"
    };

    /// Components the DOM runtime provides
    pub static BUILT_IN_COMPONENTS: phf::Set<&'static str> = phf_set! {
        "Transition", "transition", "TransitionGroup", "transition-group"
    };

    #[inline]
    pub fn is_raw_text_element(tag: &str) -> bool {
        RAW_TEXT_ELEMENTS.contains(tag)
    }

    #[inline]
    pub fn is_rcdata_element(tag: &str) -> bool {
        RCDATA_ELEMENTS.contains(tag)
    }

    #[inline]
    pub fn is_built_in_component(tag: &str) -> bool {
        BUILT_IN_COMPONENTS.contains(tag)
    }
}
