//! Relief - The sculptured AST surface for Gesso templates.
//!
//! Node types, diagnostics and the option set shared by the parser and the
//! platform presets built on top of it.

pub mod ast;
pub mod compat;
pub mod errors;
pub mod options;

pub use ast::*;
pub use compat::{CompatConfig, CompatMode, CompatSetting, DeprecationType};
pub use errors::{CompilerError, CompilerWarning, ErrorCode};
pub use options::{
    decode_basic_entities, ParserOptions, TextMode, WhitespaceStrategy, DEFAULT_MAX_DEPTH,
};
