//! # Gesso
//!
//! Template parsing toolkit written in Rust.
//!
//! This crate re-exports all Gesso sub-crates for unified documentation and
//! hosts the pieces shared by the `gesso` command-line tool.
//!
//! ## Crates
//!
//! - [`carton`] - Arena allocation, collections and tag tables
//! - [`relief`] - Template AST, diagnostics and parser options
//! - [`armature`] - Template parser
//! - [`atelier_dom`] - Browser parsing rules

/// Arena allocation, collections and tag tables.
pub use gesso_carton as carton;

/// Template AST, diagnostics and parser options.
pub use gesso_relief as relief;

/// Template parser.
pub use gesso_armature as armature;

/// Browser parsing rules.
pub use gesso_atelier_dom as atelier_dom;

pub mod config;
pub mod error;
pub mod render;
