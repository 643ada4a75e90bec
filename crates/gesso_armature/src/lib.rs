//! Armature - The recursive-descent parser for Gesso templates.
//!
//! Turns template source into the [`gesso_relief`] AST. The parser never
//! stops on malformed input: every problem is recorded as a diagnostic and
//! the best-effort tree is returned.
//!
//! ```
//! use gesso_armature::parse;
//! use gesso_carton::Bump;
//!
//! let allocator = Bump::new();
//! let (root, errors) = parse(&allocator, "<p>{{ greeting }}</p>");
//! assert!(errors.is_empty());
//! assert_eq!(root.children.len(), 1);
//! ```

pub mod cursor;
pub mod parser;

pub use cursor::Cursor;
pub use parser::{parse, parse_with_options, ParseResult, Parser};
