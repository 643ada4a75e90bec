//! Carton - The artist's toolbox for Gesso.
//!
//! Foundational pieces shared by every Gesso crate: the arena allocator the
//! AST lives in, the string type used for node content, fast hash
//! collections and the DOM tag tables.
//!
//! # Example
//!
//! ```
//! use gesso_carton::{Allocator, Box, Vec};
//!
//! let allocator = Allocator::default();
//!
//! let boxed = Box::new_in(42, allocator.as_bump());
//! assert_eq!(*boxed, 42);
//!
//! let mut vec = Vec::new_in(allocator.as_bump());
//! vec.push(1);
//! vec.push(2);
//! assert_eq!(vec.len(), 2);
//! ```

mod allocator;

pub mod dom_tag_config;
pub mod general;

pub use allocator::Allocator;

// Arena-backed containers
pub use bumpalo::boxed::Box;
pub use bumpalo::collections::Vec;
pub use bumpalo::Bump;

// Re-export compact_str::CompactString for convenience
pub use compact_str::CompactString;
pub use compact_str::CompactString as String;

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};

// Re-export phf for compile-time perfect hash functions
pub use phf::{phf_map, phf_set, Map as PhfMap, Set as PhfSet};

pub use dom_tag_config::*;
pub use general::*;
