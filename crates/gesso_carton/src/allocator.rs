//! Arena allocator used for every AST node.

use bumpalo::Bump;
use std::ops::Deref;

/// Thin owner around a [`Bump`] arena.
///
/// A parse borrows the arena for its whole output lifetime; dropping the
/// allocator frees the tree in one go.
#[derive(Default)]
pub struct Allocator {
    bump: Bump,
}

impl Allocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the arena, typically from the source length.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bump: Bump::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn as_bump(&self) -> &Bump {
        &self.bump
    }

    /// Bytes handed out by the arena so far.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    /// Drop everything allocated so far and keep the largest chunk for reuse.
    pub fn reset(&mut self) {
        self.bump.reset();
    }
}

impl Deref for Allocator {
    type Target = Bump;

    fn deref(&self) -> &Self::Target {
        &self.bump
    }
}
