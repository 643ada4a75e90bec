//! Source cursor for the template parser.
//!
//! The cursor is the only thing that moves forward through the template.
//! It keeps the current [`Position`] and derives the remaining input from
//! the original source, so any location can be sliced back out of the
//! original text.

use memchr::{memchr_iter, memrchr};

use gesso_relief::{Position, SourceLocation};

/// Character codes for fast comparison
pub mod char_codes {
    pub const TAB: u8 = 0x09;
    pub const NEWLINE: u8 = 0x0A;
    pub const FORM_FEED: u8 = 0x0C;
    pub const CARRIAGE_RETURN: u8 = 0x0D;
    pub const SPACE: u8 = 0x20;
    pub const EXCLAMATION_MARK: u8 = 0x21;
    pub const DOUBLE_QUOTE: u8 = 0x22;
    pub const SINGLE_QUOTE: u8 = 0x27;
    pub const SLASH: u8 = 0x2F;
    pub const LT: u8 = 0x3C;
    pub const EQ: u8 = 0x3D;
    pub const GT: u8 = 0x3E;
    pub const QUESTION_MARK: u8 = 0x3F;
    pub const GRAVE_ACCENT: u8 = 0x60;
}

use char_codes::*;

/// Check if character is a tag start character (a-z, A-Z)
#[inline]
pub fn is_tag_start_char(c: u8) -> bool {
    c.is_ascii_alphabetic()
}

/// Check if character is whitespace
#[inline]
pub fn is_whitespace(c: u8) -> bool {
    c == SPACE || c == NEWLINE || c == TAB || c == FORM_FEED || c == CARRIAGE_RETURN
}

/// Check if character ends a tag section
#[inline]
pub fn is_end_of_tag_section(c: u8) -> bool {
    c == SLASH || c == GT || is_whitespace(c)
}

/// Move `pos` over the first `n` bytes of `source`, which must start at `pos`.
///
/// Lines advance on `\n`; the column restarts after the last line break and
/// counts characters, not bytes.
pub fn advance_position_with_mutation(pos: &mut Position, source: &str, n: usize) {
    let consumed = &source[..n];
    let bytes = consumed.as_bytes();
    let lines = memchr_iter(NEWLINE, bytes).count() as u32;

    pos.offset += n as u32;
    pos.line += lines;
    pos.column = match memrchr(NEWLINE, bytes) {
        Some(last) => consumed[last + 1..].chars().count() as u32 + 1,
        None => pos.column + consumed.chars().count() as u32,
    };
}

/// Like [`advance_position_with_mutation`], leaving `pos` untouched.
pub fn advance_position_with_clone(pos: Position, source: &str, n: usize) -> Position {
    let mut next = pos;
    advance_position_with_mutation(&mut next, source, n);
    next
}

/// A position inside the original template.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    source: &'a str,
    pos: Position,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: Position::START,
        }
    }

    /// The whole template.
    #[inline]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Input not consumed yet.
    #[inline]
    pub fn rest(&self) -> &'a str {
        &self.source[self.pos.offset as usize..]
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos.offset as usize >= self.source.len()
    }

    #[inline]
    pub fn starts_with(&self, pattern: &str) -> bool {
        self.rest().starts_with(pattern)
    }

    /// Byte `n` positions ahead of the cursor.
    #[inline]
    pub fn peek(&self, n: usize) -> Option<u8> {
        self.rest().as_bytes().get(n).copied()
    }

    /// Consume `n` bytes.
    ///
    /// # Panics
    ///
    /// When `n` runs past the end of the input or splits a character. Both
    /// are bugs in the caller, never a property of the template.
    pub fn advance_by(&mut self, n: usize) {
        let rest = self.rest();
        assert!(n <= rest.len(), "advance_by({n}) past end of input");
        advance_position_with_mutation(&mut self.pos, rest, n);
    }

    /// Skip HTML whitespace.
    pub fn advance_spaces(&mut self) {
        let n = self
            .rest()
            .bytes()
            .position(|b| !is_whitespace(b))
            .unwrap_or_else(|| self.rest().len());
        if n > 0 {
            self.advance_by(n);
        }
    }

    /// Rewind (or jump) to a position captured earlier with [`Self::position`].
    pub fn reset(&mut self, pos: Position) {
        self.pos = pos;
    }

    /// Position `n` bytes after `start`, without moving the cursor.
    pub fn position_at(&self, start: Position, n: usize) -> Position {
        advance_position_with_clone(start, &self.source[start.offset as usize..], n)
    }

    /// Position `n` bytes ahead of the cursor, clamped to the end of input.
    pub fn position_ahead(&self, n: usize) -> Position {
        self.position_at(self.pos, n.min(self.rest().len()))
    }

    /// Location from `start` up to the cursor.
    pub fn selection(&self, start: Position) -> SourceLocation {
        self.selection_between(start, self.pos)
    }

    pub fn selection_between(&self, start: Position, end: Position) -> SourceLocation {
        SourceLocation::new(
            start,
            end,
            &self.source[start.offset as usize..end.offset as usize],
        )
    }
}

/// `source` starts with `</tag` followed by whitespace, `/`, `>` or the end
/// of input. Tag names compare ASCII case-insensitively.
pub fn starts_with_end_tag_open(source: &str, tag: &str) -> bool {
    let bytes = source.as_bytes();
    let name_end = 2 + tag.len();
    bytes.starts_with(b"</")
        && bytes.len() >= name_end
        && bytes[2..name_end].eq_ignore_ascii_case(tag.as_bytes())
        && bytes.get(name_end).map_or(true, |&c| is_end_of_tag_section(c))
}
