//! Leaf nodes: text runs, interpolations, comments and CDATA sections.

use memchr::{memchr, memmem};

use gesso_carton::{String, Vec};
use gesso_relief::ast::*;
use gesso_relief::{ErrorCode, TextMode};

use super::Parser;
use crate::cursor::char_codes::*;

impl<'a> Parser<'a> {
    /// Text up to the next construct the dispatcher recognizes in `mode`.
    ///
    /// The search skips the first character: whatever sits there was already
    /// rejected as markup.
    pub(super) fn parse_text(&mut self, mode: TextMode) -> TextNode {
        let rest = self.cursor.rest();
        let skip = rest.chars().next().map_or(0, char::len_utf8);
        let tail = &rest.as_bytes()[skip..];

        let found = if mode == TextMode::CData {
            memmem::find(tail, b"]]>")
        } else {
            let open = self.options.delimiters.0.as_bytes();
            let delimiter = if open.is_empty() {
                None
            } else {
                memmem::find(tail, open)
            };
            memchr(LT, tail).into_iter().chain(delimiter).min()
        };
        let end = found.map_or(rest.len(), |index| index + skip);

        let start = self.cursor.position();
        let content = self.parse_text_data(end, mode);
        TextNode::new(content, self.cursor.selection(start))
    }

    /// Consume `len` bytes, decoding character references where `mode`
    /// allows them.
    pub(super) fn parse_text_data(&mut self, len: usize, mode: TextMode) -> String {
        let raw = &self.cursor.rest()[..len];
        self.cursor.advance_by(len);

        if matches!(mode, TextMode::RawText | TextMode::CData)
            || memchr(b'&', raw.as_bytes()).is_none()
        {
            String::from(raw)
        } else {
            (self.options.decode_entities)(raw, mode == TextMode::AttributeValue)
        }
    }

    /// `None` when the close delimiter is missing; the caller then falls back
    /// to plain text.
    pub(super) fn parse_interpolation(&mut self, mode: TextMode) -> Option<InterpolationNode> {
        let (open_len, close_len) = (
            self.options.delimiters.0.len(),
            self.options.delimiters.1.len(),
        );
        let rest = self.cursor.rest();
        let Some(raw_len) = memmem::find(
            &rest.as_bytes()[open_len..],
            self.options.delimiters.1.as_bytes(),
        ) else {
            self.emit_error(ErrorCode::MissingInterpolationEnd, 0);
            return None;
        };

        let start = self.cursor.position();
        self.cursor.advance_by(open_len);
        let inner_start = self.cursor.position();
        let raw = &rest[open_len..open_len + raw_len];
        let decoded = self.parse_text_data(raw_len, mode);

        // The expression span excludes the padding, measured on the raw text.
        let trimmed = raw.trim();
        let (lo, hi) = if trimmed.is_empty() {
            (0, 0)
        } else {
            let lo = raw.len() - raw.trim_start().len();
            (lo, lo + trimmed.len())
        };
        let expr_loc = self.cursor.selection_between(
            self.cursor.position_at(inner_start, lo),
            self.cursor.position_at(inner_start, hi),
        );
        self.cursor.advance_by(close_len);

        Some(InterpolationNode {
            content: SimpleExpressionNode::new(decoded.trim(), false, expr_loc),
            loc: self.cursor.selection(start),
        })
    }

    pub(super) fn parse_comment(&mut self) -> CommentNode {
        let start = self.cursor.position();
        let rest = self.cursor.rest();

        let content = match find_comment_close(rest) {
            None => {
                self.cursor.advance_by(rest.len());
                self.emit_error(ErrorCode::EofInComment, 0);
                rest.get(4..).unwrap_or_default()
            }
            Some((index, close_len)) => {
                if index <= 3 {
                    self.emit_error(ErrorCode::AbruptClosingOfEmptyComment, 0);
                }
                if close_len == 4 {
                    self.emit_error(ErrorCode::IncorrectlyClosedComment, 0);
                }

                // Walk over nested openers so each report points at its `<!--`.
                let body = &rest.as_bytes()[..index];
                let finder = memmem::Finder::new(b"<!--");
                let mut prev = 1;
                while let Some(found) = finder.find(&body[prev..]) {
                    let nested = prev + found;
                    self.cursor.advance_by(nested - prev + 1);
                    if nested + 4 < body.len() {
                        self.emit_error(ErrorCode::NestedComment, 0);
                    }
                    prev = nested + 1;
                }
                self.cursor.advance_by(index + close_len - prev + 1);

                rest.get(4..index).unwrap_or_default()
            }
        };

        CommentNode::new(content, self.cursor.selection(start))
    }

    /// Comment synthesized from `<!...>`, `<?...>` or a malformed end tag.
    pub(super) fn parse_bogus_comment(&mut self) -> CommentNode {
        let start = self.cursor.position();
        let rest = self.cursor.rest();
        let content_start = if rest.as_bytes().get(1) == Some(&QUESTION_MARK) {
            1
        } else {
            2
        };

        let (content, consumed) = match memchr(GT, rest.as_bytes()) {
            Some(close) => (rest.get(content_start..close), close + 1),
            None => (rest.get(content_start..), rest.len()),
        };
        self.cursor.advance_by(consumed);

        CommentNode::new(content.unwrap_or_default(), self.cursor.selection(start))
    }

    pub(super) fn parse_cdata(&mut self) -> Vec<'a, TemplateChildNode<'a>> {
        self.cursor.advance_by("<![CDATA[".len());
        let nodes = self.parse_children(TextMode::CData);
        if self.cursor.is_eof() {
            self.emit_error(ErrorCode::EofInCdata, 0);
        } else {
            self.cursor.advance_by("]]>".len());
        }
        nodes
    }
}

/// Index and length of the first `-->` or `--!>`.
fn find_comment_close(source: &str) -> Option<(usize, usize)> {
    let bytes = source.as_bytes();
    let mut from = 0;
    while let Some(found) = memmem::find(&bytes[from..], b"--") {
        let at = from + found;
        match &bytes[at + 2..] {
            [GT, ..] => return Some((at, 3)),
            [EXCLAMATION_MARK, GT, ..] => return Some((at, 4)),
            _ => from = at + 1,
        }
    }
    None
}
