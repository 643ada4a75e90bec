//! General string helpers shared by the parser and its presets.

use crate::String;

/// Whitespace as HTML defines it: tab, line feed, form feed, carriage return, space.
#[inline]
pub const fn is_html_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

/// `true` when `s` contains nothing but HTML whitespace (or is empty).
#[inline]
pub fn is_whitespace_only(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' '))
}

/// Collapse every run of HTML whitespace to a single space.
pub fn condense_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for c in s.chars() {
        if is_html_whitespace(c) {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Normalize a `class` attribute value: any whitespace run becomes one
/// space and the ends are trimmed.
pub fn normalize_class_list(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, part) in s.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}

/// Components that ship with the runtime core.
pub fn is_core_component(tag: &str) -> bool {
    matches!(
        tag,
        "Teleport"
            | "teleport"
            | "Suspense"
            | "suspense"
            | "KeepAlive"
            | "keep-alive"
            | "BaseTransition"
            | "base-transition"
    )
}
