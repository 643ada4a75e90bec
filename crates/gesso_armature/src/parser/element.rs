//! Elements, tags and attributes.

use memchr::memchr;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use gesso_carton::{is_core_component, normalize_class_list, Box, FxHashSet, String, Vec};
use gesso_relief::ast::*;
use gesso_relief::{DeprecationType, ErrorCode, TextMode};

use super::{Parsed, Parser, ParserStackEntry};
use crate::cursor::{
    char_codes::*, is_end_of_tag_section, is_whitespace, starts_with_end_tag_open,
};

/// Splits a directive attribute name into name, argument and modifiers.
static DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^v-([a-z0-9-]+))?(?:(?::|^\.|^@|^#)(\[[^\]]+\]|[^\.]+))?(.+)?$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagType {
    Start,
    End,
}

/// Everything a tag carries before it becomes an element.
struct TagParts<'a> {
    start: Position,
    tag: &'a str,
    props: Vec<'a, PropNode<'a>>,
    is_self_closing: bool,
}

/// Attribute value as written, before it is attached to a node.
struct AttributeValue {
    content: String,
    is_quoted: bool,
    /// Including the quotes.
    loc: SourceLocation,
    /// Between the quotes.
    inner: SourceLocation,
}

/// Directives that make a `<template>` more than a plain element.
fn is_special_template_directive(prop: &PropNode<'_>) -> bool {
    matches!(
        prop,
        PropNode::Directive(dir)
            if matches!(dir.name.as_str(), "if" | "else" | "else-if" | "for" | "slot")
    )
}

fn is_directive_name(name: &str) -> bool {
    match name.as_bytes() {
        [b'v', b'-', c, ..] => c.is_ascii_alphanumeric() || *c == b'-',
        [b':' | b'.' | b'@' | b'#', ..] => true,
        _ => false,
    }
}

impl<'a> Parser<'a> {
    /// Parse a start tag. Elements with content are pushed on the ancestor
    /// stack and finished by [`Parser::close_element`].
    pub(super) fn open_element(&mut self) -> Parsed<'a> {
        let was_in_pre = self.in_pre;
        let was_in_v_pre = self.in_v_pre;

        let parts = self.parse_tag(TagType::Start);
        let element = self.create_element(parts);

        if element.is_self_closing || (self.options.is_void_tag)(&element.tag) {
            self.in_pre = was_in_pre;
            self.in_v_pre = was_in_v_pre;
            return self.finish_element(element);
        }

        if self.stack.len() >= self.options.max_depth {
            tracing::trace!(
                tag = %element.tag,
                depth = self.stack.len(),
                "nesting limit reached, closing element early"
            );
            self.emit_error_at(ErrorCode::NestingTooDeep, element.loc.start);
            self.in_pre = was_in_pre;
            self.in_v_pre = was_in_v_pre;
            return self.finish_element(element);
        }

        let mode = (self.options.get_text_mode)(&element, self.parent());
        tracing::trace!(tag = %element.tag, ?mode, depth = self.stack.len(), "open element");
        self.stack.push(ParserStackEntry {
            element,
            mode,
            children: Vec::new_in(self.allocator),
            in_pre: was_in_pre,
            in_v_pre: was_in_v_pre,
        });
        Parsed::Skip
    }

    /// Pop the innermost open element and consume its end tag if present.
    pub(super) fn close_element(&mut self) -> Parsed<'a> {
        let Some(entry) = self.stack.pop() else {
            return Parsed::Skip;
        };
        let mut element = entry.element;
        let mut children = entry.children;
        if !matches!(entry.mode, TextMode::RawText | TextMode::RcData) {
            let pre_parent = (self.options.is_pre_tag)(&element.tag);
            self.condense_children(&mut children, pre_parent);
        }

        if self.options.compat.is_some() {
            self.apply_inline_template(&mut element);
        }
        element.children = children;

        if starts_with_end_tag_open(self.cursor.rest(), &element.tag) {
            self.parse_tag(TagType::End);
        } else {
            self.emit_error_at(ErrorCode::MissingEndTag, element.loc.start);
            if self.cursor.is_eof() && element.tag.eq_ignore_ascii_case("script") {
                let comment_like = element
                    .children
                    .first()
                    .is_some_and(|first| first.loc().source.starts_with("<!--"));
                if comment_like {
                    self.emit_error(ErrorCode::EofInScriptHtmlCommentLikeText, 0);
                }
            }
        }

        element.loc = self.cursor.selection(element.loc.start);
        tracing::trace!(tag = %element.tag, end = element.loc.end.offset, "close element");
        self.in_pre = entry.in_pre;
        self.in_v_pre = entry.in_v_pre;
        self.finish_element(element)
    }

    /// The element as a node, or just its children for a legacy plain
    /// `<template>`.
    fn finish_element(&mut self, element: ElementNode<'a>) -> Parsed<'a> {
        if element.tag == "template"
            && self.is_compat_enabled(DeprecationType::NativeTemplate)
            && !element.props.iter().any(is_special_template_directive)
        {
            self.warn_deprecation(DeprecationType::NativeTemplate, &element.loc, None);
            return Parsed::Nodes(element.children);
        }
        Parsed::Node(TemplateChildNode::Element(Box::new_in(
            element,
            self.allocator,
        )))
    }

    /// End tag that matches no open element: consumed and dropped.
    pub(super) fn skip_end_tag(&mut self) {
        self.parse_tag(TagType::End);
    }

    fn parse_tag(&mut self, kind: TagType) -> TagParts<'a> {
        let start = self.cursor.position();
        let rest = self.cursor.rest();
        let open_len = match kind {
            TagType::Start => 1,
            TagType::End => 2,
        };
        let name_len = rest.as_bytes()[open_len..]
            .iter()
            .position(|&c| is_end_of_tag_section(c))
            .unwrap_or(rest.len() - open_len);
        let tag = &rest[open_len..open_len + name_len];

        self.cursor.advance_by(open_len + name_len);
        self.cursor.advance_spaces();

        let attributes_start = self.cursor.position();
        if kind == TagType::Start && (self.options.is_pre_tag)(tag) {
            self.in_pre = true;
        }

        let errors_mark = self.errors.len();
        let warnings_mark = self.warnings.len();
        let mut props = self.parse_attributes(kind);

        // v-pre changes how every attribute of its own tag is read, including
        // the ones before it, so the attribute list is parsed again.
        let has_v_pre = props
            .iter()
            .any(|p| matches!(p, PropNode::Directive(dir) if dir.name == "pre"));
        if kind == TagType::Start && !self.in_v_pre && has_v_pre {
            self.in_v_pre = true;
            self.cursor.reset(attributes_start);
            self.errors.truncate(errors_mark);
            self.warnings.truncate(warnings_mark);
            props = self.parse_attributes(kind);
            props.retain(|p| p.name() != "v-pre");
        }

        let mut is_self_closing = false;
        if self.cursor.is_eof() {
            self.emit_error(ErrorCode::EofInTag, 0);
        } else {
            is_self_closing = self.cursor.starts_with("/>");
            if kind == TagType::End && is_self_closing {
                self.emit_error(ErrorCode::EndTagWithTrailingSolidus, 0);
            }
            self.cursor.advance_by(if is_self_closing { 2 } else { 1 });
        }

        TagParts {
            start,
            tag,
            props,
            is_self_closing,
        }
    }

    fn create_element(&mut self, parts: TagParts<'a>) -> ElementNode<'a> {
        let TagParts {
            start,
            tag,
            props,
            is_self_closing,
        } = parts;
        let loc = self.cursor.selection(start);

        if self.is_compat_enabled(DeprecationType::VIfVForPrecedence) {
            let has_if = props
                .iter()
                .any(|p| matches!(p, PropNode::Directive(d) if d.name == "if"));
            let has_for = props
                .iter()
                .any(|p| matches!(p, PropNode::Directive(d) if d.name == "for"));
            if has_if && has_for {
                self.warn_deprecation(DeprecationType::VIfVForPrecedence, &loc, None);
            }
        }

        let tag_type = if self.in_v_pre {
            ElementType::Element
        } else if tag == "slot" {
            ElementType::Slot
        } else if tag == "template" {
            if props.iter().any(is_special_template_directive) {
                ElementType::Template
            } else {
                ElementType::Element
            }
        } else if self.is_component(tag, &props) {
            ElementType::Component
        } else {
            ElementType::Element
        };

        let mut element = ElementNode::new(self.allocator, tag, loc);
        element.ns = (self.options.get_namespace)(tag, self.parent());
        element.tag_type = tag_type;
        element.props = props;
        element.is_self_closing = is_self_closing;
        element
    }

    fn is_component(&mut self, tag: &str, props: &[PropNode<'a>]) -> bool {
        let options = &self.options;
        if options.is_custom_element.is_some_and(|f| f(tag)) {
            return false;
        }
        if tag == "component"
            || tag.starts_with(|c: char| c.is_ascii_uppercase())
            || is_core_component(tag)
            || options.is_built_in_component.is_some_and(|f| f(tag))
            || options.is_native_tag.is_some_and(|f| !f(tag))
        {
            return true;
        }

        // A native tag can still be cast with `is`.
        for prop in props {
            match prop {
                PropNode::Attribute(attr) if attr.name == "is" => {
                    if let Some(value) = &attr.value {
                        if value.content.starts_with("vue:")
                            || self.check_compat_enabled(
                                DeprecationType::IsOnElement,
                                &attr.loc,
                                None,
                            )
                        {
                            return true;
                        }
                    }
                }
                PropNode::Directive(dir) => {
                    if dir.name == "is" {
                        return true;
                    }
                    if dir.name == "bind"
                        && dir.is_static_arg("is")
                        && self.check_compat_enabled(DeprecationType::IsOnElement, &dir.loc, None)
                    {
                        return true;
                    }
                }
                PropNode::Attribute(_) => {}
            }
        }
        false
    }

    /// `inline-template` receives the element's inner source as its value.
    fn apply_inline_template(&mut self, element: &mut ElementNode<'a>) {
        let Some(index) = element
            .props
            .iter()
            .position(|p| matches!(p, PropNode::Attribute(a) if a.name == "inline-template"))
        else {
            return;
        };
        let prop_loc = element.props[index].loc().clone();
        if !self.check_compat_enabled(DeprecationType::InlineTemplate, &prop_loc, None) {
            return;
        }
        let loc = self.cursor.selection(element.loc.end);
        if let PropNode::Attribute(attr) = &mut element.props[index] {
            attr.value = Some(TextNode::new(loc.source.clone(), loc));
        }
    }

    fn parse_attributes(&mut self, kind: TagType) -> Vec<'a, PropNode<'a>> {
        let mut props = Vec::new_in(self.allocator);
        let mut names: FxHashSet<&'a str> = FxHashSet::default();

        while !self.cursor.is_eof()
            && !self.cursor.starts_with(">")
            && !self.cursor.starts_with("/>")
        {
            if self.cursor.starts_with("/") {
                self.emit_error(ErrorCode::UnexpectedSolidusInTag, 0);
                self.cursor.advance_by(1);
                self.cursor.advance_spaces();
                continue;
            }
            if kind == TagType::End {
                self.emit_error(ErrorCode::EndTagWithAttributes, 0);
            }

            let mut prop = self.parse_attribute(&mut names);
            if let PropNode::Attribute(attr) = &mut prop {
                if attr.name == "class" {
                    if let Some(value) = &mut attr.value {
                        value.content = normalize_class_list(&value.content);
                    }
                }
            }
            if kind == TagType::Start {
                props.push(prop);
            }

            if self
                .cursor
                .peek(0)
                .is_some_and(|c| !is_end_of_tag_section(c))
            {
                self.emit_error(ErrorCode::MissingWhitespaceBetweenAttributes, 0);
            }
            self.cursor.advance_spaces();
        }
        props
    }

    fn parse_attribute(&mut self, names: &mut FxHashSet<&'a str>) -> PropNode<'a> {
        let start = self.cursor.position();
        let rest = self.cursor.rest();

        // The first character may be anything but a separator, even `=`.
        let first_len = rest.chars().next().map_or(0, char::len_utf8);
        let name_len = first_len
            + rest.as_bytes()[first_len..]
                .iter()
                .position(|&c| is_end_of_tag_section(c) || c == EQ)
                .unwrap_or(rest.len() - first_len);
        let name: &'a str = &rest[..name_len];

        if !names.insert(name) {
            self.emit_error(ErrorCode::DuplicateAttribute, 0);
        }
        if name.starts_with('=') {
            self.emit_error(ErrorCode::UnexpectedEqualsSignBeforeAttributeName, 0);
        }
        for (i, c) in name.bytes().enumerate() {
            if matches!(c, DOUBLE_QUOTE | SINGLE_QUOTE | LT) {
                self.emit_error(ErrorCode::UnexpectedCharacterInAttributeName, i);
            }
        }
        self.cursor.advance_by(name_len);
        let name_loc = self.cursor.selection(start);

        let mut value = None;
        let rest = self.cursor.rest();
        let equals_follows = rest
            .bytes()
            .position(|c| !is_whitespace(c))
            .is_some_and(|i| rest.as_bytes()[i] == EQ);
        if equals_follows {
            self.cursor.advance_spaces();
            self.cursor.advance_by(1);
            self.cursor.advance_spaces();
            value = self.parse_attribute_value();
            if value.is_none() {
                self.emit_error(ErrorCode::MissingAttributeValue, 0);
            }
        }
        let loc = self.cursor.selection(start);

        if !self.in_v_pre && is_directive_name(name) {
            if let Some(caps) = DIRECTIVE_RE.captures(name) {
                let dir = self.create_directive(name, &caps, start, value, loc);
                return PropNode::Directive(Box::new_in(dir, self.allocator));
            }
        }

        if !self.in_v_pre && name.starts_with("v-") {
            self.emit_error(ErrorCode::MissingDirectiveName, 0);
        }

        let mut attr = AttributeNode::new(name, loc);
        attr.name_loc = name_loc;
        attr.value = value.map(|v| TextNode::new(v.content, v.loc));
        PropNode::Attribute(Box::new_in(attr, self.allocator))
    }

    fn create_directive(
        &mut self,
        name: &'a str,
        caps: &Captures<'a>,
        start: Position,
        value: Option<AttributeValue>,
        loc: SourceLocation,
    ) -> DirectiveNode<'a> {
        let is_prop_shorthand = name.starts_with('.');
        let mut dir_name = match caps.get(1) {
            Some(explicit) => explicit.as_str(),
            None if is_prop_shorthand || name.starts_with(':') => "bind",
            None if name.starts_with('@') => "on",
            None => "slot",
        };
        let remainder = caps.get(3);

        let mut arg = None;
        if let Some(raw_arg) = caps.get(2) {
            let is_slot = dir_name == "slot";
            // Slot names may contain dots, so the remainder belongs to the arg.
            let end = match remainder {
                Some(rem) if is_slot => rem.end(),
                _ => raw_arg.end(),
            };
            let arg_loc = self.cursor.selection_between(
                self.cursor.position_at(start, raw_arg.start()),
                self.cursor.position_at(start, end),
            );

            let (content, is_static) = match raw_arg.as_str().strip_prefix('[') {
                Some(inner) => match inner.strip_suffix(']') {
                    Some(inner) => (inner, false),
                    None => {
                        self.emit_error(ErrorCode::MissingDynamicDirectiveArgumentEnd, 0);
                        (inner, false)
                    }
                },
                None if is_slot => (&name[raw_arg.start()..end], true),
                None => (raw_arg.as_str(), true),
            };
            arg = Some(SimpleExpressionNode::new(content, is_static, arg_loc));
        }

        let mut modifiers = Vec::new_in(self.allocator);
        if let Some(rem) = remainder {
            // The leading character (normally the `.`) is not part of a modifier.
            let lead = rem.as_str().chars().next().map_or(0, char::len_utf8);
            let mut offset = rem.start() + lead;
            for modifier in rem.as_str()[lead..].split('.') {
                let modifier_loc = self.cursor.selection_between(
                    self.cursor.position_at(start, offset),
                    self.cursor.position_at(start, offset + modifier.len()),
                );
                modifiers.push(SimpleExpressionNode::new(modifier, true, modifier_loc));
                offset += modifier.len() + 1;
            }
        }
        if is_prop_shorthand {
            let dot_loc = self
                .cursor
                .selection_between(start, self.cursor.position_at(start, 1));
            modifiers.push(SimpleExpressionNode::new("prop", true, dot_loc));
        }

        if dir_name == "bind" {
            if let Some(arg) = &arg {
                let sync = modifiers.iter().position(|m| m.content == "sync");
                if let Some(sync) = sync {
                    if self.check_compat_enabled(
                        DeprecationType::VBindSync,
                        &loc,
                        Some(arg.loc.source.as_str()),
                    ) {
                        dir_name = "model";
                        modifiers.remove(sync);
                    }
                }
                if modifiers.iter().any(|m| m.content == "prop") {
                    self.check_compat_enabled(DeprecationType::VBindProp, &loc, None);
                }
            }
        }

        let mut dir = DirectiveNode::new(self.allocator, dir_name, name, loc);
        dir.arg = arg;
        dir.exp = value.map(|v| {
            let exp_loc = if v.is_quoted { v.inner } else { v.loc };
            SimpleExpressionNode::new(v.content, false, exp_loc)
        });
        dir.modifiers = modifiers;
        dir
    }

    fn parse_attribute_value(&mut self) -> Option<AttributeValue> {
        let start = self.cursor.position();

        if let Some(quote @ (DOUBLE_QUOTE | SINGLE_QUOTE)) = self.cursor.peek(0) {
            self.cursor.advance_by(1);
            let inner_start = self.cursor.position();
            let rest = self.cursor.rest();
            let close = memchr(quote, rest.as_bytes());
            // An unterminated value runs to the end of input.
            let content =
                self.parse_text_data(close.unwrap_or(rest.len()), TextMode::AttributeValue);
            let inner = self.cursor.selection(inner_start);
            if close.is_some() {
                self.cursor.advance_by(1);
            }
            return Some(AttributeValue {
                content,
                is_quoted: true,
                loc: self.cursor.selection(start),
                inner,
            });
        }

        let rest = self.cursor.rest();
        let len = rest
            .bytes()
            .position(|c| is_whitespace(c) || c == GT)
            .unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        for (i, c) in rest[..len].bytes().enumerate() {
            if matches!(c, DOUBLE_QUOTE | SINGLE_QUOTE | LT | EQ | GRAVE_ACCENT) {
                self.emit_error(ErrorCode::UnexpectedCharacterInUnquotedAttributeValue, i);
            }
        }
        let content = self.parse_text_data(len, TextMode::AttributeValue);
        let loc = self.cursor.selection(start);
        Some(AttributeValue {
            content,
            is_quoted: false,
            inner: loc.clone(),
            loc,
        })
    }
}
