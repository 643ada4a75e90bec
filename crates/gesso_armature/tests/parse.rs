//! Parser integration tests.
//!
//! Structural properties that must hold for any input, plus the canonical
//! examples of the template syntax.

use gesso_armature::cursor::advance_position_with_clone;
use gesso_armature::{parse, parse_with_options, Parser};
use gesso_carton::Bump;
use gesso_relief::ast::*;
use gesso_relief::{CompatConfig, CompatMode, ParserOptions, TextMode};

/// Every location must be a slice of `source` with consistent line/column.
fn check_loc(source: &str, loc: &SourceLocation) {
    let (start, end) = (loc.start.offset as usize, loc.end.offset as usize);
    assert!(start <= end, "inverted location {loc:?}");
    assert_eq!(
        loc.source.as_str(),
        &source[start..end],
        "location source is not a slice of the input"
    );
    assert_eq!(
        loc.start,
        advance_position_with_clone(Position::START, source, start),
        "start position disagrees with offset {start}"
    );
    assert_eq!(
        loc.end,
        advance_position_with_clone(Position::START, source, end),
        "end position disagrees with offset {end}"
    );
}

fn check_children(source: &str, children: &[TemplateChildNode<'_>]) {
    for pair in children.windows(2) {
        assert!(
            !matches!(
                pair,
                [TemplateChildNode::Text(_), TemplateChildNode::Text(_)]
            ),
            "adjacent text siblings in {source:?}"
        );
    }
    for child in children {
        check_loc(source, child.loc());
        match child {
            TemplateChildNode::Element(el) => {
                for prop in el.props.iter() {
                    check_loc(source, prop.loc());
                    match prop {
                        PropNode::Attribute(attr) => {
                            check_loc(source, &attr.name_loc);
                            if let Some(value) = &attr.value {
                                check_loc(source, &value.loc);
                            }
                        }
                        PropNode::Directive(dir) => {
                            let exprs = dir.arg.iter().chain(&dir.exp).chain(dir.modifiers.iter());
                            for expr in exprs {
                                check_loc(source, &expr.loc);
                            }
                        }
                    }
                }
                check_children(source, &el.children);
            }
            TemplateChildNode::Interpolation(interp) => check_loc(source, &interp.content.loc),
            TemplateChildNode::Text(_) | TemplateChildNode::Comment(_) => {}
        }
    }
}

fn check_invariants(source: &str, options: ParserOptions) {
    let allocator = Bump::new();
    let result = Parser::with_options(&allocator, source, options).parse();
    check_loc(source, &result.root.loc);
    assert_eq!(result.root.loc.source.as_str(), source);
    check_children(source, &result.root.children);
    for loc in result.errors.iter().filter_map(|e| e.loc.as_ref()) {
        check_loc(source, loc);
        assert!(loc.is_empty());
    }
    for loc in result.warnings.iter().filter_map(|w| w.loc.as_ref()) {
        check_loc(source, loc);
    }
}

/// Compact rendering of a subtree, independent of locations.
fn shape(children: &[TemplateChildNode<'_>], out: &mut String) {
    for child in children {
        match child {
            TemplateChildNode::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for prop in el.props.iter() {
                    out.push(' ');
                    out.push_str(prop.name());
                }
                out.push('>');
                shape(&el.children, out);
                out.push_str("</>");
            }
            TemplateChildNode::Text(text) => {
                out.push_str(&format!("[{}]", text.content));
            }
            TemplateChildNode::Comment(comment) => {
                out.push_str(&format!("!{}!", comment.content));
            }
            TemplateChildNode::Interpolation(interp) => {
                out.push_str(&format!("{{{}}}", interp.content.content));
            }
        }
    }
}

fn rich_options() -> ParserOptions {
    ParserOptions {
        get_namespace: |tag, parent| match parent {
            Some(parent) if parent.tag == "foreignObject" => Namespace::Html,
            Some(parent) => parent.ns,
            None if tag == "svg" => Namespace::Svg,
            None => Namespace::Html,
        },
        get_text_mode: |el, _| match el.tag.as_str() {
            "textarea" | "title" => TextMode::RcData,
            "script" | "style" => TextMode::RawText,
            _ => TextMode::Data,
        },
        is_void_tag: |tag| matches!(tag, "br" | "img" | "input"),
        is_pre_tag: |tag| tag == "pre",
        compat: Some(CompatConfig::new(CompatMode::V2)),
        max_depth: 16,
        ..Default::default()
    }
}

mod totality {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Fragments weighted towards markup so random inputs hit the recovery
    /// paths rather than plain text.
    const ALPHABET: &[&str] = &[
        "<", ">", "/", "</", "/>", "<!", "<!--", "-->", "--!>", "--", "<?", "<![CDATA[", "]]>",
        "<!DOCTYPE", "{{", "}}", "=", "\"", "'", "`", " ", "\n", "\r\n", "\t", "&amp;", "&lt;",
        "&", "a", "div", "span", "pre", "svg", "template", "textarea", "script", "Comp", "v-if",
        "v-for", "v-pre", "v-", ":", ".", "@", "#", "[", "]", "sync", "prop", "is", "x", "é",
        "日本", "inline-template",
    ];

    fn random_input(rng: &mut StdRng) -> String {
        let len = rng.gen_range(0..40);
        (0..len)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
            .collect()
    }

    #[test]
    fn random_inputs_default_options() {
        let mut rng = StdRng::seed_from_u64(0x6e55_0001);
        for _ in 0..2_000 {
            let source = random_input(&mut rng);
            check_invariants(&source, ParserOptions::default());
        }
    }

    #[test]
    fn random_inputs_rich_options() {
        let mut rng = StdRng::seed_from_u64(0x6e55_0002);
        for _ in 0..2_000 {
            let source = random_input(&mut rng);
            check_invariants(&source, rich_options());
        }
    }

    #[test]
    fn unterminated_constructs() {
        let inputs = [
            "", "<", "</", "<div", "<div a", "<div a=", "<div a=\"", "<div a='x", "<!--", "<!-- x",
            "<!", "<?", "{{", "{{ a", "<![CDATA[", "<div>{{", "<div :[a", "<template #", "<a v-pre",
            "<textarea>{{ a", "<script><!--", "<svg><![CDATA[", "</a", "<a></", "<a></a",
        ];
        for source in inputs {
            check_invariants(source, ParserOptions::default());
            check_invariants(source, rich_options());
        }
    }

    #[test]
    fn empty_delimiters_disable_interpolation() {
        let allocator = Bump::new();
        let options = ParserOptions {
            delimiters: (gesso_carton::String::default(), "}}".into()),
            ..Default::default()
        };
        let (root, errors) = parse_with_options(&allocator, "a {{ b }}", options);
        assert!(errors.is_empty());
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].as_text().unwrap().content, "a {{ b }}");
    }
}

mod locations {
    use super::*;

    #[test]
    fn well_formed_template() {
        let source = "<div id=\"app\" :class=\"{ active }\" @click.stop=\"go\">\n  \
                      <p v-if=\"ok\">héllo {{ name }}</p>\n  \
                      <!-- note -->\n  \
                      <template #item.label=\"{ x }\"><b>{{ x }}</b></template>\n\
                      </div>";
        check_invariants(source, ParserOptions::default());
    }

    #[test]
    fn crlf_input() {
        check_invariants("<div>\r\n  a\r\n  <b>c</b>\r\n</div>", rich_options());
    }

    #[test]
    fn directive_parts() {
        let allocator = Bump::new();
        let source = "<a\n  v-on:click.once.stop=\"go\"></a>";
        let (root, _) = parse(&allocator, source);
        let el = root.children[0].as_element().unwrap();
        let dir = el.directive("on").unwrap();
        let arg = dir.arg.as_ref().unwrap();
        assert_eq!(arg.loc.start, Position::new(10, 2, 8));
        assert_eq!(dir.modifiers[1].loc.source, "stop");
        assert_eq!(dir.modifiers[1].loc.start.column, 19);
        assert_eq!(dir.exp.as_ref().unwrap().loc.start.offset, 27);
    }
}

mod whitespace {
    use super::*;

    fn render(source: &str) -> String {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, source);
        let mut out = String::new();
        shape(&root.children, &mut out);
        out
    }

    #[test]
    fn condense_between_elements() {
        assert_eq!(render("<a></a> <b></b>"), "<a></>[ ]<b></>");
        assert_eq!(render("<a></a>\n<b></b>"), "<a></><b></>");
        assert_eq!(render("<a></a>\r<b></b>"), "<a></><b></>");
    }

    #[test]
    fn condense_text() {
        assert_eq!(
            render("<div>  hello  <span>world</span>  </div>"),
            "<div>[ hello ]<span>[world]</></>"
        );
        assert_eq!(render("a\n\n  b\t c"), "[a b c]");
    }

    #[test]
    fn whitespace_next_to_interpolation_survives() {
        assert_eq!(render("{{ a }}\n  {{ b }}"), "{a}[ ]{b}");
    }
}

mod idempotence {
    use super::*;

    fn elements<'b, 'a>(children: &'b [TemplateChildNode<'a>], out: &mut Vec<&'b ElementNode<'a>>) {
        for child in children {
            if let TemplateChildNode::Element(el) = child {
                out.push(el);
                elements(&el.children, out);
            }
        }
    }

    #[test]
    fn element_source_reparses_to_same_subtree() {
        let templates = [
            "<div><p class=\"a  b\">x &amp; y</p><ul><li v-for=\"i in xs\">{{ i }}</li></ul></div>",
            "<section>\n  <h1>Title</h1>\n  <!-- c -->\n  <Comp :a=\"b\" @c=\"d\" v-slot:default>t</Comp>\n</section>",
        ];
        let allocator = Bump::new();
        for template in templates {
            let (root, errors) = parse(&allocator, template);
            assert!(errors.is_empty(), "{template}");

            let mut found = Vec::new();
            elements(&root.children, &mut found);
            for el in found {
                let (reparsed, _) = parse(&allocator, &el.loc.source);
                assert_eq!(reparsed.children.len(), 1);
                let (mut expected, mut actual) = (String::new(), String::new());
                shape(&el.children, &mut expected);
                let reparsed_el = reparsed.children[0].as_element().unwrap();
                shape(&reparsed_el.children, &mut actual);
                assert_eq!(reparsed_el.tag, el.tag);
                assert_eq!(actual, expected, "{}", el.loc.source);
            }
        }
    }
}

mod examples {
    use super::*;

    #[test]
    fn interpolation_content_is_trimmed() {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, "{{ a + b }}");
        let TemplateChildNode::Interpolation(interp) = &root.children[0] else {
            panic!("Expected interpolation");
        };
        assert_eq!(interp.content.content, "a + b");
        assert_eq!(interp.content.loc.source, "a + b");
    }

    #[test]
    fn void_by_policy_is_not_self_closing() {
        let allocator = Bump::new();
        let options = ParserOptions {
            is_void_tag: |tag| tag == "input",
            ..Default::default()
        };
        let (root, _) = parse_with_options(&allocator, "<input disabled>", options);
        let input = root.children[0].as_element().unwrap();
        assert!(input.children.is_empty());
        assert!(!input.is_self_closing);
    }

    #[test]
    fn bind_shorthand() {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, "<i :foo.bar=\"baz\"/>");
        let dir = root.children[0].as_element().unwrap().directive("bind").unwrap();
        assert_eq!(dir.arg.as_ref().unwrap().content, "foo");
        assert!(dir.arg.as_ref().unwrap().is_static);
        assert_eq!(dir.modifiers.len(), 1);
        assert_eq!(dir.modifiers[0].content, "bar");
        assert_eq!(dir.exp.as_ref().unwrap().content, "baz");
    }

    #[test]
    fn nested_comment() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, "<!-- a <!-- b --> c -->");
        assert_eq!(errors.len(), 1);
        let TemplateChildNode::Comment(comment) = &root.children[0] else {
            panic!("Expected comment");
        };
        assert_eq!(comment.content, " a <!-- b ");
    }
}
