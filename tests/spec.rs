mod harness;

use harness::assert_html;

mod headers {
    use super::*;

    #[test]
    fn atx_header_level_one() {
        assert_html("# Hello", "<h1>Hello</h1>\n");
    }

    #[test]
    fn atx_header_level_two() {
        assert_html("## Hello", "<h2>Hello</h2>\n");
    }

    #[test]
    fn setext_header_level_one() {
        assert_html("Hello\n=====", "<h1>Hello</h1>\n");
    }

    #[test]
    fn setext_header_level_two() {
        assert_html("Hello\n-----", "<h2>Hello</h2>\n");
    }
}

mod blockquotes {
    use super::*;

    #[test]
    fn lazy_continuation_joins_paragraph_lines() {
        assert_html("> a\n> b", "<blockquote>\n<p>a\nb</p>\n</blockquote>\n");
    }

    #[test]
    fn nested_quote_depth() {
        assert_html(
            "> outer\n> > inner",
            "<blockquote>\n<p>outer</p>\n<blockquote>\n<p>inner</p>\n</blockquote>\n</blockquote>\n",
        );
    }
}

mod lists {
    use super::*;

    #[test]
    fn tight_unordered_list() {
        assert_html("- a\n- b", "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn loose_unordered_list() {
        assert_html(
            "- a\n\n- b",
            "<ul>\n<li><p>a</p>\n</li>\n<li><p>b</p>\n</li>\n</ul>\n",
        );
    }

    #[test]
    fn ordered_list() {
        assert_html("1. a\n2. b", "<ol>\n<li>a</li>\n<li>b</li>\n</ol>\n");
    }

    #[test]
    fn nested_indented_block_inside_item() {
        let html = harness::render_to_html("- a\n\n      code\n");
        assert!(html.contains("<pre><code>code"));
    }
}

mod code_blocks {
    use super::*;

    #[test]
    fn indented_code_block() {
        assert_html("    code\n    more", "<pre><code>code\nmore</code></pre>\n");
    }

    #[test]
    fn tab_indented_code_block() {
        assert_html("\tcode", "<pre><code>code</code></pre>\n");
    }

    #[test]
    fn code_block_escapes_html() {
        assert_html("    <div>", "<pre><code>&lt;div&gt;</code></pre>\n");
    }
}

mod links_and_images {
    use super::*;

    #[test]
    fn inline_link_with_title() {
        assert_html(
            "[foo](http://x \"t\")",
            "<p><a href=\"http://x\" title=\"t\">foo</a></p>\n",
        );
    }

    #[test]
    fn reference_style_link() {
        assert_html(
            "[foo][1]\n\n[1]: http://x \"t\"",
            "<p><a href=\"http://x\" title=\"t\">foo</a></p>\n",
        );
    }

    #[test]
    fn shortcut_reference_uses_text_as_id() {
        assert_html("[foo][]\n\n[foo]: http://x", "<p><a href=\"http://x\">foo</a></p>\n");
    }

    #[test]
    fn unresolved_reference_falls_back_to_literal_syntax() {
        assert_html("[foo][nope]", "<p>[foo][nope]</p>\n");
    }

    #[test]
    fn inline_image_with_alt_text() {
        assert_html("![alt](http://x/a.png)", "<p><img src=\"http://x/a.png\" alt=\"alt\"/></p>\n");
    }

    #[test]
    fn unresolved_image_reference_renders_empty_src() {
        assert_html("![alt][nope]", "<p><img src=\"\" alt=\"alt\"/></p>\n");
    }
}

mod emphasis_and_spans {
    use super::*;

    #[test]
    fn italic() {
        assert_html("*a*", "<p><em>a</em></p>\n");
    }

    #[test]
    fn bold() {
        assert_html("**a**", "<p><strong>a</strong></p>\n");
    }

    #[test]
    fn bold_italic() {
        assert_html("***bold italic***", "<p><strong><em>bold italic</em></strong></p>\n");
    }

    #[test]
    fn underscore_emphasis() {
        assert_html("_a_", "<p><em>a</em></p>\n");
    }

    #[test]
    fn code_span_single_backtick() {
        assert_html("`a < b`", "<p><code>a &lt; b</code></p>\n");
    }

    #[test]
    fn code_span_double_backtick_allows_internal_backtick() {
        assert_html("``a ` b``", "<p><code>a ` b</code></p>\n");
    }
}

mod rulers {
    use super::*;

    #[test]
    fn star_ruler() {
        assert_html("***", "<hr/>\n");
    }

    #[test]
    fn dash_ruler() {
        assert_html("---", "<hr/>\n");
    }

    #[test]
    fn underscore_ruler_with_spaces() {
        assert_html("_ _ _", "<hr/>\n");
    }
}

mod html_passthrough {
    use super::*;

    #[test]
    fn balanced_inline_tag_round_trips() {
        assert_html("<span>a</span>", "<p><span>a</span></p>\n");
    }

    #[test]
    fn self_closing_tag() {
        assert_html("<br/>", "<p><br/></p>\n");
    }

    #[test]
    fn comment_is_passed_through() {
        assert_html("<!-- a comment -->", "<!-- a comment -->\n");
    }
}

mod entities {
    use super::*;

    #[test]
    fn named_entity_passes_through_unescaped() {
        assert_html("&amp;", "<p>&amp;</p>\n");
    }

    #[test]
    fn numeric_entity_passes_through_unescaped() {
        assert_html("&#169;", "<p>&#169;</p>\n");
    }

    #[test]
    fn hex_numeric_entity_passes_through_unescaped() {
        assert_html("&#x1F;", "<p>&#x1F;</p>\n");
    }

    #[test]
    fn escaped_punctuation_is_literal() {
        assert_html("\\*not emphasis\\*", "<p>*not emphasis*</p>\n");
    }
}

mod invariants {
    use super::*;
    use markdown_core::ast::NodeKind;

    /// transform is total on arbitrary input: it either produces HTML or
    /// raises a typed error, never panics or loops.
    #[test]
    fn transform_is_total_on_varied_input() {
        let inputs = [
            "",
            "   \n\n   ",
            "# \n",
            "[[[[",
            "````",
            "> > > > nested",
            "- \n- \n-",
            "<div><span><p>",
            "***",
            "\\",
        ];
        for input in inputs {
            let mut out = String::new();
            let _ = markdown_core::transform(input, &mut out);
        }
    }

    #[test]
    fn special_characters_are_escaped_in_text() {
        assert_html("a & b < c > d \"e\"", "<p>a &amp; b &lt; c &gt; d &quot;e&quot;</p>\n");
    }

    #[test]
    fn hr_tag_alone_in_paragraph_renders_without_p_wrapper() {
        let html = harness::render_to_html("<hr>\n");
        assert_eq!(html, "<hr/>\n");
    }

    #[test]
    fn tight_item_has_no_inner_p() {
        let doc = harness::parse_to_document("- a\n- b");
        let root = doc.root();
        let list = doc.children(root)[0];
        for &item in doc.children(list) {
            assert!(matches!(doc.kind(item), NodeKind::Item { loose: false, .. }));
        }
        assert!(!harness::render_to_html("- a\n- b").contains("<p>"));
    }

    #[test]
    fn loose_item_wraps_paragraph() {
        let doc = harness::parse_to_document("- a\n\n- b");
        let root = doc.root();
        let list = doc.children(root)[0];
        for &item in doc.children(list) {
            assert!(matches!(doc.kind(item), NodeKind::Item { loose: true, .. }));
        }
    }

    #[test]
    fn reference_ids_match_case_sensitively() {
        assert_html("[foo][Bar]\n\n[bar]: http://x", "<p>[foo][Bar]</p>\n");
    }
}
