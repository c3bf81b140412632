//! A hand-written tokenizer, recursive-descent parser, AST, and HTML visitor
//! for classic (2004 Gruber) Markdown.
//!
//! The crate's only external surface is [`transform`]: it consumes a
//! Markdown source string to completion and writes HTML to a sink
//! implementing [`std::fmt::Write`]. Everything else — the lexer, the
//! lookahead buffer, the grammar driver, the AST, and the HTML visitor — is
//! internal plumbing exposed as public modules for embedders that want the
//! parsed tree itself rather than rendered HTML (an editor preview pane, a
//! linter, a reference-checker).
//!
//! Parsing this grammar essentially never fails: almost every block
//! production falls back to `Paragraph` and every inline production falls
//! back to literal `Text`, so [`Error::Parse`] is reserved for the small set
//! of productions with no such fallback.

pub mod ast;
pub mod error;
mod escape;
mod lexer;
mod lookahead;
pub mod parser;
mod span;
mod token;
pub mod visitor;

pub use ast::Document;
pub use error::{Error, ParseError, Result};
pub use span::{Position, SourceText};

/// Parses `source` as Markdown and writes the resulting HTML to `out`.
///
/// This is the crate's entry façade: it composes the lexer, lookahead
/// buffer, grammar driver, and HTML visitor into the single operation an
/// embedder needs. Callers that want the AST itself (rather than rendered
/// HTML) should call [`parser::parse`] directly.
pub fn transform(source: impl Into<SourceText>, out: &mut impl std::fmt::Write) -> Result<()> {
    let document = parser::parse(source.into())?;
    visitor::render(&document, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(input: &str) -> String {
        let mut out = String::new();
        transform(input, &mut out).expect("transform should not fail on well-formed input");
        out
    }

    #[test]
    fn atx_header() {
        assert_eq!(render("# Hello"), "<h1>Hello</h1>\n");
    }

    #[test]
    fn setext_header_level_one() {
        assert_eq!(render("Hello\n====="), "<h1>Hello</h1>\n");
    }

    #[test]
    fn blockquote_joins_lazy_continuation() {
        assert_eq!(render("> a\n> b"), "<blockquote>\n<p>a\nb</p>\n</blockquote>\n");
    }

    #[test]
    fn tight_list() {
        assert_eq!(render("- a\n- b"), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn loose_list() {
        assert_eq!(
            render("- a\n\n- b"),
            "<ul>\n<li><p>a</p>\n</li>\n<li><p>b</p>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn reference_style_link_with_title() {
        assert_eq!(
            render("[foo][1]\n\n[1]: http://x \"t\""),
            "<p><a href=\"http://x\" title=\"t\">foo</a></p>\n"
        );
    }

    #[test]
    fn indented_code_block() {
        assert_eq!(render("    code\n    more"), "<pre><code>code\nmore</code></pre>\n");
    }

    #[test]
    fn bold_italic_emphasis() {
        assert_eq!(render("***bold italic***"), "<p><strong><em>bold italic</em></strong></p>\n");
    }
}
