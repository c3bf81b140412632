use markdown_core::ast::Document;
use markdown_core::{parser, transform};

/// Parses `content` to a [`Document`], panicking on a grammar failure the
/// literal test inputs here are never expected to hit.
#[allow(unused)]
pub fn parse_to_document(content: &str) -> Document {
    parser::parse(content.into()).expect("parse should not fail on well-formed test input")
}

/// Runs the full `transform` pipeline and returns the rendered HTML.
#[allow(unused)]
pub fn render_to_html(content: &str) -> String {
    let mut out = String::new();
    transform(content, &mut out).expect("transform should not fail on well-formed test input");
    out
}

/// Asserts that `input` renders to exactly `expected` HTML.
#[allow(unused)]
pub fn assert_html(input: &str, expected: &str) {
    assert_eq!(expected, render_to_html(input));
}
