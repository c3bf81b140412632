//! A cheap, shared handle onto the document's source text, plus the byte-span
//! and line/column bookkeeping that tokens and AST leaves carry.
//!
//! This is a deliberately small cousin of a rope/`TextPointer` abstraction:
//! nothing here ever needs to re-synthesize source text out of order, so a
//! single `Rc<str>` clone plus a byte range is enough.

use std::ops::Range;
use std::rc::Rc;

/// The full source text of the document being parsed, held behind an `Rc` so
/// every token can cheaply carry a handle to it instead of copying.
pub type SourceText = Rc<str>;

/// A byte-offset range into a [`SourceText`].
pub type TextSpan = Range<u32>;

/// A 1-based (line, column) position in the source, as surfaced in
/// [`crate::error::ParseError`] and used by the lookahead predicates that key
/// off indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A cheap handle to a slice of the document's source text, bundling the
/// `Rc<str>` clone with the byte span so callers don't have to pass both
/// separately. Dereferences to `&str`.
#[derive(Debug, Clone)]
pub struct TextPointer {
    source: SourceText,
    span: TextSpan,
}

impl TextPointer {
    pub fn new(source: SourceText, span: TextSpan) -> Self {
        debug_assert!(
            span.end as usize <= source.len(),
            "text span out of bounds of its source"
        );
        Self { source, span }
    }

    pub fn as_str(&self) -> &str {
        &self.source[self.span.start as usize..self.span.end as usize]
    }

    pub fn span(&self) -> TextSpan {
        self.span.clone()
    }
}

impl std::ops::Deref for TextPointer {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for TextPointer {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}
impl Eq for TextPointer {}

impl std::fmt::Display for TextPointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
