use crate::span::{Position, TextPointer, TextSpan};

/// The closed set of token kinds the lexer ever produces. Punctuation tokens
/// are one variant per character so the parser can match on them directly
/// instead of re-inspecting the literal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Space,
    Tab,
    Eol,

    /// A maximal run of characters outside all punctuation and digits.
    CharSequence,
    /// One or more decimal digits.
    Digits,
    /// `&name;`
    CharEntityRef,
    /// `&#123;` or `&#x1F;`
    NumericCharRef,
    /// `\` followed by one of `` {}[]()\`_>#.!+-* ``.
    EscapedChar,

    Ampersand,
    Backslash,
    Backtick,
    Bang,
    Colon,
    Dot,
    DoubleQuote,
    Eq,
    Gt,
    Lbracket,
    Lparen,
    Lt,
    Minus,
    Plus,
    Rbracket,
    Rparen,
    Sharp,
    SingleQuote,
    Slash,
    Star,
    Underscore,

    CommentOpen,
    CommentClose,

    Eof,
}

impl TokenKind {
    /// True for tokens the `TextLookahead`/`LineLookahead` family treats as
    /// insignificant line breaks.
    pub fn is_eol_or_eof(self) -> bool {
        matches!(self, TokenKind::Eol | TokenKind::Eof)
    }
}

/// A single classified token: its kind, the literal source slice backing it,
/// and its (line, begin-column, end-column) so block-structure decisions
/// (indentation, 4-space code prefix) can be made without re-scanning.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    text: TextPointer,
    pub line: u32,
    pub begin_column: u32,
    pub end_column: u32,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: TextPointer,
        line: u32,
        begin_column: u32,
        end_column: u32,
    ) -> Self {
        Self {
            kind,
            text,
            line,
            begin_column,
            end_column,
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    pub fn span(&self) -> TextSpan {
        self.text.span()
    }

    pub fn start_position(&self) -> Position {
        Position::new(self.line, self.begin_column)
    }

    pub fn end_position(&self) -> Position {
        Position::new(self.line, self.end_column)
    }
}
