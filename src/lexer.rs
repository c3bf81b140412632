//! Character-to-token classification.
//!
//! The tokenizer never fails: every byte of input is classified as some
//! token, with `CHAR_SEQUENCE` acting as the catch-all for anything that
//! isn't whitespace, a digit, or one of the fixed punctuation characters.
//! Longest match wins; among equal-length candidates the order in which
//! they're checked below is authoritative (entity/escape forms before bare
//! punctuation, multi-char sigils before their prefix characters).

use crate::span::{Position, SourceText, TextPointer};
use crate::token::{Token, TokenKind};

/// Characters that may follow a backslash to form an `ESCAPED_CHAR` token.
const ESCAPABLE: &[u8] = b"{}[]()\\`_>#.!+-*";

pub struct Lexer {
    source: SourceText,
    position: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    pub fn new(source: SourceText) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn is_eof(&self) -> bool {
        self.position >= self.source.len()
    }

    fn rest(&self) -> &str {
        // The cursor only ever advances across whole `char`s, so `position`
        // is always on a UTF-8 boundary.
        &self.source[self.position..]
    }

    fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn make_pointer(&self, start: usize) -> TextPointer {
        TextPointer::new(self.source.clone(), start as u32..self.position as u32)
    }

    /// Returns the next token and advances the lexer past it. Once `EOF` has
    /// been produced, every subsequent call returns `EOF` again.
    pub fn next_token(&mut self) -> Token {
        if self.is_eof() {
            let line = self.line;
            let col = self.column;
            return Token::new(TokenKind::Eof, self.make_pointer(self.position), line, col, col);
        }

        let c = self.current_char().expect("checked not eof above");
        match c {
            '\r' | '\n' => self.consume_eol(),
            ' ' => self.consume_single(TokenKind::Space),
            '\t' => self.consume_tab(),
            '\\' => self.consume_escaped(),
            '&' => self.consume_ampersand(),
            '<' if self.rest().starts_with("<!--") => self.consume_fixed(TokenKind::CommentOpen, 4),
            '-' if self.rest().starts_with("-->") => self.consume_fixed(TokenKind::CommentClose, 3),
            c if c.is_ascii_digit() => self.consume_digits(),
            c => match punctuation_kind(c) {
                Some(kind) => self.consume_single(kind),
                None => self.consume_char_sequence(),
            },
        }
    }

    fn start(&self) -> (u32, u32, usize) {
        (self.line, self.column, self.position)
    }

    fn advance_char(&mut self) -> char {
        let c = self.current_char().expect("advance_char called at eof");
        self.position += c.len_utf8();
        c
    }

    /// Advance one column for an ordinary, non-tab character.
    fn advance_column(&mut self) {
        self.advance_char();
        self.column += 1;
    }

    fn finish(&self, line: u32, begin_column: u32, start: usize) -> (u32, u32, u32, TextPointer) {
        (line, begin_column, self.column, self.make_pointer(start))
    }

    fn consume_single(&mut self, kind: TokenKind) -> Token {
        let (line, begin_column, start) = self.start();
        self.advance_column();
        let (line, begin_column, end_column, text) = self.finish(line, begin_column, start);
        Token::new(kind, text, line, begin_column, end_column)
    }

    fn consume_fixed(&mut self, kind: TokenKind, chars: usize) -> Token {
        let (line, begin_column, start) = self.start();
        for _ in 0..chars {
            self.advance_column();
        }
        let (line, begin_column, end_column, text) = self.finish(line, begin_column, start);
        Token::new(kind, text, line, begin_column, end_column)
    }

    /// Tab stops land on multiples of 4 columns; the token's effective width
    /// depends on where on the line it started.
    fn consume_tab(&mut self) -> Token {
        let (line, begin_column, start) = self.start();
        self.position += 1; // '\t' is one byte
        let width = (4 - ((begin_column) % 4)) + 1;
        self.column = begin_column + width;
        let (line, begin_column, end_column, text) = self.finish(line, begin_column, start);
        Token::new(TokenKind::Tab, text, line, begin_column, end_column)
    }

    fn consume_eol(&mut self) -> Token {
        let (line, begin_column, start) = self.start();
        let c = self.advance_char();
        if c == '\r' && self.current_char() == Some('\n') {
            self.advance_char();
        }
        self.line += 1;
        self.column = 1;
        let text = self.make_pointer(start);
        Token::new(TokenKind::Eol, text, line, begin_column, begin_column + 1)
    }

    fn consume_escaped(&mut self) -> Token {
        let (line, begin_column, start) = self.start();
        self.advance_column(); // backslash
        match self.current_char() {
            Some(next) if ESCAPABLE.contains(&(next as u8)) && next.is_ascii() => {
                self.advance_column();
                let (line, begin_column, end_column, text) = self.finish(line, begin_column, start);
                Token::new(TokenKind::EscapedChar, text, line, begin_column, end_column)
            }
            _ => {
                let (line, begin_column, end_column, text) = self.finish(line, begin_column, start);
                Token::new(TokenKind::Backslash, text, line, begin_column, end_column)
            }
        }
    }

    fn consume_ampersand(&mut self) -> Token {
        let (line, begin_column, start) = self.start();
        self.advance_column(); // '&'

        if self.current_char() == Some('#') {
            let checkpoint = (self.position, self.column);
            self.advance_column();
            let is_hex = matches!(self.current_char(), Some('x') | Some('X'));
            if is_hex {
                self.advance_column();
            }
            let digit_check: fn(char) -> bool = if is_hex {
                |c| c.is_ascii_hexdigit()
            } else {
                |c| c.is_ascii_digit()
            };
            let mut count = 0;
            while count < 4 && self.current_char().map_or(false, digit_check) {
                self.advance_column();
                count += 1;
            }
            if count > 0 && self.current_char() == Some(';') {
                self.advance_column();
                let (line, begin_column, end_column, text) = self.finish(line, begin_column, start);
                return Token::new(TokenKind::NumericCharRef, text, line, begin_column, end_column);
            }
            // Not a valid numeric reference; rewind to just after '&'.
            self.position = checkpoint.0;
            self.column = checkpoint.1;
        } else if self.current_char().map_or(false, |c| c.is_ascii_alphanumeric()) {
            let checkpoint = (self.position, self.column);
            let mut has_content = false;
            while self.current_char().map_or(false, |c| c.is_ascii_alphanumeric()) {
                self.advance_column();
                has_content = true;
            }
            if has_content && self.current_char() == Some(';') {
                self.advance_column();
                let (line, begin_column, end_column, text) = self.finish(line, begin_column, start);
                return Token::new(TokenKind::CharEntityRef, text, line, begin_column, end_column);
            }
            self.position = checkpoint.0;
            self.column = checkpoint.1;
        }

        let (line, begin_column, end_column, text) = self.finish(line, begin_column, start);
        Token::new(TokenKind::Ampersand, text, line, begin_column, end_column)
    }

    fn consume_digits(&mut self) -> Token {
        let (line, begin_column, start) = self.start();
        while self.current_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance_column();
        }
        let (line, begin_column, end_column, text) = self.finish(line, begin_column, start);
        Token::new(TokenKind::Digits, text, line, begin_column, end_column)
    }

    /// Consumes a maximal run of characters that are not whitespace, not a
    /// digit, and not one of the single-character punctuation tokens. This
    /// is the tokenizer's catch-all, guaranteeing it can never fail to
    /// classify a character.
    fn consume_char_sequence(&mut self) -> Token {
        let (line, begin_column, start) = self.start();
        loop {
            match self.current_char() {
                None => break,
                Some(c) if is_plain_text_char(c) => self.advance_column(),
                Some(_) => break,
            }
        }
        let (line, begin_column, end_column, text) = self.finish(line, begin_column, start);
        Token::new(TokenKind::CharSequence, text, line, begin_column, end_column)
    }
}

fn is_plain_text_char(c: char) -> bool {
    !(c.is_whitespace() || c.is_ascii_digit() || punctuation_kind(c).is_some())
}

/// Returns the token kind for any of the single-character punctuation
/// tokens, or `None` if `c` is not one of them (and so belongs to
/// `CHAR_SEQUENCE`/`DIGITS`/whitespace instead).
fn punctuation_kind(c: char) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match c {
        '&' => Ampersand,
        '\\' => Backslash,
        '`' => Backtick,
        '!' => Bang,
        ':' => Colon,
        '.' => Dot,
        '"' => DoubleQuote,
        '=' => Eq,
        '>' => Gt,
        '[' => Lbracket,
        '(' => Lparen,
        '<' => Lt,
        '-' => Minus,
        '+' => Plus,
        ']' => Rbracket,
        ')' => Rparen,
        '#' => Sharp,
        '\'' => SingleQuote,
        '/' => Slash,
        '*' => Star,
        '_' => Underscore,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(input: &str) -> Vec<TokenKind> {
        let source: SourceText = SourceText::from(input);
        let mut lexer = Lexer::new(source);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = token.kind == TokenKind::Eof;
            kinds.push(token.kind);
            if done {
                break;
            }
        }
        kinds
    }

    #[test]
    fn classifies_punctuation_and_text() {
        use TokenKind::*;
        assert_eq!(lex_all("ab"), vec![CharSequence, Eof]);
        assert_eq!(lex_all("*"), vec![Star, Eof]);
        assert_eq!(lex_all("123"), vec![Digits, Eof]);
    }

    #[test]
    fn entity_and_numeric_refs() {
        use TokenKind::*;
        assert_eq!(lex_all("&amp;"), vec![CharEntityRef, Eof]);
        assert_eq!(lex_all("&#169;"), vec![NumericCharRef, Eof]);
        assert_eq!(lex_all("&#x1F;"), vec![NumericCharRef, Eof]);
        // Invalid refs fall back to a lone AMPERSAND followed by text.
        assert_eq!(lex_all("&nope"), vec![Ampersand, CharSequence, Eof]);
    }

    #[test]
    fn escaped_chars() {
        use TokenKind::*;
        assert_eq!(lex_all("\\*"), vec![EscapedChar, Eof]);
        // `q` is not escapable, so the backslash stands alone.
        assert_eq!(lex_all("\\q"), vec![Backslash, CharSequence, Eof]);
    }

    #[test]
    fn comment_sigils_win_over_punctuation() {
        use TokenKind::*;
        assert_eq!(lex_all("<!--"), vec![CommentOpen, Eof]);
        assert_eq!(lex_all("-->"), vec![CommentClose, Eof]);
    }

    #[test]
    fn eol_variants() {
        use TokenKind::*;
        assert_eq!(lex_all("a\nb"), vec![CharSequence, Eol, CharSequence, Eof]);
        assert_eq!(lex_all("a\r\nb"), vec![CharSequence, Eol, CharSequence, Eof]);
        assert_eq!(lex_all("a\rb"), vec![CharSequence, Eol, CharSequence, Eof]);
    }

    #[test]
    fn tab_stop_widths() {
        let source: SourceText = SourceText::from("\tx");
        let mut lexer = Lexer::new(source);
        let tab = lexer.next_token();
        assert_eq!(tab.kind, TokenKind::Tab);
        assert_eq!(tab.begin_column, 1);
        assert_eq!(tab.end_column, 5);
    }
}
