//! A small buffer of already-lexed tokens sitting between the [`Lexer`] and
//! the grammar driver, so lookahead predicates can peek arbitrarily far
//! ahead (to end-of-line, or past several blank lines) without re-invoking
//! or rewinding the character-level lexer.
//!
//! Tokens are pulled from the lexer lazily, on demand, and kept only until
//! they're consumed; nothing behind the read cursor stays buffered.

use std::collections::VecDeque;

use crate::lexer::Lexer;
use crate::span::Position;
use crate::token::{Token, TokenKind};

pub struct LookaheadBuffer {
    lexer: Lexer,
    buffer: VecDeque<Token>,
}

impl LookaheadBuffer {
    pub fn new(lexer: Lexer) -> Self {
        Self {
            lexer,
            buffer: VecDeque::new(),
        }
    }

    /// Ensures at least `count` tokens are buffered, pulling more from the
    /// lexer as needed. Stops early at `EOF`, which repeats forever once hit.
    fn fill(&mut self, count: usize) {
        while self.buffer.len() < count {
            let at_eof = self
                .buffer
                .back()
                .map_or(false, |t| t.kind == TokenKind::Eof);
            if at_eof {
                break;
            }
            self.buffer.push_back(self.lexer.next_token());
        }
    }

    /// Peeks the token `offset` positions ahead of the read cursor (0 = the
    /// next token to be consumed). Returns `EOF` forever past the end.
    pub fn peek(&mut self, offset: usize) -> &Token {
        self.fill(offset + 1);
        self.buffer
            .get(offset)
            .or_else(|| self.buffer.back())
            .expect("fill() always leaves at least one token buffered")
    }

    pub fn peek_kind(&mut self, offset: usize) -> TokenKind {
        self.peek(offset).kind
    }

    /// Consumes and returns the next token.
    pub fn advance(&mut self) -> Token {
        self.fill(1);
        self.buffer
            .pop_front()
            .expect("fill() always leaves at least one token buffered")
    }

    /// Consumes the next token if its kind matches, returning whether it did.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind(0) == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn current_position(&mut self) -> Position {
        self.peek(0).start_position()
    }

    /// Scans forward from `offset`, skipping tokens of the given kinds, and
    /// returns the offset of the first token that doesn't match.
    pub fn skip_while(&mut self, mut offset: usize, kinds: &[TokenKind]) -> usize {
        while kinds.contains(&self.peek_kind(offset)) {
            offset += 1;
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::SourceText;

    fn buffer(input: &str) -> LookaheadBuffer {
        let source: SourceText = SourceText::from(input);
        LookaheadBuffer::new(Lexer::new(source))
    }

    #[test]
    fn peek_does_not_consume() {
        let mut buf = buffer("ab");
        assert_eq!(buf.peek_kind(0), TokenKind::CharSequence);
        assert_eq!(buf.peek_kind(0), TokenKind::CharSequence);
        let token = buf.advance();
        assert_eq!(token.kind, TokenKind::CharSequence);
        assert_eq!(buf.peek_kind(0), TokenKind::Eof);
    }

    #[test]
    fn peek_ahead_multiple_tokens() {
        let mut buf = buffer("*a*");
        assert_eq!(buf.peek_kind(0), TokenKind::Star);
        assert_eq!(buf.peek_kind(1), TokenKind::CharSequence);
        assert_eq!(buf.peek_kind(2), TokenKind::Star);
        assert_eq!(buf.peek_kind(3), TokenKind::Eof);
        assert_eq!(buf.peek_kind(0), TokenKind::Star);
    }

    #[test]
    fn eof_repeats_past_end() {
        let mut buf = buffer("");
        assert_eq!(buf.peek_kind(0), TokenKind::Eof);
        assert_eq!(buf.peek_kind(5), TokenKind::Eof);
    }

    #[test]
    fn skip_while_finds_first_mismatch() {
        let mut buf = buffer("  >text");
        let offset = buf.skip_while(0, &[TokenKind::Space, TokenKind::Tab, TokenKind::Gt]);
        assert_eq!(buf.peek_kind(offset), TokenKind::CharSequence);
    }
}
