//! Recursive-descent grammar driver.
//!
//! The parser owns the lookahead buffer, the node arena, and the one piece
//! of state its grammar's context sensitivity needs across calls: the
//! current blockquote nesting depth. List/item indentation, by contrast,
//! only needs to be visible to the recursive call that's already tracking
//! it (`parse_list`'s local `list_indentation`), so it's threaded as a
//! parameter rather than kept on the parser. Productions that have no
//! matching alternative and no fallback raise [`ParseError`]; most block
//! productions fall back to `Paragraph`, so this is rare in practice.

mod block;
mod inline;
mod tag;

use crate::ast::{Document, NodeId, NodeKind};
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::lookahead::LookaheadBuffer;
use crate::span::SourceText;
use crate::token::TokenKind;

pub struct Parser {
    tokens: LookaheadBuffer,
    doc: Document,
    /// Incremented on entry to a `Quote`, decremented on exit.
    quote_depth: u32,
}

pub fn parse(source: SourceText) -> Result<Document, ParseError> {
    let mut parser = Parser {
        tokens: LookaheadBuffer::new(Lexer::new(source)),
        doc: Document::new(),
        quote_depth: 0,
    };
    parser.parse_document()?;
    Ok(parser.doc)
}

impl Parser {
    fn parse_document(&mut self) -> Result<(), ParseError> {
        let root = self.doc.root();
        loop {
            self.skip_blank_lines();
            if self.tokens.peek_kind(0) == TokenKind::Eof {
                break;
            }
            self.parse_element(root)?;
        }
        Ok(())
    }

    /// `Element`: either a `ResourceDefinition` or a `BlockElement`.
    fn parse_element(&mut self, parent: NodeId) -> Result<(), ParseError> {
        if self.resource_definition_lookahead() {
            self.parse_resource_definition(parent)?;
            return Ok(());
        }
        self.parse_block_element(parent)?;
        Ok(())
    }

    /// Consumes any run of blank lines (including a leading run of
    /// whitespace-only content before the first `EOL`).
    fn skip_blank_lines(&mut self) {
        while self.is_blank_line_ahead() && self.tokens.peek_kind(0) != TokenKind::Eof {
            self.consume_line_whitespace();
            self.tokens.eat(TokenKind::Eol);
        }
    }

    /// True when, from the read cursor, only `SPACE`/`TAB` precede an `EOL`
    /// or `EOF`.
    fn is_blank_line_ahead(&mut self) -> bool {
        let offset = self
            .tokens
            .skip_while(0, &[TokenKind::Space, TokenKind::Tab]);
        self.tokens.peek_kind(offset).is_eol_or_eof()
    }

    fn consume_line_whitespace(&mut self) {
        while matches!(self.tokens.peek_kind(0), TokenKind::Space | TokenKind::Tab) {
            self.tokens.advance();
        }
    }

    /// Consumes up to `max` leading `SPACE` tokens (the grammar's "1-3
    /// leading spaces" allowance before a block sigil).
    fn skip_up_to_spaces(&mut self, max: u32) -> u32 {
        let mut count = 0;
        while count < max && self.tokens.peek_kind(0) == TokenKind::Space {
            self.tokens.advance();
            count += 1;
        }
        count
    }

    /// Consumes one `>` introducing/continuing a blockquote line, plus a
    /// single following space if present. Returns whether one was consumed.
    fn eat_quote_marker(&mut self) -> bool {
        self.skip_up_to_spaces(3);
        if self.tokens.eat(TokenKind::Gt) {
            self.tokens.eat(TokenKind::Space);
            true
        } else {
            false
        }
    }

    fn position(&mut self) -> crate::span::Position {
        self.tokens.current_position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(input: &str) -> Document {
        parse(SourceText::from(input)).expect("parse should not fail")
    }

    #[test]
    fn empty_input_has_no_children() {
        let doc = document("");
        assert!(doc.children(doc.root()).is_empty());
    }

    #[test]
    fn single_paragraph() {
        let doc = document("hello world");
        let root_children = doc.children(doc.root());
        assert_eq!(root_children.len(), 1);
        assert!(matches!(doc.kind(root_children[0]), NodeKind::Paragraph));
    }
}
