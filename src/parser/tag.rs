//! Inline and block-level HTML tag parsing.
//!
//! A tag that never finds a `>` to close its header, or a `<name` that
//! turns out not to be followed by a plausible attribute list, is not a
//! hard error: the grammar asks for "failsafe" behavior here, so a
//! malformed or merely unclosed tag is emitted as whatever partial subtree
//! was actually read rather than aborting the surrounding parse.

use super::Parser;
use crate::ast::{NodeId, NodeKind, TagAttribute};
use crate::error::ParseError;
use crate::token::TokenKind;

impl Parser {
    /// True when the read cursor is `<` followed immediately by a name
    /// character — the minimum needed to commit to trying a tag at all
    /// (as opposed to treating `<` as plain punctuation or an autolink,
    /// both of which are tried first by the inline dispatch).
    fn tag_header_lookahead(&mut self) -> bool {
        self.tokens.peek_kind(0) == TokenKind::Lt
            && matches!(self.tokens.peek_kind(1), TokenKind::CharSequence | TokenKind::Slash)
    }

    pub(super) fn parse_tag(&mut self, parent: NodeId) -> Result<NodeId, ParseError> {
        if self.tokens.peek_kind(1) == TokenKind::Slash {
            return self.parse_stray_closing_tag(parent);
        }
        if !self.tag_header_lookahead() {
            return Err(ParseError::new(self.position(), "a tag"));
        }

        self.tokens.advance(); // '<'
        let name = self.parse_tag_name();
        let attributes = self.parse_tag_attributes();

        if self.tokens.eat(TokenKind::Slash) {
            self.tokens.eat(TokenKind::Gt);
            return Ok(self.doc.push(parent, NodeKind::EmptyTag { name, attributes }));
        }

        if !self.tokens.eat(TokenKind::Gt) {
            // Never found the closing '>': keep what was read as an opening
            // tag rather than discarding it.
            return Ok(self.doc.push(parent, NodeKind::OpeningTag { name, attributes }));
        }

        let tag = self.doc.push(parent, NodeKind::Tag { name: name.clone(), attributes });
        loop {
            if self.tokens.peek_kind(0).is_eol_or_eof() {
                break;
            }
            if self.closing_tag_lookahead(&name) {
                self.consume_closing_tag();
                break;
            }
            if self.tag_header_lookahead() {
                self.parse_tag(tag)?;
            } else {
                self.parse_text_run(tag);
            }
        }
        Ok(tag)
    }

    fn parse_tag_name(&mut self) -> String {
        let mut name = String::new();
        while matches!(self.tokens.peek_kind(0), TokenKind::CharSequence | TokenKind::Digits | TokenKind::Minus) {
            name.push_str(self.tokens.advance().text());
        }
        name
    }

    fn parse_tag_attributes(&mut self) -> Vec<TagAttribute> {
        let mut attributes = Vec::new();
        loop {
            self.skip_inline_whitespace();
            if !matches!(self.tokens.peek_kind(0), TokenKind::CharSequence | TokenKind::Digits) {
                break;
            }
            let mut name = String::new();
            while matches!(self.tokens.peek_kind(0), TokenKind::CharSequence | TokenKind::Digits | TokenKind::Minus) {
                name.push_str(self.tokens.advance().text());
            }
            self.skip_inline_whitespace();
            let value = if self.tokens.eat(TokenKind::Eq) {
                self.skip_inline_whitespace();
                Some(self.parse_attribute_value())
            } else {
                None
            };
            attributes.push(TagAttribute { name, value });
        }
        attributes
    }

    fn parse_attribute_value(&mut self) -> String {
        let close = match self.tokens.peek_kind(0) {
            TokenKind::DoubleQuote => Some(TokenKind::DoubleQuote),
            TokenKind::SingleQuote => Some(TokenKind::SingleQuote),
            _ => None,
        };
        let mut value = String::new();
        if let Some(close) = close {
            self.tokens.advance();
            while self.tokens.peek_kind(0) != close && !self.tokens.peek_kind(0).is_eol_or_eof() {
                value.push_str(self.tokens.advance().text());
            }
            self.tokens.eat(close);
        } else {
            while !matches!(
                self.tokens.peek_kind(0),
                TokenKind::Space | TokenKind::Tab | TokenKind::Gt | TokenKind::Slash
            ) && !self.tokens.peek_kind(0).is_eol_or_eof()
            {
                value.push_str(self.tokens.advance().text());
            }
        }
        value
    }

    /// True when, from the read cursor, `</name>` (case-insensitive) sits
    /// ahead, with only whitespace before the closing `>`.
    fn closing_tag_lookahead(&mut self, name: &str) -> bool {
        if !(self.tokens.peek_kind(0) == TokenKind::Lt && self.tokens.peek_kind(1) == TokenKind::Slash) {
            return false;
        }
        let mut offset = 2;
        let mut seen = String::new();
        while matches!(self.tokens.peek_kind(offset), TokenKind::CharSequence | TokenKind::Digits | TokenKind::Minus) {
            seen.push_str(self.tokens.peek(offset).text());
            offset += 1;
        }
        let after = self.tokens.skip_while(offset, &[TokenKind::Space, TokenKind::Tab]);
        seen.eq_ignore_ascii_case(name) && self.tokens.peek_kind(after) == TokenKind::Gt
    }

    fn consume_closing_tag(&mut self) {
        self.tokens.advance(); // '<'
        self.tokens.advance(); // '/'
        while matches!(self.tokens.peek_kind(0), TokenKind::CharSequence | TokenKind::Digits | TokenKind::Minus) {
            self.tokens.advance();
        }
        self.skip_inline_whitespace();
        self.tokens.eat(TokenKind::Gt);
    }

    /// A `</name>` with no matching open in the subtree currently being
    /// parsed: recorded as its own node rather than dropped, so a visitor
    /// inspecting raw HTML blocks still sees it.
    fn parse_stray_closing_tag(&mut self, parent: NodeId) -> Result<NodeId, ParseError> {
        self.tokens.advance(); // '<'
        self.tokens.advance(); // '/'
        let name = self.parse_tag_name();
        self.skip_inline_whitespace();
        self.tokens.eat(TokenKind::Gt);
        Ok(self.doc.push(parent, NodeKind::ClosingTag { name }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::SourceText;

    fn document(input: &str) -> crate::ast::Document {
        super::super::parse(SourceText::from(input)).expect("parse should not fail")
    }

    #[test]
    fn balanced_tag_with_attributes() {
        let doc = document("<div class=\"a\" id=b>text</div>");
        let root = doc.root();
        let para = doc.children(root)[0];
        let line = doc.children(para)[0];
        let tag = doc.children(line)[0];
        let NodeKind::Tag { name, attributes } = doc.kind(tag) else {
            panic!("expected a balanced Tag node");
        };
        assert_eq!(name, "div");
        assert_eq!(attributes[0].name, "class");
        assert_eq!(attributes[0].value.as_deref(), Some("a"));
        assert_eq!(attributes[1].value.as_deref(), Some("b"));
    }

    #[test]
    fn self_closing_tag() {
        let doc = document("<br/>");
        let root = doc.root();
        let para = doc.children(root)[0];
        let line = doc.children(para)[0];
        assert!(matches!(doc.kind(doc.children(line)[0]), NodeKind::EmptyTag { name, .. } if name == "br"));
    }

    #[test]
    fn unclosed_tag_is_failsafe() {
        let doc = document("<div class=\"a\"\nmore text");
        let root = doc.root();
        let para = doc.children(root)[0];
        let line = doc.children(para)[0];
        assert!(matches!(doc.kind(doc.children(line)[0]), NodeKind::OpeningTag { .. }));
    }
}
