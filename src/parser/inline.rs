//! Inline-level productions: paragraphs made of `Line`s, and the inline
//! element choice within a line (char refs, code spans, links, images,
//! autolinks, emphasis, hard line breaks, HTML tags, and the plain-text
//! fallback).
//!
//! None of these productions can hard-fail: every alternative that isn't
//! confirmed by a non-consuming lookahead first falls back to `Text`, so a
//! stray `[`, `*`, or `` ` `` that never finds its match is just emitted
//! as a literal character rather than aborting the parse.

use super::Parser;
use crate::ast::{EmphasisKind, NodeId, NodeKind, Resource};
use crate::error::ParseError;
use crate::token::TokenKind;

/// What follows the closing `]` of a `[...]` span, determining whether it
/// completes as an inline-resource link/image, a reference-style one, or a
/// bare shortcut reference (`id` defaults to the span's own text).
enum LinkFollow {
    Inline,
    Reference,
    Bare,
}

impl Parser {
    /// `Paragraph`: one or more `Line`s separated by `EOL`, continuation
    /// governed by `LineLookahead`. If exactly one line was parsed and a
    /// setext underline follows, the node is promoted in place to a
    /// `Header` instead (same id, same children).
    pub(super) fn parse_paragraph(&mut self, parent: NodeId) -> Result<NodeId, ParseError> {
        let para = self.doc.push(parent, NodeKind::Paragraph);
        self.parse_line(para)?;

        if self.doc.children(para).len() == 1 && self.tokens.peek_kind(0) == TokenKind::Eol {
            if let Some(level) = self.setext_underline_lookahead(1) {
                self.consume_setext_underline();
                self.doc.node_mut(para).kind = NodeKind::Header { level };
                return Ok(para);
            }
        }

        while self.line_lookahead() {
            self.tokens.eat(TokenKind::Eol);
            // A continuation line inside a blockquote carries its own `>`
            // prefix (possibly omitted under lazy continuation); strip one
            // per currently-open quote level before parsing its content.
            for _ in 0..self.quote_depth {
                self.eat_quote_marker();
            }
            self.parse_line(para)?;
        }
        Ok(para)
    }

    /// `Line`: a sequence of inline elements terminated by `EOL`/`EOF`. The
    /// terminating `EOL` is left for the caller (`parse_paragraph`'s loop,
    /// or the enclosing block) to consume.
    pub(super) fn parse_line(&mut self, parent: NodeId) -> Result<NodeId, ParseError> {
        let line = self.doc.push(parent, NodeKind::Line);
        self.parse_inline_sequence(line, false)?;
        Ok(line)
    }

    /// Parses inline elements into `parent` until `EOL`/`EOF`, or (inside a
    /// header) until a trailing run of `#`s per `TextLookahead`.
    pub(super) fn parse_inline_sequence(&mut self, parent: NodeId, in_header: bool) -> Result<(), ParseError> {
        loop {
            if self.tokens.peek_kind(0).is_eol_or_eof() {
                break;
            }
            if in_header && self.at_atx_trailing_run() {
                break;
            }
            self.parse_inline_element(parent);
        }
        Ok(())
    }

    fn at_atx_trailing_run(&mut self) -> bool {
        if self.tokens.peek_kind(0) != TokenKind::Sharp {
            return false;
        }
        let mut offset = 0;
        while matches!(self.tokens.peek_kind(offset), TokenKind::Sharp | TokenKind::Space) {
            offset += 1;
        }
        self.tokens.peek_kind(offset).is_eol_or_eof()
    }

    /// `LineLookahead`: true when, from the read cursor sitting on an `EOL`,
    /// the next physical line continues the current paragraph — it isn't
    /// blank and doesn't open a construct with higher priority (a new list
    /// item, a ruler, an ATX heading, a comment). Lines missing a `>` prefix
    /// still count as continuing (lazy continuation inside a blockquote).
    pub(super) fn line_lookahead(&mut self) -> bool {
        // Reached only at EOF with no trailing `EOL`: there is no further
        // line to continue the paragraph with.
        if self.tokens.peek_kind(0) != TokenKind::Eol {
            return false;
        }
        let after = 1usize;
        if self.tokens.peek_kind(after).is_eol_or_eof() {
            return false;
        }
        let (marker_count, after_quotes) = self.count_quote_markers(after);
        if marker_count > self.quote_depth {
            // More `>` markers than are currently open: a new, more deeply
            // nested quote starts here rather than continuing this one.
            return false;
        }
        if self.tokens.peek_kind(after_quotes).is_eol_or_eof() {
            return false;
        }
        if self.list_marker_kind(after_quotes).is_some() {
            return false;
        }
        if self.looks_like_ruler_at(after_quotes) {
            return false;
        }
        if self.looks_like_atx_heading_at(after_quotes) {
            return false;
        }
        if self.tokens.peek_kind(after_quotes) == TokenKind::CommentOpen {
            return false;
        }
        if !self.quoted_element_lookahead(after_quotes) {
            return false;
        }
        true
    }

    /// `Line`'s inline choice, in priority order: `CharRef`, `CodeSpan`,
    /// `Link`, `Image`, `InlineURL`, `Emphasis`, `LineBreak`, HTML `Tag`,
    /// `Text`.
    fn parse_inline_element(&mut self, parent: NodeId) -> NodeId {
        match self.tokens.peek_kind(0) {
            TokenKind::CharEntityRef | TokenKind::NumericCharRef => self.parse_char_ref(parent),
            TokenKind::Backtick => self.parse_code_span(parent),
            TokenKind::Bang if self.tokens.peek_kind(1) == TokenKind::Lbracket => self.parse_image(parent),
            TokenKind::Lbracket => self.parse_link(parent),
            TokenKind::Lt if self.inline_url_lookahead() => self.parse_inline_url(parent),
            TokenKind::Star | TokenKind::Underscore if self.emphasis_lookahead() => self.parse_emphasis(parent),
            TokenKind::Space if self.line_break_lookahead() => self.parse_line_break(parent),
            TokenKind::Lt => match self.parse_tag(parent) {
                Ok(id) => id,
                Err(_) => self.parse_text_run(parent),
            },
            _ => self.parse_text_run(parent),
        }
    }

    // ---- Plain text ------------------------------------------------------

    /// Consumes a maximal run of `CHAR_SEQUENCE`/`DIGITS` tokens as one
    /// `Text` node, or a single punctuation token when that's all that's
    /// left over from a failed special-construct attempt.
    pub(super) fn parse_text_run(&mut self, parent: NodeId) -> NodeId {
        let first = self.tokens.advance();
        let mut value = if first.kind == TokenKind::EscapedChar {
            // Token text spans both the backslash and the escaped character
            // (e.g. `\*`); only the character itself is literal content.
            first.text().chars().nth(1).into_iter().collect()
        } else {
            first.text().to_string()
        };
        if matches!(first.kind, TokenKind::CharSequence | TokenKind::Digits) {
            while matches!(self.tokens.peek_kind(0), TokenKind::CharSequence | TokenKind::Digits) {
                value.push_str(self.tokens.advance().text());
            }
        }
        self.doc.push(parent, NodeKind::Text { value })
    }

    // ---- Character references ---------------------------------------------

    fn parse_char_ref(&mut self, parent: NodeId) -> NodeId {
        let token = self.tokens.advance();
        let value = token.text().to_string();
        self.doc.push(parent, NodeKind::CharRef { value })
    }

    // ---- Code spans ---------------------------------------------------------

    fn count_run(&mut self, kind: TokenKind, offset: usize) -> usize {
        let mut n = 0;
        while self.tokens.peek_kind(offset + n) == kind {
            n += 1;
        }
        n
    }

    /// Scans for a run of `open_count` backticks before `EOL`/`EOF`, the way
    /// a double-backtick delimiter tolerates internal single backticks: runs
    /// of the wrong length are just skipped over.
    fn code_span_close_offset(&mut self, open_count: usize) -> Option<usize> {
        let mut offset = open_count;
        loop {
            match self.tokens.peek_kind(offset) {
                k if k.is_eol_or_eof() => return None,
                TokenKind::Backtick => {
                    let run = self.count_run(TokenKind::Backtick, offset);
                    if run == open_count {
                        return Some(offset);
                    }
                    offset += run;
                }
                _ => offset += 1,
            }
        }
    }

    fn parse_code_span(&mut self, parent: NodeId) -> NodeId {
        let open_count = self.count_run(TokenKind::Backtick, 0);
        let Some(_close) = self.code_span_close_offset(open_count) else {
            return self.parse_text_run(parent);
        };
        for _ in 0..open_count {
            self.tokens.advance();
        }
        let mut text = String::new();
        while !(self.tokens.peek_kind(0) == TokenKind::Backtick
            && self.count_run(TokenKind::Backtick, 0) == open_count)
        {
            text.push_str(self.tokens.advance().text());
        }
        for _ in 0..open_count {
            self.tokens.advance();
        }
        self.doc.push(parent, NodeKind::CodeSpan { text })
    }

    // ---- Links & images ------------------------------------------------------

    /// Scans from `start` (pointing at `[`) for its depth-matching `]`,
    /// stopping (and failing) at `EOL`/`EOF`. Grounds the `bracket depth
    /// inside link text` counter the grammar calls for as a pure lookahead
    /// rather than a mutable field, since nothing outside this scan needs to
    /// observe it mid-parse.
    fn bracket_match_offset(&mut self, start: usize) -> Option<usize> {
        let mut depth = 0i32;
        let mut offset = start;
        loop {
            match self.tokens.peek_kind(offset) {
                TokenKind::Lbracket => depth += 1,
                TokenKind::Rbracket => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(offset);
                    }
                }
                k if k.is_eol_or_eof() => return None,
                _ => {}
            }
            offset += 1;
        }
    }

    /// Scans from `start` (pointing at `(`) for its depth-matching `)`,
    /// grounding the `parenthesis depth inside URLs` counter the same way.
    fn paren_match_offset(&mut self, start: usize) -> Option<usize> {
        let mut depth = 0i32;
        let mut offset = start;
        loop {
            match self.tokens.peek_kind(offset) {
                TokenKind::Lparen => depth += 1,
                TokenKind::Rparen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(offset);
                    }
                }
                k if k.is_eol_or_eof() => return None,
                _ => {}
            }
            offset += 1;
        }
    }

    /// From the offset of a closing `]`, skips optional whitespace and
    /// classifies what follows.
    fn link_follow_after(&mut self, close: usize) -> (usize, LinkFollow) {
        let offset = self.tokens.skip_while(close + 1, &[TokenKind::Space, TokenKind::Tab]);
        match self.tokens.peek_kind(offset) {
            TokenKind::Lparen => (offset, LinkFollow::Inline),
            TokenKind::Lbracket => (offset, LinkFollow::Reference),
            _ => (close + 1, LinkFollow::Bare),
        }
    }

    fn parse_link(&mut self, parent: NodeId) -> NodeId {
        let Some(close) = self.bracket_match_offset(0) else {
            return self.parse_text_run(parent);
        };
        let (follow_offset, follow) = self.link_follow_after(close);
        if matches!(follow, LinkFollow::Inline) && self.paren_match_offset(follow_offset).is_none() {
            return self.parse_text_run(parent);
        }

        self.tokens.advance(); // '['
        let link = self.doc.push(
            parent,
            NodeKind::Link {
                referenced: false,
                reference_name: None,
                resource: None,
                has_whitespace_at_middle: false,
            },
        );
        self.parse_bracketed_children(link, 0);
        self.tokens.eat(TokenKind::Rbracket);

        let has_whitespace_at_middle = matches!(self.tokens.peek_kind(0), TokenKind::Space | TokenKind::Tab);
        self.skip_inline_whitespace();
        let kind = match self.tokens.peek_kind(0) {
            TokenKind::Lparen => {
                self.tokens.advance();
                self.skip_inline_whitespace();
                let location = self.parse_link_destination();
                self.skip_inline_whitespace();
                let title = self.parse_optional_title();
                self.skip_inline_whitespace();
                self.tokens.eat(TokenKind::Rparen);
                NodeKind::Link {
                    referenced: false,
                    reference_name: None,
                    resource: Some(Resource { location, title }),
                    has_whitespace_at_middle,
                }
            }
            TokenKind::Lbracket => {
                self.tokens.advance();
                let mut id = String::new();
                while self.tokens.peek_kind(0) != TokenKind::Rbracket && !self.tokens.peek_kind(0).is_eol_or_eof() {
                    id.push_str(self.tokens.advance().text());
                }
                self.tokens.eat(TokenKind::Rbracket);
                NodeKind::Link {
                    referenced: true,
                    reference_name: if id.is_empty() { None } else { Some(id) },
                    resource: None,
                    has_whitespace_at_middle,
                }
            }
            _ => NodeKind::Link {
                referenced: true,
                reference_name: None,
                resource: None,
                has_whitespace_at_middle,
            },
        };
        self.doc.node_mut(link).kind = kind;
        link
    }

    /// Parses the inline content between a link's `[` and its matching `]`
    /// as children of `link`, tracking nested-bracket depth. A nested `[`
    /// that itself forms a valid link/image is parsed recursively (and
    /// consumes its own balanced brackets); anything else just deepens the
    /// depth counter and is emitted as a literal bracket character.
    fn parse_bracketed_children(&mut self, link: NodeId, mut depth: i32) {
        loop {
            match self.tokens.peek_kind(0) {
                TokenKind::Rbracket if depth == 0 => {
                    return;
                }
                TokenKind::Rbracket => {
                    self.tokens.advance();
                    depth -= 1;
                    self.doc.push(link, NodeKind::Text { value: "]".to_string() });
                }
                TokenKind::Lbracket => {
                    if self.bracket_match_offset(0).is_some() {
                        self.parse_inline_element(link);
                    } else {
                        self.tokens.advance();
                        depth += 1;
                        self.doc.push(link, NodeKind::Text { value: "[".to_string() });
                    }
                }
                k if k.is_eol_or_eof() => return,
                _ => {
                    self.parse_inline_element(link);
                }
            }
        }
    }

    fn parse_image(&mut self, parent: NodeId) -> NodeId {
        let Some(close) = self.bracket_match_offset(1) else {
            return self.parse_text_run(parent);
        };
        let (follow_offset, follow) = self.link_follow_after(close);
        if matches!(follow, LinkFollow::Inline) && self.paren_match_offset(follow_offset).is_none() {
            return self.parse_text_run(parent);
        }

        self.tokens.advance(); // '!'
        self.tokens.advance(); // '['
        let mut text = String::new();
        let mut depth = 0i32;
        loop {
            match self.tokens.peek_kind(0) {
                TokenKind::Rbracket if depth == 0 => {
                    self.tokens.advance();
                    break;
                }
                TokenKind::Rbracket => {
                    depth -= 1;
                    text.push_str(self.tokens.advance().text());
                }
                TokenKind::Lbracket => {
                    depth += 1;
                    text.push_str(self.tokens.advance().text());
                }
                _ => text.push_str(self.tokens.advance().text()),
            }
        }

        self.skip_inline_whitespace();
        let (ref_id, resource) = match self.tokens.peek_kind(0) {
            TokenKind::Lparen => {
                self.tokens.advance();
                self.skip_inline_whitespace();
                let location = self.parse_link_destination();
                self.skip_inline_whitespace();
                let title = self.parse_optional_title();
                self.skip_inline_whitespace();
                self.tokens.eat(TokenKind::Rparen);
                (None, Some(Resource { location, title }))
            }
            TokenKind::Lbracket => {
                self.tokens.advance();
                let mut id = String::new();
                while self.tokens.peek_kind(0) != TokenKind::Rbracket && !self.tokens.peek_kind(0).is_eol_or_eof() {
                    id.push_str(self.tokens.advance().text());
                }
                self.tokens.eat(TokenKind::Rbracket);
                (if id.is_empty() { None } else { Some(id) }, None)
            }
            _ => (None, None),
        };
        self.doc.push(parent, NodeKind::Image { text, ref_id, resource })
    }

    // ---- Autolinks -----------------------------------------------------------

    fn inline_url_lookahead(&mut self) -> bool {
        let mut offset = 1;
        let mut saw_colon = false;
        loop {
            match self.tokens.peek_kind(offset) {
                TokenKind::Gt => return saw_colon && offset > 1,
                TokenKind::Colon => {
                    saw_colon = true;
                    offset += 1;
                }
                TokenKind::Space | TokenKind::Tab => return false,
                k if k.is_eol_or_eof() => return false,
                _ => offset += 1,
            }
        }
    }

    fn parse_inline_url(&mut self, parent: NodeId) -> NodeId {
        self.tokens.advance(); // '<'
        let mut url = String::new();
        while self.tokens.peek_kind(0) != TokenKind::Gt {
            url.push_str(self.tokens.advance().text());
        }
        self.tokens.advance(); // '>'
        self.doc.push(parent, NodeKind::InlineUrl { url })
    }

    // ---- Emphasis --------------------------------------------------------------

    fn emphasis_lookahead(&mut self) -> bool {
        let marker = self.tokens.peek_kind(0);
        let count = self.count_run(marker, 0);
        if count == 0 || count > 3 {
            return false;
        }
        if matches!(self.tokens.peek_kind(count), TokenKind::Space | TokenKind::Tab)
            || self.tokens.peek_kind(count).is_eol_or_eof()
        {
            return false;
        }
        self.emphasis_close_offset(marker, count).is_some()
    }

    fn emphasis_close_offset(&mut self, marker: TokenKind, count: usize) -> Option<usize> {
        let mut offset = count;
        loop {
            match self.tokens.peek_kind(offset) {
                k if k.is_eol_or_eof() => return None,
                k if k == marker => {
                    let run = self.count_run(marker, offset);
                    if run == count {
                        return Some(offset);
                    }
                    offset += run;
                }
                _ => offset += 1,
            }
        }
    }

    /// `_`, `__`, `___` or `*`, `**`, `***` around content; one delimiter is
    /// italic, two bold, three bold+italic. Content is kept flat (no nested
    /// markup), matching the AST's `Emphasis { text: String }` shape:
    /// cross-delimiter characters (`*` inside `_..._`) just end up as part
    /// of that literal text.
    fn parse_emphasis(&mut self, parent: NodeId) -> NodeId {
        let marker = self.tokens.peek_kind(0);
        let count = self.count_run(marker, 0);
        for _ in 0..count {
            self.tokens.advance();
        }
        let mut text = String::new();
        while !(self.tokens.peek_kind(0) == marker && self.count_run(marker, 0) == count) {
            text.push_str(self.tokens.advance().text());
        }
        for _ in 0..count {
            self.tokens.advance();
        }
        let kind = match count {
            1 => EmphasisKind::Italic,
            2 => EmphasisKind::Bold,
            _ => EmphasisKind::ItalicAndBold,
        };
        self.doc.push(parent, NodeKind::Emphasis { kind, text })
    }

    // ---- Line breaks -----------------------------------------------------------

    fn line_break_lookahead(&mut self) -> bool {
        self.tokens.peek_kind(0) == TokenKind::Space
            && self.tokens.peek_kind(1) == TokenKind::Space
            && self.tokens.peek_kind(2) == TokenKind::Eol
    }

    fn parse_line_break(&mut self, parent: NodeId) -> NodeId {
        self.tokens.advance();
        self.tokens.advance();
        self.doc.push(parent, NodeKind::LineBreak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::SourceText;

    fn document(input: &str) -> crate::ast::Document {
        super::super::parse(SourceText::from(input)).expect("parse should not fail")
    }

    fn first_line_children(doc: &crate::ast::Document) -> Vec<NodeId> {
        let root = doc.root();
        let para = doc.children(root)[0];
        let line = doc.children(para)[0];
        doc.children(line).to_vec()
    }

    #[test]
    fn plain_text_coalesces() {
        let doc = document("hello world");
        let children = first_line_children(&doc);
        // Adjacent CHAR_SEQUENCE/DIGITS tokens coalesce into one Text node,
        // but the intervening Space is its own token and its own node.
        assert_eq!(children.len(), 3);
        assert!(matches!(doc.kind(children[0]), NodeKind::Text { value } if value == "hello"));
        assert!(matches!(doc.kind(children[1]), NodeKind::Text { value } if value == " "));
        assert!(matches!(doc.kind(children[2]), NodeKind::Text { value } if value == "world"));
    }

    #[test]
    fn emphasis_levels() {
        let doc = document("*a* **b** ***c***");
        let children = first_line_children(&doc);
        let kinds: Vec<_> = children
            .iter()
            .filter_map(|&id| match doc.kind(id) {
                NodeKind::Emphasis { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![EmphasisKind::Italic, EmphasisKind::Bold, EmphasisKind::ItalicAndBold]
        );
    }

    #[test]
    fn inline_link_with_title() {
        let doc = document("[foo](http://x \"t\")");
        let children = first_line_children(&doc);
        let NodeKind::Link { resource: Some(resource), referenced, .. } = doc.kind(children[0]) else {
            panic!("expected a Link node with an inline resource");
        };
        assert!(!referenced);
        assert_eq!(resource.location, "http://x");
        assert_eq!(resource.title.as_deref(), Some("t"));
    }

    #[test]
    fn unmatched_bracket_falls_back_to_text() {
        let doc = document("a [b");
        let children = first_line_children(&doc);
        // "[b" never finds a closing bracket, so it's plain text alongside "a ".
        assert!(children
            .iter()
            .all(|&id| matches!(doc.kind(id), NodeKind::Text { .. })));
    }

    #[test]
    fn autolink() {
        let doc = document("<http://example.com>");
        let children = first_line_children(&doc);
        assert!(matches!(doc.kind(children[0]), NodeKind::InlineUrl { url } if url == "http://example.com"));
    }
}
