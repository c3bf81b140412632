//! Block-level productions: resource definitions, quotes, rulers, headers,
//! comments, lists/items, and indented code blocks. `BlockElement` itself
//! dispatches in the order the grammar prescribes, falling back to
//! `Paragraph` when nothing more specific matches.

use super::Parser;
use crate::ast::{NodeId, NodeKind, Resource};
use crate::error::ParseError;
use crate::token::TokenKind;

impl Parser {
    /// `BlockElement`: tries each alternative in the grammar's priority
    /// order, falling back to `Paragraph`.
    pub(super) fn parse_block_element(&mut self, parent: NodeId) -> Result<Option<NodeId>, ParseError> {
        if self.is_blank_line_ahead() {
            self.consume_line_whitespace();
            self.tokens.eat(TokenKind::Eol);
            return Ok(None);
        }

        if self.indented_code_lookahead() {
            return Ok(Some(self.parse_code(parent)?));
        }

        let quote_offset = self.tokens.skip_while(0, &[TokenKind::Space]);
        if quote_offset <= 3 && self.tokens.peek_kind(quote_offset) == TokenKind::Gt {
            return Ok(Some(self.parse_quote(parent)?));
        }

        if self.looks_like_ruler_at(0) {
            return Ok(Some(self.parse_ruler(parent)?));
        }

        if self.looks_like_atx_heading_at(0) {
            return Ok(Some(self.parse_atx_heading(parent)?));
        }

        if self.comment_lookahead() {
            return Ok(Some(self.parse_comment(parent)?));
        }

        if self.html_block_lookahead() {
            return Ok(Some(self.parse_html_block(parent)?));
        }

        if self.list_marker_kind(0).is_some() {
            return Ok(Some(self.parse_list(parent)?));
        }

        Ok(Some(self.parse_paragraph(parent)?))
    }

    fn indented_code_lookahead(&mut self) -> bool {
        if self.tokens.peek_kind(0) == TokenKind::Tab {
            return true;
        }
        let mut count = 0;
        while self.tokens.peek_kind(count) == TokenKind::Space {
            count += 1;
        }
        count >= 4
    }

    fn skip_blank_line_run(&mut self, start: usize) -> usize {
        let mut offset = start;
        loop {
            let after_ws = self.tokens.skip_while(offset, &[TokenKind::Space, TokenKind::Tab]);
            if self.tokens.peek_kind(after_ws) == TokenKind::Eol {
                offset = after_ws + 1;
                continue;
            }
            return after_ws;
        }
    }

    // ---- Resource definitions --------------------------------------------

    pub(super) fn resource_definition_lookahead(&mut self) -> bool {
        let mut offset = self.tokens.skip_while(0, &[TokenKind::Space]);
        if offset > 3 || self.tokens.peek_kind(offset) != TokenKind::Lbracket {
            return false;
        }
        offset += 1;
        let mut saw_content = false;
        while !matches!(
            self.tokens.peek_kind(offset),
            TokenKind::Rbracket | TokenKind::Eol | TokenKind::Eof
        ) {
            saw_content = true;
            offset += 1;
        }
        if !saw_content || self.tokens.peek_kind(offset) != TokenKind::Rbracket {
            return false;
        }
        offset += 1;
        self.tokens.peek_kind(offset) == TokenKind::Colon
    }

    pub(super) fn parse_resource_definition(&mut self, parent: NodeId) -> Result<NodeId, ParseError> {
        self.skip_up_to_spaces(3);
        self.tokens.advance(); // '['
        let mut id = String::new();
        while self.tokens.peek_kind(0) != TokenKind::Rbracket {
            id.push_str(self.tokens.advance().text());
        }
        self.tokens.advance(); // ']'
        self.tokens.advance(); // ':'
        self.skip_inline_whitespace();

        let location = self.parse_link_destination();
        self.skip_inline_whitespace();
        let title = self.parse_optional_title();

        self.consume_line_whitespace();
        self.tokens.eat(TokenKind::Eol);

        let resource = Resource { location, title };
        self.doc.references.define(id.clone(), resource.clone());
        Ok(self.doc.push(parent, NodeKind::ResourceDefinition { id, resource }))
    }

    /// Consumes a link destination: `<...>` bracketed form, or a bare run of
    /// non-whitespace characters.
    pub(super) fn parse_link_destination(&mut self) -> String {
        let mut text = String::new();
        if self.tokens.peek_kind(0) == TokenKind::Lt {
            self.tokens.advance();
            while self.tokens.peek_kind(0) != TokenKind::Gt && !self.tokens.peek_kind(0).is_eol_or_eof() {
                text.push_str(self.tokens.advance().text());
            }
            self.tokens.eat(TokenKind::Gt);
        } else {
            while !matches!(
                self.tokens.peek_kind(0),
                TokenKind::Space | TokenKind::Tab
            ) && !self.tokens.peek_kind(0).is_eol_or_eof()
            {
                text.push_str(self.tokens.advance().text());
            }
        }
        text
    }

    /// Consumes an optional `"title"`, `'title'`, or `(title)` following a
    /// link destination.
    pub(super) fn parse_optional_title(&mut self) -> Option<String> {
        let (open, close) = match self.tokens.peek_kind(0) {
            TokenKind::DoubleQuote => (TokenKind::DoubleQuote, TokenKind::DoubleQuote),
            TokenKind::SingleQuote => (TokenKind::SingleQuote, TokenKind::SingleQuote),
            TokenKind::Lparen => (TokenKind::Lparen, TokenKind::Rparen),
            _ => return None,
        };
        let _ = open;
        self.tokens.advance();
        let mut text = String::new();
        while self.tokens.peek_kind(0) != close && !self.tokens.peek_kind(0).is_eol_or_eof() {
            text.push_str(self.tokens.advance().text());
        }
        self.tokens.eat(close);
        Some(text)
    }

    pub(super) fn skip_inline_whitespace(&mut self) {
        while matches!(self.tokens.peek_kind(0), TokenKind::Space | TokenKind::Tab) {
            self.tokens.advance();
        }
    }

    // ---- Ruler -------------------------------------------------------------

    /// `RulerLookahead`, parameterized on a starting offset so
    /// `LineLookahead` can ask whether the *next* physical line opens a
    /// ruler without first consuming up to it.
    pub(super) fn looks_like_ruler_at(&mut self, start: usize) -> bool {
        let begin = self.tokens.skip_while(start, &[TokenKind::Space]);
        let marker = match self.tokens.peek_kind(begin) {
            kind @ (TokenKind::Star | TokenKind::Minus | TokenKind::Underscore) => kind,
            _ => return false,
        };
        let mut offset = begin;
        let mut count = 0;
        let mut run_spaces = 0;
        loop {
            match self.tokens.peek_kind(offset) {
                kind if kind == marker => {
                    count += 1;
                    run_spaces = 0;
                    offset += 1;
                }
                TokenKind::Space if run_spaces < 2 => {
                    run_spaces += 1;
                    offset += 1;
                }
                _ => break,
            }
        }
        count >= 3 && self.tokens.peek_kind(offset).is_eol_or_eof()
    }

    fn parse_ruler(&mut self, parent: NodeId) -> Result<NodeId, ParseError> {
        self.skip_up_to_spaces(3);
        while !self.tokens.peek_kind(0).is_eol_or_eof() {
            self.tokens.advance();
        }
        self.tokens.eat(TokenKind::Eol);
        Ok(self.doc.push(parent, NodeKind::Ruler))
    }

    // ---- Headers -------------------------------------------------------------

    /// `AtxHeadingLookahead`, parameterized on a starting offset for the
    /// same reason as [`Self::looks_like_ruler_at`].
    pub(super) fn looks_like_atx_heading_at(&mut self, start: usize) -> bool {
        let begin = self.tokens.skip_while(start, &[TokenKind::Space]);
        let mut offset = begin;
        let mut count = 0;
        while count < 6 && self.tokens.peek_kind(offset) == TokenKind::Sharp {
            offset += 1;
            count += 1;
        }
        count >= 1
            && (matches!(self.tokens.peek_kind(offset), TokenKind::Space | TokenKind::Tab)
                || self.tokens.peek_kind(offset).is_eol_or_eof())
    }

    fn parse_atx_heading(&mut self, parent: NodeId) -> Result<NodeId, ParseError> {
        self.skip_up_to_spaces(3);
        let mut level = 0u8;
        while level < 6 && self.tokens.peek_kind(0) == TokenKind::Sharp {
            self.tokens.advance();
            level += 1;
        }
        self.skip_inline_whitespace();
        let header = self.doc.push(parent, NodeKind::Header { level });
        self.parse_inline_sequence(header, true)?;
        self.consume_atx_closing_run();
        self.tokens.eat(TokenKind::Eol);
        Ok(header)
    }

    fn consume_atx_closing_run(&mut self) {
        while matches!(self.tokens.peek_kind(0), TokenKind::Space | TokenKind::Sharp) {
            self.tokens.advance();
        }
    }

    /// Recognizes a setext underline (`===` or `---`) starting at `start`.
    /// Called by `parse_paragraph` after its first line with `start = 1` (the
    /// cursor still sits on that line's own unconsumed `EOL` at offset 0), per
    /// the grammar's "a line followed by a line of `=`s or `-`s" rule.
    pub(super) fn setext_underline_lookahead(&mut self, start: usize) -> Option<u8> {
        let marker = match self.tokens.peek_kind(start) {
            TokenKind::Eq => TokenKind::Eq,
            TokenKind::Minus => TokenKind::Minus,
            _ => return None,
        };
        let mut offset = start;
        let mut count = 0;
        while self.tokens.peek_kind(offset) == marker {
            offset += 1;
            count += 1;
        }
        let offset = self.tokens.skip_while(offset, &[TokenKind::Space]);
        if count >= 1 && self.tokens.peek_kind(offset).is_eol_or_eof() {
            Some(if marker == TokenKind::Eq { 1 } else { 2 })
        } else {
            None
        }
    }

    /// Consumes the separating `EOL` left over from the preceding line, then
    /// the underline itself.
    pub(super) fn consume_setext_underline(&mut self) {
        self.tokens.eat(TokenKind::Eol);
        while matches!(self.tokens.peek_kind(0), TokenKind::Eq | TokenKind::Minus | TokenKind::Space) {
            self.tokens.advance();
        }
        self.tokens.eat(TokenKind::Eol);
    }

    // ---- Comments ------------------------------------------------------------

    fn comment_lookahead(&mut self) -> bool {
        let offset = self.tokens.skip_while(0, &[TokenKind::Space]);
        offset <= 3 && self.tokens.peek_kind(offset) == TokenKind::CommentOpen
    }

    fn parse_comment(&mut self, parent: NodeId) -> Result<NodeId, ParseError> {
        self.skip_up_to_spaces(3);
        self.tokens.advance(); // COMMENT_OPEN
        let mut text = String::new();
        while self.tokens.peek_kind(0) != TokenKind::CommentClose && self.tokens.peek_kind(0) != TokenKind::Eof {
            text.push_str(self.tokens.advance().text());
        }
        self.tokens.eat(TokenKind::CommentClose);
        self.consume_line_whitespace();
        self.tokens.eat(TokenKind::Eol);
        Ok(self.doc.push(parent, NodeKind::Comment { text }))
    }

    // ---- HTML block ------------------------------------------------------------

    fn html_block_lookahead(&mut self) -> bool {
        let offset = self.tokens.skip_while(0, &[TokenKind::Space]);
        offset <= 3
            && self.tokens.peek_kind(offset) == TokenKind::Lt
            && matches!(self.tokens.peek_kind(offset + 1), TokenKind::CharSequence)
    }

    fn parse_html_block(&mut self, parent: NodeId) -> Result<NodeId, ParseError> {
        self.skip_up_to_spaces(3);
        self.parse_tag(parent)
    }

    // ---- Indented code -----------------------------------------------------

    fn parse_code(&mut self, parent: NodeId) -> Result<NodeId, ParseError> {
        let code = self.doc.push(parent, NodeKind::Code);
        loop {
            if !self.strip_code_indentation() {
                break;
            }
            let mut value = String::new();
            while !self.tokens.peek_kind(0).is_eol_or_eof() {
                value.push_str(self.tokens.advance().text());
            }
            self.doc.push(code, NodeKind::CodeText { value });
            self.tokens.eat(TokenKind::Eol);
            if !self.code_line_lookahead() {
                break;
            }
        }
        Ok(code)
    }

    /// Strips a 4-space or one-tab indentation prefix (plus blockquote
    /// markers up to the current depth), returning whether a code line
    /// actually begins here.
    fn strip_code_indentation(&mut self) -> bool {
        if self.tokens.peek_kind(0) == TokenKind::Eol {
            // A blank line inside a code block has no prefix to strip.
            return true;
        }
        if self.tokens.peek_kind(0) == TokenKind::Tab {
            self.tokens.advance();
            return true;
        }
        let mut spaces = 0;
        while spaces < 4 && self.tokens.peek_kind(0) == TokenKind::Space {
            self.tokens.advance();
            spaces += 1;
        }
        spaces == 4
    }

    fn code_line_lookahead(&mut self) -> bool {
        if self.is_blank_line_ahead() {
            return true;
        }
        if self.tokens.peek_kind(0) == TokenKind::Tab {
            return true;
        }
        let mut count = 0;
        while self.tokens.peek_kind(count) == TokenKind::Space {
            count += 1;
        }
        count >= 4
    }

    // ---- Quote ---------------------------------------------------------------

    fn parse_quote(&mut self, parent: NodeId) -> Result<NodeId, ParseError> {
        self.eat_quote_marker();
        let quote = self.doc.push(parent, NodeKind::Quote);
        self.quote_depth += 1;
        loop {
            self.parse_block_element(quote)?;
            let resume = self.skip_blank_line_run(0);
            if self.tokens.peek_kind(resume) == TokenKind::Gt {
                self.consume_to_offset(resume);
                self.eat_quote_marker();
                continue;
            }
            break;
        }
        self.quote_depth -= 1;
        Ok(quote)
    }

    /// True when the content starting at `start` still sits inside the
    /// current blockquote's indentation allowance (at most 3 leading spaces
    /// past any `>` markers already skipped by the caller) — i.e. it hasn't
    /// drifted into a new sibling block at depth zero.
    pub(super) fn quoted_element_lookahead(&mut self, start: usize) -> bool {
        self.quote_depth == 0 || self.tokens.skip_while(start, &[TokenKind::Space]) - start <= 3
    }

    /// Scans from `start` over a run of `(SPACE* GT)` groups, counting how
    /// many `>` markers introduce the line. Returns the marker count and the
    /// offset just past the last one (and its single following space, if
    /// any). A continuation line carrying *more* markers than the depth
    /// already open is the start of a new, more deeply nested quote rather
    /// than a lazy continuation of the current one.
    pub(super) fn count_quote_markers(&mut self, start: usize) -> (u32, usize) {
        let mut offset = start;
        let mut count = 0u32;
        loop {
            let probe = self.tokens.skip_while(offset, &[TokenKind::Space, TokenKind::Tab]);
            if probe - offset > 3 || self.tokens.peek_kind(probe) != TokenKind::Gt {
                return (count, offset);
            }
            offset = probe + 1;
            if self.tokens.peek_kind(offset) == TokenKind::Space {
                offset += 1;
            }
            count += 1;
        }
    }

    fn consume_to_offset(&mut self, offset: usize) {
        for _ in 0..offset {
            self.tokens.advance();
        }
    }

    // ---- Lists / items ---------------------------------------------------------

    /// Classifies the list marker (if any) starting at `offset`: `Some(true)`
    /// for an ordered marker (`1.`), `Some(false)` for a bullet (`*`/`-`/`+`),
    /// `None` if nothing qualifies (including when it sits past the 3-space
    /// indentation allowance). Used both to decide whether a new list/item
    /// starts here and, offset-shifted, by [`Self::line_lookahead`](super::inline)
    /// to recognize one on the next physical line before consuming its `EOL`.
    pub(super) fn list_marker_kind(&mut self, offset: usize) -> Option<bool> {
        let start = self.tokens.skip_while(offset, &[TokenKind::Space]);
        if start - offset > 3 {
            return None;
        }
        if self.tokens.peek_kind(start) == TokenKind::Digits
            && self.tokens.peek_kind(start + 1) == TokenKind::Dot
            && matches!(self.tokens.peek_kind(start + 2), TokenKind::Space | TokenKind::Tab)
        {
            return Some(true);
        }
        if matches!(self.tokens.peek_kind(start), TokenKind::Star | TokenKind::Minus | TokenKind::Plus)
            && matches!(self.tokens.peek_kind(start + 1), TokenKind::Space | TokenKind::Tab)
        {
            return Some(false);
        }
        None
    }

    fn parse_list(&mut self, parent: NodeId) -> Result<NodeId, ParseError> {
        let ordered = self.tokens.peek_kind(self.tokens_leading_space_count()) == TokenKind::Digits;
        let list = self.doc.push(parent, NodeKind::List { ordered, indentation: 0 });
        let mut list_indentation = 0u32;
        let mut loose = false;
        loop {
            self.parse_item(list, ordered, &mut list_indentation, &mut loose)?;
            let resume = self.skip_blank_line_run(0);
            // `skip_blank_line_run` also eats the single EOL that ends the
            // item's last line, so `resume == 1` is plain tight continuation;
            // only a second, genuinely empty line (`resume > 1`) loosens it.
            let blank_gap = resume > 1;
            if self.marker_follows_from(resume, ordered) {
                self.consume_to_offset(resume);
                if blank_gap {
                    loose = true;
                }
                continue;
            }
            break;
        }
        if loose {
            let items = self.doc.children(list).to_vec();
            for item in items {
                if let NodeKind::Item { loose: ref mut l, .. } = self.doc.node_mut(item).kind {
                    *l = true;
                }
            }
        }
        Ok(list)
    }

    fn tokens_leading_space_count(&mut self) -> usize {
        self.tokens.skip_while(0, &[TokenKind::Space])
    }

    fn marker_follows_from(&mut self, start: usize, ordered: bool) -> bool {
        self.list_marker_kind(start) == Some(ordered)
    }

    fn parse_item(
        &mut self,
        list: NodeId,
        ordered: bool,
        list_indentation: &mut u32,
        loose: &mut bool,
    ) -> Result<(), ParseError> {
        self.skip_up_to_spaces(3);
        let marker_column = self.tokens.peek(0).begin_column;
        if ordered {
            self.tokens.advance(); // digits
            self.tokens.advance(); // '.'
        } else {
            self.tokens.advance(); // bullet char
        }
        self.skip_up_to_spaces(3);
        if self.tokens.peek_kind(0) == TokenKind::Tab {
            self.tokens.advance();
        } else {
            self.tokens.eat(TokenKind::Space);
        }
        let content_column = if self.tokens.peek_kind(0).is_eol_or_eof() {
            marker_column + 2
        } else {
            self.tokens.peek(0).begin_column
        };
        let indentation = content_column.saturating_sub(marker_column);
        if *list_indentation == 0 {
            *list_indentation = indentation.max(1);
        }
        let indentation = *list_indentation;

        let item = self.doc.push(list, NodeKind::Item { indentation, ordered, loose: false });
        self.parse_block_element(item)?;
        loop {
            let resume = self.skip_blank_line_run(0);
            let blank_gap = resume > 0;
            let lead = self.tokens.skip_while(resume, &[TokenKind::Space]) - resume;
            if self.tokens.peek_kind(resume + lead).is_eol_or_eof() {
                break;
            }
            if lead as u32 >= indentation {
                self.consume_to_offset(resume);
                // Strip exactly the item's own indentation so a nested
                // block (code, sub-list) sees indentation relative to the
                // item's content column, not the outer line.
                for _ in 0..indentation {
                    self.tokens.advance();
                }
                if blank_gap {
                    *loose = true;
                }
                self.parse_block_element(item)?;
                continue;
            }
            break;
        }
        Ok(())
    }
}
