//! Renders a parsed [`Document`] to HTML.
//!
//! One match over the fixed [`NodeKind`] taxonomy dispatches every node;
//! there's no vtable indirection since the tree is tagged-variant rather
//! than trait-object based.

use std::fmt::{self, Write};

use crate::ast::{Document, EmphasisKind, Node, NodeId, NodeKind, Resource};
use crate::escape::{escape_body_text, escape_href};

pub fn render(doc: &Document, out: &mut impl Write) -> fmt::Result {
    let visitor = Visitor { doc };
    visitor.render_children(doc.root(), out)
}

struct Visitor<'a> {
    doc: &'a Document,
}

impl<'a> Visitor<'a> {
    fn node(&self, id: NodeId) -> &Node {
        self.doc.node(id)
    }

    fn render_children(&self, id: NodeId, out: &mut impl Write) -> fmt::Result {
        for &child in self.doc.children(id) {
            self.render_node(child, out)?;
        }
        Ok(())
    }

    fn render_node(&self, id: NodeId, out: &mut impl Write) -> fmt::Result {
        match self.node(id).kind.clone() {
            NodeKind::Document => self.render_children(id, out),
            NodeKind::Paragraph => self.render_paragraph(id, out),
            NodeKind::Header { level } => {
                write!(out, "<h{level}>")?;
                self.render_children(id, out)?;
                writeln!(out, "</h{level}>")
            }
            NodeKind::Quote => {
                writeln!(out, "<blockquote>")?;
                self.render_children(id, out)?;
                writeln!(out, "</blockquote>")
            }
            NodeKind::List { ordered, .. } => {
                let tag = if ordered { "ol" } else { "ul" };
                writeln!(out, "<{tag}>")?;
                self.render_children(id, out)?;
                writeln!(out, "</{tag}>")
            }
            NodeKind::Item { .. } => {
                write!(out, "<li>")?;
                self.render_children(id, out)?;
                writeln!(out, "</li>")
            }
            NodeKind::Code => {
                write!(out, "<pre><code>")?;
                let texts: Vec<String> = self
                    .doc
                    .children(id)
                    .iter()
                    .map(|&child| match self.node(child).kind.clone() {
                        NodeKind::CodeText { value } => escape_body_text(&value),
                        _ => String::new(),
                    })
                    .collect();
                write!(out, "{}", texts.join("\n"))?;
                writeln!(out, "</code></pre>")
            }
            NodeKind::Ruler => writeln!(out, "<hr/>"),
            NodeKind::ResourceDefinition { .. } => Ok(()),
            NodeKind::Comment { text } => writeln!(out, "<!--{text}-->"),
            NodeKind::Line => self.render_children(id, out),

            NodeKind::Text { value } => write!(out, "{}", escape_body_text(&value)),
            NodeKind::CodeText { value } => write!(out, "{}", escape_body_text(&value)),
            NodeKind::CharRef { value } => write!(out, "{value}"),
            NodeKind::CodeSpan { text } => write!(out, "<code>{}</code>", escape_body_text(&text)),
            NodeKind::Emphasis { kind, text } => self.render_emphasis(kind, &text, out),
            NodeKind::Link { .. } => self.render_link(id, out),
            NodeKind::Image { .. } => self.render_image(id, out),
            NodeKind::InlineUrl { url } => {
                let escaped = escape_href(&url);
                write!(out, "<a href=\"{escaped}\">{escaped}</a>")
            }
            // Rendered silently: the source this grammar is modeled on emits
            // no visible markup for a hard break, relying on surrounding
            // block spacing instead.
            NodeKind::LineBreak => Ok(()),

            NodeKind::Tag { name, attributes } => self.render_balanced_tag(id, &name, &attributes, out),
            NodeKind::OpeningTag { name, attributes } => self.render_raw_open(&name, &attributes, out, false),
            NodeKind::ClosingTag { name } => write!(out, "</{name}>"),
            NodeKind::EmptyTag { name, attributes } => self.render_raw_open(&name, &attributes, out, true),
        }
    }

    /// A bare paragraph whose only non-blank content is a single `OpeningTag`
    /// child is raw HTML passed through verbatim rather than wrapped in
    /// `<p>`; likewise a paragraph inside a tight list item renders its
    /// lines without the wrapper, since the item itself supplies the block
    /// boundary.
    fn render_paragraph(&self, id: NodeId, out: &mut impl Write) -> fmt::Result {
        if self.paragraph_is_just_hr(id) {
            return writeln!(out, "<hr/>");
        }
        if let Some(raw) = self.paragraph_raw_tag_line(id) {
            self.render_node(raw, out)?;
            return writeln!(out);
        }

        let in_tight_item = self.doc.parent(id).is_some_and(|parent| {
            matches!(self.node(parent).kind, NodeKind::Item { loose: false, .. })
        });

        if in_tight_item {
            self.render_paragraph_lines(id, out)
        } else {
            write!(out, "<p>")?;
            self.render_paragraph_lines(id, out)?;
            writeln!(out, "</p>")
        }
    }

    fn render_paragraph_lines(&self, id: NodeId, out: &mut impl Write) -> fmt::Result {
        let lines = self.doc.children(id);
        for (i, &line) in lines.iter().enumerate() {
            if i > 0 {
                write!(out, "\n")?;
            }
            self.render_node(line, out)?;
        }
        Ok(())
    }

    /// True for a paragraph whose first (and only meaningful) line is a
    /// lone horizontal rule, written either as a `Ruler` or as a raw `<hr>`
    /// tag — grounded on the grammar's `containsHR` check, which only
    /// inspects the first grandchild.
    fn paragraph_is_just_hr(&self, id: NodeId) -> bool {
        let Some(&first_line) = self.doc.children(id).first() else {
            return false;
        };
        let Some(&first) = self.doc.children(first_line).first() else {
            return false;
        };
        match &self.node(first).kind {
            NodeKind::Ruler => true,
            NodeKind::Tag { name, .. } | NodeKind::OpeningTag { name, .. } | NodeKind::EmptyTag { name, .. } => {
                name.eq_ignore_ascii_case("hr")
            }
            _ => false,
        }
    }

    fn paragraph_raw_tag_line(&self, id: NodeId) -> Option<NodeId> {
        let &first_line = self.doc.children(id).first()?;
        if self.doc.children(first_line).len() != 1 {
            return None;
        }
        let &only = self.doc.children(first_line).first()?;
        matches!(self.node(only).kind, NodeKind::OpeningTag { .. } | NodeKind::Tag { .. }).then_some(only)
    }

    fn render_emphasis(&self, kind: EmphasisKind, text: &str, out: &mut impl Write) -> fmt::Result {
        let escaped = escape_body_text(text);
        match kind {
            EmphasisKind::Italic => write!(out, "<em>{escaped}</em>"),
            EmphasisKind::Bold => write!(out, "<strong>{escaped}</strong>"),
            EmphasisKind::ItalicAndBold => write!(out, "<strong><em>{escaped}</em></strong>"),
        }
    }

    fn render_link(&self, id: NodeId, out: &mut impl Write) -> fmt::Result {
        let NodeKind::Link { referenced, reference_name, resource, .. } = self.node(id).kind.clone() else {
            unreachable!("render_link called on a non-Link node")
        };

        let resolved = if referenced {
            let key = reference_name.clone().unwrap_or_else(|| self.plain_text(id));
            self.doc.references.resolve(&key).cloned()
        } else {
            resource
        };

        match resolved {
            Some(Resource { location, title }) => {
                let href = escape_href(&location);
                write!(out, "<a href=\"{href}\"")?;
                if let Some(title) = title {
                    write!(out, " title=\"{}\"", escape_body_text(&title))?;
                }
                write!(out, ">")?;
                self.render_children(id, out)?;
                write!(out, "</a>")
            }
            // Reference never resolved: fall back to the literal source
            // syntax rather than silently dropping the link text.
            None if referenced => {
                write!(out, "[")?;
                self.render_children(id, out)?;
                write!(out, "]")?;
                if let Some(name) = reference_name {
                    write!(out, "[{name}]")?;
                }
                Ok(())
            }
            None => {
                write!(out, "[")?;
                self.render_children(id, out)?;
                write!(out, "]")
            }
        }
    }

    fn render_image(&self, id: NodeId, out: &mut impl Write) -> fmt::Result {
        let NodeKind::Image { text, ref_id, resource } = self.node(id).kind.clone() else {
            unreachable!("render_image called on a non-Image node")
        };

        let resolved = match resource {
            Some(resource) => Some(resource),
            None => {
                let key = ref_id.unwrap_or_else(|| text.clone());
                self.doc.references.resolve(&key).cloned()
            }
        };

        match resolved {
            Some(Resource { location, title }) => {
                write!(out, "<img src=\"{}\" alt=\"{}\"", escape_href(&location), escape_body_text(&text))?;
                if let Some(title) = title {
                    write!(out, " title=\"{}\"", escape_body_text(&title))?;
                }
                write!(out, "/>")
            }
            None => write!(out, "<img src=\"\" alt=\"{}\"/>", escape_body_text(&text)),
        }
    }

    fn render_balanced_tag(
        &self,
        id: NodeId,
        name: &str,
        attributes: &[crate::ast::TagAttribute],
        out: &mut impl Write,
    ) -> fmt::Result {
        if name.eq_ignore_ascii_case("hr") {
            // `hr` is a void element: it never has a closing tag or body,
            // regardless of how the source spelled it.
            return writeln!(out, "<hr/>");
        }
        write!(out, "<{name}")?;
        self.write_attrs(attributes, out)?;
        write!(out, ">")?;
        self.render_children(id, out)?;
        write!(out, "</{name}>")
    }

    fn render_raw_open(
        &self,
        name: &str,
        attributes: &[crate::ast::TagAttribute],
        out: &mut impl Write,
        self_closing: bool,
    ) -> fmt::Result {
        write!(out, "<{name}")?;
        self.write_attrs(attributes, out)?;
        if self_closing {
            write!(out, "/>")
        } else {
            write!(out, ">")
        }
    }

    fn write_attrs(&self, attributes: &[crate::ast::TagAttribute], out: &mut impl Write) -> fmt::Result {
        for attr in attributes {
            match &attr.value {
                Some(value) => write!(out, " {}=\"{}\"", attr.name, escape_body_text(value))?,
                None => write!(out, " {}", attr.name)?,
            }
        }
        Ok(())
    }

    /// Flattens a subtree's textual content, used to resolve a shortcut
    /// reference's implicit id and to render a broken reference's fallback
    /// text.
    fn plain_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.plain_text_into(id, &mut out);
        out
    }

    fn plain_text_into(&self, id: NodeId, out: &mut String) {
        match self.node(id).kind.clone() {
            NodeKind::Text { value } | NodeKind::CodeSpan { text: value } | NodeKind::Emphasis { text: value, .. } => {
                out.push_str(&value);
            }
            NodeKind::CharRef { value } => out.push_str(&value),
            NodeKind::InlineUrl { url } => out.push_str(&url),
            _ => {
                for &child in self.doc.children(id) {
                    self.plain_text_into(child, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::span::SourceText;

    fn render_to_html(input: &str) -> String {
        let doc = parse(SourceText::from(input)).expect("parse should not fail");
        let mut out = String::new();
        render(&doc, &mut out).expect("render should not fail");
        out
    }

    #[test]
    fn paragraph_wraps_and_escapes() {
        assert_eq!(render_to_html("a < b"), "<p>a &lt; b</p>\n");
    }

    #[test]
    fn header_levels() {
        assert_eq!(render_to_html("# Title\n"), "<h1>Title</h1>\n");
    }

    #[test]
    fn unresolved_reference_falls_back_to_literal_text() {
        assert_eq!(render_to_html("[foo][bar]"), "<p>[foo][bar]</p>\n");
    }

    #[test]
    fn resolved_reference_link() {
        let html = render_to_html("[foo][bar]\n\n[bar]: http://example.com \"t\"\n");
        assert_eq!(html, "<p><a href=\"http://example.com\" title=\"t\">foo</a></p>\n");
    }

    #[test]
    fn ruler_renders_self_closing() {
        assert_eq!(render_to_html("---\n"), "<hr/>\n");
    }

    #[test]
    fn char_ref_passes_through_unescaped() {
        assert_eq!(render_to_html("&amp;"), "<p>&amp;</p>\n");
    }
}
