//! HTML escaping for text rendered into element content and attribute
//! values.
//!
//! Only the four characters that can actually break HTML structure are
//! rewritten; this crate has no URL-sanitation or percent-encoding step; it
//! leaves link/image destinations exactly as written past this same
//! four-character escape, in keeping with its documented scope.

use memchr::memchr3;

/// Escapes `&`, `<`, `>`, and `"` for safe inclusion in HTML text content or
/// a double-quoted attribute value.
pub fn escape_body_text(text: &str) -> String {
    let bytes = text.as_bytes();
    if memchr3(b'&', b'<', b'>', bytes).is_none() && !text.contains('"') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

/// Escapes a link/image destination. Delegates to [`escape_body_text`]: no
/// percent-encoding or scheme allowlisting is performed here.
pub fn escape_href(href: &str) -> String {
    escape_body_text(href)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_all_four_characters() {
        assert_eq!(escape_body_text("<a & b> \"c\""), "&lt;a &amp; b&gt; &quot;c&quot;");
    }

    #[test]
    fn leaves_plain_text_untouched() {
        assert_eq!(escape_body_text("hello world"), "hello world");
    }

    #[test]
    fn href_has_no_percent_encoding() {
        assert_eq!(escape_href("http://example.com/a b"), "http://example.com/a b");
    }
}
