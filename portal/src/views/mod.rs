//! Server-rendered HTML.
//!
//! Pages are plain `format!` output wrapped in [`layout`]. Every value that
//! did not originate in this module goes through [`escape`].

mod form;
mod layout;
pub mod pages;
mod table;

pub use form::{Field, FieldKind, FormView};
pub use layout::layout;
pub use table::{Column, TableView};

/// Escape text for HTML element content and double-quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape("Ñandú"), "Ñandú");
    }
}
