pub mod document;
pub mod dom_utils;
pub mod head;
pub mod selector;

mod dom_builder;
mod entities;
mod tokenizer;
mod types;

pub use crate::document::ParsedDocument;
pub use crate::dom_builder::build_dom;
pub use crate::selector::{Selector, SelectorError};
pub use crate::tokenizer::tokenize;
pub use crate::types::{Attributes, Id, Node, NodeId, Token};

/// Tokenize and build in one step. Node ids start at 1 in document order.
pub fn parse_html(input: &str) -> Node {
    build_dom(tokenize(input))
}

/// `true` when a `Content-Type` value names an HTML document.
pub fn is_html(content_type: Option<&str>) -> bool {
    let Some(value) = content_type else {
        return false;
    };
    let mime = value.split(';').next().unwrap_or_default().trim();
    mime.eq_ignore_ascii_case("text/html") || mime.eq_ignore_ascii_case("application/xhtml+xml")
}

#[cfg(test)]
mod tests {
    use super::is_html;

    #[test]
    fn recognizes_html_content_types() {
        assert!(is_html(Some("text/html")));
        assert!(is_html(Some("Text/HTML; charset=utf-8")));
        assert!(is_html(Some("application/xhtml+xml")));
        assert!(!is_html(Some("application/json")));
        assert!(!is_html(None));
    }
}
