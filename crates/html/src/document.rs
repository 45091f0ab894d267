use crate::dom_utils::{class_list, find_element};
use crate::head::{HeadMetadata, MetaTag, extract_head_metadata};
use crate::selector::Selector;
use crate::{Node, parse_html};

/// A fetched page, parsed once and then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// URL the document was served from (after redirects).
    pub url: String,
    pub dom: Node,
    pub head: HeadMetadata,
}

impl ParsedDocument {
    pub fn parse(url: impl Into<String>, body: &str) -> Self {
        Self::from_dom(url, parse_html(body))
    }

    pub fn from_dom(url: impl Into<String>, dom: Node) -> Self {
        let head = extract_head_metadata(&dom);
        Self {
            url: url.into(),
            dom,
            head,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.head.title.as_deref()
    }

    pub fn meta(&self) -> &[MetaTag] {
        &self.head.meta
    }

    pub fn body(&self) -> Option<&Node> {
        find_element(&self.dom, "body")
    }

    /// Class tokens of `<body>`, in source order.
    pub fn body_classes(&self) -> Vec<&str> {
        self.body().map(class_list).unwrap_or_default()
    }

    /// The root content container, located with `selector`.
    pub fn container(&self, selector: &Selector) -> Option<&Node> {
        selector.select_first(&self.dom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
        <html><head><title>Post</title><meta name="description" content="about"></head>
        <body class="post dark"><main><h1>Hi</h1></main></body></html>"#;

    #[test]
    fn exposes_title_container_and_metadata() {
        let doc = ParsedDocument::parse("https://site/post", PAGE);
        assert_eq!(doc.title(), Some("Post"));
        assert_eq!(doc.body_classes(), vec!["post", "dark"]);
        assert_eq!(doc.meta().len(), 1);
        let main = doc.container(&Selector::parse("main").unwrap()).unwrap();
        assert_eq!(main.children().len(), 1);
        assert!(
            doc.container(&Selector::parse("#missing").unwrap())
                .is_none()
        );
    }

    #[test]
    fn ampersand_heavy_text_parses_quickly() {
        let text = "a && b ".repeat(50_000);
        let start = std::time::Instant::now();
        let doc = ParsedDocument::parse("https://site/code", &format!("<body><pre>{text}</pre></body>"));
        assert!(start.elapsed() < std::time::Duration::from_secs(2));
        let body = doc.body().unwrap();
        assert_eq!(crate::dom_utils::text_content(body), text);
    }
}
