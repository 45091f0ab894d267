use crate::Node;
use crate::dom_utils::{find_element, text_content};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadMetadata {
    pub title: Option<String>,
    pub meta: Vec<MetaTag>,
    pub base_href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTag {
    pub name: Option<String>,     // e.g. name="description"
    pub property: Option<String>, // e.g. property="og:title"
    pub content: Option<String>,
}

/// How a `<meta>` element is matched between two documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetaKey {
    Name(String),
    Property(String),
}

impl MetaKey {
    pub fn matches(&self, node: &Node) -> bool {
        if !node.is_element("meta") {
            return false;
        }
        match self {
            MetaKey::Name(n) => node.attr("name") == Some(n.as_str()),
            MetaKey::Property(p) => node.attr("property") == Some(p.as_str()),
        }
    }
}

impl MetaTag {
    /// `name` wins over `property` when both are present.
    pub fn key(&self) -> Option<MetaKey> {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return Some(MetaKey::Name(name.to_string()));
        }
        self.property
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| MetaKey::Property(p.to_string()))
    }
}

pub fn extract_head_metadata(dom: &Node) -> HeadMetadata {
    let mut meta = HeadMetadata::default();
    if let Some(head) = find_element(dom, "head") {
        fill_head_metadata_from(head, &mut meta);
    }
    if meta.title.is_none() {
        // Documents without an explicit <head> still carry a <title> somewhere.
        meta.title = find_element(dom, "title").map(title_text);
    }
    meta
}

/// `href` of the first `<base>` in `<head>` that has one.
pub fn base_href(dom: &Node) -> Option<&str> {
    find_element(dom, "head")?
        .children()
        .iter()
        .filter(|child| child.is_element("base"))
        .find_map(|base| base.attr("href"))
}

fn title_text(node: &Node) -> String {
    text_content(node)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn fill_head_metadata_from(head: &Node, out: &mut HeadMetadata) {
    for child in head.children() {
        let Some(name) = child.element_name() else {
            continue;
        };
        match name {
            "title" if out.title.is_none() => out.title = Some(title_text(child)),
            "meta" => {
                let tag = MetaTag {
                    name: child.attr("name").map(str::to_string),
                    property: child.attr("property").map(str::to_string),
                    content: child.attr("content").map(str::to_string),
                };
                if tag.name.is_some() || tag.property.is_some() || tag.content.is_some() {
                    out.meta.push(tag);
                }
            }
            "base" if out.base_href.is_none() => {
                out.base_href = child.attr("href").map(str::to_string);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_html;

    #[test]
    fn extracts_title_meta_and_base() {
        let dom = parse_html(
            r#"<html><head>
                <title>  Hello
                   World </title>
                <meta charset="utf-8">
                <meta name="description" content="d">
                <meta property="og:title" content="og">
                <base href="/root/">
            </head><body></body></html>"#,
        );
        let head = extract_head_metadata(&dom);
        assert_eq!(head.title.as_deref(), Some("Hello World"));
        assert_eq!(head.base_href.as_deref(), Some("/root/"));
        assert_eq!(base_href(&dom), Some("/root/"));
        let keys: Vec<_> = head.meta.iter().filter_map(MetaTag::key).collect();
        assert_eq!(
            keys,
            vec![
                MetaKey::Name("description".into()),
                MetaKey::Property("og:title".into())
            ]
        );
    }

    #[test]
    fn base_without_href_is_skipped() {
        let dom = parse_html(r#"<head><base target="_self"><base href="/b/"></head>"#);
        assert_eq!(base_href(&dom), Some("/b/"));
        assert_eq!(extract_head_metadata(&dom).base_href.as_deref(), Some("/b/"));
        assert_eq!(base_href(&parse_html("<p><base href=/x/></p>")), None);
    }

    #[test]
    fn title_outside_head() {
        let dom = parse_html("<title>Bare</title><p>x</p>");
        assert_eq!(extract_head_metadata(&dom).title.as_deref(), Some("Bare"));
    }
}
