use crate::session::{SessionStore, Theme};
use crate::url_norm;
use html::dom_utils::{
    assign_node_ids, class_list, find_element, find_element_mut, find_node_by_id, max_node_id,
    set_attr, text_content,
};
use html::{Id, Node, ParsedDocument, Selector};
use url::Url;

/// The live page the engine mutates: DOM, location, viewport and session.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub dom: Node,
    pub scroll: (f64, f64),
    pub session: SessionStore,
    next_node_id: u32,
}

impl Page {
    pub fn new(url: impl Into<String>, dom: Node) -> Self {
        let next_node_id = max_node_id(&dom).wrapping_add(1).max(1);
        Self {
            url: url.into(),
            dom,
            scroll: (0.0, 0.0),
            session: SessionStore::new(),
            next_node_id,
        }
    }

    pub fn parse(url: impl Into<String>, markup: &str) -> Self {
        Self::new(url, html::parse_html(markup))
    }

    pub fn from_document(doc: ParsedDocument) -> Self {
        Self::new(doc.url, doc.dom)
    }

    /// Base for resolving relative hrefs, honoring `<base href>`.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        url_norm::base_url(&self.url, html::head::base_href(&self.dom))
    }

    // -- Node Access ---
    pub fn node(&self, id: Id) -> Option<&Node> {
        find_node_by_id(&self.dom, id)
    }

    pub fn select(&self, selector: &Selector) -> Option<&Node> {
        selector.select_first(&self.dom)
    }

    pub fn select_all(&self, selector: &Selector) -> Vec<&Node> {
        selector.select_all(&self.dom)
    }

    pub fn select_mut(&mut self, selector: &Selector) -> Option<&mut Node> {
        selector.select_first_mut(&mut self.dom)
    }

    /// Give `node` and its subtree ids that are fresh for this page.
    pub fn adopt(&mut self, node: &mut Node) {
        assign_node_ids(node, &mut self.next_node_id);
    }

    /// Replace the children of the first element matching `selector`.
    /// Returns `false` when nothing matches.
    pub fn replace_children(&mut self, selector: &Selector, mut children: Vec<Node>) -> bool {
        for child in &mut children {
            self.adopt(child);
        }
        match self.select_mut(selector).and_then(Node::children_mut) {
            Some(slot) => {
                *slot = children;
                true
            }
            None => false,
        }
    }

    // -- Document State ---
    pub fn title(&self) -> Option<String> {
        find_element(&self.dom, "title").map(|t| text_content(t).trim().to_string())
    }

    /// Set the `<title>` text, creating the element in `<head>` if needed.
    pub fn set_title(&mut self, title: &str) {
        let mut text = Node::Text {
            id: Id::default(),
            text: title.to_string(),
        };
        self.adopt(&mut text);

        if let Some(children) = find_element_mut(&mut self.dom, "title").and_then(Node::children_mut) {
            *children = vec![text];
            return;
        }

        let mut element = Node::Element {
            id: Id::default(),
            name: "title".to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        };
        self.adopt(&mut element);
        if let Some(children) = element.children_mut() {
            children.push(text);
        }
        match find_element_mut(&mut self.dom, "head").and_then(Node::children_mut) {
            Some(head) => head.push(element),
            None => log::debug!(target: "navigation.page", "no <head>; title not set"),
        }
    }

    pub fn body_classes(&self) -> Vec<String> {
        find_element(&self.dom, "body")
            .map(|b| class_list(b).into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn set_body_classes<S: AsRef<str>>(&mut self, classes: &[S]) -> bool {
        let joined = classes
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        match find_element_mut(&mut self.dom, "body") {
            Some(body) => {
                set_attr(body, "class", &joined);
                true
            }
            None => false,
        }
    }

    /// Theme preference held in the session under `key`.
    pub fn theme(&self, key: &str) -> Theme {
        Theme::from_value(self.session.get(key))
    }

    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.scroll = (x, y);
    }
}
