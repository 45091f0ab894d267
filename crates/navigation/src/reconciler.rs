//! Applies a fetched document onto the live page.
//!
//! The live page keeps its session-scoped state: the theme class on `<body>`
//! always reflects the session preference, never the fetched markup.

use crate::error::{DocumentSide, ReconcileError};
use crate::page::Page;
use crate::session::Theme;
use html::dom_utils::{find_element_mut, set_attr};
use html::head::{MetaKey, MetaTag};
use html::{Node, ParsedDocument, Selector};

#[derive(Debug, Clone)]
pub struct DomReconciler {
    container: Selector,
    theme_key: String,
}

impl DomReconciler {
    pub fn new(container: Selector, theme_key: impl Into<String>) -> Self {
        Self {
            container,
            theme_key: theme_key.into(),
        }
    }

    pub fn container(&self) -> &Selector {
        &self.container
    }

    /// Swap title, content container, body classes and head metadata.
    ///
    /// Both containers are checked before anything is touched, so an error
    /// leaves the page as it was.
    pub fn apply(&self, page: &mut Page, doc: &ParsedDocument) -> Result<(), ReconcileError> {
        let theme = page.theme(&self.theme_key);

        let incoming = doc
            .container(&self.container)
            .ok_or_else(|| self.missing(DocumentSide::Fetched))?
            .children()
            .to_vec();
        if page.select(&self.container).is_none() {
            return Err(self.missing(DocumentSide::Live));
        }

        if let Some(title) = doc.title() {
            page.set_title(title);
        }
        page.replace_children(&self.container, incoming);
        page.set_body_classes(&themed_classes(&doc.body_classes(), theme));
        update_meta(&mut page.dom, doc.meta());

        page.session.set(&self.theme_key, theme.token());
        Ok(())
    }

    fn missing(&self, side: DocumentSide) -> ReconcileError {
        ReconcileError::MissingContainer {
            selector: self.container.as_str().to_string(),
            side,
        }
    }
}

/// Fetched class tokens with theme tokens dropped and `theme` appended.
pub fn themed_classes<'a>(fetched: &[&'a str], theme: Theme) -> Vec<&'a str> {
    let mut classes: Vec<&str> = fetched
        .iter()
        .copied()
        .filter(|c| !Theme::is_token(c))
        .collect();
    classes.push(theme.token());
    classes
}

fn update_meta(live: &mut Node, fetched: &[MetaTag]) {
    let Some(head) = find_element_mut(live, "head") else {
        return;
    };
    for tag in fetched {
        let (Some(key), Some(content)) = (tag.key(), tag.content.as_deref()) else {
            continue;
        };
        if let Some(node) = find_meta_mut(head, &key) {
            set_attr(node, "content", content);
        }
    }
}

fn find_meta_mut<'a>(node: &'a mut Node, key: &MetaKey) -> Option<&'a mut Node> {
    if key.matches(node) {
        return Some(node);
    }
    node.children_mut()?
        .iter_mut()
        .find_map(|c| find_meta_mut(c, key))
}
