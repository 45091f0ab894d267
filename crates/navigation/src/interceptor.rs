//! Click classification. Pure: reads the live DOM, never touches it.

use html::dom_utils::closest;
use html::{Id, Node};
use url::Url;

const EXCLUDED_SCHEMES: [&str; 3] = ["javascript:", "mailto:", "tel:"];

/// Modifier state of the click. `button` follows DOM numbering (0 = primary).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClickModifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
    pub button: u16,
}

impl ClickModifiers {
    /// A plain primary-button click with no modifier keys held.
    pub fn is_plain(&self) -> bool {
        self.button == 0 && !(self.ctrl || self.meta || self.shift || self.alt)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NoAnchor,
    ModifiedClick,
    Download,
    Target,
    External,
    EmptyHref,
    FragmentOnly,
    ExcludedScheme,
    InvalidHref,
    CrossOrigin,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NoAnchor => "no anchor",
            SkipReason::ModifiedClick => "modified click",
            SkipReason::Download => "download attribute",
            SkipReason::Target => "target attribute",
            SkipReason::External => "rel=external",
            SkipReason::EmptyHref => "empty href",
            SkipReason::FragmentOnly => "fragment-only href",
            SkipReason::ExcludedScheme => "non-navigational scheme",
            SkipReason::InvalidHref => "unparseable href",
            SkipReason::CrossOrigin => "cross-origin",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkDecision {
    /// Soft-navigate to the resolved URL.
    Intercept(Url),
    /// Leave the click to the browser.
    Skip(SkipReason),
}

/// Classify a click on `target` (any node) inside `root`.
///
/// The decision is made against the nearest inclusive ancestor `<a>` that
/// carries an `href`. Hrefs resolve against `base`; the origin check is
/// against `page_url`.
pub fn classify_click(
    root: &Node,
    target: Id,
    page_url: &Url,
    base: &Url,
    mods: ClickModifiers,
) -> LinkDecision {
    if !mods.is_plain() {
        return LinkDecision::Skip(SkipReason::ModifiedClick);
    }
    match closest(root, target, "a", |n| n.has_attr("href")) {
        Some(anchor) => classify_anchor(anchor, page_url, base),
        None => LinkDecision::Skip(SkipReason::NoAnchor),
    }
}

pub fn classify_anchor(anchor: &Node, page_url: &Url, base: &Url) -> LinkDecision {
    if anchor.has_attr("download") {
        return LinkDecision::Skip(SkipReason::Download);
    }
    if anchor.has_attr("target") {
        return LinkDecision::Skip(SkipReason::Target);
    }
    if has_rel_token(anchor, "external") {
        return LinkDecision::Skip(SkipReason::External);
    }

    let href = anchor.attr("href").unwrap_or_default().trim();
    if href.is_empty() {
        return LinkDecision::Skip(SkipReason::EmptyHref);
    }
    if href.starts_with('#') {
        return LinkDecision::Skip(SkipReason::FragmentOnly);
    }
    if has_excluded_scheme(href) {
        return LinkDecision::Skip(SkipReason::ExcludedScheme);
    }

    let Ok(resolved) = base.join(href) else {
        return LinkDecision::Skip(SkipReason::InvalidHref);
    };
    if resolved.origin() != page_url.origin() {
        return LinkDecision::Skip(SkipReason::CrossOrigin);
    }
    LinkDecision::Intercept(resolved)
}

fn has_rel_token(anchor: &Node, token: &str) -> bool {
    anchor
        .attr("rel")
        .is_some_and(|rel| rel.split_ascii_whitespace().any(|t| t.eq_ignore_ascii_case(token)))
}

fn has_excluded_scheme(href: &str) -> bool {
    EXCLUDED_SCHEMES.iter().any(|scheme| {
        href.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}
