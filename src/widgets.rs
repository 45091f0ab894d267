//! Headless versions of the site widgets, registered with the engine.
//!
//! Each widget finds its anchor by selector and is a no-op when the anchor is
//! absent from the current page.

use html::dom_utils::{class_list, set_attr, text_content};
use html::{Id, Node, Selector};
use navigation::{
    Bindings, NavigationEngine, Page, Platform, Stage, Theme, WidgetError, WidgetHooks,
};
use rand::Rng;
use rand::seq::SliceRandom;
use std::cell::RefCell;
use std::rc::Rc;

pub const AVATARS: &[&str] = &["/img/an.png"];
pub const AVATAR_KEY: &str = "avatarIndex";

pub fn register_all<P: Platform>(engine: &mut NavigationEngine<P>) {
    let theme_key = engine.config().theme_key.clone();

    let mut toggle_bindings = Bindings::new();
    engine.register_widget(
        "theme-toggle",
        Stage::ThemeToggle,
        WidgetHooks::refresh(move |page| bind_theme_toggle(page, &mut toggle_bindings)),
    );

    engine.register_widget(
        "highlight-theme",
        Stage::ThemeTransition,
        WidgetHooks::refresh(move |page| {
            let theme = page.theme(&theme_key);
            sync_highlight_sheet(page, theme)
        }),
    );

    engine.register_widget("friends", Stage::Content, WidgetHooks::refresh(shuffle_friends));
    engine.register_widget("toc", Stage::Content, WidgetHooks::refresh(group_toc));

    let bindings = Rc::new(RefCell::new(Bindings::new()));
    let cleanup_bindings = Rc::clone(&bindings);
    engine.register_widget(
        "avatar",
        Stage::Background,
        WidgetHooks::lifecycle(
            move |page| init_avatar(page, &mut bindings.borrow_mut()),
            move |page| cleanup_avatar(page, &mut cleanup_bindings.borrow_mut()),
        ),
    );
}

fn selector(source: &str) -> Result<Selector, WidgetError> {
    Selector::parse(source).map_err(|e| WidgetError::failed(e.to_string()))
}

fn element(name: &str, attributes: &[(&str, &str)], children: Vec<Node>) -> Node {
    Node::Element {
        id: Id::default(),
        name: name.to_string(),
        attributes: attributes
            .iter()
            .map(|(k, v)| (k.to_string(), Some(v.to_string())))
            .collect(),
        children,
    }
}

fn text(value: &str) -> Node {
    Node::Text {
        id: Id::default(),
        text: value.to_string(),
    }
}

// -- Theme ---
fn bind_theme_toggle(page: &mut Page, bindings: &mut Bindings) -> Result<(), WidgetError> {
    bindings.retain_live(&page.dom);
    let Some(toggle) = page.select(&selector("#theme-toggle")?) else {
        return Ok(());
    };
    if bindings.bind(toggle.id(), "click") {
        log::debug!(target: "softnav.widgets", "theme toggle bound to node {}", toggle.id().0);
    }
    Ok(())
}

pub fn sync_highlight_sheet(page: &mut Page, theme: Theme) -> Result<(), WidgetError> {
    if let Some(link) = page.select_mut(&selector("link#hl")?) {
        set_attr(link, "href", &format!("/hl-{theme}.css"));
    }
    Ok(())
}

/// What a click on `#theme-toggle` does: flip the session preference and
/// everything derived from it.
pub fn toggle_theme(page: &mut Page, theme_key: &str) -> Result<Theme, WidgetError> {
    let theme = page.theme(theme_key).toggled();
    page.session.set(theme_key, theme.token());

    let mut classes: Vec<String> = page
        .body_classes()
        .into_iter()
        .filter(|c| !Theme::is_token(c))
        .collect();
    classes.push(theme.token().to_string());
    page.set_body_classes(&classes);

    sync_highlight_sheet(page, theme)?;
    Ok(theme)
}

// -- Content ---
fn shuffle_friends(page: &mut Page) -> Result<(), WidgetError> {
    let wrapper_sel = selector("#friends-container .collection-wrapper")?;
    let Some(children) = page.select_mut(&wrapper_sel).and_then(Node::children_mut) else {
        return Ok(());
    };
    children.retain(|c| c.element_name().is_some());
    children.shuffle(&mut rand::rng());
    for (i, item) in children.iter_mut().enumerate() {
        set_attr(item, "style", &format!("animation-delay: {:.2}s", i as f64 * 0.05));
    }
    log::debug!(target: "softnav.widgets", "shuffled {} friend links", children.len());
    Ok(())
}

struct TocEntry {
    href: String,
    text: String,
}

struct TocGroup {
    h2: TocEntry,
    h3: Vec<TocEntry>,
}

/// Group flat h2/h3 TOC links into collapsible sections.
fn group_toc(page: &mut Page) -> Result<(), WidgetError> {
    let toc_sel = selector("aside nav ul")?;
    let Some(ul) = page.select(&toc_sel) else {
        return Ok(());
    };
    // Already grouped.
    if !ul.children().iter().any(|c| c.is_element("li")) {
        return Ok(());
    }

    let link_sel = selector("a")?;
    let mut groups: Vec<TocGroup> = Vec::new();
    for li in ul.children().iter().filter(|c| c.is_element("li")) {
        let Some(link) = link_sel.select_first(li) else {
            continue;
        };
        let href = link.attr("href").unwrap_or_default();
        let Some(anchor) = href.strip_prefix('#').filter(|id| !id.is_empty()) else {
            continue;
        };
        if selector(&format!("#{anchor}")).map_or(true, |s| page.select(&s).is_none()) {
            continue;
        }
        let entry = TocEntry {
            href: href.to_string(),
            text: text_content(link).trim().to_string(),
        };
        let classes = class_list(link);
        if classes.contains(&"h2") {
            groups.push(TocGroup { h2: entry, h3: Vec::new() });
        } else if classes.contains(&"h3") {
            if let Some(group) = groups.last_mut() {
                group.h3.push(entry);
            }
        }
    }

    let rebuilt: Vec<Node> = groups.iter().enumerate().map(|(i, g)| toc_group_node(i, g)).collect();
    page.replace_children(&toc_sel, rebuilt);
    Ok(())
}

fn toc_group_node(index: usize, group: &TocGroup) -> Node {
    let index = index.to_string();
    let mut h2_link = Vec::new();
    if !group.h3.is_empty() {
        h2_link.push(element("span", &[("class", "toc-collapse-icon")], vec![text("▶")]));
    }
    h2_link.push(element("span", &[("class", "toc-level-dot")], Vec::new()));
    h2_link.push(element("span", &[("class", "toc-text")], vec![text(&group.h2.text)]));

    let mut item = vec![element("a", &[("href", group.h2.href.as_str())], h2_link)];
    if !group.h3.is_empty() {
        let h3_items = group
            .h3
            .iter()
            .enumerate()
            .map(|(j, h3)| {
                let j = j.to_string();
                let link = element(
                    "a",
                    &[("href", h3.href.as_str())],
                    vec![
                        element("span", &[("class", "toc-level-dot")], Vec::new()),
                        element("span", &[("class", "toc-text")], vec![text(&h3.text)]),
                    ],
                );
                element(
                    "div",
                    &[
                        ("class", "toc-h3-item"),
                        ("data-group-index", index.as_str()),
                        ("data-h3-index", j.as_str()),
                    ],
                    vec![link],
                )
            })
            .collect();
        item.push(element("div", &[("class", "toc-h3-container")], h3_items));
    }

    element(
        "div",
        &[("class", "toc-h2-group")],
        vec![element(
            "div",
            &[("class", "toc-h2-item"), ("data-group-index", index.as_str())],
            item,
        )],
    )
}

// -- Background ---
fn init_avatar(page: &mut Page, bindings: &mut Bindings) -> Result<(), WidgetError> {
    let img_sel = selector("#info img")?;
    if page.select(&img_sel).is_none() {
        return Ok(());
    }

    let saved = page
        .session
        .get(AVATAR_KEY)
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|i| *i < AVATARS.len());
    let index = match saved {
        Some(i) => i,
        None => {
            let i = rand::rng().random_range(0..AVATARS.len());
            page.session.set(AVATAR_KEY, i.to_string());
            i
        }
    };

    let Some(img) = page.select_mut(&img_sel) else {
        return Ok(());
    };
    set_attr(img, "src", AVATARS[index]);
    bindings.bind(img.id(), "click");
    Ok(())
}

fn cleanup_avatar(page: &mut Page, bindings: &mut Bindings) -> Result<(), WidgetError> {
    let img_sel = selector("#info img")?;
    if let Some(img) = page.select(&img_sel) {
        bindings.unbind(img.id(), "click");
    }
    // The old image may already be gone from the page.
    bindings.retain_live(&page.dom);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::dom_utils::find_element;

    const PAGE: &str = r##"<html><head><title>t</title><link id="hl" rel="stylesheet" href="/hl-dark.css"></head>
        <body class="post dark">
          <header id="info"><img src="/old.png"><button id="theme-toggle">t</button></header>
          <aside><nav><ul>
            <li><a class="h2" href="#one">One</a></li>
            <li><a class="h3" href="#one-a">One A</a></li>
            <li><a class="h3" href="#missing">Gone</a></li>
            <li><a class="h2" href="#two">Two</a></li>
          </ul></nav></aside>
          <main>
            <h2 id="one">One</h2><h3 id="one-a">One A</h3><h2 id="two">Two</h2>
            <div id="friends-container"><div class="collection-wrapper">
              <div class="collection-box-wrapper" id="f1"></div>
              <div class="collection-box-wrapper" id="f2"></div>
              <div class="collection-box-wrapper" id="f3"></div>
            </div></div>
          </main>
        </body></html>"##;

    fn page() -> Page {
        Page::parse("https://site/", PAGE)
    }

    #[test]
    fn toggle_flips_session_body_and_highlight_sheet() {
        let mut page = page();
        assert_eq!(toggle_theme(&mut page, "theme").unwrap(), Theme::Light);
        assert_eq!(page.session.get("theme"), Some("light"));
        assert_eq!(page.body_classes(), ["post", "light"]);
        let hl = page.select(&Selector::parse("link#hl").unwrap()).unwrap();
        assert_eq!(hl.attr("href"), Some("/hl-light.css"));

        assert_eq!(toggle_theme(&mut page, "theme").unwrap(), Theme::Dark);
        assert_eq!(page.body_classes(), ["post", "dark"]);
    }

    #[test]
    fn theme_toggle_binds_once() {
        let mut page = page();
        let mut bindings = Bindings::new();
        bind_theme_toggle(&mut page, &mut bindings).unwrap();
        bind_theme_toggle(&mut page, &mut bindings).unwrap();
        assert_eq!(bindings.len(), 1);

        let button = find_element(&page.dom, "button").unwrap().id();
        assert!(bindings.is_bound(button, "click"));
    }

    #[test]
    fn friends_are_shuffled_not_lost() {
        let mut page = page();
        shuffle_friends(&mut page).unwrap();
        let wrapper = page
            .select(&Selector::parse(".collection-wrapper").unwrap())
            .unwrap();
        let mut ids: Vec<_> = wrapper.children().iter().filter_map(|c| c.attr("id")).collect();
        assert_eq!(wrapper.children().len(), 3);
        assert!(wrapper.children()[0].attr("style").is_some());
        ids.sort_unstable();
        assert_eq!(ids, ["f1", "f2", "f3"]);
    }

    #[test]
    fn toc_groups_h3_under_h2_and_is_idempotent() {
        let mut page = page();
        group_toc(&mut page).unwrap();
        let once = page.dom.clone();
        group_toc(&mut page).unwrap();
        assert_eq!(page.dom, once);

        let groups = page.select_all(&Selector::parse(".toc-h2-group").unwrap());
        assert_eq!(groups.len(), 2);
        let h3 = page.select_all(&Selector::parse(".toc-h3-item").unwrap());
        // The link to a missing heading is dropped.
        assert_eq!(h3.len(), 1);
        assert_eq!(h3[0].attr("data-group-index"), Some("0"));
        let icons = page.select_all(&Selector::parse(".toc-collapse-icon").unwrap());
        assert_eq!(icons.len(), 1);
    }

    #[test]
    fn avatar_restores_index_and_rebinds() {
        let mut page = page();
        let mut bindings = Bindings::new();
        init_avatar(&mut page, &mut bindings).unwrap();
        assert_eq!(page.session.get(AVATAR_KEY), Some("0"));
        let img = find_element(&page.dom, "img").unwrap();
        assert_eq!(img.attr("src"), Some(AVATARS[0]));
        let img_id = img.id();
        assert!(bindings.is_bound(img_id, "click"));

        cleanup_avatar(&mut page, &mut bindings).unwrap();
        assert!(!bindings.is_bound(img_id, "click"));
        init_avatar(&mut page, &mut bindings).unwrap();
        assert!(bindings.is_bound(img_id, "click"));
    }

    #[test]
    fn widgets_without_anchors_are_no_ops() {
        let mut page = Page::parse("https://site/", "<main><p>bare</p></main>");
        let before = page.dom.clone();
        let mut bindings = Bindings::new();
        bind_theme_toggle(&mut page, &mut bindings).unwrap();
        shuffle_friends(&mut page).unwrap();
        group_toc(&mut page).unwrap();
        init_avatar(&mut page, &mut bindings).unwrap();
        assert_eq!(page.dom, before);
        assert!(bindings.is_empty());
    }
}
