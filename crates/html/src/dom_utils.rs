use crate::{Id, Node};

/// Renumber every node in `root` in document order, starting at `*next`.
///
/// Callers that splice subtrees into a live document pass their own counter so
/// ids stay unique across swaps.
pub fn assign_node_ids(root: &mut Node, next: &mut u32) {
    root.set_id(Id(*next));
    *next = next.wrapping_add(1).max(1);
    if let Some(children) = root.children_mut() {
        for c in children {
            assign_node_ids(c, next);
        }
    }
}

pub fn max_node_id(root: &Node) -> u32 {
    root.children()
        .iter()
        .map(max_node_id)
        .fold(root.id().0, u32::max)
}

pub fn find_node_by_id(node: &Node, id: Id) -> Option<&Node> {
    if node.id() == id {
        return Some(node);
    }
    node.children().iter().find_map(|c| find_node_by_id(c, id))
}

pub fn find_node_by_id_mut(node: &mut Node, id: Id) -> Option<&mut Node> {
    if node.id() == id {
        return Some(node);
    }
    node.children_mut()?
        .iter_mut()
        .find_map(|c| find_node_by_id_mut(c, id))
}

/// Nodes from `root` down to the node with `id`, inclusive.
pub fn path_to(root: &Node, id: Id) -> Option<Vec<&Node>> {
    fn walk<'a>(node: &'a Node, id: Id, path: &mut Vec<&'a Node>) -> bool {
        path.push(node);
        if node.id() == id {
            return true;
        }
        for c in node.children() {
            if walk(c, id, path) {
                return true;
            }
        }
        path.pop();
        false
    }

    let mut path = Vec::new();
    walk(root, id, &mut path).then_some(path)
}

/// Nearest inclusive ancestor of `id` that is an element named `tag` and
/// satisfies `pred`, like `Element.closest`.
pub fn closest<'a>(
    root: &'a Node,
    id: Id,
    tag: &str,
    pred: impl Fn(&Node) -> bool,
) -> Option<&'a Node> {
    path_to(root, id)?
        .into_iter()
        .rev()
        .find(|n| n.is_element(tag) && pred(n))
}

/// First element named `tag` in document order.
pub fn find_element<'a>(root: &'a Node, tag: &str) -> Option<&'a Node> {
    if root.is_element(tag) {
        return Some(root);
    }
    root.children().iter().find_map(|c| find_element(c, tag))
}

pub fn find_element_mut<'a>(root: &'a mut Node, tag: &str) -> Option<&'a mut Node> {
    if root.is_element(tag) {
        return Some(root);
    }
    root.children_mut()?
        .iter_mut()
        .find_map(|c| find_element_mut(c, tag))
}

pub fn set_attr(node: &mut Node, key: &str, value: &str) {
    if let Node::Element { attributes, .. } = node {
        match attributes.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some((_, v)) => *v = Some(value.to_string()),
            None => attributes.push((key.to_ascii_lowercase(), Some(value.to_string()))),
        }
    }
}

/// Whitespace-separated tokens of the `class` attribute.
pub fn class_list(node: &Node) -> Vec<&str> {
    node.attr("class")
        .map(|c| c.split_ascii_whitespace().collect())
        .unwrap_or_default()
}

pub fn has_class(node: &Node, class: &str) -> bool {
    class_list(node).contains(&class)
}

/// Concatenated descendant text, like `textContent`.
pub fn text_content(node: &Node) -> String {
    fn walk(node: &Node, out: &mut String) {
        match node {
            Node::Text { text, .. } => out.push_str(text),
            Node::Comment { .. } => {}
            _ => {
                for c in node.children() {
                    walk(c, out);
                }
            }
        }
    }
    let mut out = String::new();
    walk(node, &mut out);
    out
}

pub fn outline_from_dom(root: &Node, cap: usize) -> Vec<String> {
    fn clip(s: &str) -> String {
        let t = s.replace('\n', " ");
        let t = t.trim();
        match t.char_indices().nth(40) {
            Some((cut, _)) => format!("{}…", &t[..cut]),
            None => t.to_string(),
        }
    }

    fn walk(node: &Node, depth: usize, out: &mut Vec<String>, left: &mut usize) {
        if *left == 0 {
            return;
        }
        *left -= 1;
        let indent = "  ".repeat(depth);
        match node {
            Node::Document { doctype, .. } => match doctype {
                Some(dt) => out.push(format!("{indent}<!DOCTYPE {dt}>")),
                None => out.push(format!("{indent}#document")),
            },
            Node::Element { name, .. } => {
                let mut line = format!("{indent}<{name}");
                if let Some(id) = node.attr("id").filter(|v| !v.is_empty()) {
                    line.push_str(&format!(r#" id="{id}""#));
                }
                if let Some(class) = node.attr("class").filter(|v| !v.is_empty()) {
                    line.push_str(&format!(r#" class="{class}""#));
                }
                line.push('>');
                out.push(line);
            }
            Node::Text { text, .. } => {
                let show = clip(text);
                if !show.is_empty() {
                    out.push(format!("{indent}\"{show}\""));
                }
            }
            Node::Comment { text, .. } => out.push(format!("{indent}<!-- {} -->", clip(text))),
        }
        for c in node.children() {
            walk(c, depth + 1, out, left);
        }
    }

    let mut out = Vec::new();
    let mut left = cap;
    walk(root, 0, &mut out, &mut left);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_html;

    #[test]
    fn closest_walks_up_to_anchor() {
        let dom = parse_html(r#"<p><a href="/x"><span><b>hi</b></span></a></p>"#);
        let b = find_element(&dom, "b").unwrap();
        let anchor = closest(&dom, b.id(), "a", |n| n.has_attr("href")).unwrap();
        assert_eq!(anchor.attr("href"), Some("/x"));
        assert!(closest(&dom, b.id(), "nav", |_| true).is_none());
    }

    #[test]
    fn set_attr_replaces_or_appends() {
        let mut dom = parse_html(r#"<body class="a"></body>"#);
        let body = find_element_mut(&mut dom, "body").unwrap();
        set_attr(body, "CLASS", "b c");
        set_attr(body, "data-x", "1");
        assert_eq!(class_list(body), vec!["b", "c"]);
        assert_eq!(body.attr("data-x"), Some("1"));
    }

    #[test]
    fn renumbering_continues_from_counter() {
        let mut dom = parse_html("<div><span>x</span></div>");
        let mut next = 100;
        assign_node_ids(&mut dom, &mut next);
        assert_eq!(dom.id(), Id(100));
        assert_eq!(max_node_id(&dom), next - 1);
    }

    #[test]
    fn text_content_skips_comments() {
        let dom = parse_html("<h2>Intro <!-- x --><em>now</em></h2>");
        assert_eq!(text_content(&dom), "Intro now");
    }
}
