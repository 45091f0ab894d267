//! Simple CSS selectors: compound `tag#id.class` parts joined by the
//! descendant combinator (whitespace). That is all the navigation layer and
//! widgets need to find containers such as `main`, `#friends-container` or
//! `aside nav ul`.
use std::fmt;
use std::str::FromStr;

use crate::dom_utils::{find_node_by_id_mut, has_class};
use crate::{Id, Node};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unsupported character {ch:?} in selector {selector:?}")]
    Unsupported { selector: String, ch: char },
    #[error("dangling `{prefix}` in selector {selector:?}")]
    Dangling { selector: String, prefix: char },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        let Some(name) = node.element_name() else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if !name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| has_class(node, c))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    parts: Vec<Compound>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let parts = source
            .split_ascii_whitespace()
            .map(|part| parse_compound(source, part))
            .collect::<Result<Vec<_>, _>>()?;
        if parts.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self {
            source: source.trim().to_string(),
            parts,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// First match in document order.
    pub fn select_first<'a>(&self, root: &'a Node) -> Option<&'a Node> {
        let mut found = None;
        self.walk(root, &mut Vec::new(), &mut |node| {
            found = Some(node);
            false
        });
        found
    }

    pub fn select_all<'a>(&self, root: &'a Node) -> Vec<&'a Node> {
        let mut found = Vec::new();
        self.walk(root, &mut Vec::new(), &mut |node| {
            found.push(node);
            true
        });
        found
    }

    pub fn select_first_mut<'a>(&self, root: &'a mut Node) -> Option<&'a mut Node> {
        let id: Id = self.select_first(root)?.id();
        find_node_by_id_mut(root, id)
    }

    /// Depth-first walk; `visit` returns `false` to stop.
    fn walk<'a>(
        &self,
        node: &'a Node,
        ancestors: &mut Vec<&'a Node>,
        visit: &mut dyn FnMut(&'a Node) -> bool,
    ) -> bool {
        if self.matches_with_ancestors(node, ancestors) && !visit(node) {
            return false;
        }
        ancestors.push(node);
        for c in node.children() {
            if !self.walk(c, ancestors, visit) {
                ancestors.pop();
                return false;
            }
        }
        ancestors.pop();
        true
    }

    fn matches_with_ancestors(&self, node: &Node, ancestors: &[&Node]) -> bool {
        let Some((last, rest)) = self.parts.split_last() else {
            return false;
        };
        if !last.matches(node) {
            return false;
        }
        // Greedy right-to-left match of the remaining parts against ancestors.
        let mut remaining = rest.iter().rev().peekable();
        for ancestor in ancestors.iter().rev() {
            match remaining.peek() {
                Some(part) if part.matches(ancestor) => {
                    remaining.next();
                }
                Some(_) => {}
                None => break,
            }
        }
        remaining.peek().is_none()
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_compound(selector: &str, part: &str) -> Result<Compound, SelectorError> {
    let mut compound = Compound::default();
    let mut prefix: Option<char> = None;
    let mut current = String::new();

    for ch in part.chars() {
        match ch {
            '#' | '.' => {
                flush_simple(selector, prefix, &mut current, &mut compound)?;
                prefix = Some(ch);
            }
            '*' if current.is_empty() && prefix.is_none() => current.push(ch),
            c if c.is_alphanumeric() || c == '-' || c == '_' => current.push(c),
            other => {
                return Err(SelectorError::Unsupported {
                    selector: selector.to_string(),
                    ch: other,
                });
            }
        }
    }
    flush_simple(selector, prefix, &mut current, &mut compound)?;
    Ok(compound)
}

fn flush_simple(
    selector: &str,
    prefix: Option<char>,
    value: &mut String,
    compound: &mut Compound,
) -> Result<(), SelectorError> {
    if value.is_empty() {
        return match prefix {
            Some(p) => Err(SelectorError::Dangling {
                selector: selector.to_string(),
                prefix: p,
            }),
            None => Ok(()),
        };
    }
    let value = std::mem::take(value);
    match prefix {
        None if value == "*" => {}
        None => compound.tag = Some(value.to_ascii_lowercase()),
        Some('#') => compound.id = Some(value),
        Some(_) => compound.classes.push(value),
    }
    Ok(())
}
