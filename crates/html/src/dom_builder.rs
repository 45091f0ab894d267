use crate::dom_utils::assign_node_ids;
use crate::types::{Attributes, Id, Node, Token};

/// Elements that an opening `<p>`-closing block element implicitly ends.
fn closes_paragraph(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "div"
            | "dl"
            | "footer"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "ul"
    )
}

struct OpenElement {
    name: String,
    attributes: Attributes,
    children: Vec<Node>,
}

impl OpenElement {
    fn finish(self) -> Node {
        Node::Element {
            id: Id(0),
            name: self.name,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

struct TreeBuilder {
    doctype: Option<String>,
    top_level: Vec<Node>,
    open: Vec<OpenElement>,
}

impl TreeBuilder {
    fn append(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.top_level.push(node),
        }
    }

    fn current_is(&self, name: &str) -> bool {
        self.open.last().is_some_and(|el| el.name == name)
    }

    /// Pop the innermost open element and attach it to its parent.
    fn close_current(&mut self) {
        if let Some(el) = self.open.pop() {
            let node = el.finish();
            self.append(node);
        }
    }

    fn close_until(&mut self, name: &str) {
        if !self.open.iter().any(|el| el.name == name) {
            log::trace!(target: "html.tree_builder", "ignoring stray </{name}>");
            return;
        }
        while let Some(el) = self.open.last() {
            let done = el.name == name;
            self.close_current();
            if done {
                break;
            }
        }
    }

    fn start_element(&mut self, name: String, attributes: Attributes, self_closing: bool) {
        if self.current_is("p") && closes_paragraph(&name) {
            self.close_current();
        }
        if (name == "li" && self.current_is("li")) || (name == "option" && self.current_is("option"))
        {
            self.close_current();
        }

        let el = OpenElement {
            name,
            attributes,
            children: Vec::new(),
        };
        if self_closing {
            self.append(el.finish());
        } else {
            self.open.push(el);
        }
    }

    fn finish(mut self) -> Node {
        while !self.open.is_empty() {
            self.close_current();
        }
        Node::Document {
            id: Id(0),
            doctype: self.doctype,
            children: self.top_level,
        }
    }
}

/// Build an owned DOM tree from a token stream and number its nodes from 1.
///
/// Mismatched end tags close every element opened after the matching one;
/// end tags with no matching open element are dropped.
pub fn build_dom(tokens: Vec<Token>) -> Node {
    let mut builder = TreeBuilder {
        doctype: None,
        top_level: Vec::new(),
        open: Vec::new(),
    };

    for token in tokens {
        match token {
            Token::Doctype(name) => builder.doctype = Some(name),
            Token::Comment(text) => builder.append(Node::Comment { id: Id(0), text }),
            Token::Text(text) => {
                // Whitespace between top-level nodes carries no content.
                if builder.open.is_empty() && text.trim().is_empty() {
                    continue;
                }
                builder.append(Node::Text { id: Id(0), text });
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => builder.start_element(name, attributes, self_closing),
            Token::EndTag(name) => builder.close_until(&name),
        }
    }

    let mut dom = builder.finish();
    let mut next = 1;
    assign_node_ids(&mut dom, &mut next);
    dom
}
