use serde::{Deserialize, Serialize};

/// A parsed HTML document: an ordered list of top-level nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    /// Raw content between `<!` and `>`, e.g. `DOCTYPE html`
    Doctype(String),
}

/// An element node. Attribute order is preserved for round-tripping;
/// boolean attributes carry `None` as their value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, Option<String>)>,
    pub children: Vec<Node>,
    pub self_closing: bool,
}

/// Elements that never have children and take no end tag
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// Attribute value; boolean attributes yield an empty string
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|(n, _)| n == name)
    }

    /// Set an attribute, replacing any existing value in place
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.attributes.iter_mut().find(|(n, _)| n == name) {
            entry.1 = Some(value.to_string());
        } else {
            self.attributes
                .push((name.to_string(), Some(value.to_string())));
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attributes.retain(|(n, _)| n != name);
    }

    pub fn has_element_children(&self) -> bool {
        self.children
            .iter()
            .any(|child| matches!(child, Node::Element(_)))
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Element children only, skipping text/comment nodes
    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
            _ => {}
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// First element matching the predicate, pre-order
    pub fn find_element<F>(&self, pred: F) -> Option<&Element>
    where
        F: Fn(&Element) -> bool,
    {
        find_in_nodes(&self.children, &pred)
    }

    pub fn find_element_mut<F>(&mut self, pred: F) -> Option<&mut Element>
    where
        F: Fn(&Element) -> bool,
    {
        find_in_nodes_mut(&mut self.children, &pred)
    }

    /// Visit every element, pre-order
    pub fn for_each_element<F>(&self, f: &mut F)
    where
        F: FnMut(&Element),
    {
        visit_nodes(&self.children, f);
    }

    pub fn for_each_element_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Element),
    {
        visit_nodes_mut(&mut self.children, f);
    }

    /// Visit every node (elements, text, comments), pre-order. The
    /// callback may replace the node in place; recursion continues into
    /// the replacement's children.
    pub fn for_each_node_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Node),
    {
        visit_all_nodes_mut(&mut self.children, f);
    }

    /// Drop every node (at any depth) failing the predicate
    pub fn retain_nodes<F>(&mut self, pred: F)
    where
        F: Fn(&Node) -> bool + Copy,
    {
        retain_in_nodes(&mut self.children, pred);
    }

    pub fn element_count(&self) -> usize {
        let mut count = 0;
        self.for_each_element(&mut |_| count += 1);
        count
    }
}

fn find_in_nodes<'a>(nodes: &'a [Node], pred: &impl Fn(&Element) -> bool) -> Option<&'a Element> {
    for node in nodes {
        if let Node::Element(el) = node {
            if pred(el) {
                return Some(el);
            }
            if let Some(found) = find_in_nodes(&el.children, pred) {
                return Some(found);
            }
        }
    }
    None
}

fn find_in_nodes_mut<'a>(
    nodes: &'a mut [Node],
    pred: &impl Fn(&Element) -> bool,
) -> Option<&'a mut Element> {
    for node in nodes {
        if let Node::Element(el) = node {
            if pred(el) {
                return Some(el);
            }
            if let Some(found) = find_in_nodes_mut(&mut el.children, pred) {
                return Some(found);
            }
        }
    }
    None
}

fn visit_nodes<F: FnMut(&Element)>(nodes: &[Node], f: &mut F) {
    for node in nodes {
        if let Node::Element(el) = node {
            f(el);
            visit_nodes(&el.children, f);
        }
    }
}

fn visit_nodes_mut<F: FnMut(&mut Element)>(nodes: &mut [Node], f: &mut F) {
    for node in nodes {
        if let Node::Element(el) = node {
            f(el);
            visit_nodes_mut(&mut el.children, f);
        }
    }
}

fn visit_all_nodes_mut<F: FnMut(&mut Node)>(nodes: &mut [Node], f: &mut F) {
    for node in nodes {
        f(node);
        if let Node::Element(el) = node {
            visit_all_nodes_mut(&mut el.children, f);
        }
    }
}

fn retain_in_nodes<F: Fn(&Node) -> bool + Copy>(nodes: &mut Vec<Node>, pred: F) {
    nodes.retain(|node| pred(node));
    for node in nodes {
        if let Node::Element(el) = node {
            retain_in_nodes(&mut el.children, pred);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        crate::parse("<div class=\"a\"><span>hi</span><p>there</p></div>")
    }

    #[test]
    fn find_element_pre_order() {
        let doc = sample();
        let first = doc.find_element(|el| el.tag == "span").unwrap();
        assert_eq!(first.text_content(), "hi");
    }

    #[test]
    fn attr_helpers() {
        let mut el = Element::new("div");
        assert!(!el.has_attr("id"));

        el.set_attr("id", "x");
        assert_eq!(el.attr("id"), Some("x"));

        el.set_attr("id", "y");
        assert_eq!(el.attr("id"), Some("y"));
        assert_eq!(el.attributes.len(), 1);

        el.remove_attr("id");
        assert!(!el.has_attr("id"));
    }

    #[test]
    fn element_count_counts_all() {
        let doc = sample();
        assert_eq!(doc.element_count(), 3);
    }

    #[test]
    fn retain_nodes_removes_at_depth() {
        let mut doc = sample();
        doc.retain_nodes(|node| !matches!(node, Node::Element(el) if el.tag == "span"));
        assert_eq!(doc.element_count(), 2);
        assert!(doc.find_element(|el| el.tag == "span").is_none());
    }
}
