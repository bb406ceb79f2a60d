use crate::tree::{is_void_element, Document, Element, Node};

/// Serialize a tree back to markup.
///
/// Output is canonical: attributes double-quoted in stored order, text
/// verbatim, void elements without end tags. Serializing, re-parsing, and
/// serializing again yields identical bytes, which is what the identifier
/// idempotence and export round-trip guarantees rest on.
pub fn serialize(doc: &Document) -> String {
    let mut serializer = Serializer::new();
    for node in &doc.children {
        serializer.write_node(node);
    }
    serializer.output
}

struct Serializer {
    output: String,
}

impl Serializer {
    fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    fn write_node(&mut self, node: &Node) {
        match node {
            Node::Text(text) => self.output.push_str(text),
            Node::Comment(text) => {
                self.output.push_str("<!--");
                self.output.push_str(text);
                self.output.push_str("-->");
            }
            Node::Doctype(text) => {
                self.output.push_str("<!");
                self.output.push_str(text);
                self.output.push('>');
            }
            Node::Element(element) => self.write_element(element),
        }
    }

    fn write_element(&mut self, element: &Element) {
        self.output.push('<');
        self.output.push_str(&element.tag);
        for (name, value) in &element.attributes {
            self.output.push(' ');
            self.output.push_str(name);
            if let Some(value) = value {
                self.output.push_str("=\"");
                if value.contains('"') {
                    self.output.push_str(&value.replace('"', "&quot;"));
                } else {
                    self.output.push_str(value);
                }
                self.output.push('"');
            }
        }

        if element.self_closing && element.children.is_empty() {
            self.output.push_str("/>");
            return;
        }
        self.output.push('>');
        if is_void_element(&element.tag) {
            return;
        }
        for child in &element.children {
            self.write_node(child);
        }
        self.output.push_str("</");
        self.output.push_str(&element.tag);
        self.output.push('>');
    }
}
