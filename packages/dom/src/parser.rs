use crate::tokenizer::{tokenize, Token};
use crate::tree::{is_void_element, Document, Element, Node};

/// Parse HTML into a tree. Total and permissive: unclosed elements are
/// closed at the end of their parent, stray end tags are ignored, and a
/// fragment stays a fragment (no synthesized html/head/body).
pub fn parse(source: &str) -> Document {
    let mut builder = TreeBuilder::new();
    for token in tokenize(source) {
        builder.push_token(token);
    }
    builder.finish()
}

struct TreeBuilder {
    root: Vec<Node>,
    /// Open elements, innermost last
    stack: Vec<Element>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            root: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn push_token(&mut self, token: Token) {
        match token {
            Token::Text(text) => self.append(Node::Text(text)),
            Token::Comment(text) => self.append(Node::Comment(text)),
            Token::Doctype(text) => self.append(Node::Doctype(text)),
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let element = Element {
                    tag: name.clone(),
                    attributes,
                    children: Vec::new(),
                    self_closing,
                };
                if self_closing || is_void_element(&name) {
                    self.append(Node::Element(element));
                } else {
                    self.stack.push(element);
                }
            }
            Token::EndTag { name } => {
                // Close the nearest matching open element; ignore strays
                if let Some(index) = self.stack.iter().rposition(|el| el.tag == name) {
                    while self.stack.len() > index {
                        let Some(element) = self.stack.pop() else { break };
                        self.append(Node::Element(element));
                    }
                }
            }
        }
    }

    fn append(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn finish(mut self) -> Document {
        while let Some(element) = self.stack.pop() {
            self.append(Node::Element(element));
        }
        Document {
            children: self.root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_nested_tree() {
        let doc = parse("<div><span>a</span><span>b</span></div>");
        assert_eq!(doc.children.len(), 1);
        let div = doc.find_element(|el| el.tag == "div").unwrap();
        assert_eq!(div.element_children().count(), 2);
    }

    #[test]
    fn void_elements_do_not_nest() {
        let doc = parse("<div><br><img src=\"a.png\"><p>x</p></div>");
        let div = doc.find_element(|el| el.tag == "div").unwrap();
        let tags: Vec<_> = div.element_children().map(|el| el.tag.clone()).collect();
        assert_eq!(tags, vec!["br", "img", "p"]);
    }

    #[test]
    fn recovers_unclosed_elements() {
        let doc = parse("<div><p>one<p>two</div>");
        // Both <p> elements end up inside the div; the second nests in the
        // first because this parser does not model implied end tags.
        let div = doc.find_element(|el| el.tag == "div").unwrap();
        assert!(div.element_children().any(|el| el.tag == "p"));
        assert_eq!(doc.element_count(), 3);
    }

    #[test]
    fn ignores_stray_end_tags() {
        let doc = parse("</p><div>x</div></span>");
        assert_eq!(doc.element_count(), 1);
        assert_eq!(
            doc.find_element(|el| el.tag == "div").unwrap().text_content(),
            "x"
        );
    }

    #[test]
    fn closes_everything_at_eof() {
        let doc = parse("<div><span>dangling");
        let div = doc.find_element(|el| el.tag == "div").unwrap();
        let span = div.element_children().next().unwrap();
        assert_eq!(span.tag, "span");
        assert_eq!(span.text_content(), "dangling");
    }

    #[test]
    fn full_page_structure() {
        let doc = parse(
            "<!DOCTYPE html><html><head><title>t</title></head><body><div id=\"a\">hi</div></body></html>",
        );
        assert!(matches!(&doc.children[0], Node::Doctype(d) if d == "DOCTYPE html"));
        let title = doc.find_element(|el| el.tag == "title").unwrap();
        assert_eq!(title.text_content(), "t");
        let div = doc.find_element(|el| el.tag == "div").unwrap();
        assert_eq!(div.attr("id"), Some("a"));
    }

    #[test]
    fn style_content_stays_raw() {
        let doc = parse("<style>.a > .b { color: red; }</style>");
        let style = doc.find_element(|el| el.tag == "style").unwrap();
        assert_eq!(style.text_content(), ".a > .b { color: red; }");
    }
}
