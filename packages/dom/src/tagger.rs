use crate::serializer::serialize;
use crate::tree::{Document, Node};

/// Marker attribute carrying an element's stable identifier
pub const VISUAL_ID_ATTR: &str = "data-visual-id";

/// Sequential identifier issuer for elements.
///
/// One issuer is shared across every HTML file of a project, so
/// identifiers never collide across pages.
#[derive(Debug, Clone, Default)]
pub struct IdIssuer {
    count: u64,
}

impl IdIssuer {
    pub fn new() -> Self {
        Self { count: 0 }
    }

    /// Resume issuing after `count` identifiers have been handed out
    pub fn starting_at(count: u64) -> Self {
        Self { count }
    }

    pub fn next_id(&mut self) -> String {
        self.count += 1;
        format!("el-{}", self.count)
    }

    /// How many identifiers have been issued
    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Walk the tree pre-order and assign an identifier to every element that
/// does not already carry one. Existing markers are never reassigned, so
/// re-tagging a tagged document is a no-op.
pub fn tag_document(doc: &mut Document, issuer: &mut IdIssuer) {
    tag_nodes(&mut doc.children, issuer);
}

fn tag_nodes(nodes: &mut [Node], issuer: &mut IdIssuer) {
    for node in nodes {
        if let Node::Element(el) = node {
            if !el.has_attr(VISUAL_ID_ATTR) {
                let id = issuer.next_id();
                el.set_attr(VISUAL_ID_ATTR, &id);
            }
            tag_nodes(&mut el.children, issuer);
        }
    }
}

/// Parse, tag, and serialize one HTML source string
pub fn tag_html(source: &str, issuer: &mut IdIssuer) -> String {
    let mut doc = crate::parse(source);
    tag_document(&mut doc, issuer);
    serialize(&doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use std::collections::HashSet;

    #[test]
    fn tags_every_element_pre_order() {
        let mut issuer = IdIssuer::new();
        let out = tag_html("<div><span>a</span></div><p>b</p>", &mut issuer);
        assert_eq!(
            out,
            "<div data-visual-id=\"el-1\"><span data-visual-id=\"el-2\">a</span></div><p data-visual-id=\"el-3\">b</p>"
        );
        assert_eq!(issuer.count(), 3);
    }

    #[test]
    fn counter_is_shared_across_files() {
        let mut issuer = IdIssuer::new();
        let first = tag_html("<div></div>", &mut issuer);
        let second = tag_html("<div></div><span></span>", &mut issuer);

        let mut seen = HashSet::new();
        for source in [&first, &second] {
            let doc = parse(source);
            doc.for_each_element(&mut |el| {
                let id = el.attr(VISUAL_ID_ATTR).unwrap().to_string();
                assert!(seen.insert(id), "duplicate identifier across files");
            });
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn retagging_is_byte_identical() {
        let mut issuer = IdIssuer::new();
        let tagged = tag_html("<div><img src=\"a.png\"><p>hi</p></div>", &mut issuer);

        // A fresh issuer must not disturb existing markers
        let mut second = IdIssuer::new();
        let retagged = tag_html(&tagged, &mut second);
        assert_eq!(retagged, tagged);
        assert_eq!(second.count(), 0);
    }

    #[test]
    fn partial_tags_are_filled_in_without_reassignment() {
        let mut issuer = IdIssuer::starting_at(7);
        let out = tag_html(
            "<div data-visual-id=\"el-2\"><span>x</span></div>",
            &mut issuer,
        );
        assert_eq!(
            out,
            "<div data-visual-id=\"el-2\"><span data-visual-id=\"el-8\">x</span></div>"
        );
    }
}
