use crate::geometry::GeometryIndex;
use crate::styles::StyleResolver;
use sitecanvas_bundle::{ElementData, Rect};
use sitecanvas_dom::{Document, Element, Node, VISUAL_ID_ATTR};
use std::collections::BTreeMap;

/// Derive an ElementData snapshot for the element carrying `id`.
///
/// Snapshots are point-in-time: callers re-extract after any mutation
/// that should show up in the properties panel.
pub fn extract_element_data(
    doc: &Document,
    resolver: &StyleResolver,
    geometry: &GeometryIndex,
    id: &str,
) -> Option<ElementData> {
    let (element, parent_id, sibling_index) = locate(&doc.children, None, id)?;
    Some(build(element, parent_id, sibling_index, resolver, geometry))
}

/// Find the element plus its parent identifier and index among the
/// parent's element children
fn locate<'doc>(
    nodes: &'doc [Node],
    parent_id: Option<&str>,
    id: &str,
) -> Option<(&'doc Element, Option<String>, usize)> {
    let mut sibling_index = 0;
    for node in nodes {
        if let Node::Element(el) = node {
            if el.attr(VISUAL_ID_ATTR) == Some(id) {
                return Some((el, parent_id.map(str::to_string), sibling_index));
            }
            if let Some(found) = locate(&el.children, el.attr(VISUAL_ID_ATTR), id) {
                return Some(found);
            }
            sibling_index += 1;
        }
    }
    None
}

fn build(
    element: &Element,
    parent_id: Option<String>,
    sibling_index: usize,
    resolver: &StyleResolver,
    geometry: &GeometryIndex,
) -> ElementData {
    let id = element.attr(VISUAL_ID_ATTR).unwrap_or("").to_string();

    let mut attributes = BTreeMap::new();
    for (name, value) in &element.attributes {
        if name != "style" {
            attributes.insert(name.clone(), value.clone().unwrap_or_default());
        }
    }

    let text = if element.has_element_children() {
        None
    } else {
        Some(element.text_content())
    };

    let children = element
        .element_children()
        .enumerate()
        .map(|(index, child)| build(child, Some(id.clone()), index, resolver, geometry))
        .collect();

    ElementData {
        bounds: geometry.get(&id).unwrap_or(Rect::default()),
        tag_name: element.tag.clone(),
        classes: element.attr("class").unwrap_or("").to_string(),
        styles: resolver.resolve(element),
        attributes,
        text,
        children,
        parent_id,
        sibling_index,
        id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitecanvas_dom::parse;

    fn setup() -> (Document, StyleResolver, GeometryIndex) {
        let doc = parse(
            "<div data-visual-id=\"el-1\" class=\"hero card\" title=\"box\">\
             <span data-visual-id=\"el-2\">first</span>\
             <span data-visual-id=\"el-3\" style=\"color: blue\">second</span>\
             </div>",
        );
        let mut resolver = StyleResolver::new();
        resolver.add_stylesheet(".hero { background-color: #eee }");
        let mut geometry = GeometryIndex::new();
        geometry.set("el-1", Rect::new(0.0, 0.0, 200.0, 100.0));
        geometry.set("el-3", Rect::new(10.0, 40.0, 80.0, 20.0));
        (doc, resolver, geometry)
    }

    #[test]
    fn snapshot_captures_identity_and_geometry() {
        let (doc, resolver, geometry) = setup();
        let data = extract_element_data(&doc, &resolver, &geometry, "el-1").unwrap();

        assert_eq!(data.tag_name, "div");
        assert_eq!(data.classes, "hero card");
        assert_eq!(data.bounds.width, 200.0);
        assert_eq!(data.parent_id, None);
        assert_eq!(data.sibling_index, 0);
        assert_eq!(data.attributes.get("title").map(String::as_str), Some("box"));
        assert!(!data.attributes.contains_key("style"));
        assert_eq!(
            data.style("background-color"),
            Some("#eee")
        );
    }

    #[test]
    fn text_only_for_leaf_elements() {
        let (doc, resolver, geometry) = setup();
        let parent = extract_element_data(&doc, &resolver, &geometry, "el-1").unwrap();
        assert_eq!(parent.text, None);

        let leaf = extract_element_data(&doc, &resolver, &geometry, "el-2").unwrap();
        assert_eq!(leaf.text.as_deref(), Some("first"));
    }

    #[test]
    fn children_carry_parent_and_sibling_index() {
        let (doc, resolver, geometry) = setup();
        let data = extract_element_data(&doc, &resolver, &geometry, "el-1").unwrap();
        assert_eq!(data.children.len(), 2);
        assert_eq!(data.children[1].id, "el-3");
        assert_eq!(data.children[1].parent_id.as_deref(), Some("el-1"));
        assert_eq!(data.children[1].sibling_index, 1);

        // Extraction of the nested element directly agrees
        let nested = extract_element_data(&doc, &resolver, &geometry, "el-3").unwrap();
        assert_eq!(nested.parent_id.as_deref(), Some("el-1"));
        assert_eq!(nested.sibling_index, 1);
        assert_eq!(nested.style("color"), Some("blue"));
    }

    #[test]
    fn unknown_geometry_defaults_to_zero_bounds() {
        let (doc, resolver, geometry) = setup();
        let data = extract_element_data(&doc, &resolver, &geometry, "el-2").unwrap();
        assert_eq!(data.bounds, Rect::default());
    }

    #[test]
    fn missing_element_yields_none() {
        let (doc, resolver, geometry) = setup();
        assert!(extract_element_data(&doc, &resolver, &geometry, "el-99").is_none());
    }
}
