use sitecanvas_bundle::Project;
use sitecanvas_dom::{parse, serialize, Document, Element, Node};

/// Provenance marker on inlined style blocks
pub const STYLE_MARKER_ATTR: &str = "data-visual-style";
/// Marker value for a block injected for an unreferenced stylesheet
pub const MARKER_INJECTED: &str = "injected";
/// Marker value for a block that replaced an author `<link>` tag
pub const MARKER_REWRITTEN: &str = "rewritten";
/// On injected blocks: the project path of the stylesheet
pub const SOURCE_PATH_ATTR: &str = "data-visual-path";

/// Produce the self-contained preview HTML for a project.
///
/// Pure: same project in, same string out, and the project is never
/// mutated. Returns an empty string when the root file is missing.
///
/// Author `<link>` tags referencing a local stylesheet are replaced by a
/// `<style>` block that keeps the link's entire attribute list behind the
/// marker, so export can reconstruct the link verbatim. Stylesheets not
/// referenced at all are injected at the end of `<head>`. Idempotent over
/// already-assembled content: existing marker blocks are refreshed in
/// place rather than injected twice.
pub fn assemble_preview(project: &Project) -> String {
    let Some(root) = project.root_file() else {
        return String::new();
    };
    let Some(source) = root.as_text() else {
        return String::new();
    };

    let mut doc = parse(source);
    let stylesheets: Vec<(String, String, String)> = project
        .css_files()
        .filter_map(|file| {
            file.as_text().map(|content| {
                (
                    file.path.clone(),
                    file.basename().to_string(),
                    content.to_string(),
                )
            })
        })
        .collect();

    let mut handled: Vec<bool> = vec![false; stylesheets.len()];

    // Rewrite author <link> tags to inline style blocks, and refresh any
    // marker blocks left by a previous assembly pass
    doc.for_each_node_mut(&mut |node| {
        let Node::Element(el) = node else { return };
        if el.tag == "link" {
            let Some(href) = el.attr("href").map(str::to_string) else {
                return;
            };
            if let Some(index) = stylesheets
                .iter()
                .position(|(path, basename, _)| href_matches(&href, path, basename))
            {
                handled[index] = true;
                let mut attributes = vec![(
                    STYLE_MARKER_ATTR.to_string(),
                    Some(MARKER_REWRITTEN.to_string()),
                )];
                attributes.extend(el.attributes.clone());
                *node = Node::Element(Element {
                    tag: "style".to_string(),
                    attributes,
                    children: vec![Node::Text(stylesheets[index].2.clone())],
                    self_closing: false,
                });
            }
        } else if el.tag == "style" {
            match el.attr(STYLE_MARKER_ATTR) {
                Some(MARKER_INJECTED) => {
                    if let Some(path) = el.attr(SOURCE_PATH_ATTR).map(str::to_string) {
                        if let Some(index) =
                            stylesheets.iter().position(|(p, _, _)| *p == path)
                        {
                            handled[index] = true;
                            el.children = vec![Node::Text(stylesheets[index].2.clone())];
                        }
                    }
                }
                Some(MARKER_REWRITTEN) => {
                    if let Some(href) = el.attr("href").map(str::to_string) {
                        if let Some(index) = stylesheets
                            .iter()
                            .position(|(path, basename, _)| href_matches(&href, path, basename))
                        {
                            handled[index] = true;
                            el.children = vec![Node::Text(stylesheets[index].2.clone())];
                        }
                    }
                }
                _ => {}
            }
        }
    });

    // Inject everything still unreferenced at the end of <head>, or at
    // the document top when there is no head
    let pending: Vec<Element> = stylesheets
        .iter()
        .zip(&handled)
        .filter(|(_, handled)| !**handled)
        .map(|((path, _, content), _)| injected_style(path, content))
        .collect();
    if !pending.is_empty() {
        inject_into_head(&mut doc, pending);
    }

    serialize(&doc)
}

fn href_matches(href: &str, path: &str, basename: &str) -> bool {
    let href = href.trim_start_matches("./").trim_start_matches('/');
    href == path || href == basename
}

fn injected_style(path: &str, content: &str) -> Element {
    Element {
        tag: "style".to_string(),
        attributes: vec![
            (
                STYLE_MARKER_ATTR.to_string(),
                Some(MARKER_INJECTED.to_string()),
            ),
            (SOURCE_PATH_ATTR.to_string(), Some(path.to_string())),
        ],
        children: vec![Node::Text(content.to_string())],
        self_closing: false,
    }
}

fn inject_into_head(doc: &mut Document, styles: Vec<Element>) {
    if let Some(head) = doc.find_element_mut(|el| el.tag == "head") {
        head.children
            .extend(styles.into_iter().map(Node::Element));
        return;
    }
    // No head: place blocks at the top, after any doctype
    let insert_at = doc
        .children
        .iter()
        .position(|node| !matches!(node, Node::Doctype(_)))
        .unwrap_or(doc.children.len());
    for (offset, style) in styles.into_iter().enumerate() {
        doc.children
            .insert(insert_at + offset, Node::Element(style));
    }
}
