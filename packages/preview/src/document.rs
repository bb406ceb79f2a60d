use crate::mutations::{find_element, Mutation, MutationError};
use crate::styles::parse_inline_style;
use sitecanvas_bundle::{FileContent, Project};
use sitecanvas_dom::{parse, serialize, Document, Element};

/// The live rendered document: the second mutable copy of the project's
/// root HTML (the first lives in the Project's file set).
///
/// Panel edits and drags mutate this tree directly for immediate visual
/// feedback; `reconcile_into` is the single place it is serialized back
/// into the project.
#[derive(Debug)]
pub struct PreviewDocument {
    doc: Document,
}

impl PreviewDocument {
    pub fn from_html(html: &str) -> Self {
        Self { doc: parse(html) }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn contains(&self, id: &str) -> bool {
        find_element(&self.doc, id).is_some()
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        find_element(&self.doc, id)
    }

    pub fn apply(&mut self, mutation: &Mutation) -> Result<(), MutationError> {
        mutation.apply(&mut self.doc)
    }

    /// Serialize the live tree
    pub fn html(&self) -> String {
        serialize(&self.doc)
    }

    /// Write the live document back into the project's root HTML file.
    /// This is the explicit reconciliation boundary between the two
    /// mutable copies. Returns false when the root file is missing.
    pub fn reconcile_into(&self, project: &mut Project) -> bool {
        let html = self.html();
        let root_path = project.root_html_path.clone();
        match project.file_mut(&root_path) {
            Some(file) => {
                file.size = Some(html.len() as u64);
                file.content = FileContent::Text(html);
                true
            }
            None => false,
        }
    }

    /// Current left/top offsets from the element's inline style, in CSS
    /// pixels. Missing or non-pixel values read as zero.
    pub fn inline_offsets(&self, id: &str) -> Option<(f64, f64)> {
        let element = self.element(id)?;
        let style = element.attr("style").unwrap_or("");
        let properties = parse_inline_style(style);
        let read = |name: &str| {
            properties
                .iter()
                .find(|(property, _)| property == name)
                .and_then(|(_, value)| parse_px(value))
                .unwrap_or(0.0)
        };
        Some((read("left"), read("top")))
    }

    /// Update the element's left/top inline styles in one step
    pub fn set_position(&mut self, id: &str, left: f64, top: f64) -> Result<(), MutationError> {
        self.apply(&Mutation::SetInlineStyle {
            id: id.to_string(),
            property: "left".to_string(),
            value: format_px(left),
        })?;
        self.apply(&Mutation::SetInlineStyle {
            id: id.to_string(),
            property: "top".to_string(),
            value: format_px(top),
        })
    }
}

fn parse_px(value: &str) -> Option<f64> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

fn format_px(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}px", value as i64)
    } else {
        format!("{value}px")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitecanvas_bundle::SiteFile;

    fn live() -> PreviewDocument {
        PreviewDocument::from_html(
            "<div data-visual-id=\"el-1\" style=\"position: absolute; left: 10px; top: 20px\">x</div>",
        )
    }

    #[test]
    fn reads_inline_offsets() {
        assert_eq!(live().inline_offsets("el-1"), Some((10.0, 20.0)));
    }

    #[test]
    fn missing_offsets_read_as_zero() {
        let doc = PreviewDocument::from_html("<div data-visual-id=\"el-1\">x</div>");
        assert_eq!(doc.inline_offsets("el-1"), Some((0.0, 0.0)));
        assert_eq!(doc.inline_offsets("el-9"), None);
    }

    #[test]
    fn set_position_updates_both_offsets() {
        let mut doc = live();
        doc.set_position("el-1", 50.0, 20.5).unwrap();
        assert_eq!(doc.inline_offsets("el-1"), Some((50.0, 20.5)));
        assert!(doc.html().contains("left: 50px"));
        assert!(doc.html().contains("top: 20.5px"));
    }

    #[test]
    fn reconcile_writes_root_file() {
        let mut project = Project::new(
            "site",
            vec![SiteFile::text("index.html", "<p>old</p>")],
            "index.html",
            0,
        );
        let mut doc = live();
        doc.set_position("el-1", 1.0, 2.0).unwrap();

        assert!(doc.reconcile_into(&mut project));
        let content = project.root_file().unwrap().as_text().unwrap();
        assert!(content.contains("left: 1px"));
        assert_eq!(
            project.root_file().unwrap().size,
            Some(content.len() as u64)
        );
    }

    #[test]
    fn reconcile_without_root_reports_failure() {
        let mut project = Project::new("site", vec![], "index.html", 0);
        assert!(!live().reconcile_into(&mut project));
    }
}
