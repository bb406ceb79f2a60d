use crate::assemble::{MARKER_INJECTED, MARKER_REWRITTEN, STYLE_MARKER_ATTR};
use sitecanvas_archive::{pack_files, ArchiveError};
use sitecanvas_bundle::{FileContent, FileKind, Project};
use sitecanvas_dom::{parse, serialize, Element, Node};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to package archive: {0}")]
    Pack(#[from] ArchiveError),

    #[error("No project is loaded")]
    NoProject,
}

/// A packaged export, ready for download
#[derive(Debug, Clone)]
pub struct ExportedArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Remove the artifacts assembly put into an HTML file: injected style
/// blocks are dropped, rewritten blocks become their original `<link>`
/// tags again. The rewritten block carries the link's full attribute
/// list, so the reconstruction is exact.
pub fn restore_html(source: &str) -> String {
    let mut doc = parse(source);

    doc.retain_nodes(|node| {
        !matches!(
            node,
            Node::Element(el)
                if el.tag == "style" && el.attr(STYLE_MARKER_ATTR) == Some(MARKER_INJECTED)
        )
    });

    doc.for_each_node_mut(&mut |node| {
        let Node::Element(el) = node else { return };
        if el.tag == "style" && el.attr(STYLE_MARKER_ATTR) == Some(MARKER_REWRITTEN) {
            let attributes = el
                .attributes
                .iter()
                .filter(|(name, _)| name != STYLE_MARKER_ATTR)
                .cloned()
                .collect();
            *node = Node::Element(Element {
                tag: "link".to_string(),
                attributes,
                children: Vec::new(),
                self_closing: false,
            });
        }
    });

    serialize(&doc)
}

/// Package a project for download, restoring every HTML file to its
/// pre-preview form. A pure read: the project is untouched, so a failed
/// export is always safe to retry.
pub fn export_project(project: &Project) -> Result<ExportedArchive, ExportError> {
    let files: Vec<_> = project
        .files
        .iter()
        .map(|file| {
            if file.kind == FileKind::Html {
                if let Some(text) = file.as_text() {
                    let mut restored = file.clone();
                    let content = restore_html(text);
                    restored.size = Some(content.len() as u64);
                    restored.content = FileContent::Text(content);
                    return restored;
                }
            }
            file.clone()
        })
        .collect();

    let bytes = pack_files(&files)?;
    Ok(ExportedArchive {
        file_name: format!("{}-exported.zip", project.name),
        bytes,
    })
}
