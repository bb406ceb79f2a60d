//! Document assembly for the preview surface, and its inverse for export.
//!
//! Assembly inlines every local stylesheet into the root document so the
//! preview never issues a network request; each inlined block carries a
//! provenance marker, which is how export knows exactly what to strip or
//! restore.

pub mod assemble;
pub mod export;

pub use assemble::{
    assemble_preview, MARKER_INJECTED, MARKER_REWRITTEN, SOURCE_PATH_ATTR, STYLE_MARKER_ATTR,
};
pub use export::{export_project, restore_html, ExportError, ExportedArchive};
