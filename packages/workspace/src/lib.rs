//! The application state holder.
//!
//! `VisualEditor` owns the single authoritative Project plus the editing
//! session around it; every consumer goes through its entry points.

pub mod editor;

pub use editor::VisualEditor;
