//! Preview surface engine: the live rendered document, the validated
//! mutations that edit it, approximate computed styles, ElementData
//! extraction, and the pointer-driven interaction controller.
//!
//! The live document is the second mutable copy of the project's root
//! HTML. Direct mutation gives immediate visual feedback without
//! serializing the whole document per micro-edit; `reconcile_into` is the
//! single boundary writing it back into the project.

pub mod controller;
pub mod document;
pub mod extract;
pub mod geometry;
pub mod mutations;
pub mod styles;

pub use controller::{
    ControllerAction, GuideOrientation, InteractionController, PointerInput, SnapGuide, Tool,
    ViewContext, DRAG_THRESHOLD_PX, SNAP_THRESHOLD_PX,
};
pub use document::PreviewDocument;
pub use extract::extract_element_data;
pub use geometry::GeometryIndex;
pub use mutations::{Mutation, MutationError};
pub use styles::{PositionMode, StyleResolver, STYLE_ALLOW_LIST};
