use crate::styles::PositionMode;
use serde::{Deserialize, Serialize};
use sitecanvas_bundle::Rect;

/// Minimum pointer travel (screen pixels) before a gesture counts as a
/// drag rather than a click
pub const DRAG_THRESHOLD_PX: f64 = 3.0;

/// Snap distance in screen pixels; scaled by the inverse zoom before
/// comparing document-space edges
pub const SNAP_THRESHOLD_PX: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Select,
    Pan,
}

/// Read access to the state the pointer handlers depend on.
///
/// Handlers are attached once per render; reading through this accessor
/// instead of captured values means they always observe the current
/// tool, selection, and zoom.
pub trait ViewContext {
    fn tool(&self) -> Tool;
    fn selected_id(&self) -> Option<String>;
    fn scale(&self) -> f64;
    fn offset(&self) -> (f64, f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideOrientation {
    Vertical,
    Horizontal,
}

/// An active alignment line, surfaced while snapping holds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapGuide {
    pub orientation: GuideOrientation,
    /// Document-space coordinate of the line
    pub position: f64,
}

/// A pointer event forwarded from the rendered frame. The generation
/// stamp lets the controller drop events attached to a previous render.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerInput {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub generation: u64,
}

/// What the host should do in response to a pointer event
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerAction {
    /// Mark the element hovered; bounds are in screen space
    Hover { id: String, bounds: Rect },
    ClearHover,
    Select { id: String },
    /// Apply new offsets to the dragged element
    DragMove {
        id: String,
        left: f64,
        top: f64,
        guides: Vec<SnapGuide>,
    },
    /// Drag session over; `moved` is false for a plain click
    DragEnd { id: String, moved: bool },
}

#[derive(Debug, Clone)]
struct DragSession {
    id: String,
    /// Pointer position at drag start, screen space
    start_x: f64,
    start_y: f64,
    /// Element offsets at drag start, document space
    origin_left: f64,
    origin_top: f64,
    /// Dragged element size, document space
    width: f64,
    height: f64,
    moved: bool,
}

/// Pointer-event state machine for hover, selection, and drag-with-snap.
///
/// Owns no document state; everything it needs arrives per event, and
/// the current tool/selection/zoom are read through [`ViewContext`].
#[derive(Debug, Default)]
pub struct InteractionController {
    hovered: Option<String>,
    drag: Option<DragSession>,
    generation: u64,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new render pass. Interaction state is reset and events
    /// stamped with an older generation are ignored from here on, which
    /// is how stale handlers from a replaced document are neutralized.
    pub fn begin_render_pass(&mut self) -> u64 {
        self.generation += 1;
        self.hovered = None;
        self.drag = None;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn hovered_id(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn is_stale(&self, input: &PointerInput) -> bool {
        input.generation != self.generation
    }

    /// Hover feedback, suppressed for the current selection and during a
    /// drag. `bounds` is the element's document-space rectangle; the
    /// reported rectangle is mapped into screen space.
    pub fn pointer_enter(
        &mut self,
        input: &PointerInput,
        ctx: &dyn ViewContext,
        bounds: Rect,
    ) -> Option<ControllerAction> {
        if self.is_stale(input) || ctx.tool() != Tool::Select || self.drag.is_some() {
            return None;
        }
        if ctx.selected_id().as_deref() == Some(input.id.as_str()) {
            return None;
        }
        self.hovered = Some(input.id.clone());
        let scale = ctx.scale();
        let (offset_x, offset_y) = ctx.offset();
        Some(ControllerAction::Hover {
            id: input.id.clone(),
            bounds: Rect::new(
                bounds.x * scale + offset_x,
                bounds.y * scale + offset_y,
                bounds.width * scale,
                bounds.height * scale,
            ),
        })
    }

    pub fn pointer_leave(&mut self, input: &PointerInput) -> Option<ControllerAction> {
        if self.is_stale(input) || self.drag.is_some() {
            return None;
        }
        self.hovered = None;
        Some(ControllerAction::ClearHover)
    }

    /// Select the element; open a drag session when it is positioned
    /// absolute/fixed. `offsets` are its current left/top and `size` its
    /// document-space dimensions.
    pub fn pointer_down(
        &mut self,
        input: &PointerInput,
        ctx: &dyn ViewContext,
        position: PositionMode,
        offsets: (f64, f64),
        size: (f64, f64),
    ) -> Vec<ControllerAction> {
        if self.is_stale(input) || ctx.tool() != Tool::Select {
            return Vec::new();
        }
        self.hovered = None;
        let mut actions = vec![ControllerAction::Select {
            id: input.id.clone(),
        }];
        if position.is_draggable() {
            self.drag = Some(DragSession {
                id: input.id.clone(),
                start_x: input.x,
                start_y: input.y,
                origin_left: offsets.0,
                origin_top: offsets.1,
                width: size.0,
                height: size.1,
                moved: false,
            });
            actions.push(ControllerAction::ClearHover);
        }
        actions
    }

    /// Advance an active drag. Below the travel threshold the gesture is
    /// still a click and nothing moves. `siblings` are the document-space
    /// rectangles of the other positioned siblings, used for edge and
    /// center snapping.
    pub fn pointer_move(
        &mut self,
        input: &PointerInput,
        ctx: &dyn ViewContext,
        siblings: &[(String, Rect)],
    ) -> Option<ControllerAction> {
        if self.is_stale(input) {
            return None;
        }
        let drag = self.drag.as_mut()?;
        if drag.id != input.id {
            return None;
        }

        let dx = input.x - drag.start_x;
        let dy = input.y - drag.start_y;
        if !drag.moved && (dx * dx + dy * dy).sqrt() < DRAG_THRESHOLD_PX {
            return None;
        }
        drag.moved = true;

        let scale = ctx.scale();
        let mut left = drag.origin_left + dx / scale;
        let mut top = drag.origin_top + dy / scale;

        let threshold = SNAP_THRESHOLD_PX / scale;
        let mut guides = Vec::new();

        // Compare the moving element's left/center/right lines against
        // every sibling's, snapping to the closest line within reach
        let mut best_x: Option<(f64, f64, f64)> = None; // (distance, snapped left, line)
        let mut best_y: Option<(f64, f64, f64)> = None;
        for (sibling_id, rect) in siblings {
            if *sibling_id == drag.id {
                continue;
            }
            for line in [rect.x, rect.center_x(), rect.right()] {
                for anchor in [0.0, drag.width / 2.0, drag.width] {
                    let distance = (left + anchor - line).abs();
                    if distance <= threshold
                        && best_x.map(|(d, _, _)| distance < d).unwrap_or(true)
                    {
                        best_x = Some((distance, line - anchor, line));
                    }
                }
            }
            for line in [rect.y, rect.center_y(), rect.bottom()] {
                for anchor in [0.0, drag.height / 2.0, drag.height] {
                    let distance = (top + anchor - line).abs();
                    if distance <= threshold
                        && best_y.map(|(d, _, _)| distance < d).unwrap_or(true)
                    {
                        best_y = Some((distance, line - anchor, line));
                    }
                }
            }
        }
        if let Some((_, snapped, line)) = best_x {
            left = snapped;
            guides.push(SnapGuide {
                orientation: GuideOrientation::Vertical,
                position: line,
            });
        }
        if let Some((_, snapped, line)) = best_y {
            top = snapped;
            guides.push(SnapGuide {
                orientation: GuideOrientation::Horizontal,
                position: line,
            });
        }

        Some(ControllerAction::DragMove {
            id: drag.id.clone(),
            left,
            top,
            guides,
        })
    }

    /// End the drag session; guides clear and only a real drag should
    /// produce a history snapshot
    pub fn pointer_up(&mut self, input: &PointerInput) -> Option<ControllerAction> {
        if self.is_stale(input) {
            return None;
        }
        let drag = self.drag.take()?;
        Some(ControllerAction::DragEnd {
            id: drag.id,
            moved: drag.moved,
        })
    }
}
