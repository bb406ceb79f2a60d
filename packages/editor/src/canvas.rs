use serde::{Deserialize, Serialize};
use sitecanvas_bundle::Rect;

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 5.0;

/// Pan/zoom state of the canvas viewport.
///
/// Not part of undo history; persisted independently across sessions.
/// The transient interaction flags are skipped on serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasState {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    #[serde(skip)]
    pub panning: bool,
    #[serde(skip)]
    pub dragging: bool,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            panning: false,
            dragging: false,
        }
    }
}

impl CanvasState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.set_scale(self.scale * factor);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Map a point from screen space into document space
    pub fn screen_to_canvas(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.offset_x) / self.scale, (y - self.offset_y) / self.scale)
    }

    /// Map a point from document space onto the screen
    pub fn canvas_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale + self.offset_x, y * self.scale + self.offset_y)
    }

    /// Map a document-space rectangle onto the screen
    pub fn project_rect(&self, rect: Rect) -> Rect {
        let (x, y) = self.canvas_to_screen(rect.x, rect.y);
        Rect::new(x, y, rect.width * self.scale, rect.height * self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_clamped() {
        let mut canvas = CanvasState::new();
        canvas.set_scale(0.01);
        assert_eq!(canvas.scale, MIN_SCALE);
        canvas.set_scale(100.0);
        assert_eq!(canvas.scale, MAX_SCALE);
    }

    #[test]
    fn screen_and_canvas_transforms_invert() {
        let mut canvas = CanvasState::new();
        canvas.set_scale(2.0);
        canvas.pan_by(100.0, 50.0);

        let (cx, cy) = canvas.screen_to_canvas(140.0, 90.0);
        assert_eq!((cx, cy), (20.0, 20.0));
        assert_eq!(canvas.canvas_to_screen(cx, cy), (140.0, 90.0));
    }

    #[test]
    fn project_rect_scales_size() {
        let mut canvas = CanvasState::new();
        canvas.set_scale(2.0);
        let projected = canvas.project_rect(Rect::new(10.0, 10.0, 30.0, 40.0));
        assert_eq!(projected, Rect::new(20.0, 20.0, 60.0, 80.0));
    }

    #[test]
    fn transient_flags_are_not_persisted() {
        let mut canvas = CanvasState::new();
        canvas.panning = true;
        canvas.dragging = true;

        let json = serde_json::to_string(&canvas).unwrap();
        let restored: CanvasState = serde_json::from_str(&json).unwrap();
        assert!(!restored.panning);
        assert!(!restored.dragging);
        assert_eq!(restored.scale, canvas.scale);
    }
}
