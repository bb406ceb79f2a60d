use sitecanvas_bundle::Rect;
use std::collections::HashMap;

/// On-screen bounding rectangles by element identifier.
///
/// The engine cannot lay out text; the host reads geometry from the
/// rendered frame and feeds it here after every layout pass. Tests
/// inject rectangles directly.
#[derive(Debug, Default, Clone)]
pub struct GeometryIndex {
    rects: HashMap<String, Rect>,
}

impl GeometryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: impl Into<String>, rect: Rect) {
        self.rects.insert(id.into(), rect);
    }

    pub fn get(&self, id: &str) -> Option<Rect> {
        self.rects.get(id).copied()
    }

    pub fn remove(&mut self, id: &str) {
        self.rects.remove(id);
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}
