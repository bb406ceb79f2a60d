use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Axis-aligned bounding geometry in document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Point-in-time snapshot of one element, extracted for the properties
/// panel. Never a live view: re-derived after every mutation that should
/// be reflected in the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementData {
    pub id: String,
    pub tag_name: String,
    /// The class attribute, verbatim
    pub classes: String,
    /// Computed styles filtered to the allow-list, overlaid with inline styles
    pub styles: BTreeMap<String, String>,
    /// Non-style attributes
    pub attributes: BTreeMap<String, String>,
    /// Present only when the element has no element children
    pub text: Option<String>,
    pub children: Vec<ElementData>,
    pub bounds: Rect,
    pub parent_id: Option<String>,
    pub sibling_index: usize,
}

impl ElementData {
    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
        assert_eq!(rect.center_x(), 60.0);
        assert_eq!(rect.center_y(), 45.0);
    }

    #[test]
    fn element_data_serializes_deterministically() {
        let mut styles = BTreeMap::new();
        styles.insert("color".to_string(), "red".to_string());
        styles.insert("background-color".to_string(), "blue".to_string());
        let data = ElementData {
            id: "el-1".to_string(),
            tag_name: "div".to_string(),
            classes: String::new(),
            styles,
            attributes: BTreeMap::new(),
            text: Some("hi".to_string()),
            children: vec![],
            bounds: Rect::default(),
            parent_id: None,
            sibling_index: 0,
        };
        let a = serde_json::to_string(&data).unwrap();
        let b = serde_json::to_string(&data).unwrap();
        assert_eq!(a, b);
        assert!(a.contains("\"background-color\":\"blue\""));
    }
}
