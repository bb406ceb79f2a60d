use crate::events::{EditorEvent, EventBus};
use sitecanvas_bundle::ElementData;

/// The current selection and its cached ElementData snapshot.
///
/// Edits here update the snapshot and notify the preview surface; they
/// never commit to history themselves. Callers commit at gesture
/// boundaries (input blur, drag end) so the undo stack is not flooded
/// with per-keystroke entries.
#[derive(Debug, Default)]
pub struct SelectionState {
    selected_id: Option<String>,
    element: Option<ElementData>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the selection. Any cached snapshot is dropped so the next
    /// read forces a fresh extraction.
    pub fn select(&mut self, id: Option<&str>) {
        self.selected_id = id.map(str::to_string);
        self.element = None;
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn element(&self) -> Option<&ElementData> {
        self.element.as_ref()
    }

    pub fn set_element_data(&mut self, data: ElementData) {
        self.element = Some(data);
    }

    /// Update one style property on the cached snapshot and notify.
    /// Returns false when the identifier is not the current selection.
    pub fn update_style(
        &mut self,
        id: &str,
        property: &str,
        value: &str,
        events: &mut EventBus,
    ) -> bool {
        if self.selected_id.as_deref() != Some(id) {
            return false;
        }
        if let Some(element) = &mut self.element {
            element
                .styles
                .insert(property.to_string(), value.to_string());
        }
        events.emit(EditorEvent::StyleChanged {
            id: id.to_string(),
            property: property.to_string(),
            value: value.to_string(),
        });
        true
    }

    /// Analogous for text content
    pub fn update_text(&mut self, id: &str, text: &str, events: &mut EventBus) -> bool {
        if self.selected_id.as_deref() != Some(id) {
            return false;
        }
        if let Some(element) = &mut self.element {
            element.text = Some(text.to_string());
        }
        events.emit(EditorEvent::TextChanged {
            id: id.to_string(),
            text: text.to_string(),
        });
        true
    }
}
