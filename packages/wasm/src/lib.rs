use sitecanvas_bundle::Rect;
use sitecanvas_preview::{ControllerAction, PointerInput, Tool};
use sitecanvas_workspace::VisualEditor;
use wasm_bindgen::prelude::*;

mod platform;

use platform::{BrowserClock, LocalStorage};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// The editor engine, exposed to the browser host.
///
/// Byte slices come in, JSON strings go out; the host owns rendering,
/// listener attachment, and layout measurement.
#[wasm_bindgen]
pub struct SitecanvasEditor {
    inner: VisualEditor,
}

#[wasm_bindgen]
impl SitecanvasEditor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: VisualEditor::new(Box::new(BrowserClock), Box::new(LocalStorage)),
        }
    }

    #[wasm_bindgen(js_name = loadArchive)]
    pub fn load_archive(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner
            .load_archive(file_name, bytes)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = hasProject)]
    pub fn has_project(&self) -> bool {
        self.inner.has_project()
    }

    #[wasm_bindgen(js_name = assembledHtml)]
    pub fn assembled_html(&self) -> String {
        self.inner.assembled_html()
    }

    #[wasm_bindgen(js_name = renderGeneration)]
    pub fn render_generation(&self) -> u64 {
        self.inner.render_generation()
    }

    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&mut self, tool: &str) {
        let tool = match tool {
            "pan" => Tool::Pan,
            _ => Tool::Select,
        };
        self.inner.set_tool(tool);
    }

    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, scale: f64) {
        self.inner.set_zoom(scale);
    }

    #[wasm_bindgen(js_name = panBy)]
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.inner.pan_by(dx, dy);
    }

    /// Canvas state as JSON ({scale, offset_x, offset_y})
    #[wasm_bindgen(js_name = canvasState)]
    pub fn canvas_state(&self) -> Result<String, JsValue> {
        to_json(self.inner.canvas())
    }

    /// Layout feed: measured document-space bounds for one element
    #[wasm_bindgen(js_name = setElementBounds)]
    pub fn set_element_bounds(&mut self, id: &str, x: f64, y: f64, width: f64, height: f64) {
        self.inner.set_element_bounds(id, Rect::new(x, y, width, height));
    }

    pub fn select(&mut self, id: Option<String>) {
        self.inner.select(id.as_deref());
    }

    #[wasm_bindgen(js_name = selectedId)]
    pub fn selected_id(&self) -> Option<String> {
        self.inner.selected_id().map(str::to_string)
    }

    /// The selection's ElementData snapshot as JSON, or null
    #[wasm_bindgen(js_name = selectedElement)]
    pub fn selected_element(&self) -> Result<JsValue, JsValue> {
        match self.inner.selected_element() {
            Some(data) => Ok(JsValue::from_str(&to_json(data)?)),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = updateStyle)]
    pub fn update_style(&mut self, id: &str, property: &str, value: &str) -> Result<(), JsValue> {
        self.inner
            .update_style(id, property, value)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = updateText)]
    pub fn update_text(&mut self, id: &str, text: &str) -> Result<(), JsValue> {
        self.inner
            .update_text(id, text)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = setAttribute)]
    pub fn set_attribute(&mut self, id: &str, name: &str, value: &str) -> Result<(), JsValue> {
        self.inner
            .set_attribute(id, name, value)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = removeElement)]
    pub fn remove_element(&mut self, id: &str) -> Result<(), JsValue> {
        self.inner
            .remove_element(id)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = reorderLayers)]
    pub fn reorder_layers(
        &mut self,
        parent_id: &str,
        from_index: usize,
        to_index: usize,
    ) -> Result<(), JsValue> {
        self.inner
            .reorder_layers(parent_id, from_index, to_index)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = pointerEnter)]
    pub fn pointer_enter(
        &mut self,
        id: &str,
        x: f64,
        y: f64,
        generation: u64,
    ) -> Result<String, JsValue> {
        let input = pointer_input(id, x, y, generation);
        actions_json(self.inner.pointer_enter(&input).into_iter().collect())
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(
        &mut self,
        id: &str,
        x: f64,
        y: f64,
        generation: u64,
    ) -> Result<String, JsValue> {
        let input = pointer_input(id, x, y, generation);
        actions_json(self.inner.pointer_leave(&input).into_iter().collect())
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(
        &mut self,
        id: &str,
        x: f64,
        y: f64,
        generation: u64,
    ) -> Result<String, JsValue> {
        let input = pointer_input(id, x, y, generation);
        actions_json(self.inner.pointer_down(&input))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(
        &mut self,
        id: &str,
        x: f64,
        y: f64,
        generation: u64,
    ) -> Result<String, JsValue> {
        let input = pointer_input(id, x, y, generation);
        actions_json(self.inner.pointer_move(&input).into_iter().collect())
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(
        &mut self,
        id: &str,
        x: f64,
        y: f64,
        generation: u64,
    ) -> Result<String, JsValue> {
        let input = pointer_input(id, x, y, generation);
        actions_json(self.inner.pointer_up(&input).into_iter().collect())
    }

    /// Advance debounce timers; call once per animation frame
    pub fn tick(&mut self) {
        self.inner.tick();
    }

    #[wasm_bindgen(js_name = commitNow)]
    pub fn commit_now(&mut self, label: &str) -> bool {
        self.inner.commit_now(label)
    }

    pub fn undo(&mut self) -> bool {
        self.inner.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.inner.redo()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    /// Queued editor events as a JSON array, clearing the queue
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> Result<String, JsValue> {
        to_json(&self.inner.drain_events())
    }

    #[wasm_bindgen(js_name = exportFileName)]
    pub fn export_file_name(&self) -> Option<String> {
        self.inner
            .project()
            .map(|project| format!("{}-exported.zip", project.name))
    }

    /// Package the current project; returns the archive bytes
    #[wasm_bindgen(js_name = exportZip)]
    pub fn export_zip(&mut self) -> Result<Vec<u8>, JsValue> {
        self.inner
            .export()
            .map(|exported| exported.bytes)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = saveSession)]
    pub fn save_session(&mut self) {
        self.inner.save_session();
    }

    #[wasm_bindgen(js_name = restoreSession)]
    pub fn restore_session(&mut self) -> bool {
        self.inner.restore_session()
    }
}

impl Default for SitecanvasEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn pointer_input(id: &str, x: f64, y: f64, generation: u64) -> PointerInput {
    PointerInput {
        id: id.to_string(),
        x,
        y,
        generation,
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

fn actions_json(actions: Vec<ControllerAction>) -> Result<String, JsValue> {
    let rendered: Vec<serde_json::Value> = actions
        .iter()
        .map(|action| match action {
            ControllerAction::Hover { id, bounds } => serde_json::json!({
                "type": "hover",
                "id": id,
                "bounds": bounds,
            }),
            ControllerAction::ClearHover => serde_json::json!({ "type": "clear-hover" }),
            ControllerAction::Select { id } => serde_json::json!({
                "type": "select",
                "id": id,
            }),
            ControllerAction::DragMove {
                id,
                left,
                top,
                guides,
            } => serde_json::json!({
                "type": "drag-move",
                "id": id,
                "left": left,
                "top": top,
                "guides": guides,
            }),
            ControllerAction::DragEnd { id, moved } => serde_json::json!({
                "type": "drag-end",
                "id": id,
                "moved": moved,
            }),
        })
        .collect();
    serde_json::to_string(&rendered)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitecanvas_preview::{GuideOrientation, SnapGuide};

    #[test]
    fn actions_render_with_type_tags() {
        let json = actions_json(vec![
            ControllerAction::Select {
                id: "el-1".to_string(),
            },
            ControllerAction::DragMove {
                id: "el-1".to_string(),
                left: 50.0,
                top: 10.0,
                guides: vec![SnapGuide {
                    orientation: GuideOrientation::Vertical,
                    position: 50.0,
                }],
            },
        ])
        .unwrap();

        assert!(json.contains("\"type\":\"select\""));
        assert!(json.contains("\"type\":\"drag-move\""));
        assert!(json.contains("\"left\":50.0"));
        assert!(json.contains("\"vertical\""));
    }

    #[test]
    fn empty_action_sets_render_as_empty_arrays() {
        assert_eq!(actions_json(vec![]).unwrap(), "[]");
    }
}
