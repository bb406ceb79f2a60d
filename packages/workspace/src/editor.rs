use sitecanvas_archive::{process_archive, ArchiveError};
use sitecanvas_assembler::{assemble_preview, export_project, ExportError, ExportedArchive};
use sitecanvas_bundle::{Project, Rect};
use sitecanvas_common::{Clock, KeyValueStore};
use sitecanvas_dom::{Element, Node, VISUAL_ID_ATTR};
use sitecanvas_editor::{
    load_canvas, load_project, save_canvas, save_project, CanvasState, EditorEvent, EventBus,
    HistoryManager, SelectionState, DEFAULT_DEBOUNCE_MS,
};
use sitecanvas_preview::{
    extract_element_data, ControllerAction, GeometryIndex, InteractionController, Mutation,
    MutationError, PointerInput, PositionMode, PreviewDocument, StyleResolver, Tool, ViewContext,
};
use tracing::warn;

/// The single authoritative holder of editing state.
///
/// Owns the Project, the live preview document (the second mutable copy),
/// history, selection, canvas, and the interaction controller. All
/// mutation flows enter here; consumers receive read-only views or
/// drained events. The live document is reconciled back into the Project
/// lazily, right before any history snapshot or export observes it.
pub struct VisualEditor {
    clock: Box<dyn Clock>,
    store: Box<dyn KeyValueStore>,
    project: Option<Project>,
    live: Option<PreviewDocument>,
    /// True while the live document has edits the Project has not seen
    live_dirty: bool,
    resolver: StyleResolver,
    history: HistoryManager,
    selection: SelectionState,
    canvas: CanvasState,
    events: EventBus,
    controller: InteractionController,
    geometry: GeometryIndex,
    tool: Tool,
}

/// Point-in-time read of the view state, handed to the interaction
/// controller so its handlers never capture stale values
struct ViewSnapshot {
    tool: Tool,
    selected: Option<String>,
    scale: f64,
    offset: (f64, f64),
}

impl ViewContext for ViewSnapshot {
    fn tool(&self) -> Tool {
        self.tool
    }
    fn selected_id(&self) -> Option<String> {
        self.selected.clone()
    }
    fn scale(&self) -> f64 {
        self.scale
    }
    fn offset(&self) -> (f64, f64) {
        self.offset
    }
}

impl VisualEditor {
    pub fn new(clock: Box<dyn Clock>, store: Box<dyn KeyValueStore>) -> Self {
        Self {
            clock,
            store,
            project: None,
            live: None,
            live_dirty: false,
            resolver: StyleResolver::new(),
            history: HistoryManager::new(),
            selection: SelectionState::new(),
            canvas: CanvasState::new(),
            events: EventBus::new(),
            controller: InteractionController::new(),
            geometry: GeometryIndex::new(),
            tool: Tool::Select,
        }
    }

    // ---- project lifecycle ----

    /// Validate, extract, and install an uploaded archive. On failure no
    /// state changes: the previous project (if any) stays installed.
    pub fn load_archive(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), ArchiveError> {
        let now = self.clock.now_ms();
        let project = process_archive(file_name, bytes, now)?;
        self.install_project(project, "Load project");
        Ok(())
    }

    fn install_project(&mut self, project: Project, label: &str) {
        let now = self.clock.now_ms();
        self.resolver = StyleResolver::from_project(&project);
        self.live = Some(PreviewDocument::from_html(&assemble_preview(&project)));
        self.live_dirty = false;
        self.geometry.clear();
        self.controller.begin_render_pass();
        self.selection.select(None);
        self.history.clear();
        self.history.set_enabled(true);
        self.history.commit(&project, None, label, now);
        self.project = Some(project);
        self.persist_project();
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn has_project(&self) -> bool {
        self.project.is_some()
    }

    /// The self-contained HTML the preview surface renders, reflecting
    /// all live edits
    pub fn assembled_html(&self) -> String {
        self.live
            .as_ref()
            .map(PreviewDocument::html)
            .unwrap_or_default()
    }

    /// Generation stamp the host attaches to forwarded pointer events
    pub fn render_generation(&self) -> u64 {
        self.controller.generation()
    }

    // ---- view state ----

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn canvas(&self) -> &CanvasState {
        &self.canvas
    }

    pub fn set_zoom(&mut self, scale: f64) {
        self.canvas.set_scale(scale);
        self.persist_canvas();
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.canvas.pan_by(dx, dy);
        self.persist_canvas();
    }

    /// Layout feed from the host: measured document-space bounds per element
    pub fn set_element_bounds(&mut self, id: &str, rect: Rect) {
        self.geometry.set(id, rect);
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain()
    }

    // ---- selection ----

    pub fn select(&mut self, id: Option<&str>) {
        self.selection.select(id);
        self.refresh_selection();
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selection.selected_id()
    }

    pub fn selected_element(&self) -> Option<&sitecanvas_bundle::ElementData> {
        self.selection.element()
    }

    /// Re-derive the selection's ElementData snapshot from the live
    /// document. Called after any mutation the properties panel should see.
    pub fn refresh_selection(&mut self) {
        let Some(id) = self.selection.selected_id().map(str::to_string) else {
            return;
        };
        let Some(live) = &self.live else {
            return;
        };
        if let Some(data) =
            extract_element_data(live.document(), &self.resolver, &self.geometry, &id)
        {
            self.selection.set_element_data(data);
        }
    }

    // ---- panel edits ----

    /// Apply a style edit to the live node and schedule a debounced
    /// history snapshot. History only captures the edit once the quiet
    /// period passes or a gesture boundary flushes it.
    pub fn update_style(
        &mut self,
        id: &str,
        property: &str,
        value: &str,
    ) -> Result<(), MutationError> {
        let live = self
            .live
            .as_mut()
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;
        live.apply(&Mutation::SetInlineStyle {
            id: id.to_string(),
            property: property.to_string(),
            value: value.to_string(),
        })?;
        self.live_dirty = true;
        self.selection
            .update_style(id, property, value, &mut self.events);
        let now = self.clock.now_ms();
        self.history
            .commit_debounced("Edit style", DEFAULT_DEBOUNCE_MS, now);
        Ok(())
    }

    pub fn update_text(&mut self, id: &str, text: &str) -> Result<(), MutationError> {
        let live = self
            .live
            .as_mut()
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;
        live.apply(&Mutation::SetText {
            id: id.to_string(),
            text: text.to_string(),
        })?;
        self.live_dirty = true;
        self.selection.update_text(id, text, &mut self.events);
        let now = self.clock.now_ms();
        self.history
            .commit_debounced("Edit text", DEFAULT_DEBOUNCE_MS, now);
        Ok(())
    }

    pub fn set_attribute(&mut self, id: &str, name: &str, value: &str) -> Result<(), MutationError> {
        let live = self
            .live
            .as_mut()
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;
        live.apply(&Mutation::SetAttribute {
            id: id.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        })?;
        self.live_dirty = true;
        self.refresh_selection();
        let now = self.clock.now_ms();
        self.history
            .commit_debounced("Edit attribute", DEFAULT_DEBOUNCE_MS, now);
        Ok(())
    }

    /// Delete an element and its subtree; an immediate history commit,
    /// not a debounced one
    pub fn remove_element(&mut self, id: &str) -> Result<(), MutationError> {
        let live = self
            .live
            .as_mut()
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;
        live.apply(&Mutation::RemoveElement { id: id.to_string() })?;
        self.live_dirty = true;
        self.geometry.remove(id);
        if self.selection.selected_id() == Some(id) {
            self.selection.select(None);
        }
        self.commit_now("Delete element");
        Ok(())
    }

    // ---- pointer events ----

    pub fn pointer_enter(&mut self, input: &PointerInput) -> Option<ControllerAction> {
        let bounds = self.geometry.get(&input.id)?;
        let ctx = self.view_snapshot();
        self.controller.pointer_enter(input, &ctx, bounds)
    }

    pub fn pointer_leave(&mut self, input: &PointerInput) -> Option<ControllerAction> {
        self.controller.pointer_leave(input)
    }

    pub fn pointer_down(&mut self, input: &PointerInput) -> Vec<ControllerAction> {
        let (position, offsets) = match &self.live {
            Some(live) => match live.element(&input.id) {
                Some(element) => {
                    let styles = self.resolver.resolve(element);
                    let position = styles
                        .get("position")
                        .map(|value| PositionMode::from_value(value))
                        .unwrap_or(PositionMode::Static);
                    let fallback = self.geometry.get(&input.id).unwrap_or_default();
                    let left = styles
                        .get("left")
                        .and_then(|value| parse_px(value))
                        .unwrap_or(fallback.x);
                    let top = styles
                        .get("top")
                        .and_then(|value| parse_px(value))
                        .unwrap_or(fallback.y);
                    (position, (left, top))
                }
                None => return Vec::new(),
            },
            None => return Vec::new(),
        };
        let size = self
            .geometry
            .get(&input.id)
            .map(|rect| (rect.width, rect.height))
            .unwrap_or((0.0, 0.0));

        let ctx = self.view_snapshot();
        let actions = self
            .controller
            .pointer_down(input, &ctx, position, offsets, size);
        for action in &actions {
            if let ControllerAction::Select { id } = action {
                self.selection.select(Some(id));
            }
        }
        self.refresh_selection();
        self.canvas.dragging = self.controller.is_dragging();
        actions
    }

    pub fn pointer_move(&mut self, input: &PointerInput) -> Option<ControllerAction> {
        let siblings = self.positioned_sibling_rects(&input.id);
        let ctx = self.view_snapshot();
        let action = self.controller.pointer_move(input, &ctx, &siblings)?;
        if let ControllerAction::DragMove { id, left, top, .. } = &action {
            if let Some(live) = &mut self.live {
                if live.set_position(id, *left, *top).is_ok() {
                    self.live_dirty = true;
                }
            }
        }
        Some(action)
    }

    pub fn pointer_up(&mut self, input: &PointerInput) -> Option<ControllerAction> {
        let action = self.controller.pointer_up(input)?;
        self.canvas.dragging = false;
        if let ControllerAction::DragEnd { moved: true, .. } = &action {
            self.sync_project();
            let now = self.clock.now_ms();
            self.history
                .commit_debounced("Move element", DEFAULT_DEBOUNCE_MS, now);
            self.refresh_selection();
        }
        Some(action)
    }

    /// The other positioned element children of the dragged element's
    /// parent, with their measured bounds; these are the snap candidates
    fn positioned_sibling_rects(&self, id: &str) -> Vec<(String, Rect)> {
        let Some(live) = &self.live else {
            return Vec::new();
        };
        let doc = live.document();
        let parent = doc.find_element(|el| {
            el.element_children()
                .any(|child| child.attr(VISUAL_ID_ATTR) == Some(id))
        });

        let mut rects = Vec::new();
        let mut collect = |el: &Element| {
            if let Some(sibling_id) = el.attr(VISUAL_ID_ATTR) {
                if sibling_id != id
                    && self.resolver.position_mode(el) != PositionMode::Static
                {
                    if let Some(rect) = self.geometry.get(sibling_id) {
                        rects.push((sibling_id.to_string(), rect));
                    }
                }
            }
        };
        match parent {
            Some(parent) => {
                for child in parent.element_children() {
                    collect(child);
                }
            }
            None => {
                for node in &doc.children {
                    if let Node::Element(el) = node {
                        collect(el);
                    }
                }
            }
        }
        rects
    }

    // ---- history ----

    /// Commit a snapshot right now, superseding any pending debounce.
    /// Called at gesture boundaries (input blur, panel close).
    pub fn commit_now(&mut self, label: &str) -> bool {
        self.sync_project();
        self.history.cancel_pending();
        let now = self.clock.now_ms();
        let selected = self.selection.selected_id().map(str::to_string);
        let committed = match &self.project {
            Some(project) => self
                .history
                .commit(project, selected.as_deref(), label, now),
            None => false,
        };
        if committed {
            self.events.emit(EditorEvent::HistorySaved {
                label: label.to_string(),
            });
        }
        committed
    }

    /// Advance debounce timers; the host calls this once per frame
    pub fn tick(&mut self) {
        if !self.history.has_pending() {
            return;
        }
        self.sync_project();
        let now = self.clock.now_ms();
        let selected = self.selection.selected_id().map(str::to_string);
        let committed = match &self.project {
            Some(project) => self.history.tick(project, selected.as_deref(), now),
            None => false,
        };
        if committed {
            self.emit_history_saved();
        }
    }

    /// Force any pending debounced commit through immediately
    pub fn flush_history(&mut self) -> bool {
        if !self.history.has_pending() {
            return false;
        }
        self.sync_project();
        let now = self.clock.now_ms();
        let selected = self.selection.selected_id().map(str::to_string);
        let flushed = match &self.project {
            Some(project) => self.history.flush(project, selected.as_deref(), now),
            None => false,
        };
        if flushed {
            self.emit_history_saved();
        }
        flushed
    }

    fn emit_history_saved(&mut self) {
        if let Some(label) = self.history.current_label().map(str::to_string) {
            self.events.emit(EditorEvent::HistorySaved { label });
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.sync_project();
        let now = self.clock.now_ms();
        let selected = self.selection.selected_id().map(str::to_string);
        let result = match &self.project {
            Some(project) => self.history.undo(project, selected.as_deref(), now),
            None => None,
        };
        match result {
            Some((project, selected)) => {
                self.replace_project(project, selected);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.sync_project();
        let now = self.clock.now_ms();
        let selected = self.selection.selected_id().map(str::to_string);
        let result = match &self.project {
            Some(project) => self.history.redo(project, selected.as_deref(), now),
            None => None,
        };
        match result {
            Some((project, selected)) => {
                self.replace_project(project, selected);
                true
            }
            None => false,
        }
    }

    /// Install a project restored from history: rebuild the preview
    /// document and the stylesheet cascade, restore the selection
    fn replace_project(&mut self, project: Project, selected: Option<String>) {
        self.resolver = StyleResolver::from_project(&project);
        self.live = Some(PreviewDocument::from_html(&assemble_preview(&project)));
        self.live_dirty = false;
        self.controller.begin_render_pass();
        self.project = Some(project);
        self.selection.select(selected.as_deref());
        self.refresh_selection();
        self.persist_project();
    }

    // ---- layers ----

    /// Move the layer at `from_index` to `to_index` among the element
    /// children of `parent_id`, as a single history entry
    pub fn reorder_layers(
        &mut self,
        parent_id: &str,
        from_index: usize,
        to_index: usize,
    ) -> Result<(), MutationError> {
        let (child_id, node_index) = {
            let live = self
                .live
                .as_ref()
                .ok_or_else(|| MutationError::ParentNotFound(parent_id.to_string()))?;
            let parent = live
                .element(parent_id)
                .ok_or_else(|| MutationError::ParentNotFound(parent_id.to_string()))?;
            let child_id = parent
                .element_children()
                .nth(from_index)
                .and_then(|el| el.attr(VISUAL_ID_ATTR))
                .map(str::to_string)
                .ok_or(MutationError::InvalidIndex(from_index))?;
            // Map the layer index onto the parent's node list, which may
            // interleave text nodes
            let element_positions: Vec<usize> = parent
                .children
                .iter()
                .enumerate()
                .filter(|(_, node)| matches!(node, Node::Element(_)))
                .map(|(index, _)| index)
                .collect();
            let node_index = element_positions
                .get(to_index)
                .copied()
                .unwrap_or(parent.children.len());
            (child_id, node_index)
        };

        self.history.start_batch("Reorder layers");
        let result = match self.live.as_mut() {
            Some(live) => live.apply(&Mutation::MoveElement {
                id: child_id,
                new_parent_id: parent_id.to_string(),
                index: node_index,
            }),
            None => Err(MutationError::ParentNotFound(parent_id.to_string())),
        };
        if let Err(error) = result {
            self.history.cancel_batch();
            return Err(error);
        }

        self.live_dirty = true;
        self.sync_project();
        let now = self.clock.now_ms();
        let selected = self.selection.selected_id().map(str::to_string);
        if let Some(project) = &self.project {
            // Absorbed by the batch window; the single entry lands below
            self.history
                .commit(project, selected.as_deref(), "Reorder layers", now);
        }
        self.events.emit(EditorEvent::LayersReordered {
            parent_id: parent_id.to_string(),
            from_index,
            to_index,
        });
        let committed = match &self.project {
            Some(project) => self.history.end_batch(project, selected.as_deref(), now),
            None => false,
        };
        if committed {
            self.events.emit(EditorEvent::HistorySaved {
                label: "Reorder layers".to_string(),
            });
        }
        self.persist_project();
        self.refresh_selection();
        Ok(())
    }

    // ---- export & persistence ----

    /// Package the current project for download. Reads state only; a
    /// failed export leaves everything untouched and is safe to retry.
    pub fn export(&mut self) -> Result<ExportedArchive, ExportError> {
        self.sync_project();
        match &self.project {
            Some(project) => export_project(project),
            None => Err(ExportError::NoProject),
        }
    }

    pub fn save_session(&mut self) {
        self.sync_project();
        self.persist_project();
        self.persist_canvas();
    }

    /// Reinstall the persisted project and canvas, if any
    pub fn restore_session(&mut self) -> bool {
        if let Some(canvas) = load_canvas(self.store.as_ref()) {
            self.canvas = canvas;
        }
        match load_project(self.store.as_ref()) {
            Some(project) => {
                self.install_project(project, "Restore session");
                true
            }
            None => false,
        }
    }

    // ---- internals ----

    /// Reconcile the live document back into the Project. The single
    /// write point of the dual-copy design; snapshots and exports call
    /// it first so they always observe the latest edits.
    fn sync_project(&mut self) {
        if !self.live_dirty {
            return;
        }
        let now = self.clock.now_ms();
        if let (Some(live), Some(project)) = (&self.live, &mut self.project) {
            if live.reconcile_into(project) {
                project.touch(now);
            }
        }
        self.live_dirty = false;
    }

    fn view_snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            tool: self.tool,
            selected: self.selection.selected_id().map(str::to_string),
            scale: self.canvas.scale,
            offset: (self.canvas.offset_x, self.canvas.offset_y),
        }
    }

    fn persist_project(&mut self) {
        if let Some(project) = &self.project {
            if let Err(error) = save_project(self.store.as_ref(), project) {
                warn!(%error, "failed to persist project");
            }
        }
    }

    fn persist_canvas(&self) {
        if let Err(error) = save_canvas(self.store.as_ref(), &self.canvas) {
            warn!(%error, "failed to persist canvas state");
        }
    }
}

fn parse_px(value: &str) -> Option<f64> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}
