use crate::canvas::CanvasState;
use sitecanvas_bundle::Project;
use sitecanvas_common::{CommonError, CommonResult, KeyValueStore};
use tracing::warn;

/// Namespace keys in the browser-scoped store. Selection and undo
/// history are deliberately never persisted.
pub const PROJECT_KEY: &str = "sitecanvas.project";
pub const CANVAS_KEY: &str = "sitecanvas.canvas";

pub fn save_project(store: &dyn KeyValueStore, project: &Project) -> CommonResult<()> {
    let json = serde_json::to_string(project)
        .map_err(|e| CommonError::Serialization(e.to_string()))?;
    store
        .set(PROJECT_KEY, &json)
        .map_err(CommonError::Storage)
}

/// Load the persisted project; unreadable state is treated as absent
pub fn load_project(store: &dyn KeyValueStore) -> Option<Project> {
    let json = store.get(PROJECT_KEY)?;
    match serde_json::from_str(&json) {
        Ok(project) => Some(project),
        Err(error) => {
            warn!(%error, "discarding unreadable persisted project");
            None
        }
    }
}

pub fn save_canvas(store: &dyn KeyValueStore, canvas: &CanvasState) -> CommonResult<()> {
    let json = serde_json::to_string(canvas)
        .map_err(|e| CommonError::Serialization(e.to_string()))?;
    store.set(CANVAS_KEY, &json).map_err(CommonError::Storage)
}

pub fn load_canvas(store: &dyn KeyValueStore) -> Option<CanvasState> {
    let json = store.get(CANVAS_KEY)?;
    match serde_json::from_str(&json) {
        Ok(canvas) => Some(canvas),
        Err(error) => {
            warn!(%error, "discarding unreadable persisted canvas state");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitecanvas_bundle::SiteFile;
    use sitecanvas_common::MemoryStore;

    #[test]
    fn project_round_trips_through_store() {
        let store = MemoryStore::new();
        let project = Project::new(
            "site",
            vec![SiteFile::text("index.html", "<p>hi</p>")],
            "index.html",
            42,
        );

        save_project(&store, &project).unwrap();
        let restored = load_project(&store).unwrap();
        assert_eq!(restored, project);
    }

    #[test]
    fn canvas_round_trips_through_store() {
        let store = MemoryStore::new();
        let mut canvas = CanvasState::new();
        canvas.set_scale(1.5);
        canvas.pan_by(10.0, -20.0);

        save_canvas(&store, &canvas).unwrap();
        let restored = load_canvas(&store).unwrap();
        assert_eq!(restored.scale, 1.5);
        assert_eq!(restored.offset_y, -20.0);
    }

    #[test]
    fn corrupt_state_is_treated_as_absent() {
        let store = MemoryStore::new();
        store.set(PROJECT_KEY, "{not json").unwrap();
        store.set(CANVAS_KEY, "[]").unwrap();
        assert!(load_project(&store).is_none());
        assert!(load_canvas(&store).is_none());
    }

    #[test]
    fn missing_keys_load_as_none() {
        let store = MemoryStore::new();
        assert!(load_project(&store).is_none());
        assert!(load_canvas(&store).is_none());
    }
}
