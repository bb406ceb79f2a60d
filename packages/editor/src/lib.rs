//! Editing session state: undo/redo history, the current selection, the
//! canvas viewport, cross-component notifications, and session persistence.
//!
//! Everything here is deliberately passive. The history manager never
//! reaches for a wall clock or a timer of its own; time arrives as an
//! argument, which is what makes debounce and flush ordering testable.

pub mod canvas;
pub mod events;
pub mod history;
pub mod persist;
pub mod selection;

pub use canvas::{CanvasState, MAX_SCALE, MIN_SCALE};
pub use events::{EditorEvent, EventBus};
pub use history::{HistoryEntry, HistoryManager, DEFAULT_DEBOUNCE_MS, MAX_HISTORY_ENTRIES};
pub use persist::{
    load_canvas, load_project, save_canvas, save_project, CANVAS_KEY, PROJECT_KEY,
};
pub use selection::SelectionState;
