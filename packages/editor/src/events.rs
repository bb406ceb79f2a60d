use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Cross-component notifications with small structured payloads.
///
/// Emitted by the selection state and the workspace; observed by the
/// preview surface (to patch live nodes) and the host UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EditorEvent {
    StyleChanged {
        id: String,
        property: String,
        value: String,
    },
    TextChanged {
        id: String,
        text: String,
    },
    LayersReordered {
        parent_id: String,
        from_index: usize,
        to_index: usize,
    },
    HistorySaved {
        label: String,
    },
}

/// Single-threaded notification channel. Producers enqueue, the host
/// drains once per frame.
#[derive(Debug, Default)]
pub struct EventBus {
    queue: VecDeque<EditorEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: EditorEvent) {
        self.queue.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<EditorEvent> {
        self.queue.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
