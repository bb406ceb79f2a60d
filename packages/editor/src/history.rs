//! # Undo/Redo History
//!
//! Bounded, linear undo/redo over whole-project snapshots.
//!
//! ## Design
//!
//! - Every commit deep-copies the project, so no entry ever shares
//!   mutable structure with the live value
//! - Committing after an undo discards the redo branch (linear history)
//! - Debounced commits coalesce rapid edits into one entry; they are
//!   flushed before any undo/redo so an in-flight edit is never lost
//! - A batch window collapses any number of commits into a single entry

use serde::{Deserialize, Serialize};
use sitecanvas_bundle::Project;
use tracing::debug;

/// Maximum retained history length
pub const MAX_HISTORY_ENTRIES: usize = 50;

/// Default quiet period for debounced commits
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// One undo/redo checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub project: Project,
    pub selected_id: Option<String>,
    pub timestamp_ms: u64,
    pub label: String,
}

#[derive(Debug)]
struct PendingCommit {
    label: String,
    due_at_ms: u64,
}

#[derive(Debug)]
struct BatchWindow {
    label: String,
    dirty: bool,
}

#[derive(Debug)]
pub struct HistoryManager {
    entries: Vec<HistoryEntry>,
    /// Index of the entry matching the live project; None before any commit
    cursor: Option<usize>,
    max_entries: usize,
    enabled: bool,
    pending: Option<PendingCommit>,
    batch: Option<BatchWindow>,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::with_max_entries(MAX_HISTORY_ENTRIES)
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            max_entries,
            enabled: true,
            pending: None,
            batch: None,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
        self.pending = None;
        self.batch = None;
    }

    /// Snapshot the project into a new entry.
    ///
    /// No-op when history is disabled. Inside a batch window the commit is
    /// absorbed: the window is marked dirty and a single entry is pushed at
    /// `end_batch`. Returns whether an entry was pushed.
    pub fn commit(
        &mut self,
        project: &Project,
        selected_id: Option<&str>,
        label: &str,
        now_ms: u64,
    ) -> bool {
        if !self.enabled {
            return false;
        }
        if let Some(batch) = &mut self.batch {
            batch.dirty = true;
            return false;
        }
        self.push_entry(project, selected_id, label, now_ms);
        true
    }

    fn push_entry(
        &mut self,
        project: &Project,
        selected_id: Option<&str>,
        label: &str,
        now_ms: u64,
    ) {
        // Discard the redo branch
        match self.cursor {
            Some(cursor) => self.entries.truncate(cursor + 1),
            None => self.entries.clear(),
        }

        self.entries.push(HistoryEntry {
            project: project.clone(),
            selected_id: selected_id.map(str::to_string),
            timestamp_ms: now_ms,
            label: label.to_string(),
        });

        let mut cursor = self.entries.len() - 1;
        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
            cursor -= 1;
        }
        self.cursor = Some(cursor);
        debug!(label, entries = self.entries.len(), "history commit");
    }

    /// Schedule a commit after a quiet period. A newer call replaces a
    /// pending one, coalescing rapid edits (drag, nudge) into one entry.
    pub fn commit_debounced(&mut self, label: &str, delay_ms: u64, now_ms: u64) {
        if !self.enabled {
            return;
        }
        self.pending = Some(PendingCommit {
            label: label.to_string(),
            due_at_ms: now_ms + delay_ms,
        });
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    /// Fire the pending commit once its quiet period has elapsed. The
    /// snapshot observes the project as it is now, not as it was when the
    /// commit was scheduled.
    pub fn tick(&mut self, project: &Project, selected_id: Option<&str>, now_ms: u64) -> bool {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| now_ms >= pending.due_at_ms);
        if !due {
            return false;
        }
        self.flush(project, selected_id, now_ms)
    }

    /// Fire any pending commit immediately. Called before undo/redo so an
    /// in-progress edit lands in history instead of being lost or applied
    /// on top of a reverted state.
    pub fn flush(&mut self, project: &Project, selected_id: Option<&str>, now_ms: u64) -> bool {
        match self.pending.take() {
            Some(pending) => self.commit(project, selected_id, &pending.label, now_ms),
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.enabled && self.cursor.is_some_and(|cursor| cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.enabled
            && self
                .cursor
                .is_some_and(|cursor| cursor + 1 < self.entries.len())
    }

    /// Step back one entry, returning an independent copy of the project
    /// and selection to install. None at the oldest retained state.
    pub fn undo(
        &mut self,
        project: &Project,
        selected_id: Option<&str>,
        now_ms: u64,
    ) -> Option<(Project, Option<String>)> {
        self.flush(project, selected_id, now_ms);
        let cursor = self.cursor?;
        if cursor == 0 {
            return None;
        }
        self.cursor = Some(cursor - 1);
        let entry = &self.entries[cursor - 1];
        Some((entry.project.clone(), entry.selected_id.clone()))
    }

    /// Step forward one entry. None at the newest state.
    pub fn redo(
        &mut self,
        project: &Project,
        selected_id: Option<&str>,
        now_ms: u64,
    ) -> Option<(Project, Option<String>)> {
        self.flush(project, selected_id, now_ms);
        let cursor = self.cursor?;
        if cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor = Some(cursor + 1);
        let entry = &self.entries[cursor + 1];
        Some((entry.project.clone(), entry.selected_id.clone()))
    }

    /// Open a named batch window. Commits inside the window collapse into
    /// one entry pushed at `end_batch`.
    pub fn start_batch(&mut self, label: &str) {
        if self.enabled && self.batch.is_none() {
            self.batch = Some(BatchWindow {
                label: label.to_string(),
                dirty: false,
            });
        }
    }

    /// Close the batch window, committing exactly once if anything changed
    pub fn end_batch(
        &mut self,
        project: &Project,
        selected_id: Option<&str>,
        now_ms: u64,
    ) -> bool {
        match self.batch.take() {
            Some(batch) if batch.dirty => {
                self.push_entry(project, selected_id, &batch.label, now_ms);
                true
            }
            _ => false,
        }
    }

    /// Abandon the batch window, returning a copy of the entry at the
    /// cursor so the caller can restore the pre-batch state
    pub fn cancel_batch(&mut self) -> Option<(Project, Option<String>)> {
        self.batch.take()?;
        let cursor = self.cursor?;
        let entry = &self.entries[cursor];
        Some((entry.project.clone(), entry.selected_id.clone()))
    }

    /// Label of the entry at the cursor (the most recent commit)
    pub fn current_label(&self) -> Option<&str> {
        self.cursor.map(|cursor| self.entries[cursor].label.as_str())
    }

    /// Label of the entry an undo would revert
    pub fn undo_label(&self) -> Option<&str> {
        let cursor = self.cursor?;
        if cursor == 0 {
            return None;
        }
        Some(&self.entries[cursor].label)
    }

    pub fn redo_label(&self) -> Option<&str> {
        let cursor = self.cursor?;
        self.entries.get(cursor + 1).map(|entry| entry.label.as_str())
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}
