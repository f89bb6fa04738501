//! Explicit manuscript state with bounded undo/redo.
//!
//! [`ManuscriptStore`] owns the current manuscript as a list of snapshots.
//! Every successful edit pushes a new snapshot; undo and redo move a cursor
//! over them. Edits always patch the snapshot under the cursor, so a
//! sequence of patches is applied to the latest document, never a stale one.

use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::models::Patch;
use crate::patch::{apply_patch, MatchTier, PatchError, Patched};

pub const DEFAULT_MAX_HISTORY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    Initial,
    PartialEdit,
    DirectEdit,
}

/// What a partial edit replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditDetail {
    pub original: String,
    pub replacement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
    pub tier: MatchTier,
    /// Char range of the previous snapshot that was replaced.
    pub replaced: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub action: EditAction,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<EditDetail>,
}

impl HistoryEntry {
    fn new(action: EditAction, content: String, detail: Option<EditDetail>) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            content,
            timestamp: Utc::now(),
            detail,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ManuscriptStore {
    history: Vec<HistoryEntry>,
    cursor: usize,
    max_entries: usize,
}

impl ManuscriptStore {
    pub fn new(initial: impl Into<String>) -> Self {
        Self::with_capacity(initial, DEFAULT_MAX_HISTORY)
    }

    /// A store keeping at most `max_entries` snapshots (at least one).
    pub fn with_capacity(initial: impl Into<String>, max_entries: usize) -> Self {
        Self {
            history: vec![HistoryEntry::new(EditAction::Initial, initial.into(), None)],
            cursor: 0,
            max_entries: max_entries.max(1),
        }
    }

    pub fn current(&self) -> &str {
        &self.history[self.cursor].content
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }

    /// Patch the current manuscript. Nothing is recorded on failure.
    pub fn apply_edit(&mut self, patch: &Patch, request: Option<&str>) -> Result<Patched, PatchError> {
        let patched = apply_patch(self.current(), patch)?;
        let detail = EditDetail {
            original: patch.selection.text.clone(),
            replacement: patch.replacement.clone(),
            request: request.map(str::to_string),
            tier: patched.tier,
            replaced: patched.replaced.clone(),
        };
        self.push(EditAction::PartialEdit, patched.document.clone(), Some(detail));
        Ok(patched)
    }

    /// Replace the whole manuscript, as after a direct edit.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.push(EditAction::DirectEdit, content.into(), None);
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        true
    }

    fn push(&mut self, action: EditAction, content: String, detail: Option<EditDetail>) {
        self.history.truncate(self.cursor + 1);
        self.history.push(HistoryEntry::new(action, content, detail));
        if self.history.len() > self.max_entries {
            let dropped = self.history.len() - self.max_entries;
            self.history.drain(..dropped);
        }
        self.cursor = self.history.len() - 1;
        debug!(?action, entries = self.history.len(), "history updated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Selection;

    fn patch(text: &str, replacement: &str) -> Patch {
        Patch {
            selection: Selection::new(text),
            replacement: replacement.to_string(),
        }
    }

    #[test]
    fn test_sequential_edits_use_latest_document() {
        let mut store = ManuscriptStore::new("아침에 일어났다. 학교에 갔다.");
        store.apply_edit(&patch("아침에", "새벽에"), None).unwrap();
        store
            .apply_edit(&patch("새벽에 일어났다.", "새벽 다섯 시에 일어났다."), Some("자세히"))
            .unwrap();
        assert_eq!(store.current(), "새벽 다섯 시에 일어났다. 학교에 갔다.");
        assert_eq!(store.entries().len(), 3);
        let detail = store.entries()[2].detail.as_ref().unwrap();
        assert_eq!(detail.request.as_deref(), Some("자세히"));
        assert_eq!(detail.tier, MatchTier::Exact);
        assert_eq!(detail.replaced, 0..9);
    }

    #[test]
    fn test_failed_edit_records_nothing() {
        let mut store = ManuscriptStore::new("hello world");
        let err = store.apply_edit(&patch("absent", "x"), None).unwrap_err();
        assert_eq!(err, PatchError::NotFound);
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.current(), "hello world");
    }

    #[test]
    fn test_undo_redo() {
        let mut store = ManuscriptStore::new("one");
        store.set_content("two");
        store.set_content("three");

        assert!(store.undo());
        assert_eq!(store.current(), "two");
        assert!(store.undo());
        assert_eq!(store.current(), "one");
        assert!(!store.undo());

        assert!(store.redo());
        assert_eq!(store.current(), "two");
    }

    #[test]
    fn test_edit_after_undo_drops_redo_branch() {
        let mut store = ManuscriptStore::new("one");
        store.set_content("two");
        store.undo();
        store.set_content("branch");
        assert!(!store.can_redo());
        assert_eq!(store.entries().len(), 2);
        assert_eq!(store.current(), "branch");
    }

    #[test]
    fn test_history_bounded() {
        let mut store = ManuscriptStore::with_capacity("v0", 3);
        for i in 1..=5 {
            store.set_content(format!("v{i}"));
        }
        let contents: Vec<&str> = store.entries().iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["v3", "v4", "v5"]);
        assert_eq!(store.current(), "v5");
        assert!(store.undo());
        assert!(store.undo());
        assert!(!store.undo());
    }
}
