use crate::models::Guide;

const HISTORY_CAP: usize = 50;

/// Bounded undo/redo stacks of full document snapshots.
///
/// Cheap because every document operation already returns a fresh value:
/// recording a snapshot is one clone, and undo/redo never replays edits.
#[derive(Debug, Default)]
pub struct History {
    undo: Vec<Guide>,
    redo: Vec<Guide>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the document state before an edit. Clears the redo stack and
    /// drops the oldest snapshot once the cap is reached.
    pub fn record(&mut self, snapshot: Guide) {
        if self.undo.len() >= HISTORY_CAP {
            self.undo.remove(0);
        }
        self.undo.push(snapshot);
        self.redo.clear();
    }

    /// Swaps the current document for the most recent snapshot, if any.
    pub fn undo(&mut self, current: Guide) -> Option<Guide> {
        let previous = self.undo.pop()?;
        self.redo.push(current);
        Some(previous)
    }

    pub fn redo(&mut self, current: Guide) -> Option<Guide> {
        let next = self.redo.pop()?;
        self.undo.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
