//! Snapshot-based undo/redo

use crate::model::Row;

/// Linear undo/redo log of full row-collection snapshots.
///
/// There is always at least one entry, and the cursor always points at one.
/// Recording after an undo discards the entries past the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: Vec<Vec<Row>>,
    cursor: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl History {
    /// Starts a history whose only entry is `initial`.
    pub fn new(initial: Vec<Row>) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    /// Discards everything and starts over from `initial`.
    pub fn reset(&mut self, initial: Vec<Row>) {
        self.entries = vec![initial];
        self.cursor = 0;
    }

    /// Appends `snapshot` if it differs from the current entry.
    ///
    /// Returns `true` if an entry was added.
    pub fn record(&mut self, snapshot: &[Row]) -> bool {
        if self.current() == snapshot {
            return false;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot.to_vec());
        self.cursor = self.entries.len() - 1;
        log::debug!("History entry {} recorded", self.cursor);
        true
    }

    /// Steps back and returns the restored snapshot.
    pub fn undo(&mut self) -> Option<&[Row]> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Steps forward and returns the restored snapshot.
    pub fn redo(&mut self) -> Option<&[Row]> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// The snapshot at the cursor.
    pub fn current(&self) -> &[Row] {
        &self.entries[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: a history holds at least one entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
