//! Pending cell changes and save results

use std::collections::HashMap;

use crate::model::Row;
use crate::model::Value;

/// A cell edited locally but not yet confirmed by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingChange {
    pub row_id: String,
    pub column_id: String,
    /// Value before the first unsaved edit.
    pub old_value: Value,
    pub new_value: Value,
}

/// Rendering annotation of a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellStatus {
    #[default]
    Unset,
    /// The cell has an unsaved change.
    Modified,
}

/// Ordered set of pending changes, at most one per cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingChanges {
    entries: Vec<PendingChange>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a change. A later change to the same cell overwrites
    /// `new_value` in place and keeps the original `old_value`.
    pub fn upsert(&mut self, row_id: &str, column_id: &str, old_value: Value, new_value: Value) {
        match self.position(row_id, column_id) {
            Some(index) => self.entries[index].new_value = new_value,
            None => self.entries.push(PendingChange {
                row_id: row_id.to_string(),
                column_id: column_id.to_string(),
                old_value,
                new_value,
            }),
        }
    }

    pub fn get(&self, row_id: &str, column_id: &str) -> Option<&PendingChange> {
        self.position(row_id, column_id).map(|i| &self.entries[i])
    }

    pub fn contains(&self, row_id: &str, column_id: &str) -> bool {
        self.position(row_id, column_id).is_some()
    }

    pub fn remove(&mut self, row_id: &str, column_id: &str) -> Option<PendingChange> {
        self.position(row_id, column_id)
            .map(|i| self.entries.remove(i))
    }

    /// Drops every change belonging to a row.
    pub fn remove_row(&mut self, row_id: &str) {
        self.entries.retain(|c| c.row_id != row_id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingChange> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Status of a cell for rendering.
    pub fn status(&self, row_id: &str, column_id: &str) -> CellStatus {
        if self.contains(row_id, column_id) {
            CellStatus::Modified
        } else {
            CellStatus::Unset
        }
    }

    /// Builds the changes that turn `baseline` into `current`.
    ///
    /// Rows are matched by identifier; rows missing from either side are
    /// skipped. The identifier column itself is never reported.
    pub fn diff(baseline: &[Row], current: &[Row], id_field: &str) -> Self {
        let saved: HashMap<String, &Row> = baseline
            .iter()
            .map(|row| (row.id_key(id_field), row))
            .collect();

        let mut changes = Self::new();
        for row in current {
            let row_id = row.id_key(id_field);
            let Some(saved_row) = saved.get(&row_id) else {
                continue;
            };

            let mut columns: Vec<&String> = row
                .fields()
                .keys()
                .chain(saved_row.fields().keys())
                .filter(|column| column.as_str() != id_field)
                .collect();
            columns.sort();
            columns.dedup();

            for column in columns {
                let old_value = saved_row.value(column);
                let new_value = row.value(column);
                if old_value != new_value {
                    changes.upsert(&row_id, column, old_value.clone(), new_value.clone());
                }
            }
        }
        changes
    }

    fn position(&self, row_id: &str, column_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|c| c.row_id == row_id && c.column_id == column_id)
    }
}

/// Outcome of persisting one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveResult {
    pub row_id: String,
    pub column_id: String,
    pub success: bool,
    pub message: String,
}

impl SaveResult {
    pub fn succeeded(row_id: &str, column_id: &str) -> Self {
        Self {
            row_id: row_id.to_string(),
            column_id: column_id.to_string(),
            success: true,
            message: format!("Successfully updated {} for item {}", column_id, row_id),
        }
    }

    pub fn failed(row_id: &str, column_id: &str, error: impl std::fmt::Display) -> Self {
        Self {
            row_id: row_id.to_string(),
            column_id: column_id.to_string(),
            success: false,
            message: format!("Failed to update {}: {}", column_id, error),
        }
    }
}

/// Success and failure counts of a save batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl SaveSummary {
    pub fn from_results(results: &[SaveResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            succeeded,
            failed: results.len() - succeeded,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}
