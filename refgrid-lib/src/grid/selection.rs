//! Row and cell selection.
//!
//! Selection is tracked by string IDs so it stays stable when rows are
//! re-sorted, filtered or paged.

use std::collections::HashSet;

use super::events::Modifiers;

/// Key identifying one cell: `"<rowId>-<columnId>"`.
pub fn cell_key(row_id: &str, column: &str) -> String {
    format!("{}-{}", row_id, column)
}

/// ID-based row selection with a range anchor.
#[derive(Debug, Clone, Default)]
pub struct RowSelection {
    /// Currently selected IDs
    selected: HashSet<String>,
    /// Anchor for range selection (Shift+click starting point)
    anchor: Option<String>,
}

impl RowSelection {
    /// Create a new empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all selected IDs (sorted for deterministic ordering).
    pub fn selected(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Check if an ID is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Get the number of selected items.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Get the anchor ID for range selection.
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// Clear all selection and the anchor.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }

    /// Drops an ID from the selection, e.g. after its row was deleted.
    pub fn forget(&mut self, id: &str) {
        self.selected.remove(id);
        if self.anchor.as_deref() == Some(id) {
            self.anchor = None;
        }
    }

    /// Select a single ID (clears others) and make it the anchor.
    pub fn select(&mut self, id: &str) {
        self.selected.clear();
        self.selected.insert(id.to_string());
        self.anchor = Some(id.to_string());
    }

    /// Toggle selection of an ID and make it the anchor.
    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
        self.anchor = Some(id.to_string());
    }

    /// Replace the selection with the rows between the anchor and `target_id`.
    ///
    /// `ordered_ids` is the order the user sees. Nothing changes if either
    /// end is not in it. The anchor is kept so further shift-clicks pivot
    /// around the same row.
    pub fn range_select(&mut self, target_id: &str, ordered_ids: &[String]) -> bool {
        let Some(anchor) = self.anchor.as_deref() else {
            return false;
        };
        let anchor_pos = ordered_ids.iter().position(|id| id == anchor);
        let target_pos = ordered_ids.iter().position(|id| id == target_id);

        let (start, end) = match (anchor_pos, target_pos) {
            (Some(a), Some(t)) => (a.min(t), a.max(t)),
            _ => return false,
        };

        self.selected = ordered_ids[start..=end].iter().cloned().collect();
        true
    }

    /// Applies a click on a row.
    ///
    /// Mod-click toggles, shift-click with an anchor selects a range over
    /// `ordered_ids`, a plain click selects only that row.
    pub fn click(&mut self, id: &str, modifiers: Modifiers, ordered_ids: &[String]) {
        if modifiers.is_mod() {
            self.toggle(id);
        } else if modifiers.shift && self.anchor.is_some() {
            self.range_select(id, ordered_ids);
        } else {
            self.select(id);
        }
    }
}

/// Set of selected cells, independent of row selection.
#[derive(Debug, Clone, Default)]
pub struct CellSelection {
    selected: HashSet<String>,
}

impl CellSelection {
    /// Create a new empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a click on a cell: mod-click toggles membership, a plain
    /// click replaces the selection.
    pub fn click(&mut self, row_id: &str, column: &str, modifiers: Modifiers) {
        let key = cell_key(row_id, column);
        if modifiers.is_mod() {
            if !self.selected.remove(&key) {
                self.selected.insert(key);
            }
        } else {
            self.selected.clear();
            self.selected.insert(key);
        }
    }

    /// Check if a cell is selected.
    pub fn is_selected(&self, row_id: &str, column: &str) -> bool {
        self.selected.contains(&cell_key(row_id, column))
    }

    /// Selected cell keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.selected.iter().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_plain_click_replaces() {
        let order = ids(&["1", "2", "3"]);
        let mut selection = RowSelection::new();

        selection.click("1", Modifiers::NONE, &order);
        selection.click("2", Modifiers::NONE, &order);

        assert_eq!(selection.selected(), vec!["2"]);
        assert_eq!(selection.anchor(), Some("2"));
    }

    #[test]
    fn test_mod_click_toggles() {
        let order = ids(&["1", "2", "3"]);
        let mut selection = RowSelection::new();

        selection.click("1", Modifiers::CTRL, &order);
        selection.click("3", Modifiers::CTRL, &order);
        assert_eq!(selection.selected(), vec!["1", "3"]);

        selection.click("1", Modifiers::CTRL, &order);
        assert_eq!(selection.selected(), vec!["3"]);
        assert_eq!(selection.anchor(), Some("1"));
    }

    #[test]
    fn test_shift_click_selects_visual_range() {
        let order = ids(&["5", "3", "9", "1"]);
        let mut selection = RowSelection::new();

        selection.click("3", Modifiers::NONE, &order);
        selection.click("1", Modifiers::SHIFT, &order);

        assert_eq!(selection.selected(), vec!["1", "3", "9"]);
        assert_eq!(selection.anchor(), Some("3"));
    }

    #[test]
    fn test_shift_click_outside_page_is_ignored() {
        let order = ids(&["1", "2"]);
        let mut selection = RowSelection::new();

        selection.click("1", Modifiers::NONE, &order);
        selection.click("7", Modifiers::SHIFT, &order);

        assert_eq!(selection.selected(), vec!["1"]);
    }

    #[test]
    fn test_shift_click_without_anchor_selects_one() {
        let order = ids(&["1", "2"]);
        let mut selection = RowSelection::new();

        selection.click("2", Modifiers::SHIFT, &order);
        assert_eq!(selection.selected(), vec!["2"]);
    }

    #[test]
    fn test_cell_selection() {
        let mut cells = CellSelection::new();

        cells.click("1", "name", Modifiers::NONE);
        cells.click("2", "name", Modifiers::CTRL);
        assert_eq!(cells.keys(), vec!["1-name", "2-name"]);

        cells.click("1", "name", Modifiers::CTRL);
        assert_eq!(cells.keys(), vec!["2-name"]);

        cells.click("3", "type", Modifiers::NONE);
        assert!(cells.is_selected("3", "type"));
        assert_eq!(cells.len(), 1);
    }
}
