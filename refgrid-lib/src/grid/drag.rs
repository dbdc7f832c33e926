//! Drag-fill state machine

use crate::model::Value;

/// Pointer drag state.
///
/// A drag starts on a cell holding a real value and fills that value into
/// other cells of the same column as the pointer passes over them.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        value: Value,
        column: String,
        /// Cells changed during this gesture.
        touched: usize,
    },
}

impl DragState {
    /// Starts a drag from a cell. Returns `false` and stays idle if the value
    /// is falsy or the null placeholder.
    pub fn begin(&mut self, value: &Value, column: &str) -> bool {
        if !value.is_fillable() {
            return false;
        }
        *self = Self::Dragging {
            value: value.clone(),
            column: column.to_string(),
            touched: 0,
        };
        true
    }

    /// Ends the drag. Returns how many cells the gesture changed, or `None`
    /// if no drag was active.
    pub fn end(&mut self) -> Option<usize> {
        match std::mem::take(self) {
            Self::Dragging { touched, .. } => Some(touched),
            Self::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// The value being dragged, if the drag is over `column`.
    pub fn value_for(&self, column: &str) -> Option<&Value> {
        match self {
            Self::Dragging {
                value, column: c, ..
            } if c == column => Some(value),
            _ => None,
        }
    }

    /// The column being dragged.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Dragging { column, .. } => Some(column),
            Self::Idle => None,
        }
    }

    pub(crate) fn mark_touched(&mut self) {
        if let Self::Dragging { touched, .. } = self {
            *touched += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_requires_fillable_value() {
        let mut drag = DragState::default();
        assert!(!drag.begin(&Value::na(), "type"));
        assert!(!drag.begin(&Value::from(""), "type"));
        assert!(!drag.begin(&Value::Null, "type"));
        assert!(!drag.begin(&Value::from(false), "active"));
        assert!(!drag.begin(&Value::from(0), "capacity"));
        assert!(!drag.is_dragging());

        assert!(drag.begin(&Value::from("Public"), "type"));
        assert_eq!(drag.value_for("type"), Some(&Value::from("Public")));
        assert_eq!(drag.value_for("name"), None);
    }

    #[test]
    fn test_end_reports_touched() {
        let mut drag = DragState::default();
        drag.begin(&Value::from(3), "capacity");
        drag.mark_touched();
        drag.mark_touched();

        assert_eq!(drag.end(), Some(2));
        assert_eq!(drag, DragState::Idle);
        assert_eq!(drag.end(), None);
    }
}
