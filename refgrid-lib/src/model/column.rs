//! Column descriptors

/// Describes one grid column.
///
/// `accessor` must match a [`Row`](super::Row) key. Width and visibility are
/// layout state owned by the grid and persisted in the table settings, never
/// sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Row key this column reads.
    pub accessor: String,
    /// Header text.
    pub title: String,
    /// Current width in pixels.
    pub width: u32,
    /// Whether the column is shown.
    pub visible: bool,
}

impl ColumnDescriptor {
    /// Creates a visible column.
    pub fn new(accessor: impl Into<String>, title: impl Into<String>, width: u32) -> Self {
        Self {
            accessor: accessor.into(),
            title: title.into(),
            width,
            visible: true,
        }
    }
}
