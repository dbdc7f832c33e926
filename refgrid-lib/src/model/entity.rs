//! Entity capability contract

use std::fmt;

use super::ColumnDescriptor;
use super::Row;

/// Stable identity of a table.
///
/// Used as the settings key so layout survives title changes or localization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableId {
    /// Hospital reference records.
    Hospitals,
    /// Notification records.
    Notifications,
}

impl TableId {
    /// Returns the slug used in settings keys and export file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Hospitals => "hospitals",
            Self::Notifications => "notifications",
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Backend path segments for one entity collection.
///
/// # Examples
///
/// ```
/// use refgrid_lib::model::Endpoints;
///
/// let endpoints = Endpoints::uniform("hospitals");
/// assert_eq!(endpoints.item_path("12"), "hospitals/12");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// `GET` path returning every record.
    pub list: String,
    /// `POST` path creating a record.
    pub create: String,
    /// Prefix for `PUT`/`DELETE` by id.
    pub item: String,
}

impl Endpoints {
    /// Uses the same path for list, create and item access.
    pub fn uniform(collection: impl Into<String>) -> Self {
        let collection = collection.into();
        Self {
            list: collection.clone(),
            create: collection.clone(),
            item: collection,
        }
    }

    /// Creates endpoints with distinct paths.
    pub fn new(list: impl Into<String>, create: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            list: list.into(),
            create: create.into(),
            item: item.into(),
        }
    }

    /// Returns the path addressing a single record.
    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.item.trim_end_matches('/'), urlencoding::encode(id))
    }
}

/// Everything a grid needs to know about one kind of record.
///
/// A grid is generic over this contract instead of over untyped data: the
/// identifier field, the column set, the formatter that normalizes backend
/// records, and where the records live.
pub trait Entity: Send + Sync + 'static {
    /// Stable table identity.
    const TABLE: TableId;
    /// Human-readable table title.
    const TITLE: &'static str;
    /// Row key holding the unique identifier.
    const ID_FIELD: &'static str;

    /// Backend paths for this collection.
    fn endpoints() -> Endpoints;

    /// Columns in display order.
    fn columns() -> Vec<ColumnDescriptor>;

    /// Normalizes a raw backend record. Never fails.
    fn format(raw: &serde_json::Value) -> Row;

    /// Local records served when the backend is unreachable.
    fn sample_records() -> Vec<serde_json::Value> {
        Vec::new()
    }
}
