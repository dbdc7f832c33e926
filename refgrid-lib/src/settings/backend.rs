//! Storage for encoded table layouts.

use async_trait::async_trait;

use crate::error::SettingsError;
use crate::model::TableId;

/// One table's encoded layout as it sits in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLayout {
    /// Encoding version the blob was written with.
    pub version: u32,
    pub blob: Vec<u8>,
}

/// Persists at most one layout record per table.
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    async fn fetch(&self, table: TableId) -> Result<Option<StoredLayout>, SettingsError>;

    /// Inserts or replaces the table's record.
    async fn put(&self, table: TableId, layout: StoredLayout) -> Result<(), SettingsError>;

    /// Clearing a table with no record is not an error.
    async fn clear(&self, table: TableId) -> Result<(), SettingsError>;
}
