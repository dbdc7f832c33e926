//! In-process settings backend.

use async_trait::async_trait;
use dashmap::DashMap;

use super::SettingsBackend;
use super::StoredLayout;
use crate::error::SettingsError;
use crate::model::TableId;

/// Layouts held in a `DashMap` for the lifetime of the process.
///
/// Used by tests and when no settings database is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    layouts: DashMap<TableId, StoredLayout>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tables with a stored layout.
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

#[async_trait]
impl SettingsBackend for MemoryStore {
    async fn fetch(&self, table: TableId) -> Result<Option<StoredLayout>, SettingsError> {
        Ok(self.layouts.get(&table).map(|entry| entry.value().clone()))
    }

    async fn put(&self, table: TableId, layout: StoredLayout) -> Result<(), SettingsError> {
        self.layouts.insert(table, layout);
        Ok(())
    }

    async fn clear(&self, table: TableId) -> Result<(), SettingsError> {
        self.layouts.remove(&table);
        Ok(())
    }
}
