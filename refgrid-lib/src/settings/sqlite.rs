//! SQLite layout storage.

use std::path::Path;

use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_sqlite::JournalMode;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use rusqlite::OptionalExtension;

use super::LayoutStore;
use super::SettingsBackend;
use super::StoredLayout;
use crate::error::SettingsError;
use crate::model::TableId;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS table_layouts (
    layout_key TEXT PRIMARY KEY,
    version INTEGER NOT NULL,
    layout BLOB NOT NULL,
    updated_at TEXT NOT NULL
)";

/// One row of `table_layouts` per table, keyed by
/// [`LayoutStore::key`].
///
/// Records already read or written are served from memory afterwards.
pub struct SqliteStore {
    client: Client,
    loaded: DashMap<TableId, Option<StoredLayout>>,
}

impl SqliteStore {
    /// Opens (or creates) a settings database at the given path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;
        Self::with_schema(client).await
    }

    /// Opens an in-memory database. Data is lost on drop.
    pub async fn open_in_memory() -> Result<Self, SettingsError> {
        let client = ClientBuilder::new().path(":memory:").open().await?;
        Self::with_schema(client).await
    }

    async fn with_schema(client: Client) -> Result<Self, SettingsError> {
        client.conn(|conn| conn.execute_batch(SCHEMA)).await?;
        Ok(Self {
            client,
            loaded: DashMap::new(),
        })
    }
}

#[async_trait]
impl SettingsBackend for SqliteStore {
    async fn fetch(&self, table: TableId) -> Result<Option<StoredLayout>, SettingsError> {
        if let Some(known) = self.loaded.get(&table) {
            return Ok(known.value().clone());
        }

        let key = LayoutStore::key(table);
        let layout = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT version, layout FROM table_layouts WHERE layout_key = ?1",
                    [&key],
                    |row| {
                        Ok(StoredLayout {
                            version: row.get(0)?,
                            blob: row.get(1)?,
                        })
                    },
                )
                .optional()
            })
            .await?;

        self.loaded.insert(table, layout.clone());
        Ok(layout)
    }

    async fn put(&self, table: TableId, layout: StoredLayout) -> Result<(), SettingsError> {
        let key = LayoutStore::key(table);
        let record = layout.clone();
        let updated_at = Utc::now().to_rfc3339();

        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT INTO table_layouts (layout_key, version, layout, updated_at)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(layout_key) DO UPDATE SET
                        version = excluded.version,
                        layout = excluded.layout,
                        updated_at = excluded.updated_at",
                    rusqlite::params![key, record.version, record.blob, updated_at],
                )
            })
            .await?;

        self.loaded.insert(table, Some(layout));
        Ok(())
    }

    async fn clear(&self, table: TableId) -> Result<(), SettingsError> {
        let key = LayoutStore::key(table);
        self.client
            .conn(move |conn| {
                conn.execute("DELETE FROM table_layouts WHERE layout_key = ?1", [&key])
            })
            .await?;

        self.loaded.insert(table, None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(version: u32, blob: &[u8]) -> StoredLayout {
        StoredLayout {
            version,
            blob: blob.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_put_fetch_clear() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        assert_eq!(store.fetch(TableId::Hospitals).await.unwrap(), None);

        store.put(TableId::Hospitals, layout(1, &[1, 2, 3])).await.unwrap();
        store.put(TableId::Notifications, layout(1, &[4])).await.unwrap();
        assert_eq!(
            store.fetch(TableId::Hospitals).await.unwrap(),
            Some(layout(1, &[1, 2, 3]))
        );

        store.clear(TableId::Hospitals).await.unwrap();
        assert_eq!(store.fetch(TableId::Hospitals).await.unwrap(), None);
        assert_eq!(
            store.fetch(TableId::Notifications).await.unwrap(),
            Some(layout(1, &[4]))
        );
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = std::env::temp_dir().join(format!("refgrid-layouts-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.db");

        {
            let store = SqliteStore::open(&path).await.unwrap();
            store.put(TableId::Hospitals, layout(1, &[7])).await.unwrap();
            store.put(TableId::Hospitals, layout(2, &[8, 9])).await.unwrap();
        }

        let reopened = SqliteStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.fetch(TableId::Hospitals).await.unwrap(),
            Some(layout(2, &[8, 9]))
        );
        std::fs::remove_dir_all(&dir).ok();
    }
}
