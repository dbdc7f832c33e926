//! Per-table layout settings.
//!
//! Each table's [`TableSettings`] is stored as one versioned bincode record,
//! keyed by the table's stable [`TableId`], behind a pluggable
//! [`SettingsBackend`].

mod backend;
mod memory;
mod sqlite;

pub use backend::SettingsBackend;
pub use backend::StoredLayout;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::error::SettingsError;
use crate::model::TableId;

/// Alternating row background palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RowColorScheme {
    #[default]
    WhiteGreen,
    LightGreen,
    LightBlue,
}

impl RowColorScheme {
    /// Background for an unselected row at the given index within the page.
    pub fn stripe(&self, index: usize) -> &'static str {
        let even = index % 2 == 0;
        match (self, even) {
            (Self::WhiteGreen, true) => "#ffffff",
            (Self::WhiteGreen, false) => "#f0faf5",
            (Self::LightGreen, true) => "#f6fdf9",
            (Self::LightGreen, false) => "#e3f5ea",
            (Self::LightBlue, true) => "#f7fbff",
            (Self::LightBlue, false) => "#e8f1fb",
        }
    }

    /// Background for a selected row.
    pub fn selected(&self) -> &'static str {
        match self {
            Self::WhiteGreen | Self::LightGreen => "#e6f7ef",
            Self::LightBlue => "#d6e8fa",
        }
    }
}

/// Layout and behaviour preferences for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSettings {
    pub row_color_scheme: RowColorScheme,
    /// Row height in pixels.
    pub row_height: u32,
    pub enable_virtualization: bool,
    /// Ask before a refresh discards pending changes.
    pub confirm_before_refresh: bool,
    pub auto_save: bool,
    /// Column accessor to visibility. Columns absent from the map are visible.
    pub visible_columns: BTreeMap<String, bool>,
    /// Column accessor to width override in pixels.
    pub column_widths: BTreeMap<String, u32>,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            row_color_scheme: RowColorScheme::default(),
            row_height: 25,
            enable_virtualization: false,
            confirm_before_refresh: true,
            auto_save: false,
            visible_columns: BTreeMap::new(),
            column_widths: BTreeMap::new(),
        }
    }
}

impl TableSettings {
    /// Returns `true` unless the column was explicitly hidden.
    pub fn is_visible(&self, accessor: &str) -> bool {
        self.visible_columns.get(accessor).copied().unwrap_or(true)
    }
}

/// Encoding version of [`TableSettings`] records. Records written with any
/// other version are ignored on load.
pub const LAYOUT_VERSION: u32 = 1;

/// Loads, saves and resets table layouts over a [`SettingsBackend`].
#[derive(Clone)]
pub struct LayoutStore {
    backend: Arc<dyn SettingsBackend>,
}

impl LayoutStore {
    pub fn new(backend: impl SettingsBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Creates a store that keeps everything in memory.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Record key for a table's layout.
    pub fn key(table: TableId) -> String {
        format!("{}-table-settings", table.slug())
    }

    /// Loads a table's settings.
    ///
    /// Returns defaults when nothing is stored, when the record was written
    /// with another [`LAYOUT_VERSION`], or when it no longer decodes.
    pub async fn load(&self, table: TableId) -> Result<TableSettings, SettingsError> {
        let Some(stored) = self.backend.fetch(table).await? else {
            return Ok(TableSettings::default());
        };
        if stored.version != LAYOUT_VERSION {
            log::warn!(
                "Ignoring {} layout written with version {}",
                table,
                stored.version
            );
            return Ok(TableSettings::default());
        }
        match bincode::deserialize(&stored.blob) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                log::warn!("Discarding unreadable {} layout: {}", table, e);
                Ok(TableSettings::default())
            }
        }
    }

    pub async fn save(&self, table: TableId, settings: &TableSettings) -> Result<(), SettingsError> {
        let blob = bincode::serialize(settings).map_err(SettingsError::Serialization)?;
        let layout = StoredLayout {
            version: LAYOUT_VERSION,
            blob,
        };
        self.backend.put(table, layout).await
    }

    /// Forgets a table's saved layout so the next load yields defaults.
    pub async fn reset(&self, table: TableId) -> Result<(), SettingsError> {
        self.backend.clear(table).await
    }
}

impl std::fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutStore").finish_non_exhaustive()
    }
}
