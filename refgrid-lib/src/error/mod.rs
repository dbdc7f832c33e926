//! Error types

mod api;
mod settings;

pub use api::*;
pub use settings::*;

/// Top-level error for grid and backend operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The CRUD backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Reading or writing table settings failed.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// A row could not be converted to or from JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The requested action is not valid in the grid's current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// No row with the given identifier is loaded.
    #[error("row {0} not found")]
    RowNotFound(String),

    /// Writing an export file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
