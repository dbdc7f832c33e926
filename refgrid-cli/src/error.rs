//! CLI error type.

use refgrid_lib::error::ApiError;
use refgrid_lib::error::SettingsError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Grid(#[from] refgrid_lib::Error),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to start logger: {0}")]
    Logger(String),

    #[error("{0}")]
    Usage(String),
}
