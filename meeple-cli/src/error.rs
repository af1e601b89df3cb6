use thiserror::Error;

/// Errors that surface at the top of a CLI command.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// BGG request or parse failure
    #[error("BGG error: {0}")]
    Bgg(#[from] meeple_bgg::BggError),

    /// Library store failure
    #[error("Database error: {0}")]
    Store(#[from] meeple_db::StoreError),

    /// Schema creation or migration failure
    #[error("Database error: {0}")]
    Schema(#[from] meeple_db::schema::SchemaError),

    /// Sync run aborted
    #[error("Sync failed: {0}")]
    Sync(#[from] meeple_sync::SyncError),

    /// JSON output failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
