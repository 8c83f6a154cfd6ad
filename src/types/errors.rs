//! Error types for riasec.

use thiserror::Error;

/// Default result type for riasec.
pub type RiasecResult<T> = Result<T, RiasecError>;

/// Errors raised by the engine and its collaborators.
#[derive(Error, Debug)]
pub enum RiasecError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "cli")]
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Question provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Question provider returned no records")]
    EmptyResultSet,

    #[error("Snapshot failed validation: {0}")]
    ValidationFailed(String),

    #[error("Failed to persist snapshot: {0}")]
    StorageWriteFailed(String),

    #[error("A rebuild is already in progress")]
    RebuildInProgress,

    #[error("{0}")]
    Other(String),
}

impl RiasecError {
    /// Creates a generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a provider error.
    pub fn provider<S: Into<String>>(msg: S) -> Self {
        Self::ProviderUnavailable(msg.into())
    }

    /// Whether the engine answers this error by falling back to another snapshot
    /// source instead of surfacing it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::EmptyResultSet | Self::ValidationFailed(_)
        )
    }
}
