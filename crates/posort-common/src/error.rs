//! Error types for posort

use thiserror::Error;

/// Result type alias for posort operations
pub type Result<T> = std::result::Result<T, PosortError>;

/// Main error type for posort
#[derive(Error, Debug)]
pub enum PosortError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Ledger object '{object}' exists but could not be deserialized: {reason}")]
    LedgerCorrupt { object: String, reason: String },

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Manifest parse error: {0}")]
    ManifestParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl PosortError {
    /// Whether this error is the cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PosortError::Cancelled)
    }
}
