//! Error types for the store module.

use ledger_mirror_core::Interrupted;
use thiserror::Error;

/// Errors that can occur during mirror operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The singleton row is missing.
    #[error("mirror row not found: {0}")]
    NotFound(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// The blocking worker running the query failed.
    #[error("storage task failed: {0}")]
    Task(String),

    /// Injected or backend-reported storage fault.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The caller's deadline passed.
    #[error("storage call timed out")]
    Timeout,

    /// The caller cancelled the call.
    #[error("storage call cancelled")]
    Cancelled,
}

impl From<Interrupted> for StoreError {
    fn from(e: Interrupted) -> Self {
        match e {
            Interrupted::Timeout => StoreError::Timeout,
            Interrupted::Cancelled => StoreError::Cancelled,
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
