//! Error types for the ledger mirror core.

use thiserror::Error;

/// Core errors raised by value parsing, key handling, and encoding.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid decimal integer: {0:?}")]
    InvalidDecimal(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("signing failed: {0}")]
    Signing(String),
}

impl From<hex::FromHexError> for CoreError {
    fn from(e: hex::FromHexError) -> Self {
        CoreError::InvalidHex(e.to_string())
    }
}

/// Why an operation bounded by a [`CallContext`](crate::CallContext) stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    /// The context's deadline passed before the operation finished.
    #[error("deadline exceeded")]
    Timeout,

    /// The context's cancellation token fired.
    #[error("cancelled by caller")]
    Cancelled,
}
