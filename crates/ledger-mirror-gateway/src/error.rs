//! Error types for the gateway module.

use ledger_mirror_core::{CoreError, Interrupted};
use thiserror::Error;

/// Errors that can occur talking to the ledger.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Construction-time configuration problem (URL, address, key, ABI).
    #[error("invalid gateway configuration: {0}")]
    Config(String),

    /// The node could not be reached or rejected a read.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The node answered a read with data that does not decode.
    #[error("malformed ledger response: {0}")]
    Malformed(String),

    /// A decoded value had a different type than required.
    #[error("unexpected type in '{method}' return: expected {expected}, got {found}")]
    UnexpectedType {
        method: String,
        expected: &'static str,
        found: String,
    },

    /// The value cannot be represented by the contract's argument type.
    #[error("value out of range: {0}")]
    OutOfRange(String),

    /// The credential could not produce a signature.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Building or broadcasting a transaction failed.
    #[error("transaction submission failed: {0}")]
    Submission(String),

    /// The caller's deadline passed.
    #[error("ledger call timed out")]
    Timeout,

    /// The caller cancelled the call.
    #[error("ledger call cancelled")]
    Cancelled,
}

impl From<Interrupted> for GatewayError {
    fn from(e: Interrupted) -> Self {
        match e {
            Interrupted::Timeout => GatewayError::Timeout,
            Interrupted::Cancelled => GatewayError::Cancelled,
        }
    }
}

impl From<CoreError> for GatewayError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Signing(msg) => GatewayError::Signing(msg),
            other => GatewayError::Config(other.to_string()),
        }
    }
}

impl GatewayError {
    /// Reclassify a transport/node failure that happened while submitting.
    ///
    /// The JSON-RPC layer reports every failure as `Unavailable` or
    /// `Malformed`; on the write path those mean the transaction was not
    /// accepted.
    pub(crate) fn into_submission(self) -> Self {
        match self {
            GatewayError::Unavailable(msg) | GatewayError::Malformed(msg) => {
                GatewayError::Submission(msg)
            }
            other => other,
        }
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
