//! Caller-facing errors for mirror operations.

use std::fmt;

use ledger_mirror_gateway::GatewayError;
use ledger_mirror_store::StoreError;
use thiserror::Error;

/// Classification of a failed operation.
///
/// This is what transports match on; the [`MirrorError`] carries the cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input, rejected before any I/O.
    InvalidArgument,
    /// The ledger node could not be reached or answered a read badly.
    GatewayUnavailable,
    /// The credential could not sign.
    SigningError,
    /// The transaction was not accepted.
    SubmissionError,
    /// The durable store failed.
    StoreUnavailable,
    /// The mirror row is missing.
    NotFound,
    /// The deadline passed.
    Timeout,
    /// The caller cancelled.
    Cancelled,
}

impl ErrorKind {
    /// Stable snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::GatewayUnavailable => "gateway_unavailable",
            ErrorKind::SigningError => "signing_error",
            ErrorKind::SubmissionError => "submission_error",
            ErrorKind::StoreUnavailable => "store_unavailable",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
        }
    }

    /// Whether the caller is at fault. Only `InvalidArgument` is; every other
    /// kind is a server-side failure.
    pub fn is_client_error(self) -> bool {
        matches!(self, ErrorKind::InvalidArgument)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the [`Coordinator`](crate::Coordinator).
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The input was rejected before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Gateway error.
    #[error("gateway error: {0}")]
    Gateway(GatewayError),

    /// Mirror store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl MirrorError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MirrorError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            MirrorError::Gateway(e) => match e {
                GatewayError::Config(_)
                | GatewayError::Unavailable(_)
                | GatewayError::Malformed(_)
                | GatewayError::UnexpectedType { .. } => ErrorKind::GatewayUnavailable,
                GatewayError::OutOfRange(_) => ErrorKind::InvalidArgument,
                GatewayError::Signing(_) => ErrorKind::SigningError,
                GatewayError::Submission(_) => ErrorKind::SubmissionError,
                GatewayError::Timeout => ErrorKind::Timeout,
                GatewayError::Cancelled => ErrorKind::Cancelled,
            },
            MirrorError::Store(e) => match e {
                StoreError::NotFound(_) => ErrorKind::NotFound,
                StoreError::Timeout => ErrorKind::Timeout,
                StoreError::Cancelled => ErrorKind::Cancelled,
                StoreError::Database(_)
                | StoreError::Migration(_)
                | StoreError::Task(_)
                | StoreError::Unavailable(_) => ErrorKind::StoreUnavailable,
            },
        }
    }
}

impl From<GatewayError> for MirrorError {
    fn from(e: GatewayError) -> Self {
        match e {
            // The contract cannot hold the value; the caller asked for it.
            GatewayError::OutOfRange(msg) => MirrorError::InvalidArgument(msg),
            other => MirrorError::Gateway(other),
        }
    }
}

/// Result type for coordinator operations.
pub type Result<T> = std::result::Result<T, MirrorError>;
