//! Mirror trait: the abstract interface for the durable copy of the value.
//!
//! The mirror owns exactly one row. Implementations include SQLite (primary)
//! and in-memory (for tests).

use async_trait::async_trait;
use ledger_mirror_core::CallContext;

use crate::error::Result;

/// Primary key of the only meaningful row.
pub const SINGLETON_ID: i64 = 1;

/// Value written when the row is first created.
pub const DEFAULT_VALUE: &str = "0";

/// Result of [`Mirror::ensure_initialized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitResult {
    /// The row did not exist and was inserted with [`DEFAULT_VALUE`].
    Created,
    /// The row already existed (idempotent - not an error). Its value was
    /// left as is.
    AlreadyPresent,
}

/// The Mirror trait: async interface for the single persisted value.
///
/// All methods take the caller's [`CallContext`] and give up with
/// `Timeout`/`Cancelled` when it expires.
///
/// # Design Notes
///
/// - **Idempotent init**: check-then-insert, never an unconditional insert.
/// - **Unconditional overwrite**: `write` replaces the value; there is no
///   version column and no compare-and-swap. Concurrent writers are
///   last-write-wins, each write applied as one row update.
/// - **Opaque text**: the mirror stores whatever string it is given. The
///   caller is responsible for handing it canonical text.
#[async_trait]
pub trait Mirror: Send + Sync {
    /// Create the backing structure if absent and insert the singleton row
    /// with [`DEFAULT_VALUE`] if absent. Safe to call on every start.
    async fn ensure_initialized(&self, ctx: &CallContext) -> Result<InitResult>;

    /// Overwrite the singleton row's value.
    ///
    /// Returns `NotFound` if the row does not exist.
    async fn write(&self, ctx: &CallContext, value: &str) -> Result<()>;

    /// Read the singleton row's value.
    ///
    /// Returns `NotFound` if the row does not exist.
    async fn read(&self, ctx: &CallContext) -> Result<String>;
}

#[async_trait]
impl<M: Mirror + ?Sized> Mirror for std::sync::Arc<M> {
    async fn ensure_initialized(&self, ctx: &CallContext) -> Result<InitResult> {
        (**self).ensure_initialized(ctx).await
    }

    async fn write(&self, ctx: &CallContext, value: &str) -> Result<()> {
        (**self).write(ctx, value).await
    }

    async fn read(&self, ctx: &CallContext) -> Result<String> {
        (**self).read(ctx).await
    }
}
