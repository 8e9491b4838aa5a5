//! The gateway abstraction the coordinator is written against.

use std::sync::Arc;

use async_trait::async_trait;
use ledger_mirror_core::{AuthoritativeValue, CallContext, TxHash};

use crate::error::Result;

/// Access to the authoritative value held by the ledger contract.
///
/// Implementations must be thread-safe (Send + Sync) and allow concurrent
/// calls. Neither operation retries on its own.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Query the contract's getter at the latest block.
    ///
    /// Read-only: no transaction is created and no signing key is used.
    async fn read_authoritative(&self, ctx: &CallContext) -> Result<AuthoritativeValue>;

    /// Sign and broadcast a transaction calling the contract's setter.
    ///
    /// Returns once the network has accepted the transaction, which is
    /// before it is included in a block. A read issued right after may still
    /// observe the previous value.
    async fn submit_change(&self, ctx: &CallContext, value: &AuthoritativeValue)
        -> Result<TxHash>;
}

#[async_trait]
impl<G: Gateway + ?Sized> Gateway for Arc<G> {
    async fn read_authoritative(&self, ctx: &CallContext) -> Result<AuthoritativeValue> {
        (**self).read_authoritative(ctx).await
    }

    async fn submit_change(
        &self,
        ctx: &CallContext,
        value: &AuthoritativeValue,
    ) -> Result<TxHash> {
        (**self).submit_change(ctx, value).await
    }
}
