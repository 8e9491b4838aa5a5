//! The Coordinator: read, write, sync and check on top of a Gateway and a
//! Mirror.
//!
//! The ledger is the single source of truth. The mirror is a cache that only
//! `sync` writes, so it can lag the ledger at any moment, including right
//! after a successful `write`.

use std::sync::Arc;
use std::time::Duration;

use ledger_mirror_core::{AuthoritativeValue, CallContext, TxHash};
use ledger_mirror_gateway::Gateway;
use ledger_mirror_store::{InitResult, Mirror};

use crate::error::{MirrorError, Result};

/// Configuration for the Coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Deadline applied by [`Coordinator::context`]. `None` means no deadline.
    pub call_timeout: Option<Duration>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            call_timeout: Some(Duration::from_secs(15)),
        }
    }
}

/// The consistency coordinator.
///
/// Cheap to clone; clones share the same gateway and mirror. Operations may
/// run concurrently and are not serialized against each other.
pub struct Coordinator<G, M> {
    gateway: Arc<G>,
    mirror: Arc<M>,
    config: CoordinatorConfig,
}

impl<G, M> Clone for Coordinator<G, M> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            mirror: Arc::clone(&self.mirror),
            config: self.config.clone(),
        }
    }
}

impl<G: Gateway, M> Coordinator<G, M> {
    /// Create a coordinator that owns its components.
    pub fn new(gateway: G, mirror: M, config: CoordinatorConfig) -> Self {
        Self::from_shared(Arc::new(gateway), Arc::new(mirror), config)
    }

    /// Create a coordinator over components shared with the caller.
    pub fn from_shared(gateway: Arc<G>, mirror: Arc<M>, config: CoordinatorConfig) -> Self {
        Self {
            gateway,
            mirror,
            config,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// A fresh context for one operation, bounded by `call_timeout`.
    pub fn context(&self) -> CallContext {
        match self.config.call_timeout {
            Some(timeout) => CallContext::with_timeout(timeout),
            None => CallContext::background(),
        }
    }

    /// Current authoritative value, straight from the ledger.
    pub async fn read(&self, ctx: &CallContext) -> Result<AuthoritativeValue> {
        let value = self.gateway.read_authoritative(ctx).await?;
        tracing::debug!(value = %value, "read");
        Ok(value)
    }

    /// Submit a change to the ledger.
    ///
    /// `text` must be a base-10 integer. It is validated before the gateway
    /// is touched. The returned hash proves acceptance, not inclusion, and
    /// the mirror is left alone.
    pub async fn write(&self, ctx: &CallContext, text: &str) -> Result<TxHash> {
        let value = AuthoritativeValue::parse_decimal(text)
            .map_err(|e| MirrorError::InvalidArgument(e.to_string()))?;

        let tx = self.gateway.submit_change(ctx, &value).await?;
        tracing::info!(value = %value, tx = %tx, "write submitted");
        Ok(tx)
    }
}

/// Mirror operations. `read` and `write` above never touch the mirror, so a
/// coordinator used only for them can be built over `()`.
impl<G: Gateway, M: Mirror> Coordinator<G, M> {
    /// Create the mirror row if it is missing. Safe to call on every start.
    pub async fn initialize(&self, ctx: &CallContext) -> Result<InitResult> {
        let result = self.mirror.ensure_initialized(ctx).await?;
        match result {
            InitResult::Created => tracing::info!("mirror row created with default value"),
            InitResult::AlreadyPresent => tracing::debug!("mirror row already present"),
        }
        Ok(result)
    }

    /// Copy the authoritative value into the mirror and return it.
    ///
    /// A failed ledger read leaves the mirror untouched.
    pub async fn sync(&self, ctx: &CallContext) -> Result<AuthoritativeValue> {
        let value = self.gateway.read_authoritative(ctx).await?;
        self.mirror.write(ctx, &value.to_canonical_string()).await?;
        tracing::info!(value = %value, "mirror synced");
        Ok(value)
    }

    /// Whether the mirror matches the ledger right now.
    ///
    /// Both sides are read concurrently and compared as canonical decimal
    /// text. The answer can be stale by the time it is returned.
    pub async fn check(&self, ctx: &CallContext) -> Result<bool> {
        let (mirrored, authoritative) = tokio::try_join!(
            async { self.mirror.read(ctx).await.map_err(MirrorError::from) },
            async {
                self.gateway
                    .read_authoritative(ctx)
                    .await
                    .map_err(MirrorError::from)
            },
        )?;

        let authoritative = authoritative.to_canonical_string();
        let equal = mirrored == authoritative;
        if equal {
            tracing::debug!(value = %authoritative, "mirror matches ledger");
        } else {
            tracing::warn!(
                mirror = %mirrored,
                ledger = %authoritative,
                "mirror has drifted from ledger"
            );
        }
        Ok(equal)
    }
}
