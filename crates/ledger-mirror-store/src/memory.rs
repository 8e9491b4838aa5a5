//! In-memory implementation of the Mirror trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps the row in memory with no persistence, and can be told to
//! fail so callers' error paths can be exercised.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use ledger_mirror_core::CallContext;
use parking_lot::RwLock;

use crate::error::{Result, StoreError};
use crate::traits::{InitResult, Mirror, DEFAULT_VALUE, SINGLETON_ID};

/// In-memory mirror.
///
/// All data is lost when the mirror is dropped. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryMirror {
    row: RwLock<Option<String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryMirror {
    /// Create a mirror with no row (as if `ensure_initialized` never ran).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mirror whose row already holds `value`.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            row: RwLock::new(Some(value.into())),
            ..Self::default()
        }
    }

    /// Make subsequent reads fail with `Unavailable`.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail with `Unavailable`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current row contents, bypassing fault injection.
    pub fn snapshot(&self) -> Option<String> {
        self.row.read().clone()
    }
}

#[async_trait]
impl Mirror for MemoryMirror {
    async fn ensure_initialized(&self, ctx: &CallContext) -> Result<InitResult> {
        ctx.check()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }

        let mut row = self.row.write();
        if row.is_some() {
            return Ok(InitResult::AlreadyPresent);
        }
        *row = Some(DEFAULT_VALUE.to_string());
        Ok(InitResult::Created)
    }

    async fn write(&self, ctx: &CallContext, value: &str) -> Result<()> {
        ctx.check()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }

        let mut row = self.row.write();
        match row.as_mut() {
            Some(current) => {
                *current = value.to_string();
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("id = {}", SINGLETON_ID))),
        }
    }

    async fn read(&self, ctx: &CallContext) -> Result<String> {
        ctx.check()?;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".into()));
        }

        self.row
            .read()
            .clone()
            .ok_or_else(|| StoreError::NotFound(format!("id = {}", SINGLETON_ID)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_then_read() {
        let mirror = MemoryMirror::new();
        let ctx = CallContext::background();

        assert!(matches!(mirror.read(&ctx).await, Err(StoreError::NotFound(_))));
        assert_eq!(
            mirror.ensure_initialized(&ctx).await.unwrap(),
            InitResult::Created
        );
        assert_eq!(mirror.read(&ctx).await.unwrap(), "0");
    }

    #[tokio::test]
    async fn test_init_keeps_existing() {
        let mirror = MemoryMirror::with_value("5");
        let ctx = CallContext::background();

        assert_eq!(
            mirror.ensure_initialized(&ctx).await.unwrap(),
            InitResult::AlreadyPresent
        );
        assert_eq!(mirror.snapshot().as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let mirror = MemoryMirror::with_value("5");
        let ctx = CallContext::background();

        mirror.set_fail_writes(true);
        assert!(matches!(
            mirror.write(&ctx, "6").await,
            Err(StoreError::Unavailable(_))
        ));
        assert_eq!(mirror.write_count(), 0);
        assert_eq!(mirror.snapshot().as_deref(), Some("5"));

        mirror.set_fail_reads(true);
        assert!(matches!(
            mirror.read(&ctx).await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
