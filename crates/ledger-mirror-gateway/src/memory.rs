//! In-memory ledger for testing.
//!
//! Models the parts of a real node the coordinator can observe: submitted
//! changes sit in a pending pool until [`MemoryLedger::confirm_pending`]
//! includes them, reads see only included state, and every call is counted.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ledger_mirror_core::{keccak256, AuthoritativeValue, CallContext, TxHash};
use parking_lot::Mutex;

use crate::abi::ContractInterface;
use crate::error::{GatewayError, Result};
use crate::traits::Gateway;

struct LedgerState {
    value: AuthoritativeValue,
    pending: VecDeque<(TxHash, AuthoritativeValue)>,
    /// Reads cycle through these instead of `value` when non-empty.
    scripted: Vec<AuthoritativeValue>,
    script_pos: usize,
    nonce: u64,
    auto_confirm: bool,
    fail_reads: Option<String>,
    fail_submits: Option<String>,
    fail_signing: bool,
    latency: Duration,
}

/// In-memory ledger with a pending pool and fault injection.
pub struct MemoryLedger {
    interface: ContractInterface,
    state: Mutex<LedgerState>,
    reads: AtomicUsize,
    submits: AtomicUsize,
}

impl MemoryLedger {
    /// A `uint256` storage contract holding zero.
    pub fn new() -> Self {
        Self::with_interface(ContractInterface::uint256_storage())
    }

    /// A ledger whose argument range follows `interface`.
    pub fn with_interface(interface: ContractInterface) -> Self {
        Self {
            interface,
            state: Mutex::new(LedgerState {
                value: AuthoritativeValue::zero(),
                pending: VecDeque::new(),
                scripted: Vec::new(),
                script_pos: 0,
                nonce: 0,
                auto_confirm: false,
                fail_reads: None,
                fail_submits: None,
                fail_signing: false,
                latency: Duration::ZERO,
            }),
            reads: AtomicUsize::new(0),
            submits: AtomicUsize::new(0),
        }
    }

    /// Set the included value directly, as if another writer changed it.
    pub fn set_value(&self, value: impl Into<AuthoritativeValue>) {
        self.state.lock().value = value.into();
    }

    /// The included value, bypassing counters and fault injection.
    pub fn value(&self) -> AuthoritativeValue {
        self.state.lock().value.clone()
    }

    /// Include every pending change in submission order. Returns how many.
    pub fn confirm_pending(&self) -> usize {
        let mut state = self.state.lock();
        let count = state.pending.len();
        while let Some((hash, value)) = state.pending.pop_front() {
            tracing::trace!(tx = %hash, value = %value, "memory ledger included change");
            state.value = value;
        }
        count
    }

    /// Changes accepted but not yet included.
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Include changes as soon as they are submitted.
    pub fn set_auto_confirm(&self, auto: bool) {
        self.state.lock().auto_confirm = auto;
    }

    /// Make reads return these values in turn, wrapping around. An empty
    /// list restores normal reads.
    pub fn script_reads(&self, values: Vec<AuthoritativeValue>) {
        let mut state = self.state.lock();
        state.scripted = values;
        state.script_pos = 0;
    }

    /// Make reads fail with `Unavailable`. `None` clears the fault.
    pub fn fail_reads(&self, reason: Option<&str>) {
        self.state.lock().fail_reads = reason.map(str::to_string);
    }

    /// Make submissions fail with `Submission`. `None` clears the fault.
    pub fn fail_submits(&self, reason: Option<&str>) {
        self.state.lock().fail_submits = reason.map(str::to_string);
    }

    /// Make submissions fail with `Signing`.
    pub fn fail_signing(&self, fail: bool) {
        self.state.lock().fail_signing = fail;
    }

    /// Delay every call by `latency` before it takes effect.
    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().latency = latency;
    }

    /// Number of `read_authoritative` calls, including failed ones.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `submit_change` calls, including failed ones.
    pub fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    fn latency(&self) -> Duration {
        self.state.lock().latency
    }

    async fn delay(&self, ctx: &CallContext) -> Result<()> {
        ctx.check()?;
        let latency = self.latency();
        if !latency.is_zero() {
            ctx.run(tokio::time::sleep(latency)).await?;
        }
        Ok(())
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Gateway for MemoryLedger {
    async fn read_authoritative(&self, ctx: &CallContext) -> Result<AuthoritativeValue> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.delay(ctx).await?;

        let mut state = self.state.lock();
        if let Some(reason) = &state.fail_reads {
            return Err(GatewayError::Unavailable(reason.clone()));
        }
        if state.scripted.is_empty() {
            return Ok(state.value.clone());
        }
        let pos = state.script_pos % state.scripted.len();
        state.script_pos = pos + 1;
        Ok(state.scripted[pos].clone())
    }

    async fn submit_change(
        &self,
        ctx: &CallContext,
        value: &AuthoritativeValue,
    ) -> Result<TxHash> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        let calldata = self.interface.encode_set(value)?;
        self.delay(ctx).await?;

        let mut state = self.state.lock();
        if state.fail_signing {
            return Err(GatewayError::Signing("injected signing failure".into()));
        }
        if let Some(reason) = &state.fail_submits {
            return Err(GatewayError::Submission(reason.clone()));
        }

        let mut preimage = state.nonce.to_be_bytes().to_vec();
        preimage.extend_from_slice(&calldata);
        let hash = TxHash::from_bytes(keccak256(&preimage));
        state.nonce += 1;

        if state.auto_confirm {
            state.value = value.clone();
        } else {
            state.pending.push_back((hash, value.clone()));
        }
        Ok(hash)
    }
}
