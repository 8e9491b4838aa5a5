//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use ledger_mirror::{Coordinator, CoordinatorConfig};
use ledger_mirror_core::{AuthoritativeValue, CallContext, Signer};
use ledger_mirror_gateway::MemoryLedger;
use ledger_mirror_store::{MemoryMirror, SqliteMirror};
use tempfile::TempDir;

/// Well-known development key (first account of the common local dev chains).
pub const DEV_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Address controlled by [`DEV_PRIVATE_KEY`].
pub const DEV_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

/// First contract deployed by [`DEV_ADDRESS`] on a fresh chain.
pub const DEV_CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

/// ABI of the storage contract: `get() returns (uint256)`, `set(uint256)`.
pub const STORAGE_ABI: &str = r#"[
  {"inputs":[],"name":"get","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"view","type":"function"},
  {"inputs":[{"internalType":"uint256","name":"x","type":"uint256"}],"name":"set","outputs":[],"stateMutability":"nonpayable","type":"function"}
]"#;

/// Signer for [`DEV_PRIVATE_KEY`].
pub fn dev_signer() -> Signer {
    Signer::from_hex(DEV_PRIVATE_KEY).expect("dev key is valid")
}

/// Shorthand for building values in tests.
pub fn value(n: i64) -> AuthoritativeValue {
    AuthoritativeValue::from(n)
}

/// A coordinator over an in-memory ledger and mirror.
///
/// The fixture keeps its own handles to both doubles so tests can inject
/// faults and inspect state while the coordinator runs.
pub struct TestFixture {
    pub ledger: Arc<MemoryLedger>,
    pub mirror: Arc<MemoryMirror>,
    pub coordinator: Coordinator<MemoryLedger, MemoryMirror>,
}

impl TestFixture {
    /// Fresh ledger holding zero, mirror with no row yet.
    pub fn new() -> Self {
        Self::with_parts(MemoryLedger::new(), MemoryMirror::new(), CoordinatorConfig::default())
    }

    /// Mirror row already holding `mirrored`.
    pub fn with_mirror_value(mirrored: &str) -> Self {
        Self::with_parts(
            MemoryLedger::new(),
            MemoryMirror::with_value(mirrored),
            CoordinatorConfig::default(),
        )
    }

    /// Coordinator with a custom configuration.
    pub fn with_config(config: CoordinatorConfig) -> Self {
        Self::with_parts(MemoryLedger::new(), MemoryMirror::new(), config)
    }

    pub fn with_parts(ledger: MemoryLedger, mirror: MemoryMirror, config: CoordinatorConfig) -> Self {
        let ledger = Arc::new(ledger);
        let mirror = Arc::new(mirror);
        let coordinator = Coordinator::from_shared(Arc::clone(&ledger), Arc::clone(&mirror), config);
        Self {
            ledger,
            mirror,
            coordinator,
        }
    }

    /// Context without a deadline.
    pub fn ctx(&self) -> CallContext {
        CallContext::background()
    }

    /// The mirror row, bypassing the coordinator.
    pub fn mirrored(&self) -> Option<String> {
        self.mirror.snapshot()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A coordinator over an in-memory ledger and a SQLite file in a temp dir.
pub struct SqliteFixture {
    pub dir: TempDir,
    pub ledger: Arc<MemoryLedger>,
    pub coordinator: Coordinator<MemoryLedger, SqliteMirror>,
}

impl SqliteFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let ledger = Arc::new(MemoryLedger::new());
        let coordinator = Self::open_at(&dir, Arc::clone(&ledger));
        Self {
            dir,
            ledger,
            coordinator,
        }
    }

    /// Open a second coordinator on the same database file, as a restart
    /// would.
    pub fn reopen(&self) -> Coordinator<MemoryLedger, SqliteMirror> {
        Self::open_at(&self.dir, Arc::clone(&self.ledger))
    }

    fn open_at(dir: &TempDir, ledger: Arc<MemoryLedger>) -> Coordinator<MemoryLedger, SqliteMirror> {
        let mirror = SqliteMirror::open(dir.path().join("mirror.db")).expect("open sqlite mirror");
        Coordinator::from_shared(ledger, Arc::new(mirror), CoordinatorConfig::default())
    }
}

impl Default for SqliteFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_signer_address() {
        assert_eq!(dev_signer().address().to_hex(), DEV_ADDRESS);
    }

    #[test]
    fn test_fixture_shares_doubles() {
        let fixture = TestFixture::with_mirror_value("3");
        fixture.ledger.set_value(4u64);
        assert_eq!(fixture.coordinator.gateway().value(), value(4));
        assert_eq!(fixture.coordinator.mirror().snapshot().as_deref(), Some("3"));
    }

    #[test]
    fn test_storage_abi_parses() {
        let interface = ledger_mirror_gateway::ContractInterface::from_json(STORAGE_ABI).unwrap();
        assert_eq!(interface, ledger_mirror_gateway::ContractInterface::uint256_storage());
    }
}
