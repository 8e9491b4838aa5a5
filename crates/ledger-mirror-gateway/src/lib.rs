//! # Ledger Mirror Gateway
//!
//! Reads and writes the authoritative value held by a storage contract on
//! an Ethereum-compatible ledger.
//!
//! ## Overview
//!
//! Reads are `eth_call`s against the contract's `get` method at the latest
//! block. Writes are legacy (EIP-155) transactions calling `set`, signed
//! locally with a secp256k1 key and broadcast with `eth_sendRawTransaction`.
//! A successful write means the node accepted the transaction, not that a
//! block included it.
//!
//! ## Key Types
//!
//! - [`Gateway`] - The async trait the coordinator uses
//! - [`NodeGateway`] - JSON-RPC implementation
//! - [`MemoryLedger`] - In-memory ledger with a pending pool, for tests
//! - [`ContractInterface`] - The parsed `get`/`set` pair
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ledger_mirror_core::{AuthoritativeValue, CallContext};
//! use ledger_mirror_gateway::{Gateway, GatewayConfig, NodeGateway};
//! use std::time::Duration;
//!
//! async fn example(abi: String) {
//!     let config = GatewayConfig::new(
//!         "http://localhost:8545",
//!         "0x5FbDB2315678afecb367f032d93F642f64180aa3",
//!         "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
//!         abi,
//!     );
//!     let gateway = NodeGateway::connect(config).unwrap();
//!
//!     let ctx = CallContext::with_timeout(Duration::from_secs(15));
//!     let tx = gateway
//!         .submit_change(&ctx, &AuthoritativeValue::from(42u64))
//!         .await
//!         .unwrap();
//!     println!("submitted {}", tx);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **No retries**: every failure surfaces to the caller
//! - **Unknown outcome**: a write interrupted after broadcast may still land
//! - **Fail fast**: bad configuration is rejected before any network I/O

pub mod abi;
pub mod config;
pub mod error;
pub mod memory;
pub mod node;
pub mod rpc;
pub mod traits;

pub use abi::{AbiType, AbiValue, ContractInterface, Method};
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use memory::MemoryLedger;
pub use node::NodeGateway;
pub use traits::Gateway;
