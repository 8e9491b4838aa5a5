//! # Ledger Mirror
//!
//! Exposes one value stored in a ledger contract through a plain
//! read/write API and keeps a durable local copy of it.
//!
//! ## Overview
//!
//! The [`Coordinator`] offers four operations:
//!
//! - **read**: the authoritative value, straight from the ledger
//! - **write**: validate a decimal and submit a transaction setting it
//! - **sync**: copy the authoritative value into the mirror
//! - **check**: compare mirror and ledger for drift
//!
//! ## Key Concepts
//!
//! - **Authoritative value**: lives on the ledger; changes only through
//!   consensus.
//! - **Mirror**: a single durable row; changes only through `sync`.
//! - **Acceptance is not inclusion**: a successful `write` returns before the
//!   change is in a block, so a following `read` may still see the old value.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ledger_mirror::{Coordinator, CoordinatorConfig};
//! use ledger_mirror::gateway::{GatewayConfig, NodeGateway};
//! use ledger_mirror::store::SqliteMirror;
//!
//! async fn example(config: GatewayConfig) {
//!     let gateway = NodeGateway::connect(config).unwrap();
//!     let mirror = SqliteMirror::open("ledger-mirror.db").unwrap();
//!     let coordinator = Coordinator::new(gateway, mirror, CoordinatorConfig::default());
//!
//!     let ctx = coordinator.context();
//!     coordinator.initialize(&ctx).await.unwrap();
//!
//!     let tx = coordinator.write(&ctx, "42").await.unwrap();
//!     println!("submitted {}", tx);
//!
//!     // Later, once the transaction is included
//!     coordinator.sync(&ctx).await.unwrap();
//!     assert!(coordinator.check(&ctx).await.unwrap());
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `ledger_mirror::core` - Value types, call context, signing
//! - `ledger_mirror::store` - Mirror trait and SQLite backend
//! - `ledger_mirror::gateway` - Gateway trait and JSON-RPC backend

pub mod coordinator;
pub mod error;

// Re-export component crates
pub use ledger_mirror_core as core;
pub use ledger_mirror_gateway as gateway;
pub use ledger_mirror_store as store;

// Re-export main types for convenience
pub use coordinator::{Coordinator, CoordinatorConfig};
pub use error::{ErrorKind, MirrorError, Result};

// Re-export commonly used component types
pub use ledger_mirror_core::{AuthoritativeValue, CallContext, CancellationToken, TxHash};
pub use ledger_mirror_gateway::Gateway;
pub use ledger_mirror_store::{InitResult, Mirror};
