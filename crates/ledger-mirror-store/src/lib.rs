//! # Ledger Mirror Store
//!
//! The durable mirror: one row holding the last value synced from the
//! ledger, as canonical decimal text.
//!
//! ## Key Types
//!
//! - [`Mirror`] - The async trait for mirror operations
//! - [`SqliteMirror`] - SQLite-based persistent mirror
//! - [`MemoryMirror`] - In-memory mirror for tests
//! - [`InitResult`] - Outcome of idempotent initialization
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ledger_mirror_core::CallContext;
//! use ledger_mirror_store::{Mirror, SqliteMirror};
//!
//! async fn example() {
//!     let mirror = SqliteMirror::open("ledger-mirror.db").unwrap();
//!     let ctx = CallContext::background();
//!
//!     // Safe on every start: inserts "0" only if the row is missing
//!     mirror.ensure_initialized(&ctx).await.unwrap();
//!
//!     mirror.write(&ctx, "42").await.unwrap();
//!     assert_eq!(mirror.read(&ctx).await.unwrap(), "42");
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Single row**: key [`SINGLETON_ID`], schema `storage(id, value)`
//! - **Idempotent init**: check-then-insert in one immediate transaction
//! - **Last write wins**: no version column, no compare-and-swap

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryMirror;
pub use sqlite::SqliteMirror;
pub use traits::{InitResult, Mirror, DEFAULT_VALUE, SINGLETON_ID};
