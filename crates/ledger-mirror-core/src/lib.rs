//! # Ledger Mirror Core
//!
//! Primitives shared by the gateway, the mirror, and the coordinator.
//!
//! This crate does no network or storage I/O. It holds the value types, the
//! per-call [`CallContext`], and the pure computation needed to produce a
//! signed transaction.
//!
//! ## Key Types
//!
//! - [`AuthoritativeValue`] - The contract's scalar, arbitrary precision
//! - [`TxHash`] - Receipt handed back on submission
//! - [`Address`] - Account or contract address
//! - [`CallContext`] - Deadline + cancellation for one operation
//! - [`Signer`] - secp256k1 credential
//! - [`LegacyTransaction`] - EIP-155 transaction builder
//!
//! ## Encoding
//!
//! Transactions are RLP-encoded (see [`rlp`]) and hashed with Keccak-256.

pub mod context;
pub mod crypto;
pub mod error;
pub mod rlp;
pub mod transaction;
pub mod types;

pub use context::CallContext;
pub use crypto::{keccak256, RecoverableSignature, Signer};
pub use error::{CoreError, Interrupted};
pub use transaction::{LegacyTransaction, SignedTransaction};
pub use types::{decode_hex, encode_hex, Address, AuthoritativeValue, TxHash};

pub use num_bigint::BigInt;
pub use tokio_util::sync::CancellationToken;
