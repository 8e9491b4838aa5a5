//! # Ledger Mirror Testkit
//!
//! Testing utilities for the ledger mirror.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Published Keccak-256, selector, address, RLP and
//!   EIP-155 values the gateway must reproduce
//! - **Generators**: Proptest strategies for valid and invalid decimal input
//! - **Fixtures**: A coordinator wired to in-memory doubles, or to SQLite in
//!   a temp dir
//!
//! ## Golden Vectors
//!
//! ```rust
//! use ledger_mirror_testkit::vectors::verify_all;
//!
//! assert!(verify_all().is_empty());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use ledger_mirror_testkit::generators::invalid_decimal_text;
//!
//! proptest! {
//!     #[test]
//!     fn rejected(text in invalid_decimal_text()) {
//!         prop_assert!(text.parse::<ledger_mirror::AuthoritativeValue>().is_err());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use ledger_mirror_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::with_mirror_value("5");
//! fixture.ledger.set_value(7u64);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{SqliteFixture, TestFixture};
