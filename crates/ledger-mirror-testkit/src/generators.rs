//! Proptest generators for property-based testing.

use num_bigint::{BigInt, BigUint, Sign};
use proptest::prelude::*;

use ledger_mirror_core::AuthoritativeValue;

/// Any value that fits a `uint256` slot.
pub fn uint256_value() -> impl Strategy<Value = AuthoritativeValue> {
    any::<[u8; 32]>().prop_map(|bytes| {
        AuthoritativeValue::from(BigInt::from_biguint(
            Sign::Plus,
            BigUint::from_bytes_be(&bytes),
        ))
    })
}

/// Small and large signed values, including negatives.
pub fn signed_value() -> impl Strategy<Value = AuthoritativeValue> {
    prop_oneof![
        (-1000i64..=1000).prop_map(AuthoritativeValue::from),
        any::<i128>().prop_map(|n| AuthoritativeValue::from(BigInt::from(n))),
    ]
}

/// Decimal text the parser accepts for a `uint256` slot, leading zeros
/// included.
pub fn valid_uint256_text() -> impl Strategy<Value = String> {
    prop_oneof![
        uint256_value().prop_map(|v| v.to_canonical_string()),
        ("0{1,3}", 0u64..=u64::MAX).prop_map(|(zeros, n)| format!("{}{}", zeros, n)),
    ]
}

/// Decimal text with an optional sign, any length.
pub fn valid_decimal_text() -> impl Strategy<Value = String> {
    "-?[0-9]{1,90}".prop_map(String::from)
}

/// Text that is not a base-10 integer.
pub fn invalid_decimal_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("-".to_string()),
        Just("١٢٣".to_string()),
        "\\+[0-9]{1,10}".prop_map(String::from),
        "[ \t\n][0-9]{1,10}".prop_map(String::from),
        "[0-9]{1,10}[ \t\n]".prop_map(String::from),
        "[0-9]{0,5}[a-zA-Z_.,+'][0-9]{0,5}".prop_map(String::from),
        "0[xXbBoO][0-9a-f]{1,8}".prop_map(String::from),
        "--[0-9]{1,5}".prop_map(String::from),
    ]
}
