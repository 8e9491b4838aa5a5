//! Contract interface description and the ABI word codec.
//!
//! Only what the `get`/`set` pair needs: static, single-word types. The
//! getter's return word is decoded generically into an [`AbiValue`] and then
//! narrowed to an integer with an explicit check, so a contract that returns
//! something other than an integer is reported, never read as zero.

use bytes::{BufMut, Bytes, BytesMut};
use ledger_mirror_core::{keccak256, Address, AuthoritativeValue};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Signed, Zero};
use serde::Deserialize;
use std::fmt;

use crate::error::{GatewayError, Result};

/// Size of one ABI word.
pub const WORD: usize = 32;

/// Name of the accessor method.
pub const GETTER: &str = "get";

/// Name of the mutator method.
pub const SETTER: &str = "set";

/// A static, single-word ABI type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiType {
    /// `uintN`, N in bits.
    Uint(u16),
    /// `intN`, N in bits.
    Int(u16),
    Bool,
    Address,
    /// `bytesN`, N in bytes (1..=32).
    FixedBytes(u8),
}

impl AbiType {
    /// Parse a Solidity type name. Returns `None` for dynamic, array, tuple,
    /// or malformed types.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bool" => return Some(AbiType::Bool),
            "address" => return Some(AbiType::Address),
            "uint" => return Some(AbiType::Uint(256)),
            "int" => return Some(AbiType::Int(256)),
            _ => {}
        }

        if let Some(bits) = s.strip_prefix("uint") {
            return parse_bits(bits).map(AbiType::Uint);
        }
        if let Some(bits) = s.strip_prefix("int") {
            return parse_bits(bits).map(AbiType::Int);
        }
        if let Some(len) = s.strip_prefix("bytes") {
            let len: u8 = len.parse().ok()?;
            if (1..=32).contains(&len) && !s.starts_with("bytes0") {
                return Some(AbiType::FixedBytes(len));
            }
        }
        None
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, AbiType::Uint(_) | AbiType::Int(_))
    }

    /// Decode one word as this type.
    pub fn decode(&self, word: &[u8; WORD]) -> std::result::Result<AbiValue, String> {
        match *self {
            AbiType::Uint(bits) => {
                let value = BigInt::from(BigUint::from_bytes_be(word));
                if value.bits() > u64::from(bits) {
                    return Err(format!("{} exceeds {}", value, self));
                }
                Ok(AbiValue::Uint(value))
            }
            AbiType::Int(bits) => {
                let value = BigInt::from_signed_bytes_be(word);
                if !fits_signed(&value, bits) {
                    return Err(format!("bad sign extension for {}", self));
                }
                Ok(AbiValue::Int(value))
            }
            AbiType::Bool => match BigUint::from_bytes_be(word) {
                v if v.is_zero() => Ok(AbiValue::Bool(false)),
                v if v.is_one() => Ok(AbiValue::Bool(true)),
                v => Err(format!("{} is not a bool", v)),
            },
            AbiType::Address => {
                if word[..12].iter().any(|b| *b != 0) {
                    return Err("dirty address padding".to_string());
                }
                let mut addr = [0u8; 20];
                addr.copy_from_slice(&word[12..]);
                Ok(AbiValue::Address(Address(addr)))
            }
            AbiType::FixedBytes(len) => {
                let len = usize::from(len);
                if word[len..].iter().any(|b| *b != 0) {
                    return Err(format!("dirty bytes{} padding", len));
                }
                Ok(AbiValue::FixedBytes(word[..len].to_vec()))
            }
        }
    }

    /// Encode an integer as one word of this type.
    pub fn encode_integer(&self, value: &BigInt) -> Result<[u8; WORD]> {
        let out_of_range = || GatewayError::OutOfRange(format!("{} does not fit {}", value, self));

        match *self {
            AbiType::Uint(bits) => {
                if value.is_negative() || value.bits() > u64::from(bits) {
                    return Err(out_of_range());
                }
                let (_, be) = value.to_bytes_be();
                Ok(left_pad(&be, 0x00))
            }
            AbiType::Int(bits) => {
                if !fits_signed(value, bits) {
                    return Err(out_of_range());
                }
                let be = value.to_signed_bytes_be();
                let fill = if value.sign() == Sign::Minus { 0xff } else { 0x00 };
                Ok(left_pad(&be, fill))
            }
            _ => Err(GatewayError::Config(format!("{} is not an integer type", self))),
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{}", bits),
            AbiType::Int(bits) => write!(f, "int{}", bits),
            AbiType::Bool => f.write_str("bool"),
            AbiType::Address => f.write_str("address"),
            AbiType::FixedBytes(len) => write!(f, "bytes{}", len),
        }
    }
}

fn parse_bits(s: &str) -> Option<u16> {
    if s.starts_with('0') {
        return None;
    }
    let bits: u16 = s.parse().ok()?;
    (bits >= 8 && bits <= 256 && bits % 8 == 0).then_some(bits)
}

fn fits_signed(value: &BigInt, bits: u16) -> bool {
    let limit = BigInt::one() << (usize::from(bits) - 1);
    let min = -limit.clone();
    *value >= min && *value < limit
}

fn left_pad(be: &[u8], fill: u8) -> [u8; WORD] {
    let mut word = [fill; WORD];
    word[WORD - be.len()..].copy_from_slice(be);
    word
}

/// A decoded ABI value, before narrowing to the type the caller wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(BigInt),
    Int(BigInt),
    Bool(bool),
    Address(Address),
    FixedBytes(Vec<u8>),
}

impl AbiValue {
    fn type_name(&self) -> &'static str {
        match self {
            AbiValue::Uint(_) => "uint",
            AbiValue::Int(_) => "int",
            AbiValue::Bool(_) => "bool",
            AbiValue::Address(_) => "address",
            AbiValue::FixedBytes(_) => "bytes",
        }
    }

    /// Checked downcast to an integer.
    pub fn into_integer(self, method: &str) -> Result<BigInt> {
        match self {
            AbiValue::Uint(v) | AbiValue::Int(v) => Ok(v),
            other => Err(GatewayError::UnexpectedType {
                method: method.to_string(),
                expected: "integer",
                found: other.type_name().to_string(),
            }),
        }
    }
}

/// One function of the contract as the mirror uses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub selector: [u8; 4],
    /// The getter's output type, or the setter's input type.
    pub ty: AbiType,
}

/// The parsed `get`/`set` pair of the mirrored contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInterface {
    getter: Method,
    setter: Method,
}

#[derive(Debug, Deserialize)]
struct AbiEntry {
    #[serde(rename = "type", default = "default_entry_type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default)]
    outputs: Vec<AbiParam>,
}

#[derive(Debug, Deserialize)]
struct AbiParam {
    #[serde(rename = "type")]
    ty: String,
}

fn default_entry_type() -> String {
    "function".to_string()
}

impl ContractInterface {
    /// The common storage contract: `get() returns (uint256)`,
    /// `set(uint256)`.
    pub fn uint256_storage() -> Self {
        Self {
            getter: Method {
                name: GETTER.to_string(),
                selector: selector(GETTER, &[]),
                ty: AbiType::Uint(256),
            },
            setter: Method {
                name: SETTER.to_string(),
                selector: selector(SETTER, &[AbiType::Uint(256)]),
                ty: AbiType::Uint(256),
            },
        }
    }

    /// Parse ABI JSON: a bare ABI array, or a build artifact object with an
    /// `abi` field.
    pub fn from_json(json: &str) -> Result<Self> {
        let root: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| GatewayError::Config(format!("ABI is not valid JSON: {}", e)))?;

        let abi = match root {
            serde_json::Value::Array(_) => root,
            serde_json::Value::Object(mut map) => map
                .remove("abi")
                .ok_or_else(|| GatewayError::Config("ABI object has no 'abi' field".into()))?,
            _ => return Err(GatewayError::Config("ABI must be an array".into())),
        };

        let entries: Vec<AbiEntry> = serde_json::from_value(abi)
            .map_err(|e| GatewayError::Config(format!("malformed ABI: {}", e)))?;

        Self::from_entries(&entries)
    }

    fn from_entries(entries: &[AbiEntry]) -> Result<Self> {
        let getter = find_unique(entries, GETTER, 0)?;
        if getter.outputs.len() != 1 {
            return Err(GatewayError::Config(format!(
                "'{}' must return exactly one value, found {}",
                GETTER,
                getter.outputs.len()
            )));
        }
        let output = parse_static(&getter.outputs[0].ty, GETTER)?;

        let setter = find_unique(entries, SETTER, 1)?;
        let input = parse_static(&setter.inputs[0].ty, SETTER)?;
        if !input.is_integer() {
            return Err(GatewayError::Config(format!(
                "'{}' must take an integer, found {}",
                SETTER, input
            )));
        }

        Ok(Self {
            getter: Method {
                name: GETTER.to_string(),
                selector: selector(GETTER, &[]),
                ty: output,
            },
            setter: Method {
                name: SETTER.to_string(),
                selector: selector(SETTER, &[input]),
                ty: input,
            },
        })
    }

    pub fn getter(&self) -> &Method {
        &self.getter
    }

    pub fn setter(&self) -> &Method {
        &self.setter
    }

    /// Calldata for the getter.
    pub fn encode_get(&self) -> Bytes {
        Bytes::copy_from_slice(&self.getter.selector)
    }

    /// Calldata for the setter.
    ///
    /// Fails with `OutOfRange` if the value does not fit the input type.
    pub fn encode_set(&self, value: &AuthoritativeValue) -> Result<Bytes> {
        let word = self.setter.ty.encode_integer(value.as_bigint())?;
        let mut buf = BytesMut::with_capacity(4 + WORD);
        buf.put_slice(&self.setter.selector);
        buf.put_slice(&word);
        Ok(buf.freeze())
    }

    /// Decode the getter's return data.
    pub fn decode_get(&self, data: &[u8]) -> Result<AuthoritativeValue> {
        let word: &[u8; WORD] = data.try_into().map_err(|_| {
            GatewayError::Malformed(format!(
                "'{}' returned {} bytes, expected {}",
                GETTER,
                data.len(),
                WORD
            ))
        })?;

        let value = self
            .getter
            .ty
            .decode(word)
            .map_err(|e| GatewayError::Malformed(format!("'{}' return: {}", GETTER, e)))?;

        Ok(AuthoritativeValue::from(value.into_integer(GETTER)?))
    }
}

fn find_unique<'a>(entries: &'a [AbiEntry], name: &str, arity: usize) -> Result<&'a AbiEntry> {
    let mut matches = entries
        .iter()
        .filter(|e| e.kind == "function" && e.name == name && e.inputs.len() == arity);

    let found = matches.next().ok_or_else(|| {
        GatewayError::Config(format!(
            "ABI has no function '{}' taking {} argument(s)",
            name, arity
        ))
    })?;
    if matches.next().is_some() {
        return Err(GatewayError::Config(format!(
            "ABI has more than one '{}' taking {} argument(s)",
            name, arity
        )));
    }
    Ok(found)
}

fn parse_static(ty: &str, method: &str) -> Result<AbiType> {
    AbiType::parse(ty).ok_or_else(|| {
        GatewayError::Config(format!("'{}' uses unsupported ABI type '{}'", method, ty))
    })
}

/// First four bytes of Keccak-256 over the canonical signature.
pub fn selector(name: &str, inputs: &[AbiType]) -> [u8; 4] {
    let args: Vec<String> = inputs.iter().map(|t| t.to_string()).collect();
    let signature = format!("{}({})", name, args.join(","));
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SIMPLE_STORAGE_ABI: &str = r#"[
        {"inputs":[],"name":"get","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"view","type":"function"},
        {"inputs":[{"internalType":"uint256","name":"x","type":"uint256"}],"name":"set","outputs":[],"stateMutability":"nonpayable","type":"function"}
    ]"#;

    fn word_of(n: u64) -> [u8; WORD] {
        let mut w = [0u8; WORD];
        w[24..].copy_from_slice(&n.to_be_bytes());
        w
    }

    #[test]
    fn test_known_selectors() {
        assert_eq!(hex::encode(selector("get", &[])), "6d4ce63c");
        assert_eq!(hex::encode(selector("set", &[AbiType::Uint(256)])), "60fe47b1");
    }

    #[test]
    fn test_parse_simple_storage() {
        let iface = ContractInterface::from_json(SIMPLE_STORAGE_ABI).unwrap();
        assert_eq!(iface, ContractInterface::uint256_storage());
        assert_eq!(hex::encode(iface.encode_get()), "6d4ce63c");
    }

    #[test]
    fn test_parse_artifact_object() {
        let artifact = format!(r#"{{"contractName":"SimpleStorage","abi":{}}}"#, SIMPLE_STORAGE_ABI);
        let iface = ContractInterface::from_json(&artifact).unwrap();
        assert_eq!(iface.setter().ty, AbiType::Uint(256));
    }

    #[test]
    fn test_parse_rejects_bad_interfaces() {
        let cases = [
            "not json",
            r#"{"no_abi": []}"#,
            r#"[]"#,
            // getter takes an argument
            r#"[{"type":"function","name":"get","inputs":[{"type":"uint256"}],"outputs":[{"type":"uint256"}]},
                {"type":"function","name":"set","inputs":[{"type":"uint256"}],"outputs":[]}]"#,
            // dynamic output
            r#"[{"type":"function","name":"get","inputs":[],"outputs":[{"type":"string"}]},
                {"type":"function","name":"set","inputs":[{"type":"uint256"}],"outputs":[]}]"#,
            // setter takes a non-integer
            r#"[{"type":"function","name":"get","inputs":[],"outputs":[{"type":"uint256"}]},
                {"type":"function","name":"set","inputs":[{"type":"bool"}],"outputs":[]}]"#,
            // no setter
            r#"[{"type":"function","name":"get","inputs":[],"outputs":[{"type":"uint256"}]}]"#,
        ];
        for abi in cases {
            assert!(
                matches!(ContractInterface::from_json(abi), Err(GatewayError::Config(_))),
                "accepted {}",
                abi
            );
        }
    }

    #[test]
    fn test_ignores_events_and_overloads_of_other_arity() {
        let abi = r#"[
            {"type":"event","name":"get","inputs":[]},
            {"type":"function","name":"set","inputs":[{"type":"int128"},{"type":"bool"}],"outputs":[]},
            {"name":"get","inputs":[],"outputs":[{"type":"int128"}]},
            {"type":"function","name":"set","inputs":[{"type":"int128"}],"outputs":[]}
        ]"#;
        let iface = ContractInterface::from_json(abi).unwrap();
        assert_eq!(iface.getter().ty, AbiType::Int(128));
        assert_eq!(iface.setter().selector, selector("set", &[AbiType::Int(128)]));
    }

    #[test]
    fn test_type_parsing() {
        assert_eq!(AbiType::parse("uint"), Some(AbiType::Uint(256)));
        assert_eq!(AbiType::parse("uint8"), Some(AbiType::Uint(8)));
        assert_eq!(AbiType::parse("int64"), Some(AbiType::Int(64)));
        assert_eq!(AbiType::parse("bytes32"), Some(AbiType::FixedBytes(32)));
        assert_eq!(AbiType::parse("uint7"), None);
        assert_eq!(AbiType::parse("uint264"), None);
        assert_eq!(AbiType::parse("uint08"), None);
        assert_eq!(AbiType::parse("bytes"), None);
        assert_eq!(AbiType::parse("bytes33"), None);
        assert_eq!(AbiType::parse("uint256[]"), None);
        assert_eq!(AbiType::parse("string"), None);
    }

    #[test]
    fn test_decode_get() {
        let iface = ContractInterface::uint256_storage();
        assert_eq!(
            iface.decode_get(&word_of(42)).unwrap(),
            AuthoritativeValue::from(42u64)
        );
        assert_eq!(
            iface.decode_get(&[0xff; WORD]).unwrap().to_string(),
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
    }

    #[test]
    fn test_decode_get_wrong_length_is_malformed() {
        let iface = ContractInterface::uint256_storage();
        assert!(matches!(iface.decode_get(&[]), Err(GatewayError::Malformed(_))));
        assert!(matches!(
            iface.decode_get(&[0u8; 64]),
            Err(GatewayError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_non_integer_is_unexpected_type() {
        let abi = r#"[
            {"type":"function","name":"get","inputs":[],"outputs":[{"type":"bool"}]},
            {"type":"function","name":"set","inputs":[{"type":"uint256"}],"outputs":[]}
        ]"#;
        let iface = ContractInterface::from_json(abi).unwrap();
        let err = iface.decode_get(&word_of(1)).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::UnexpectedType { expected: "integer", ref found, .. } if found == "bool"
        ));
    }

    #[test]
    fn test_decode_rejects_dirty_padding() {
        let mut word = word_of(1);
        word[0] = 1;
        assert!(AbiType::Uint(8).decode(&word).is_err());
        assert!(AbiType::Address.decode(&word).is_err());
        assert!(AbiType::Bool.decode(&word_of(2)).is_err());
        // -1 as int8 is all 0xff; a positive high byte with 0xff low byte is not.
        assert!(AbiType::Int(8).decode(&[0xff; WORD]).is_ok());
        assert!(AbiType::Int(8).decode(&word_of(0xff)).is_err());
    }

    #[test]
    fn test_encode_set() {
        let iface = ContractInterface::uint256_storage();
        let data = iface.encode_set(&AuthoritativeValue::from(42u64)).unwrap();
        assert_eq!(data.len(), 36);
        assert_eq!(&data[..4], &[0x60, 0xfe, 0x47, 0xb1]);
        assert_eq!(&data[4..], &word_of(42));
    }

    #[test]
    fn test_encode_out_of_range() {
        let iface = ContractInterface::uint256_storage();
        assert!(matches!(
            iface.encode_set(&AuthoritativeValue::from(-1i64)),
            Err(GatewayError::OutOfRange(_))
        ));
        let too_big = AuthoritativeValue::parse_decimal(
            "115792089237316195423570985008687907853269984665640564039457584007913129639936",
        )
        .unwrap();
        assert!(matches!(
            iface.encode_set(&too_big),
            Err(GatewayError::OutOfRange(_))
        ));

        assert!(AbiType::Int(8).encode_integer(&BigInt::from(127)).is_ok());
        assert!(AbiType::Int(8).encode_integer(&BigInt::from(128)).is_err());
        assert!(AbiType::Int(8).encode_integer(&BigInt::from(-128)).is_ok());
        assert!(AbiType::Int(8).encode_integer(&BigInt::from(-129)).is_err());
    }

    #[test]
    fn test_encode_negative_int_sign_extends() {
        let word = AbiType::Int(256).encode_integer(&BigInt::from(-2)).unwrap();
        assert_eq!(&word[..31], &[0xff; 31]);
        assert_eq!(word[31], 0xfe);
    }

    proptest! {
        #[test]
        fn int256_word_codec_is_exact(v in any::<i128>()) {
            let value = BigInt::from(v);
            let word = AbiType::Int(256).encode_integer(&value).unwrap();
            prop_assert_eq!(AbiType::Int(256).decode(&word).unwrap(), AbiValue::Int(value));
        }

        #[test]
        fn uint_width_is_enforced(v in any::<u64>(), bits in (1u16..=8).prop_map(|b| b * 8)) {
            let value = BigInt::from(v);
            let fits = value.bits() <= u64::from(bits);
            prop_assert_eq!(AbiType::Uint(bits).encode_integer(&value).is_ok(), fits);
        }
    }
}
