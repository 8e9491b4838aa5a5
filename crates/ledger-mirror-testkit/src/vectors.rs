//! Golden test vectors for deterministic verification.
//!
//! Published values for the encodings the gateway relies on. A change to
//! any of these breaks compatibility with every Ethereum-compatible node.

use ledger_mirror_core::rlp::RlpList;
use ledger_mirror_core::{keccak256, Address, LegacyTransaction, Signer};
use ledger_mirror_gateway::abi::{selector, AbiType};

/// Keccak-256 of an input.
#[derive(Debug, Clone)]
pub struct HashVector {
    pub input: &'static [u8],
    pub expected: &'static str,
}

/// Four-byte function selector of a signature.
#[derive(Debug, Clone)]
pub struct SelectorVector {
    pub name: &'static str,
    pub inputs: &'static [AbiType],
    pub expected: &'static str,
}

/// Address derived from a private key.
#[derive(Debug, Clone)]
pub struct AddressVector {
    pub private_key: &'static str,
    pub expected: &'static str,
}

pub fn hash_vectors() -> Vec<HashVector> {
    vec![
        HashVector {
            input: b"",
            expected: "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470",
        },
        HashVector {
            input: b"abc",
            expected: "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45",
        },
    ]
}

pub fn selector_vectors() -> Vec<SelectorVector> {
    vec![
        SelectorVector {
            name: "get",
            inputs: &[],
            expected: "6d4ce63c",
        },
        SelectorVector {
            name: "set",
            inputs: &[AbiType::Uint(256)],
            expected: "60fe47b1",
        },
        SelectorVector {
            name: "balanceOf",
            inputs: &[AbiType::Address],
            expected: "70a08231",
        },
        SelectorVector {
            name: "transfer",
            inputs: &[AbiType::Address, AbiType::Uint(256)],
            expected: "a9059cbb",
        },
    ]
}

pub fn address_vectors() -> Vec<AddressVector> {
    vec![
        AddressVector {
            private_key: "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            expected: "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
        },
        AddressVector {
            private_key: "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
            expected: "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
        },
        AddressVector {
            private_key: "4646464646464646464646464646464646464646464646464646464646464646",
            expected: "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f",
        },
    ]
}

/// The worked example from EIP-155: nonce 9, 20 gwei, 21000 gas, 1 ether
/// to `0x3535...35` on chain 1.
pub fn eip155_example() -> LegacyTransaction {
    LegacyTransaction {
        nonce: 9,
        gas_price: 20_000_000_000,
        gas_limit: 21_000,
        to: Address::from_bytes([0x35; 20]),
        value: 1_000_000_000_000_000_000,
        data: Default::default(),
        chain_id: 1,
    }
}

pub const EIP155_SIGNING_PAYLOAD: &str =
    "ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080";

pub const EIP155_SIGNING_HASH: &str =
    "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53";

/// Key used to sign [`eip155_example`].
pub const EIP155_PRIVATE_KEY: &str =
    "4646464646464646464646464646464646464646464646464646464646464646";

/// RLP encodings from the Ethereum wiki.
pub fn rlp_vectors() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("c0", RlpList::new().finish().to_vec()),
        (
            "c88363617483646f67",
            RlpList::new()
                .append_bytes(b"cat")
                .append_bytes(b"dog")
                .finish()
                .to_vec(),
        ),
        (
            "c6800f820400",
            RlpList::new()
                .append_u64(0)
                .append_u64(15)
                .append_u64(1024)
                .finish()
                .to_vec(),
        ),
    ]
}

/// Run every vector and return the names of the ones that do not match.
pub fn verify_all() -> Vec<String> {
    let mut failures = Vec::new();

    for v in hash_vectors() {
        if hex::encode(keccak256(v.input)) != v.expected {
            failures.push(format!("keccak256({:?})", String::from_utf8_lossy(v.input)));
        }
    }

    for v in selector_vectors() {
        if hex::encode(selector(v.name, v.inputs)) != v.expected {
            failures.push(format!("selector {}", v.name));
        }
    }

    for v in address_vectors() {
        match Signer::from_hex(v.private_key) {
            Ok(signer) if signer.address().to_hex() == v.expected => {}
            _ => failures.push(format!("address of {}", v.expected)),
        }
    }

    let tx = eip155_example();
    if hex::encode(tx.signing_payload()) != EIP155_SIGNING_PAYLOAD {
        failures.push("eip155 signing payload".into());
    }
    if hex::encode(tx.signing_hash()) != EIP155_SIGNING_HASH {
        failures.push("eip155 signing hash".into());
    }

    for (expected, encoded) in rlp_vectors() {
        if hex::encode(encoded) != expected {
            failures.push(format!("rlp {}", expected));
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_match() {
        let failures = verify_all();
        assert!(failures.is_empty(), "mismatched vectors: {:?}", failures);
    }

    #[test]
    fn test_eip155_signature_recovers_sender() {
        let signer = Signer::from_hex(EIP155_PRIVATE_KEY).unwrap();
        let tx = eip155_example();
        let signed = tx.sign(&signer).unwrap();

        let recovered = signed
            .signature
            .recover_address(&tx.signing_hash())
            .unwrap();
        assert_eq!(recovered, signer.address());
        assert_eq!(signed.hash.0, keccak256(&signed.raw));
    }
}
