//! Legacy transactions with EIP-155 replay protection.
//!
//! The signing payload commits to the chain id, so a transaction signed for
//! one network is rejected by every other. The chain id is always supplied
//! by the caller; nothing in this module assumes a network.

use bytes::Bytes;

use crate::crypto::{keccak256, RecoverableSignature, Signer};
use crate::error::CoreError;
use crate::rlp::RlpList;
use crate::types::{Address, TxHash};

/// An unsigned legacy (type 0) transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: Address,
    pub value: u128,
    pub data: Bytes,
    pub chain_id: u64,
}

impl LegacyTransaction {
    /// RLP of `[nonce, gasPrice, gas, to, value, data, chainId, 0, 0]`.
    pub fn signing_payload(&self) -> Bytes {
        let mut list = self.common_fields();
        list.append_u64(self.chain_id).append_u64(0).append_u64(0);
        list.finish()
    }

    /// Keccak-256 of the signing payload.
    pub fn signing_hash(&self) -> [u8; 32] {
        keccak256(&self.signing_payload())
    }

    /// Sign and encode for `eth_sendRawTransaction`.
    pub fn sign(&self, signer: &Signer) -> Result<SignedTransaction, CoreError> {
        let signature = signer.sign_prehash(&self.signing_hash())?;
        Ok(self.with_signature(signature))
    }

    fn with_signature(&self, signature: RecoverableSignature) -> SignedTransaction {
        let v = u128::from(signature.recovery_id) + 35 + 2 * u128::from(self.chain_id);

        let mut list = self.common_fields();
        list.append_u128(v)
            .append_uint_be(&signature.r)
            .append_uint_be(&signature.s);
        let raw = list.finish();
        let hash = TxHash(keccak256(&raw));

        SignedTransaction {
            raw,
            hash,
            signature,
        }
    }

    fn common_fields(&self) -> RlpList {
        let mut list = RlpList::new();
        list.append_u64(self.nonce)
            .append_u128(self.gas_price)
            .append_u64(self.gas_limit)
            .append_bytes(self.to.as_bytes())
            .append_u128(self.value)
            .append_bytes(&self.data);
        list
    }
}

/// A signed transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    /// RLP-encoded signed transaction.
    pub raw: Bytes,
    /// Keccak-256 of `raw`; the hash the node reports on acceptance.
    pub hash: TxHash,
    pub signature: RecoverableSignature,
}
