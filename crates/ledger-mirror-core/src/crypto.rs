//! Cryptographic primitives for the ledger mirror.
//!
//! Wraps secp256k1 ECDSA signing and Keccak-256 hashing with strong types.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::error::CoreError;
use crate::types::{decode_hex, Address};

/// Compute the Keccak-256 hash of the given data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// A secp256k1 signature with its public-key recovery id.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// 0 or 1 (y-parity of the ephemeral point).
    pub recovery_id: u8,
}

impl RecoverableSignature {
    /// Recover the signer's address from a 32-byte prehash.
    pub fn recover_address(&self, prehash: &[u8; 32]) -> Result<Address, CoreError> {
        let mut rs = [0u8; 64];
        rs[..32].copy_from_slice(&self.r);
        rs[32..].copy_from_slice(&self.s);
        let signature = Signature::from_slice(&rs)
            .map_err(|e| CoreError::Signing(e.to_string()))?;
        let recovery_id = RecoveryId::from_byte(self.recovery_id)
            .ok_or_else(|| CoreError::Signing(format!("bad recovery id {}", self.recovery_id)))?;
        let key = VerifyingKey::recover_from_prehash(prehash, &signature, recovery_id)
            .map_err(|e| CoreError::Signing(e.to_string()))?;
        Ok(address_of(&key))
    }
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RecoverableSignature(r={}.., v={})",
            &hex::encode(self.r)[..16],
            self.recovery_id
        )
    }
}

/// The credential used to sign state-changing transactions.
///
/// Constructed once at startup and shared; the secret never leaves this type
/// and is never printed.
#[derive(Clone)]
pub struct Signer {
    key: SigningKey,
    address: Address,
}

impl Signer {
    /// Load a signer from a 32-byte hex private key (`0x` optional).
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = decode_hex(s.trim()).map_err(|_| CoreError::InvalidPrivateKey)?;
        if bytes.len() != 32 {
            return Err(CoreError::InvalidPrivateKey);
        }
        Self::from_bytes(&bytes)
    }

    /// Load a signer from raw scalar bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let key = SigningKey::from_slice(bytes).map_err(|_| CoreError::InvalidPrivateKey)?;
        let address = address_of(key.verifying_key());
        Ok(Self { key, address })
    }

    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = address_of(key.verifying_key());
        Self { key, address }
    }

    /// The account address controlled by this key.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte prehash (RFC 6979 nonce, low-S form).
    pub fn sign_prehash(&self, prehash: &[u8; 32]) -> Result<RecoverableSignature, CoreError> {
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(prehash)
            .map_err(|e| CoreError::Signing(e.to_string()))?;

        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);

        Ok(RecoverableSignature {
            r,
            s,
            recovery_id: recovery_id.to_byte(),
        })
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signer({})", self.address)
    }
}

/// Derive the account address of a public key: the last 20 bytes of the
/// Keccak-256 of the uncompressed point without its `0x04` tag.
fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..]);
    Address(out)
}
