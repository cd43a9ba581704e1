//! # Key Management
//!
//! A secp256k1 private key held in memory, able to sign typed-data digests
//! the way the root chain expects.
//!
//! ## Security considerations
//!
//! - Key bytes are never logged and never printed by `Debug`.
//! - There is no key generation here. Keys come from a wallet, a keystore or
//!   a test fixture; this crate only uses them.

use std::fmt;

use alloy_primitives::{Address, B256};
use secp256k1::{PublicKey, SecretKey, SECP256K1};
use thiserror::Error;

use super::hash::public_key_to_address;
use super::signatures::sign_digest;
use crate::transaction::Signature;

/// Errors that can occur when loading a private key.
///
/// Intentionally vague: error messages never echo key material.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key: not a valid secp256k1 scalar")]
    InvalidSecretKey,

    #[error("invalid secret key hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid secret key length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Signs digests with a secp256k1 private key held in memory.
///
/// The address is derived once at construction.
///
/// # Examples
///
/// ```
/// use alloy_primitives::B256;
/// use plasma_protocol::crypto::{recover_signer, LocalSigner};
///
/// let signer = LocalSigner::from_hex(
///     "0x0000000000000000000000000000000000000000000000000000000000000001",
/// )
/// .unwrap();
/// let digest = B256::repeat_byte(0x42);
/// let signature = signer.sign(&digest);
/// assert_eq!(recover_signer(&digest, &signature).unwrap(), signer.address());
/// ```
#[derive(Clone)]
pub struct LocalSigner {
    secret: SecretKey,
    address: Address,
}

impl LocalSigner {
    /// Loads a key from its 32 raw bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, KeyError> {
        let secret = SecretKey::from_slice(bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        let address = public_key_to_address(&PublicKey::from_secret_key(SECP256K1, &secret));
        Ok(Self { secret, address })
    }

    /// Loads a key from hex, with or without a `0x` prefix.
    ///
    /// For devnets and tests. Please don't keep raw hex keys in config files
    /// anywhere that matters.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(stripped)?;
        let array: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidLength(bytes.len()))?;
        Self::from_bytes(&array)
    }

    /// Address the key controls.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Signs a 32-byte digest, returning `r || s || v` with `v = 27 + recid`.
    pub fn sign(&self, digest: &B256) -> Signature {
        sign_digest(&self.secret, digest)
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
