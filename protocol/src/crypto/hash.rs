//! # Hashing Utilities
//!
//! Keccak-256 is the only hash the Plasma contracts understand: transaction
//! ids, typed-data digests and addresses are all derived from it. The
//! implementation is `alloy-primitives`'; this module adds the one
//! derivation the signing code needs on top.

use alloy_primitives::Address;
use secp256k1::PublicKey;

pub use alloy_primitives::keccak256;

/// Ethereum address of a secp256k1 public key: the last 20 bytes of the
/// keccak-256 of the uncompressed point without its `0x04` tag.
///
/// # Example
///
/// ```
/// use plasma_protocol::crypto::hash::public_key_to_address;
/// use secp256k1::{PublicKey, SecretKey, SECP256K1};
///
/// let mut one = [0u8; 32];
/// one[31] = 1;
/// let sk = SecretKey::from_slice(&one).unwrap();
/// let address = public_key_to_address(&PublicKey::from_secret_key(SECP256K1, &sk));
/// assert_eq!(
///     address.to_checksum(None),
///     "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
/// );
/// ```
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, B256};
    use hex_literal::hex;
    use secp256k1::{SecretKey, SECP256K1};

    use super::*;

    #[test]
    fn keccak_of_empty_input() {
        assert_eq!(
            keccak256(b""),
            B256::from(hex!(
                "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
            ))
        );
    }

    #[test]
    fn address_of_key_two() {
        let mut two = [0u8; 32];
        two[31] = 2;
        let sk = SecretKey::from_slice(&two).unwrap();
        let pk = PublicKey::from_secret_key(SECP256K1, &sk);
        assert_eq!(
            public_key_to_address(&pk),
            address!("2b5ad5c4795c026514f8317c7a215e218dccd6cf")
        );
    }
}
