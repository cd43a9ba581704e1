//! # Digital Signatures
//!
//! Recoverable ECDSA over secp256k1, serialized the way the Plasma contracts
//! read it: `r (32) || s (32) || v (1)` with `v` in `{27, 28}`.
//!
//! Verification is by recovery. The contracts never see a public key, only
//! the address recovered from the signature, so that is what we compare.

use alloy_primitives::{Address, B256};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, SecretKey, SECP256K1};
use thiserror::Error;

use super::hash::public_key_to_address;
use crate::transaction::Signature;

/// Offset Ethereum adds to the recovery id.
const RECOVERY_ID_OFFSET: u8 = 27;

/// Errors raised while recovering a signer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// `v` is not one of 27, 28 (or the raw 0, 1).
    #[error("invalid recovery byte {0}")]
    InvalidRecoveryId(u8),

    /// `r` or `s` is not a valid scalar.
    #[error("malformed signature")]
    Malformed,

    /// No public key recovers from this signature and digest.
    #[error("public key recovery failed")]
    RecoveryFailed,
}

/// Signs a digest with a raw secret key.
pub fn sign_digest(secret: &SecretKey, digest: &B256) -> Signature {
    let message = Message::from_digest(digest.0);
    let (recovery_id, compact) = SECP256K1
        .sign_ecdsa_recoverable(&message, secret)
        .serialize_compact();

    let mut raw = [0u8; 65];
    raw[..64].copy_from_slice(&compact);
    // Recovery ids are 0..=3.
    raw[64] = RECOVERY_ID_OFFSET + recovery_id.to_i32() as u8;
    Signature::from_bytes(raw)
}

/// Recovers the address that produced `signature` over `digest`.
pub fn recover_signer(digest: &B256, signature: &Signature) -> Result<Address, SignatureError> {
    let v = signature.v();
    let recid = match v {
        0 | 1 => v,
        27 | 28 => v - RECOVERY_ID_OFFSET,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };
    let recovery_id =
        RecoveryId::from_i32(i32::from(recid)).map_err(|_| SignatureError::InvalidRecoveryId(v))?;
    let recoverable = RecoverableSignature::from_compact(&signature.as_bytes()[..64], recovery_id)
        .map_err(|_| SignatureError::Malformed)?;

    let public_key = SECP256K1
        .recover_ecdsa(&Message::from_digest(digest.0), &recoverable)
        .map_err(|_| SignatureError::RecoveryFailed)?;
    Ok(public_key_to_address(&public_key))
}

/// Returns `true` if `signature` over `digest` recovers to `expected`.
///
/// Any failure is just "no". Callers that need the reason use
/// [`recover_signer`].
pub fn verify(digest: &B256, signature: &Signature, expected: Address) -> bool {
    recover_signer(digest, signature).is_ok_and(|signer| signer == expected)
}
