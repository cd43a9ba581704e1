//! Signature verification for signed transaction bodies.
//!
//! The child chain accepts a transaction only if the signature at index `i`
//! recovers, over the typed-data digest, to the owner of input `i`. Owners
//! are not part of the transaction; the caller looks them up (from the
//! watcher, or from the outputs it built the transaction from) and passes
//! them in input order.
//!
//! The checks are ordered from cheapest to most expensive (counts before
//! recovery) to fail fast on clearly invalid bodies.

use alloy_primitives::Address;
use thiserror::Error;
use tracing::trace;

use super::typed_data::TypedDataHasher;
use super::types::TransactionBody;
use crate::crypto::{recover_signer, SignatureError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during signature verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// The caller supplied a different number of owners than inputs.
    #[error("{owners} owners supplied for {inputs} inputs")]
    OwnerCountMismatch { owners: usize, inputs: usize },

    /// The body is not (fully) signed.
    #[error("expected {inputs} signatures, found {signatures}")]
    MissingSignatures { signatures: usize, inputs: usize },

    /// A signature could not be recovered at all.
    #[error("signature {index} is invalid: {source}")]
    InvalidSignature {
        index: usize,
        #[source]
        source: SignatureError,
    },

    /// A signature recovers to someone other than the input's owner.
    #[error("signature {index} recovers to {recovered}, expected owner {expected}")]
    WrongSigner {
        index: usize,
        expected: Address,
        recovered: Address,
    },
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Checks that `body` is signed by the owner of every input.
///
/// The checks, in order:
///
/// 1. **Owners** -- one owner per input.
/// 2. **Count** -- one signature per input.
/// 3. **Recovery** -- each signature recovers over
///    [`TypedDataHasher::signing_digest`] to the owner at its index.
///
/// # Errors
///
/// Returns the first failing check as a [`VerificationError`].
pub fn verify_signatures(
    body: &TransactionBody,
    hasher: &TypedDataHasher,
    owners: &[Address],
) -> Result<(), VerificationError> {
    let inputs = body.inputs().len();
    if owners.len() != inputs {
        return Err(VerificationError::OwnerCountMismatch {
            owners: owners.len(),
            inputs,
        });
    }
    if body.signatures().len() != inputs {
        return Err(VerificationError::MissingSignatures {
            signatures: body.signatures().len(),
            inputs,
        });
    }

    let digest = hasher.signing_digest(body);
    for (index, (signature, expected)) in body.signatures().iter().zip(owners).enumerate() {
        let recovered = recover_signer(&digest, signature)
            .map_err(|source| VerificationError::InvalidSignature { index, source })?;
        if recovered != *expected {
            trace!(index, %recovered, %expected, "signature from wrong key");
            return Err(VerificationError::WrongSigner {
                index,
                expected: *expected,
                recovered,
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, B256, U256};

    use super::*;
    use crate::config::ChainConfig;
    use crate::crypto::LocalSigner;
    use crate::transaction::signing::sign_transaction;
    use crate::transaction::types::{Input, Output, Signature};

    const BOB: Address = address!("3272ee86d8192f59261960c9ae186063c8c9041f");

    fn signer(last_byte: u8) -> LocalSigner {
        let mut key = [0u8; 32];
        key[31] = last_byte;
        LocalSigner::from_bytes(&key).unwrap()
    }

    fn unsigned() -> TransactionBody {
        TransactionBody::payment(
            vec![Input::new(1, 0, 0), Input::new(2, 0, 0)],
            vec![Output::payment(BOB, Address::ZERO, U256::from(1))],
            B256::ZERO,
        )
        .unwrap()
    }

    fn hasher() -> TypedDataHasher {
        TypedDataHasher::new(&ChainConfig::default())
    }

    #[test]
    fn valid_signatures_pass() {
        let (a, b) = (signer(1), signer(2));
        let hasher = hasher();
        let signed = sign_transaction(unsigned(), &hasher, &[&a, &b]).unwrap();
        assert_eq!(
            verify_signatures(&signed, &hasher, &[a.address(), b.address()]),
            Ok(())
        );
    }

    #[test]
    fn swapped_owners_fail_at_first_index() {
        let (a, b) = (signer(1), signer(2));
        let hasher = hasher();
        let signed = sign_transaction(unsigned(), &hasher, &[&a, &b]).unwrap();
        assert_eq!(
            verify_signatures(&signed, &hasher, &[b.address(), a.address()]),
            Err(VerificationError::WrongSigner {
                index: 0,
                expected: b.address(),
                recovered: a.address(),
            })
        );
    }

    #[test]
    fn unsigned_body_fails() {
        assert_eq!(
            verify_signatures(&unsigned(), &hasher(), &[BOB, BOB]),
            Err(VerificationError::MissingSignatures {
                signatures: 0,
                inputs: 2
            })
        );
    }

    #[test]
    fn owner_count_is_checked_first() {
        assert_eq!(
            verify_signatures(&unsigned(), &hasher(), &[BOB]),
            Err(VerificationError::OwnerCountMismatch {
                owners: 1,
                inputs: 2
            })
        );
    }

    #[test]
    fn signature_for_other_domain_fails() {
        let a = signer(1);
        let body = TransactionBody::payment(
            vec![Input::new(1, 0, 0)],
            vec![Output::payment(BOB, Address::ZERO, U256::from(1))],
            B256::ZERO,
        )
        .unwrap();
        let mainnet = TypedDataHasher::new(&ChainConfig {
            chain_id: 1,
            ..ChainConfig::default()
        });
        let signed = sign_transaction(body, &mainnet, &[&a]).unwrap();
        assert!(matches!(
            verify_signatures(&signed, &hasher(), &[a.address()]),
            Err(VerificationError::WrongSigner { index: 0, .. })
        ));
    }

    #[test]
    fn garbage_signature_is_invalid() {
        let mut raw = [0u8; 65];
        raw[64] = 30;
        let body = TransactionBody::payment(
            vec![Input::new(1, 0, 0)],
            vec![Output::payment(BOB, Address::ZERO, U256::from(1))],
            B256::ZERO,
        )
        .unwrap()
        .with_signatures(vec![Signature::from_bytes(raw)])
        .unwrap();
        assert_eq!(
            verify_signatures(&body, &hasher(), &[BOB]),
            Err(VerificationError::InvalidSignature {
                index: 0,
                source: SignatureError::InvalidRecoveryId(30),
            })
        );
    }
}
