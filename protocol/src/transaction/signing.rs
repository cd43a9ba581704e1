//! Transaction signing over the typed-data digest.
//!
//! Signing is a separate step from building because the key may not be
//! available at construction time (hardware wallet, remote signer, another
//! party owning one of the inputs). Anything that can turn a 32-byte digest
//! into a recoverable signature implements [`DigestSigner`]; the in-memory
//! [`LocalSigner`] is the one this crate ships.
//!
//! Every input owner signs the same digest. Signatures are attached in
//! input order, so the signer list passed to [`sign_transaction`] must
//! line up with [`TransactionBody::inputs`].

use alloy_primitives::{Address, B256};
use thiserror::Error;
use tracing::debug;

use super::error::TransactionError;
use super::typed_data::TypedDataHasher;
use super::types::{Signature, TransactionBody};
use crate::crypto::{LocalSigner, SignatureError};

pub use crate::crypto::recover_signer;

/// Errors raised while signing a transaction.
#[derive(Debug, Error)]
pub enum SigningError {
    /// One signer per input is required.
    #[error("{signers} signers for {inputs} inputs")]
    SignerCountMismatch { signers: usize, inputs: usize },

    /// The body already carries signatures.
    #[error("transaction is already signed")]
    AlreadySigned,

    /// An external signer failed to produce a signature.
    #[error("signer {address} failed: {reason}")]
    Signer { address: Address, reason: String },

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Body(#[from] TransactionError),
}

/// Something that signs typed-data digests for one address.
pub trait DigestSigner {
    /// Address whose inputs this signer can unlock.
    fn address(&self) -> Address;

    /// Produces `r || s || v` over `digest`.
    fn sign_digest(&self, digest: &B256) -> Result<Signature, SigningError>;
}

impl DigestSigner for LocalSigner {
    fn address(&self) -> Address {
        LocalSigner::address(self)
    }

    fn sign_digest(&self, digest: &B256) -> Result<Signature, SigningError> {
        Ok(self.sign(digest))
    }
}

/// Signs every input of `body`, one signer per input, in input order.
///
/// The digest is computed once with `hasher` and handed to each signer.
/// On success the returned body is fully signed and ready for
/// [`super::encoding::encode_signed`].
///
/// # Errors
///
/// - [`SigningError::AlreadySigned`] if `body` carries any signature.
/// - [`SigningError::SignerCountMismatch`] unless there is exactly one
///   signer per input.
/// - Whatever a signer returns.
///
/// # Example
///
/// ```
/// use alloy_primitives::{address, Address, B256, U256};
/// use plasma_protocol::config::ChainConfig;
/// use plasma_protocol::crypto::LocalSigner;
/// use plasma_protocol::transaction::{
///     sign_transaction, Input, Output, TransactionBody, TypedDataHasher,
/// };
///
/// let signer = LocalSigner::from_hex(
///     "0x0000000000000000000000000000000000000000000000000000000000000001",
/// )
/// .unwrap();
/// let body = TransactionBody::payment(
///     vec![Input::new(1_000, 0, 0)],
///     vec![Output::payment(
///         address!("3272ee86d8192f59261960c9ae186063c8c9041f"),
///         Address::ZERO,
///         U256::from(1),
///     )],
///     B256::ZERO,
/// )
/// .unwrap();
///
/// let hasher = TypedDataHasher::new(&ChainConfig::default());
/// let signed = sign_transaction(body, &hasher, &[&signer]).unwrap();
/// assert!(signed.is_fully_signed());
/// ```
pub fn sign_transaction(
    mut body: TransactionBody,
    hasher: &TypedDataHasher,
    signers: &[&dyn DigestSigner],
) -> Result<TransactionBody, SigningError> {
    if !body.signatures().is_empty() {
        return Err(SigningError::AlreadySigned);
    }
    if signers.len() != body.inputs().len() {
        return Err(SigningError::SignerCountMismatch {
            signers: signers.len(),
            inputs: body.inputs().len(),
        });
    }

    let digest = hasher.signing_digest(&body);
    for signer in signers {
        let signature = signer.sign_digest(&digest)?;
        body.push_signature(signature)?;
    }

    debug!(
        %digest,
        signatures = body.signatures().len(),
        "signed transaction"
    );
    Ok(body)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, U256};

    use super::*;
    use crate::config::ChainConfig;
    use crate::transaction::types::{Input, Output};

    const BOB: Address = address!("3272ee86d8192f59261960c9ae186063c8c9041f");

    fn signer(last_byte: u8) -> LocalSigner {
        let mut key = [0u8; 32];
        key[31] = last_byte;
        LocalSigner::from_bytes(&key).unwrap()
    }

    fn body(inputs: usize) -> TransactionBody {
        TransactionBody::payment(
            (0..inputs as u64).map(|b| Input::new(b + 1, 0, 0)).collect(),
            vec![Output::payment(BOB, Address::ZERO, U256::from(1))],
            B256::ZERO,
        )
        .unwrap()
    }

    fn hasher() -> TypedDataHasher {
        TypedDataHasher::new(&ChainConfig::default())
    }

    /// Signer that always refuses, standing in for a remote device.
    struct Refusing;

    impl DigestSigner for Refusing {
        fn address(&self) -> Address {
            Address::ZERO
        }

        fn sign_digest(&self, _digest: &B256) -> Result<Signature, SigningError> {
            Err(SigningError::Signer {
                address: Address::ZERO,
                reason: "user rejected".into(),
            })
        }
    }

    #[test]
    fn signatures_follow_input_order() {
        let (a, b) = (signer(1), signer(2));
        let hasher = hasher();
        let signed = sign_transaction(body(2), &hasher, &[&a, &b]).unwrap();

        let digest = hasher.signing_digest(&signed);
        assert_eq!(
            recover_signer(&digest, &signed.signatures()[0]).unwrap(),
            a.address()
        );
        assert_eq!(
            recover_signer(&digest, &signed.signatures()[1]).unwrap(),
            b.address()
        );
    }

    #[test]
    fn signer_count_must_match_inputs() {
        let a = signer(1);
        let err = sign_transaction(body(2), &hasher(), &[&a]).unwrap_err();
        assert!(matches!(
            err,
            SigningError::SignerCountMismatch {
                signers: 1,
                inputs: 2
            }
        ));
    }

    #[test]
    fn signed_body_cannot_be_signed_again() {
        let a = signer(1);
        let hasher = hasher();
        let signed = sign_transaction(body(1), &hasher, &[&a]).unwrap();
        let err = sign_transaction(signed, &hasher, &[&a]).unwrap_err();
        assert!(matches!(err, SigningError::AlreadySigned));
    }

    #[test]
    fn signer_failure_is_propagated() {
        let err = sign_transaction(body(1), &hasher(), &[&Refusing]).unwrap_err();
        assert!(matches!(err, SigningError::Signer { .. }));
    }

    #[test]
    fn body_without_inputs_needs_no_signers() {
        let signed = sign_transaction(body(0), &hasher(), &[]).unwrap();
        assert!(signed.is_fully_signed());
        assert!(signed.signatures().is_empty());
    }

    #[test]
    fn local_signer_implements_trait() {
        let a = signer(1);
        let dyn_signer: &dyn DigestSigner = &a;
        assert_eq!(dyn_signer.address(), a.address());
        let digest = B256::repeat_byte(5);
        assert_eq!(dyn_signer.sign_digest(&digest).unwrap(), a.sign(&digest));
    }
}
