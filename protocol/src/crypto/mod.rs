//! # Cryptographic Primitives
//!
//! Everything that touches key material or keccak lives here. The rest of
//! the crate only ever sees digests, [`Signature`](crate::transaction::Signature)s
//! and addresses.
//!
//! We don't roll our own: hashing is `alloy-primitives`' keccak, signing and
//! recovery are `secp256k1` with its global context.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{keccak256, public_key_to_address};
pub use keys::{KeyError, LocalSigner};
pub use signatures::{recover_signer, sign_digest, verify, SignatureError};
