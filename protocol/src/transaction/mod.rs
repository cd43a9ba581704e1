//! # Transaction Module
//!
//! Construction, encoding, hashing, signing and verification of Plasma
//! payment transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs         TransactionBody and its value types (Input, Output, Signature)
//! error.rs         Construction, encoding and decoding errors
//! builder.rs       Fluent TransactionBuilder: input selection, change, fee
//! encoding.rs      Canonical RLP, signed and unsigned, plus the decoder
//! typed_data.rs    EIP-712 struct hash and signing digest
//! signing.rs       DigestSigner seam and sign_transaction
//! verification.rs  Recover-and-compare check of every input signature
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: [`TransactionBuilder`] selects inputs and assembles outputs.
//! 2. **Hash**: [`TypedDataHasher::signing_digest`] yields the digest to sign.
//! 3. **Sign**: [`sign_transaction`] attaches one signature per input.
//! 4. **Encode**: [`encode_signed`] produces the bytes the child chain takes.
//! 5. **Decode**: [`decode`] parses whatever the chain hands back.
//!
//! ## Design Decisions
//!
//! - The raw encoding never pads; the typed-data hash always pads to four
//!   inputs and four outputs. The two representations are independent.
//! - The transaction id is keccak-256 of the unsigned encoding, so it is
//!   stable across signing.
//! - All amounts are `U256` in the token's smallest unit. No floating point
//!   anywhere near monetary values.

pub mod builder;
pub mod encoding;
pub mod error;
pub mod signing;
pub mod typed_data;
pub mod types;
pub mod verification;

pub use builder::TransactionBuilder;
pub use encoding::{
    decode, decode_hex, encode_signed, encode_signed_hex, encode_unsigned, encode_unsigned_hex,
    transaction_hash,
};
pub use error::{DecodeError, EncodeError, TransactionError};
pub use signing::{sign_transaction, DigestSigner, SigningError};
pub use typed_data::{domain_separator, TypedDataHasher};
pub use types::{Input, Output, OutputType, Payment, Signature, TransactionBody, Utxo};
pub use verification::{verify_signatures, VerificationError};
