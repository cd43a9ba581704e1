//! Error types for transaction construction, encoding and decoding.
//!
//! Every failure carries enough context to act on without re-deriving it:
//! the currency and amounts for funding failures, the offending count for
//! arity failures, and the field name for decoding failures.

use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Errors raised while assembling or mutating a [`super::TransactionBody`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// More inputs than the contracts accept.
    #[error("too many inputs: {count} (max {max})")]
    TooManyInputs { count: usize, max: usize },

    /// More outputs than the contracts accept.
    #[error("too many outputs: {count} (max {max})")]
    TooManyOutputs { count: usize, max: usize },

    /// An output or payment carries a zero amount.
    #[error("amount at index {index} must be > 0")]
    ZeroAmount { index: usize },

    /// The number of signatures does not match the number of inputs.
    #[error("signature count {signatures} does not match input count {inputs}")]
    SignatureCountMismatch { signatures: usize, inputs: usize },

    /// Every input already carries a signature.
    #[error("transaction already holds {inputs} signatures, one per input")]
    AlreadySigned { inputs: usize },

    /// The sender's outputs of `currency` cannot cover the requirement.
    #[error(
        "insufficient funds in {currency}: required {required}, available {available} (short by {shortfall})"
    )]
    InsufficientFunds {
        /// Token that ran out.
        currency: Address,
        /// Sum of payments (and fee) in this token.
        required: U256,
        /// Sum of the sender's outputs in this token.
        available: U256,
        /// `required - available`.
        shortfall: U256,
    },

    /// Summing amounts for `currency` overflowed 256 bits.
    #[error("amount overflow while summing {currency}")]
    AmountOverflow { currency: Address },

    /// The builder was asked to pay nobody.
    #[error("transaction has no payments")]
    NoPayments,
}

/// Errors raised while serializing a body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The signed form needs exactly one signature per input.
    #[error("cannot encode signed transaction: {signatures} signatures for {inputs} inputs")]
    SignatureCountMismatch { signatures: usize, inputs: usize },
}

/// Errors raised while parsing transaction bytes.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The RLP structure itself is malformed (truncated, non-canonical
    /// length prefix, list/string confusion).
    #[error("malformed {field}: {source}")]
    Rlp {
        field: &'static str,
        #[source]
        source: alloy_rlp::Error,
    },

    /// A list holds the wrong number of items.
    #[error("{field} must have {expected} items, got {got}")]
    UnexpectedArity {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    /// A fixed-width leaf has the wrong length.
    #[error("{field} must be exactly {expected} bytes, got {got}")]
    InvalidWidth {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    /// An integer leaf is wider than its field.
    #[error("{field} is {got} bytes wide (max {max})")]
    Oversized {
        field: &'static str,
        max: usize,
        got: usize,
    },

    /// An integer leaf has a leading zero byte.
    #[error("{field} is not minimally encoded")]
    NonCanonicalInteger { field: &'static str },

    /// Bytes remain after the transaction's outer list.
    #[error("{count} trailing bytes after transaction")]
    TrailingBytes { count: usize },

    /// The output type is not one the chain defines.
    #[error("unknown output type {0}")]
    UnknownOutputType(u64),

    /// The hex wrapper is malformed.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The bytes are well formed but describe an invalid body.
    #[error("invalid transaction body: {0}")]
    InvalidBody(#[from] TransactionError),
}
