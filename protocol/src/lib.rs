// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Plasma Protocol: Transaction Codec
//!
//! Client-side plumbing for a UTXO Plasma child chain: build a payment,
//! hash it the way the root-chain contracts do, sign it, and put it on the
//! wire in the one byte format the child chain accepts. And back again.
//!
//! Everything here is a pure function over values. No I/O, no global state,
//! no async. Talking to the watcher or the root chain is the caller's job.
//!
//! ## Architecture
//!
//! - **position**: packing `(block, txindex, oindex)` into one integer.
//! - **transaction**: bodies, builder, RLP codec, EIP-712 digest, signing.
//! - **crypto**: keccak and secp256k1. Don't roll your own.
//! - **config**: protocol constants and per-deployment [`ChainConfig`].
//!
//! ## Quick tour
//!
//! ```
//! use alloy_primitives::{address, Address, U256};
//! use plasma_protocol::config::ChainConfig;
//! use plasma_protocol::crypto::LocalSigner;
//! use plasma_protocol::position::UtxoPosition;
//! use plasma_protocol::transaction::{
//!     decode, encode_signed, sign_transaction, verify_signatures, Payment,
//!     TransactionBuilder, TypedDataHasher, Utxo,
//! };
//!
//! let config = ChainConfig::default();
//! let alice = LocalSigner::from_hex(
//!     "0x0000000000000000000000000000000000000000000000000000000000000001",
//! )
//! .unwrap();
//! let bob = address!("3272ee86d8192f59261960c9ae186063c8c9041f");
//!
//! let body = TransactionBuilder::new(&config, alice.address())
//!     .utxos([Utxo::new(UtxoPosition::deposit(1), alice.address(), Address::ZERO, U256::from(10))])
//!     .payment(Payment::new(bob, Address::ZERO, U256::from(3)))
//!     .build()
//!     .unwrap();
//!
//! let hasher = TypedDataHasher::new(&config);
//! let signed = sign_transaction(body, &hasher, &[&alice]).unwrap();
//! let bytes = encode_signed(&signed).unwrap();
//!
//! let decoded = decode(&bytes).unwrap();
//! verify_signatures(&decoded, &hasher, &[alice.address()]).unwrap();
//! ```
//!
//! ## Design Philosophy
//!
//! 1. Invalid bodies are unrepresentable: constructors check, accessors trust.
//! 2. One canonical encoding per body. The decoder rejects everything else.
//! 3. Configuration is passed in, never looked up.
//! 4. If it touches money, it has tests. Plural.

pub mod config;
pub mod crypto;
pub mod position;
pub mod transaction;

pub use config::{ChainConfig, Fee};
pub use position::{decode_utxo_position, encode_utxo_position, PositionError, UtxoPosition};
pub use transaction::{
    decode, encode_signed, encode_unsigned, TransactionBody, TransactionBuilder, TypedDataHasher,
};
