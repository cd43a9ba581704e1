//! Core type definitions for Plasma transactions.
//!
//! These types form the vocabulary of every transaction on the child chain.
//! Small value types (`Input`, `Output`, `Signature`) have public fields or
//! cheap constructors; [`TransactionBody`] keeps its fields private so the
//! arity, amount and signature invariants hold for every value that exists.

use std::fmt;

use alloy_primitives::{Address, FixedBytes, B256, U256};
use serde::{Deserialize, Serialize};

use super::error::TransactionError;
use crate::config::{DEFAULT_TX_DATA, MAX_INPUTS, MAX_OUTPUTS, PAYMENT_TX_TYPE, SIGNATURE_LENGTH};
use crate::position::UtxoPosition;

// ---------------------------------------------------------------------------
// OutputType
// ---------------------------------------------------------------------------

/// Discriminant for the predicate guarding an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputType {
    /// Fungible payment output, spendable by the owner's signature.
    Payment,
    /// Fee-claim output, produced by the operator's fee transaction.
    FeeClaim,
}

impl OutputType {
    /// Numeric id used on the wire and in the struct hash.
    pub const fn id(self) -> u64 {
        match self {
            Self::Payment => 1,
            Self::FeeClaim => 2,
        }
    }

    /// Inverse of [`OutputType::id`].
    pub const fn from_id(id: u64) -> Option<Self> {
        match id {
            1 => Some(Self::Payment),
            2 => Some(Self::FeeClaim),
            _ => None,
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payment => write!(f, "Payment"),
            Self::FeeClaim => write!(f, "FeeClaim"),
        }
    }
}

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Reference to an unspent output being consumed.
///
/// Only the position travels with the transaction; owner and amount are
/// looked up off-chain.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Input {
    pub position: UtxoPosition,
}

impl Input {
    /// Input spending the output at `(block_number, transaction_index, output_index)`.
    pub const fn new(block_number: u64, transaction_index: u32, output_index: u16) -> Self {
        Self {
            position: UtxoPosition::new(block_number, transaction_index, output_index),
        }
    }
}

impl From<UtxoPosition> for Input {
    fn from(position: UtxoPosition) -> Self {
        Self { position }
    }
}

/// A newly created output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    pub output_type: OutputType,
    /// Owner (for payment outputs) or predicate guard.
    pub output_guard: Address,
    /// Token contract; the zero address is the native coin.
    pub token: Address,
    /// Must be strictly positive; enforced by [`TransactionBody::new`].
    pub amount: U256,
}

impl Output {
    /// A payment output to `owner`.
    pub fn payment(owner: Address, token: Address, amount: U256) -> Self {
        Self {
            output_type: OutputType::Payment,
            output_guard: owner,
            token,
            amount,
        }
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A 65-byte recoverable ECDSA signature, `r || s || v`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(FixedBytes<SIGNATURE_LENGTH>);

impl Signature {
    /// Wraps raw `r || s || v` bytes.
    pub const fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(FixedBytes(bytes))
    }

    /// Parses a signature, rejecting anything that is not 65 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; SIGNATURE_LENGTH] = bytes.try_into().ok()?;
        Some(Self::from_bytes(array))
    }

    /// The raw 65 bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0 .0
    }

    /// First 32 bytes.
    pub fn r(&self) -> B256 {
        B256::from_slice(&self.0[..32])
    }

    /// Second 32 bytes.
    pub fn s(&self) -> B256 {
        B256::from_slice(&self.0[32..64])
    }

    /// Recovery byte, `27` or `28` for signatures made by this crate.
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// `0x`-prefixed hex, the form the watcher API exchanges.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// TransactionBody
// ---------------------------------------------------------------------------

/// A Plasma transaction: inputs being spent, outputs being created, and one
/// signature per input once signed.
///
/// Construction validates every invariant, so code holding a
/// `TransactionBody` never re-checks:
///
/// - at most [`MAX_INPUTS`] inputs and [`MAX_OUTPUTS`] outputs;
/// - every output amount is strictly positive;
/// - signatures are either absent or exactly one per input, attached in
///   input order and never reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBody {
    tx_type: u32,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
    tx_data: u32,
    metadata: B256,
    signatures: Vec<Signature>,
}

impl TransactionBody {
    /// Creates an unsigned body, checking arity and amounts.
    pub fn new(
        tx_type: u32,
        inputs: Vec<Input>,
        outputs: Vec<Output>,
        tx_data: u32,
        metadata: B256,
    ) -> Result<Self, TransactionError> {
        if inputs.len() > MAX_INPUTS {
            return Err(TransactionError::TooManyInputs {
                count: inputs.len(),
                max: MAX_INPUTS,
            });
        }
        if outputs.len() > MAX_OUTPUTS {
            return Err(TransactionError::TooManyOutputs {
                count: outputs.len(),
                max: MAX_OUTPUTS,
            });
        }
        if let Some(index) = outputs.iter().position(|o| o.amount.is_zero()) {
            return Err(TransactionError::ZeroAmount { index });
        }

        Ok(Self {
            tx_type,
            inputs,
            outputs,
            tx_data,
            metadata,
            signatures: Vec::new(),
        })
    }

    /// Creates an unsigned payment body.
    pub fn payment(
        inputs: Vec<Input>,
        outputs: Vec<Output>,
        metadata: B256,
    ) -> Result<Self, TransactionError> {
        Self::new(PAYMENT_TX_TYPE, inputs, outputs, DEFAULT_TX_DATA, metadata)
    }

    /// Attaches a full set of signatures, one per input.
    pub fn with_signatures(mut self, signatures: Vec<Signature>) -> Result<Self, TransactionError> {
        if !self.signatures.is_empty() {
            return Err(TransactionError::AlreadySigned {
                inputs: self.inputs.len(),
            });
        }
        if signatures.len() != self.inputs.len() {
            return Err(TransactionError::SignatureCountMismatch {
                signatures: signatures.len(),
                inputs: self.inputs.len(),
            });
        }
        self.signatures = signatures;
        Ok(self)
    }

    /// Appends the signature for the next unsigned input.
    pub fn push_signature(&mut self, signature: Signature) -> Result<(), TransactionError> {
        if self.signatures.len() >= self.inputs.len() {
            return Err(TransactionError::AlreadySigned {
                inputs: self.inputs.len(),
            });
        }
        self.signatures.push(signature);
        Ok(())
    }

    /// Transaction type; `1` for payments.
    pub fn tx_type(&self) -> u32 {
        self.tx_type
    }

    /// Inputs in spending order.
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Outputs in creation order.
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Reserved word, always `0` today.
    pub fn tx_data(&self) -> u32 {
        self.tx_data
    }

    /// Free-form 32-byte metadata.
    pub fn metadata(&self) -> B256 {
        self.metadata
    }

    /// Signatures attached so far, in input order.
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Returns `true` when every input carries its signature.
    pub fn is_fully_signed(&self) -> bool {
        self.signatures.len() == self.inputs.len()
    }

    /// The same body with signatures stripped.
    pub fn unsigned(&self) -> Self {
        Self {
            signatures: Vec::new(),
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Builder vocabulary
// ---------------------------------------------------------------------------

/// An unspent output the sender can spend, as reported by the watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub position: UtxoPosition,
    pub owner: Address,
    pub currency: Address,
    pub amount: U256,
}

impl Utxo {
    pub fn new(position: UtxoPosition, owner: Address, currency: Address, amount: U256) -> Self {
        Self {
            position,
            owner,
            currency,
            amount,
        }
    }
}

/// A requested transfer to `owner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub owner: Address,
    pub currency: Address,
    pub amount: U256,
}

impl Payment {
    pub fn new(owner: Address, currency: Address, amount: U256) -> Self {
        Self {
            owner,
            currency,
            amount,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    const ALICE: Address = address!("f4ebbe787311bb955bb353b7a4d8b97af8ed1c9b");

    fn one_output() -> Vec<Output> {
        vec![Output::payment(ALICE, Address::ZERO, U256::from(1))]
    }

    #[test]
    fn output_type_ids_roundtrip() {
        for ty in [OutputType::Payment, OutputType::FeeClaim] {
            assert_eq!(OutputType::from_id(ty.id()), Some(ty));
        }
        assert_eq!(OutputType::from_id(0), None);
        assert_eq!(OutputType::from_id(3), None);
    }

    #[test]
    fn body_rejects_five_inputs() {
        let inputs = (0..5).map(|i| Input::new(1, i, 0)).collect();
        let err = TransactionBody::payment(inputs, one_output(), B256::ZERO).unwrap_err();
        assert_eq!(err, TransactionError::TooManyInputs { count: 5, max: 4 });
    }

    #[test]
    fn body_rejects_five_outputs() {
        let outputs = vec![Output::payment(ALICE, Address::ZERO, U256::from(1)); 5];
        let err = TransactionBody::payment(vec![], outputs, B256::ZERO).unwrap_err();
        assert_eq!(err, TransactionError::TooManyOutputs { count: 5, max: 4 });
    }

    #[test]
    fn body_rejects_zero_amount_output() {
        let outputs = vec![
            Output::payment(ALICE, Address::ZERO, U256::from(1)),
            Output::payment(ALICE, Address::ZERO, U256::ZERO),
        ];
        let err = TransactionBody::payment(vec![], outputs, B256::ZERO).unwrap_err();
        assert_eq!(err, TransactionError::ZeroAmount { index: 1 });
    }

    #[test]
    fn signatures_are_append_only_and_bounded() {
        let mut body =
            TransactionBody::payment(vec![Input::new(1, 0, 0)], one_output(), B256::ZERO).unwrap();
        assert!(!body.is_fully_signed());

        let sig = Signature::from_bytes([7u8; 65]);
        body.push_signature(sig).unwrap();
        assert!(body.is_fully_signed());
        assert_eq!(
            body.push_signature(sig),
            Err(TransactionError::AlreadySigned { inputs: 1 })
        );
        assert!(body.unsigned().signatures().is_empty());
    }

    #[test]
    fn with_signatures_requires_one_per_input() {
        let body = TransactionBody::payment(
            vec![Input::new(1, 0, 0), Input::new(2, 0, 0)],
            one_output(),
            B256::ZERO,
        )
        .unwrap();
        let err = body
            .clone()
            .with_signatures(vec![Signature::from_bytes([1u8; 65])])
            .unwrap_err();
        assert_eq!(
            err,
            TransactionError::SignatureCountMismatch {
                signatures: 1,
                inputs: 2
            }
        );

        let signed = body
            .with_signatures(vec![Signature::from_bytes([1u8; 65]); 2])
            .unwrap();
        assert!(signed.is_fully_signed());
    }

    #[test]
    fn signature_accessors_split_rsv() {
        let mut raw = [0u8; 65];
        raw[..32].fill(0x11);
        raw[32..64].fill(0x22);
        raw[64] = 27;
        let sig = Signature::from_bytes(raw);
        assert_eq!(sig.r(), B256::repeat_byte(0x11));
        assert_eq!(sig.s(), B256::repeat_byte(0x22));
        assert_eq!(sig.v(), 27);
        assert_eq!(sig.to_hex().len(), 2 + 130);
    }

    #[test]
    fn signature_from_slice_checks_length() {
        assert!(Signature::from_slice(&[0u8; 64]).is_none());
        assert!(Signature::from_slice(&[0u8; 65]).is_some());
    }

    #[test]
    fn output_serde_roundtrip() {
        let out = Output::payment(ALICE, Address::ZERO, U256::from(42));
        let json = serde_json::to_string(&out).unwrap();
        let recovered: Output = serde_json::from_str(&json).unwrap();
        assert_eq!(out, recovered);
    }

    #[test]
    fn signature_serde_roundtrip() {
        let sig = Signature::from_bytes([9u8; 65]);
        let json = serde_json::to_string(&sig).unwrap();
        let recovered: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(sig, recovered);
    }
}
