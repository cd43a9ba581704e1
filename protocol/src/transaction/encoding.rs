//! Canonical RLP encoding of transaction bodies.
//!
//! The child chain parses transactions as nested RLP lists:
//!
//! ```text
//! unsigned: [txType, [input, ...], [output, ...], txData, metadata]
//! signed:   [[sig, ...], txType, [input, ...], [output, ...], txData, metadata]
//! input:    [blknum, txindex, oindex]
//! output:   [outputType, [outputGuard, token, amount]]
//! ```
//!
//! Integers are minimal big-endian strings (zero is the empty string),
//! addresses are 20-byte strings, metadata is a 32-byte string and each
//! signature a 65-byte string. Absent inputs and outputs are simply not in
//! the list. The decoder accepts exactly one encoding per body and rejects
//! everything else, so `encode(decode(bytes)) == bytes` whenever decoding
//! succeeds.

use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_rlp::{length_of_length, BufMut, Encodable, Header};
use tracing::{debug, trace};

use super::error::{DecodeError, EncodeError};
use super::types::{Input, Output, OutputType, Signature, TransactionBody};
use crate::config::{ADDRESS_LENGTH, AMOUNT_MAX_LENGTH, METADATA_LENGTH, SIGNATURE_LENGTH};
use crate::position::UtxoPosition;

/// Items in the unsigned top-level list.
const UNSIGNED_FIELDS: usize = 5;
/// Items in the signed top-level list (signatures first).
const SIGNED_FIELDS: usize = 6;

// ---------------------------------------------------------------------------
// List helpers
// ---------------------------------------------------------------------------

fn payload_length<T: Encodable>(items: &[T]) -> usize {
    items.iter().map(Encodable::length).sum()
}

fn list_length<T: Encodable>(items: &[T]) -> usize {
    let payload = payload_length(items);
    payload + length_of_length(payload)
}

fn encode_items<T: Encodable>(items: &[T], out: &mut dyn BufMut) {
    Header {
        list: true,
        payload_length: payload_length(items),
    }
    .encode(out);
    for item in items {
        item.encode(out);
    }
}

// ---------------------------------------------------------------------------
// Encodable impls
// ---------------------------------------------------------------------------

impl Input {
    fn rlp_payload_length(&self) -> usize {
        let p = &self.position;
        p.block_number.length() + p.transaction_index.length() + p.output_index.length()
    }
}

impl Encodable for Input {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: self.rlp_payload_length(),
        }
        .encode(out);
        self.position.block_number.encode(out);
        self.position.transaction_index.encode(out);
        self.position.output_index.encode(out);
    }

    fn length(&self) -> usize {
        let payload = self.rlp_payload_length();
        payload + length_of_length(payload)
    }
}

impl Output {
    fn rlp_data_length(&self) -> usize {
        self.output_guard.length() + self.token.length() + self.amount.length()
    }

    fn rlp_payload_length(&self) -> usize {
        let data = self.rlp_data_length();
        self.output_type.id().length() + data + length_of_length(data)
    }
}

impl Encodable for Output {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: self.rlp_payload_length(),
        }
        .encode(out);
        self.output_type.id().encode(out);
        Header {
            list: true,
            payload_length: self.rlp_data_length(),
        }
        .encode(out);
        self.output_guard.encode(out);
        self.token.encode(out);
        self.amount.encode(out);
    }

    fn length(&self) -> usize {
        let payload = self.rlp_payload_length();
        payload + length_of_length(payload)
    }
}

impl Encodable for Signature {
    fn encode(&self, out: &mut dyn BufMut) {
        self.as_bytes()[..].encode(out);
    }

    fn length(&self) -> usize {
        self.as_bytes()[..].length()
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn encode_body(body: &TransactionBody, signatures: Option<&[Signature]>) -> Vec<u8> {
    let payload = signatures.map_or(0, list_length)
        + body.tx_type().length()
        + list_length(body.inputs())
        + list_length(body.outputs())
        + body.tx_data().length()
        + body.metadata().length();

    let mut out = Vec::with_capacity(payload + length_of_length(payload));
    Header {
        list: true,
        payload_length: payload,
    }
    .encode(&mut out);
    if let Some(signatures) = signatures {
        encode_items(signatures, &mut out);
    }
    body.tx_type().encode(&mut out);
    encode_items(body.inputs(), &mut out);
    encode_items(body.outputs(), &mut out);
    body.tx_data().encode(&mut out);
    body.metadata().encode(&mut out);
    out
}

/// Serializes the body without signatures. These are the bytes the
/// transaction hash is computed over.
pub fn encode_unsigned(body: &TransactionBody) -> Vec<u8> {
    encode_body(body, None)
}

/// Serializes the body with its signature list in front.
///
/// Fails unless there is exactly one signature per input.
pub fn encode_signed(body: &TransactionBody) -> Result<Vec<u8>, EncodeError> {
    if body.signatures().len() != body.inputs().len() {
        return Err(EncodeError::SignatureCountMismatch {
            signatures: body.signatures().len(),
            inputs: body.inputs().len(),
        });
    }
    Ok(encode_body(body, Some(body.signatures())))
}

/// Hash the child chain identifies the transaction by: keccak-256 of the
/// unsigned encoding.
pub fn transaction_hash(body: &TransactionBody) -> B256 {
    keccak256(encode_unsigned(body))
}

/// `0x`-prefixed hex of [`encode_unsigned`].
pub fn encode_unsigned_hex(body: &TransactionBody) -> String {
    format!("0x{}", hex::encode(encode_unsigned(body)))
}

/// `0x`-prefixed hex of [`encode_signed`].
pub fn encode_signed_hex(body: &TransactionBody) -> Result<String, EncodeError> {
    Ok(format!("0x{}", hex::encode(encode_signed(body)?)))
}

impl TransactionBody {
    /// See [`encode_unsigned`].
    pub fn encode_unsigned(&self) -> Vec<u8> {
        encode_unsigned(self)
    }

    /// See [`encode_signed`].
    pub fn encode_signed(&self) -> Result<Vec<u8>, EncodeError> {
        encode_signed(self)
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn rlp_err(field: &'static str) -> impl FnOnce(alloy_rlp::Error) -> DecodeError {
    move |source| DecodeError::Rlp { field, source }
}

/// Splits a list payload into the raw encodings of its items.
fn split_items<'a>(mut payload: &'a [u8], field: &'static str) -> Result<Vec<&'a [u8]>, DecodeError> {
    let mut items = Vec::new();
    while !payload.is_empty() {
        let start = payload;
        let header = Header::decode(&mut payload).map_err(rlp_err(field))?;
        if payload.len() < header.payload_length {
            return Err(DecodeError::Rlp {
                field,
                source: alloy_rlp::Error::InputTooShort,
            });
        }
        payload = &payload[header.payload_length..];
        items.push(&start[..start.len() - payload.len()]);
    }
    Ok(items)
}

fn take_list<'a>(mut item: &'a [u8], field: &'static str) -> Result<&'a [u8], DecodeError> {
    Header::decode_bytes(&mut item, true).map_err(rlp_err(field))
}

fn take_string<'a>(mut item: &'a [u8], field: &'static str) -> Result<&'a [u8], DecodeError> {
    Header::decode_bytes(&mut item, false).map_err(rlp_err(field))
}

fn expect_arity<'a>(
    payload: &'a [u8],
    field: &'static str,
    expected: usize,
) -> Result<Vec<&'a [u8]>, DecodeError> {
    let items = split_items(payload, field)?;
    if items.len() != expected {
        return Err(DecodeError::UnexpectedArity {
            field,
            expected,
            got: items.len(),
        });
    }
    Ok(items)
}

/// Reads a minimally encoded big-endian integer at most `max` bytes wide.
fn take_uint<'a>(item: &'a [u8], field: &'static str, max: usize) -> Result<&'a [u8], DecodeError> {
    let bytes = take_string(item, field)?;
    if bytes.len() > max {
        return Err(DecodeError::Oversized {
            field,
            max,
            got: bytes.len(),
        });
    }
    if bytes.first() == Some(&0) {
        return Err(DecodeError::NonCanonicalInteger { field });
    }
    Ok(bytes)
}

fn take_u64(item: &[u8], field: &'static str, max: usize) -> Result<u64, DecodeError> {
    let bytes = take_uint(item, field, max)?;
    Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

fn take_fixed<'a>(item: &'a [u8], field: &'static str, width: usize) -> Result<&'a [u8], DecodeError> {
    let bytes = take_string(item, field)?;
    if bytes.len() != width {
        return Err(DecodeError::InvalidWidth {
            field,
            expected: width,
            got: bytes.len(),
        });
    }
    Ok(bytes)
}

fn decode_input(item: &[u8]) -> Result<Input, DecodeError> {
    let fields = expect_arity(take_list(item, "input")?, "input", 3)?;
    // Widths are bounded by the field types, so the casts below are lossless.
    let block_number = take_u64(fields[0], "input block number", 8)?;
    let transaction_index = take_u64(fields[1], "input transaction index", 4)? as u32;
    let output_index = take_u64(fields[2], "input output index", 2)? as u16;
    Ok(Input::from(UtxoPosition::new(
        block_number,
        transaction_index,
        output_index,
    )))
}

fn decode_output(item: &[u8]) -> Result<Output, DecodeError> {
    let fields = expect_arity(take_list(item, "output")?, "output", 2)?;
    let type_id = take_u64(fields[0], "output type", 8)?;
    let output_type = OutputType::from_id(type_id).ok_or(DecodeError::UnknownOutputType(type_id))?;

    let data = expect_arity(take_list(fields[1], "output data")?, "output data", 3)?;
    let output_guard = Address::from_slice(take_fixed(data[0], "output guard", ADDRESS_LENGTH)?);
    let token = Address::from_slice(take_fixed(data[1], "output token", ADDRESS_LENGTH)?);
    let amount_bytes = take_uint(data[2], "output amount", AMOUNT_MAX_LENGTH)?;
    let amount = U256::try_from_be_slice(amount_bytes).ok_or(DecodeError::Oversized {
        field: "output amount",
        max: AMOUNT_MAX_LENGTH,
        got: amount_bytes.len(),
    })?;

    Ok(Output {
        output_type,
        output_guard,
        token,
        amount,
    })
}

fn decode_signature(item: &[u8]) -> Result<Signature, DecodeError> {
    let bytes = take_fixed(item, "signature", SIGNATURE_LENGTH)?;
    Signature::from_slice(bytes).ok_or(DecodeError::InvalidWidth {
        field: "signature",
        expected: SIGNATURE_LENGTH,
        got: bytes.len(),
    })
}

/// Parses either encoding back into a body.
///
/// The signed form is recognized by its leading list; the unsigned form
/// starts with the `txType` integer.
pub fn decode(bytes: &[u8]) -> Result<TransactionBody, DecodeError> {
    decode_body(bytes).inspect_err(|err| {
        debug!(len = bytes.len(), error = %err, "rejected transaction bytes");
    })
}

fn decode_body(bytes: &[u8]) -> Result<TransactionBody, DecodeError> {
    let mut buf = bytes;
    let payload = Header::decode_bytes(&mut buf, true).map_err(rlp_err("transaction"))?;
    if !buf.is_empty() {
        return Err(DecodeError::TrailingBytes { count: buf.len() });
    }

    let signed = payload.first().is_some_and(|b| *b >= alloy_rlp::EMPTY_LIST_CODE);
    let expected = if signed { SIGNED_FIELDS } else { UNSIGNED_FIELDS };
    let fields = expect_arity(payload, "transaction", expected)?;
    let (signature_field, fields) = if signed {
        (Some(fields[0]), &fields[1..])
    } else {
        (None, &fields[..])
    };

    let tx_type = take_u64(fields[0], "tx type", 4)? as u32;
    let inputs = split_items(take_list(fields[1], "inputs")?, "inputs")?
        .into_iter()
        .map(decode_input)
        .collect::<Result<Vec<_>, _>>()?;
    let outputs = split_items(take_list(fields[2], "outputs")?, "outputs")?
        .into_iter()
        .map(decode_output)
        .collect::<Result<Vec<_>, _>>()?;
    let tx_data = take_u64(fields[3], "tx data", 4)? as u32;
    let metadata = B256::from_slice(take_fixed(fields[4], "metadata", METADATA_LENGTH)?);

    let body = TransactionBody::new(tx_type, inputs, outputs, tx_data, metadata)?;

    let body = match signature_field {
        Some(item) => {
            let signatures = split_items(take_list(item, "signatures")?, "signatures")?
                .into_iter()
                .map(decode_signature)
                .collect::<Result<Vec<_>, _>>()?;
            body.with_signatures(signatures)?
        }
        None => body,
    };

    trace!(
        signed,
        inputs = body.inputs().len(),
        outputs = body.outputs().len(),
        "decoded transaction"
    );
    Ok(body)
}

/// Parses `0x`-prefixed (or bare) hex.
pub fn decode_hex(encoded: &str) -> Result<TransactionBody, DecodeError> {
    let stripped = encoded.strip_prefix("0x").unwrap_or(encoded);
    decode(&hex::decode(stripped)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
