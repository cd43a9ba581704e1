//! # UTXO Positions
//!
//! Every output on the child chain is addressed by the block that contains
//! its transaction, the transaction's index in that block, and the output's
//! index in the transaction. The contracts squeeze that triple into a single
//! integer:
//!
//! ```text
//! position = block_number * BLOCK_OFFSET + transaction_index * TX_OFFSET + output_index
//! ```
//!
//! The offsets are chosen so the three ranges never overlap, which makes the
//! packing a bijection for every in-range triple. Both directions are
//! fallible: packing rejects fields that would alias another output, and
//! unpacking rejects integers whose transaction slot does not fit a `u32`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{BLOCK_OFFSET, TX_OFFSET};

/// Errors raised when a position cannot be packed without losing information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// The output index would spill into the transaction index range.
    #[error("output index {output_index} out of range (must be < {max})")]
    OutputIndexOutOfRange { output_index: u16, max: u64 },

    /// The transaction index would spill into the block number range.
    #[error("transaction index {transaction_index} out of range (must be < {max})")]
    TransactionIndexOutOfRange { transaction_index: u64, max: u64 },

    /// The block number is too large for a 64-bit position.
    #[error("block number {block_number} overflows a 64-bit utxo position")]
    BlockNumberOverflow { block_number: u64 },
}

/// Location of an output on the child chain.
///
/// Ordering is lexicographic over `(block_number, transaction_index,
/// output_index)`, which is also the numeric order of the packed form.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UtxoPosition {
    /// Child-chain block (or deposit block) containing the transaction.
    pub block_number: u64,
    /// Index of the transaction within the block.
    pub transaction_index: u32,
    /// Index of the output within the transaction.
    pub output_index: u16,
}

impl UtxoPosition {
    /// Creates a position from its three components.
    pub const fn new(block_number: u64, transaction_index: u32, output_index: u16) -> Self {
        Self {
            block_number,
            transaction_index,
            output_index,
        }
    }

    /// Position of a deposit: the deposit block holds exactly one
    /// transaction with exactly one output.
    pub const fn deposit(block_number: u64) -> Self {
        Self::new(block_number, 0, 0)
    }

    /// Packs the position into its integer form.
    pub fn encode(&self) -> Result<u64, PositionError> {
        if u64::from(self.output_index) >= TX_OFFSET {
            return Err(PositionError::OutputIndexOutOfRange {
                output_index: self.output_index,
                max: TX_OFFSET,
            });
        }

        // Any u32 * TX_OFFSET fits in a u64, so only the range check matters.
        let tx_part = u64::from(self.transaction_index) * TX_OFFSET;
        if tx_part >= BLOCK_OFFSET {
            return Err(PositionError::TransactionIndexOutOfRange {
                transaction_index: u64::from(self.transaction_index),
                max: BLOCK_OFFSET / TX_OFFSET,
            });
        }

        self.block_number
            .checked_mul(BLOCK_OFFSET)
            .and_then(|block_part| block_part.checked_add(tx_part))
            .and_then(|sum| sum.checked_add(u64::from(self.output_index)))
            .ok_or(PositionError::BlockNumberOverflow {
                block_number: self.block_number,
            })
    }

    /// Unpacks an integer position. Every position `encode` accepts maps
    /// back to itself.
    pub fn decode(value: u64) -> Result<Self, PositionError> {
        // TX_OFFSET fits in a u16, so the remainder always does too.
        let output_index = (value % TX_OFFSET) as u16;
        let tx_slot = (value / TX_OFFSET) % (BLOCK_OFFSET / TX_OFFSET);
        let transaction_index =
            u32::try_from(tx_slot).map_err(|_| PositionError::TransactionIndexOutOfRange {
                transaction_index: tx_slot,
                max: u64::from(u32::MAX) + 1,
            })?;
        let block_number = value / BLOCK_OFFSET;
        Ok(Self::new(block_number, transaction_index, output_index))
    }
}

impl fmt::Display for UtxoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.block_number, self.transaction_index, self.output_index
        )
    }
}

impl TryFrom<UtxoPosition> for u64 {
    type Error = PositionError;

    fn try_from(pos: UtxoPosition) -> Result<Self, Self::Error> {
        pos.encode()
    }
}

impl TryFrom<u64> for UtxoPosition {
    type Error = PositionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::decode(value)
    }
}

/// Packs `(block, txindex, oindex)` into a single integer.
pub fn encode_utxo_position(pos: &UtxoPosition) -> Result<u64, PositionError> {
    pos.encode()
}

/// Inverse of [`encode_utxo_position`].
pub fn decode_utxo_position(value: u64) -> Result<UtxoPosition, PositionError> {
    UtxoPosition::decode(value)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn encode_known_position() {
        let pos = UtxoPosition::new(2, 3, 1);
        assert_eq!(pos.encode().unwrap(), 2_000_000_000_030_001);
    }

    #[test]
    fn decode_known_position() {
        let pos = decode_utxo_position(2_000_000_000_030_001).unwrap();
        assert_eq!(pos, UtxoPosition::new(2, 3, 1));
    }

    #[test]
    fn deposit_position_has_no_tx_or_output_index() {
        let pos = UtxoPosition::deposit(1_001);
        assert_eq!(pos.encode().unwrap(), 1_001 * BLOCK_OFFSET);
        assert_eq!(UtxoPosition::decode(1_001 * BLOCK_OFFSET).unwrap(), pos);
    }

    #[test]
    fn zero_is_the_zero_position() {
        assert_eq!(UtxoPosition::default().encode().unwrap(), 0);
        assert_eq!(UtxoPosition::decode(0).unwrap(), UtxoPosition::default());
    }

    #[test]
    fn output_index_at_offset_is_rejected() {
        let err = UtxoPosition::new(1, 0, TX_OFFSET as u16).encode().unwrap_err();
        assert_eq!(
            err,
            PositionError::OutputIndexOutOfRange {
                output_index: 10_000,
                max: TX_OFFSET
            }
        );
    }

    #[test]
    fn largest_output_index_is_accepted() {
        let pos = UtxoPosition::new(1, 0, (TX_OFFSET - 1) as u16);
        assert_eq!(UtxoPosition::decode(pos.encode().unwrap()).unwrap(), pos);
    }

    #[test]
    fn max_transaction_index_is_accepted() {
        // u32::MAX * TX_OFFSET stays below BLOCK_OFFSET with the current layout.
        let pos = UtxoPosition::new(0, u32::MAX, 0);
        assert_eq!(UtxoPosition::decode(pos.encode().unwrap()).unwrap(), pos);
    }

    #[test]
    fn block_number_overflow_is_rejected() {
        let max_block = u64::MAX / BLOCK_OFFSET;
        assert!(UtxoPosition::new(max_block, 0, 0).encode().is_ok());
        assert_eq!(
            UtxoPosition::new(max_block + 1, 0, 0).encode(),
            Err(PositionError::BlockNumberOverflow {
                block_number: max_block + 1
            })
        );
    }

    #[test]
    fn decode_rejects_transaction_slot_wider_than_u32() {
        let slot = u64::from(u32::MAX) + 1;
        let err = UtxoPosition::decode(slot * TX_OFFSET).unwrap_err();
        assert_eq!(
            err,
            PositionError::TransactionIndexOutOfRange {
                transaction_index: slot,
                max: slot
            }
        );
    }

    #[test]
    fn ordering_matches_packed_order() {
        let a = UtxoPosition::new(1, 5, 3);
        let b = UtxoPosition::new(1, 6, 0);
        let c = UtxoPosition::new(2, 0, 0);
        assert!(a < b && b < c);
        assert!(a.encode().unwrap() < b.encode().unwrap());
        assert!(b.encode().unwrap() < c.encode().unwrap());
    }

    #[test]
    fn display_shows_triple() {
        assert_eq!(UtxoPosition::new(7, 1, 2).to_string(), "7:1:2");
    }

    #[test]
    fn conversions_match_free_functions() {
        let pos = UtxoPosition::new(12, 34, 5);
        let packed: u64 = pos.try_into().unwrap();
        assert_eq!(packed, encode_utxo_position(&pos).unwrap());
        assert_eq!(UtxoPosition::try_from(packed).unwrap(), pos);
    }

    proptest! {
        #[test]
        fn roundtrip_valid_positions(
            block_number in 0..=(u64::MAX / BLOCK_OFFSET - 1),
            transaction_index in any::<u32>(),
            output_index in 0..(TX_OFFSET as u16),
        ) {
            let pos = UtxoPosition::new(block_number, transaction_index, output_index);
            let packed = pos.encode().unwrap();
            prop_assert_eq!(UtxoPosition::decode(packed).unwrap(), pos);
        }

        #[test]
        fn decode_then_encode_is_identity(value in any::<u64>()) {
            if let Ok(pos) = UtxoPosition::decode(value) {
                prop_assert_eq!(pos.encode().unwrap(), value);
            }
        }
    }
}
