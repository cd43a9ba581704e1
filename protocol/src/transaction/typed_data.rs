//! EIP-712 hashing of transaction bodies.
//!
//! The Plasma framework verifies signatures over a typed-data digest, not
//! over the raw RLP bytes. The struct layout is fixed-arity: a transaction
//! always hashes exactly four inputs and four outputs, with absent slots
//! filled by all-zero structs. The raw encoding never pads, so two bodies
//! that differ only in trailing empty slots cannot exist, and the padding
//! here cannot introduce ambiguity.
//!
//! ```text
//! EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)
//! Transaction(uint256 txType,Input[4] inputs,Output[4] outputs,uint256 txData,bytes32 metadata)
//! Input(uint256 blknum,uint256 txindex,uint256 oindex)
//! Output(uint256 outputType,bytes20 outputGuard,address currency,uint256 amount)
//! ```

use std::borrow::Cow;

use alloy_primitives::{keccak256, Address, FixedBytes, B256, U256};
use alloy_sol_types::{Eip712Domain, SolStruct};
use serde_json::{json, Value};
use tracing::debug;

use super::types::{Input, Output, TransactionBody};
use crate::config::{ChainConfig, MAX_INPUTS, MAX_OUTPUTS};

mod eip712 {
    alloy_sol_types::sol! {
        struct Input {
            uint256 blknum;
            uint256 txindex;
            uint256 oindex;
        }

        struct Output {
            uint256 outputType;
            bytes20 outputGuard;
            address currency;
            uint256 amount;
        }

        struct Transaction {
            uint256 txType;
            Input[4] inputs;
            Output[4] outputs;
            uint256 txData;
            bytes32 metadata;
        }
    }
}

/// Prefix of every EIP-712 signing payload.
const EIP712_PREFIX: [u8; 2] = [0x19, 0x01];

// ---------------------------------------------------------------------------
// Struct conversion
// ---------------------------------------------------------------------------

const EMPTY_INPUT: eip712::Input = eip712::Input {
    blknum: U256::ZERO,
    txindex: U256::ZERO,
    oindex: U256::ZERO,
};

const EMPTY_OUTPUT: eip712::Output = eip712::Output {
    outputType: U256::ZERO,
    outputGuard: FixedBytes::ZERO,
    currency: Address::ZERO,
    amount: U256::ZERO,
};

fn sol_input(input: &Input) -> eip712::Input {
    let p = &input.position;
    eip712::Input {
        blknum: U256::from(p.block_number),
        txindex: U256::from(p.transaction_index),
        oindex: U256::from(p.output_index),
    }
}

fn sol_output(output: &Output) -> eip712::Output {
    eip712::Output {
        outputType: U256::from(output.output_type.id()),
        outputGuard: output.output_guard.0,
        currency: output.token,
        amount: output.amount,
    }
}

fn sol_transaction(body: &TransactionBody) -> eip712::Transaction {
    // TransactionBody caps both lists at four, so indexing past the end
    // only ever lands on padding.
    let inputs: [eip712::Input; MAX_INPUTS] = std::array::from_fn(|i| {
        body.inputs().get(i).map_or(EMPTY_INPUT, sol_input)
    });
    let outputs: [eip712::Output; MAX_OUTPUTS] = std::array::from_fn(|i| {
        body.outputs().get(i).map_or(EMPTY_OUTPUT, sol_output)
    });

    eip712::Transaction {
        txType: U256::from(body.tx_type()),
        inputs,
        outputs,
        txData: U256::from(body.tx_data()),
        metadata: body.metadata(),
    }
}

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

fn domain(name: &str, version: &str, chain_id: u64, verifying_contract: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some(Cow::Owned(name.to_owned())),
        Some(Cow::Owned(version.to_owned())),
        Some(U256::from(chain_id)),
        Some(verifying_contract),
        None,
    )
}

/// Hash of the `EIP712Domain` struct the verifying contract signs under.
pub fn domain_separator(
    name: &str,
    version: &str,
    chain_id: u64,
    verifying_contract: Address,
) -> B256 {
    domain(name, version, chain_id, verifying_contract).hash_struct()
}

// ---------------------------------------------------------------------------
// TypedDataHasher
// ---------------------------------------------------------------------------

/// Computes struct hashes and signing digests for one deployment.
///
/// The domain separator is derived once from the [`ChainConfig`] the
/// hasher is built with; nothing is read from global state.
#[derive(Debug, Clone)]
pub struct TypedDataHasher {
    domain: Eip712Domain,
    separator: B256,
}

impl TypedDataHasher {
    pub fn new(config: &ChainConfig) -> Self {
        let domain = domain(
            &config.domain_name,
            &config.domain_version,
            config.chain_id,
            config.verifying_contract,
        );
        let separator = domain.hash_struct();
        debug!(
            chain_id = config.chain_id,
            verifying_contract = %config.verifying_contract,
            %separator,
            "typed-data domain ready"
        );
        Self { domain, separator }
    }

    /// The domain separator.
    pub fn separator(&self) -> B256 {
        self.separator
    }

    /// Struct hash of the transaction, padded to four inputs and outputs.
    pub fn hash_transaction(&self, body: &TransactionBody) -> B256 {
        sol_transaction(body).eip712_hash_struct()
    }

    /// `keccak256(0x19 0x01 || separator || hash_transaction(body))`, the
    /// 32 bytes every input owner signs.
    pub fn signing_digest(&self, body: &TransactionBody) -> B256 {
        let struct_hash = self.hash_transaction(body);
        let mut payload = [0u8; 66];
        payload[..2].copy_from_slice(&EIP712_PREFIX);
        payload[2..34].copy_from_slice(self.separator.as_slice());
        payload[34..].copy_from_slice(struct_hash.as_slice());
        keccak256(payload)
    }

    /// The `eth_signTypedData_v4` document for `body`.
    ///
    /// Wallets that sign typed data themselves take this instead of the
    /// digest; hashing it yields [`TypedDataHasher::signing_digest`].
    pub fn typed_data(&self, body: &TransactionBody) -> Value {
        let tx = sol_transaction(body);

        let inputs: Vec<Value> = tx
            .inputs
            .iter()
            .map(|i| {
                json!({
                    "blknum": i.blknum.to_string(),
                    "txindex": i.txindex.to_string(),
                    "oindex": i.oindex.to_string(),
                })
            })
            .collect();

        let outputs: Vec<Value> = tx
            .outputs
            .iter()
            .map(|o| {
                json!({
                    "outputType": o.outputType.to_string(),
                    "outputGuard": format!("{:#x}", o.outputGuard),
                    "currency": o.currency.to_string(),
                    "amount": o.amount.to_string(),
                })
            })
            .collect();

        let mut domain = json!({});
        if let Some(name) = &self.domain.name {
            domain["name"] = json!(name);
        }
        if let Some(version) = &self.domain.version {
            domain["version"] = json!(version);
        }
        if let Some(chain_id) = self.domain.chain_id {
            domain["chainId"] = json!(chain_id.to_string());
        }
        if let Some(contract) = self.domain.verifying_contract {
            domain["verifyingContract"] = json!(contract.to_string());
        }

        json!({
            "types": {
                "EIP712Domain": [
                    { "name": "name", "type": "string" },
                    { "name": "version", "type": "string" },
                    { "name": "chainId", "type": "uint256" },
                    { "name": "verifyingContract", "type": "address" },
                ],
                "Transaction": [
                    { "name": "txType", "type": "uint256" },
                    { "name": "inputs", "type": "Input[4]" },
                    { "name": "outputs", "type": "Output[4]" },
                    { "name": "txData", "type": "uint256" },
                    { "name": "metadata", "type": "bytes32" },
                ],
                "Input": [
                    { "name": "blknum", "type": "uint256" },
                    { "name": "txindex", "type": "uint256" },
                    { "name": "oindex", "type": "uint256" },
                ],
                "Output": [
                    { "name": "outputType", "type": "uint256" },
                    { "name": "outputGuard", "type": "bytes20" },
                    { "name": "currency", "type": "address" },
                    { "name": "amount", "type": "uint256" },
                ],
            },
            "primaryType": "Transaction",
            "domain": domain,
            "message": {
                "txType": tx.txType.to_string(),
                "inputs": inputs,
                "outputs": outputs,
                "txData": tx.txData.to_string(),
                "metadata": tx.metadata.to_string(),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
