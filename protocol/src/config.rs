//! # Protocol Configuration & Constants
//!
//! Every magic number the Plasma codec depends on lives here. If you're
//! hardcoding a constant somewhere else, you're doing it wrong.
//!
//! The constants mirror what the root-chain contracts and the child-chain
//! transaction parser expect. Changing any of them silently forks you off the
//! chain, so they are `const` and not configuration. Values that legitimately
//! vary per deployment (chain id, contract address, default fee) live in
//! [`ChainConfig`] and are passed explicitly to whoever needs them.

use alloy_primitives::{address, Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// UTXO Position Layout
// ---------------------------------------------------------------------------

/// Multiplier applied to the block number when packing a UTXO position.
pub const BLOCK_OFFSET: u64 = 1_000_000_000_000_000;

/// Multiplier applied to the transaction index when packing a UTXO position.
/// Output indices live below this value.
pub const TX_OFFSET: u64 = 10_000;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Maximum number of inputs per transaction. Enforced by the contracts, so
/// we enforce it at construction instead of finding out at exit time.
pub const MAX_INPUTS: usize = 4;

/// Maximum number of outputs per transaction.
pub const MAX_OUTPUTS: usize = 4;

/// The only transaction type the builder produces: a plain payment.
pub const PAYMENT_TX_TYPE: u32 = 1;

/// `txData` is reserved by the transaction format and is always zero today.
pub const DEFAULT_TX_DATA: u32 = 0;

// ---------------------------------------------------------------------------
// Byte Widths
// ---------------------------------------------------------------------------

/// Recoverable ECDSA signature: `r (32) || s (32) || v (1)`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Addresses, output guards and token identifiers.
pub const ADDRESS_LENGTH: usize = 20;

/// Transaction metadata is a single 32-byte word.
pub const METADATA_LENGTH: usize = 32;

/// Upper bound on the width of an amount (uint256).
pub const AMOUNT_MAX_LENGTH: usize = 32;

/// The zero address doubles as the native coin's token identifier.
pub const ETH_CURRENCY: Address = Address::ZERO;

// ---------------------------------------------------------------------------
// Typed-Data Domain
// ---------------------------------------------------------------------------

/// Domain name the Plasma framework contracts sign under.
pub const DEFAULT_DOMAIN_NAME: &str = "OMG Network";

/// Domain version string.
pub const DEFAULT_DOMAIN_VERSION: &str = "1";

/// Chain id of a local development chain (ganache/anvil default).
pub const DEVNET_CHAIN_ID: u64 = 1337;

/// Plasma framework address on a freshly deployed local devnet.
pub const DEVNET_PLASMA_FRAMEWORK: Address = address!("d92e713d051c37ebb2561803a3b5fbabc4962431");

// ---------------------------------------------------------------------------
// ChainConfig
// ---------------------------------------------------------------------------

/// Errors raised while loading a [`ChainConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON or does not match the schema.
    #[error("invalid chain config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The domain name must not be empty; the contracts never use one.
    #[error("chain config has an empty domain name")]
    EmptyDomainName,
}

/// Fee charged by the child chain for a transaction.
///
/// The amount may be zero (fee-free devnets); a zero fee never forces an
/// input of the fee currency to be spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    /// Token the fee is paid in.
    pub currency: Address,
    /// Fee amount in the token's smallest unit.
    pub amount: U256,
}

impl Fee {
    /// Creates a new fee.
    pub fn new(currency: Address, amount: U256) -> Self {
        Self { currency, amount }
    }

    /// A zero fee in the native coin.
    pub fn zero() -> Self {
        Self::new(ETH_CURRENCY, U256::ZERO)
    }
}

/// Deployment-specific parameters.
///
/// The typed-data domain and the builder's default fee both come from here;
/// nothing in the crate reads them from global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// EIP-155 chain id of the root chain.
    pub chain_id: u64,
    /// Address of the Plasma framework contract that verifies signatures.
    pub verifying_contract: Address,
    /// Typed-data domain name.
    #[serde(default = "default_domain_name")]
    pub domain_name: String,
    /// Typed-data domain version.
    #[serde(default = "default_domain_version")]
    pub domain_version: String,
    /// Fee applied by the builder when the caller does not pick one.
    #[serde(default = "Fee::zero")]
    pub default_fee: Fee,
}

fn default_domain_name() -> String {
    DEFAULT_DOMAIN_NAME.to_string()
}

fn default_domain_version() -> String {
    DEFAULT_DOMAIN_VERSION.to_string()
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: DEVNET_CHAIN_ID,
            verifying_contract: DEVNET_PLASMA_FRAMEWORK,
            domain_name: default_domain_name(),
            domain_version: default_domain_version(),
            default_fee: Fee::zero(),
        }
    }
}

impl ChainConfig {
    /// Parses a JSON chain configuration.
    ///
    /// ```
    /// use plasma_protocol::config::ChainConfig;
    ///
    /// let cfg = ChainConfig::from_json(
    ///     r#"{ "chainId": 4, "verifyingContract": "0x96d5d8bc539694e5fa1ec0dab0e6327ca9e680f9" }"#,
    /// )
    /// .unwrap();
    /// assert_eq!(cfg.chain_id, 4);
    /// assert_eq!(cfg.domain_name, "OMG Network");
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.domain_name.is_empty() {
            return Err(ConfigError::EmptyDomainName);
        }
        Ok(config)
    }

    /// Overrides the default fee.
    pub fn with_default_fee(mut self, fee: Fee) -> Self {
        self.default_fee = fee;
        self
    }
}
