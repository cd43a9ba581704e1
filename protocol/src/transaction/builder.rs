//! Transaction construction via the builder pattern.
//!
//! The [`TransactionBuilder`] turns "pay these people from these outputs"
//! into one unsigned [`TransactionBody`]: it picks inputs, routes the excess
//! back to the sender as change, and refuses anything the contracts would
//! reject (more than four inputs or outputs, zero amounts).
//!
//! The builder does not sign -- that happens in [`super::signing`]. This
//! separation keeps construction testable without key material.
//!
//! # Selection
//!
//! Requirements are collected per currency, in the order the currencies
//! first appear among the payments, with the fee added to its own currency
//! last. Each requirement is then covered greedily from the sender's outputs
//! of that currency in the order the caller supplied them, skipping
//! zero-amount outputs and any position already taken. There is no
//! attempt at optimal coin selection and no splitting into several
//! transactions; callers that need either should merge outputs first.

use std::collections::HashSet;

use alloy_primitives::{Address, B256, U256};
use tracing::debug;

use super::error::TransactionError;
use super::types::{Input, Output, Payment, TransactionBody, Utxo};
use crate::config::{ChainConfig, Fee, MAX_INPUTS};
use crate::position::UtxoPosition;

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

/// Amount owed in one currency, with the outputs picked to cover it.
#[derive(Debug)]
struct Requirement {
    currency: Address,
    required: U256,
    selected: U256,
    inputs: Vec<UtxoPosition>,
}

impl Requirement {
    fn new(currency: Address) -> Self {
        Self {
            currency,
            required: U256::ZERO,
            selected: U256::ZERO,
            inputs: Vec::new(),
        }
    }

    fn add(&mut self, amount: U256) -> Result<(), TransactionError> {
        self.required = self
            .required
            .checked_add(amount)
            .ok_or(TransactionError::AmountOverflow {
                currency: self.currency,
            })?;
        Ok(())
    }

    fn excess(&self) -> U256 {
        self.selected.saturating_sub(self.required)
    }
}

fn requirement_for(requirements: &mut Vec<Requirement>, currency: Address) -> &mut Requirement {
    let index = match requirements.iter().position(|r| r.currency == currency) {
        Some(index) => index,
        None => {
            requirements.push(Requirement::new(currency));
            requirements.len() - 1
        }
    };
    &mut requirements[index]
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned payment transactions.
///
/// # Usage
///
/// ```
/// use alloy_primitives::{address, Address, U256};
/// use plasma_protocol::config::ChainConfig;
/// use plasma_protocol::position::UtxoPosition;
/// use plasma_protocol::transaction::{Payment, TransactionBuilder, Utxo};
///
/// let alice = address!("f4ebbe787311bb955bb353b7a4d8b97af8ed1c9b");
/// let bob = address!("3272ee86d8192f59261960c9ae186063c8c9041f");
///
/// let body = TransactionBuilder::new(&ChainConfig::default(), alice)
///     .utxos([Utxo::new(UtxoPosition::new(1_000, 0, 0), alice, Address::ZERO, U256::from(10))])
///     .payment(Payment::new(bob, Address::ZERO, U256::from(4)))
///     .build()
///     .unwrap();
///
/// // One payment to bob, six back to alice.
/// assert_eq!(body.outputs().len(), 2);
/// assert_eq!(body.outputs()[1].amount, U256::from(6));
/// ```
///
/// The fee defaults to [`ChainConfig::default_fee`]; [`Self::fee`]
/// overrides it.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    sender: Address,
    utxos: Vec<Utxo>,
    payments: Vec<Payment>,
    fee: Fee,
    metadata: B256,
}

impl TransactionBuilder {
    /// Creates a builder spending `sender`'s outputs.
    ///
    /// Defaults:
    /// - `fee`: the config's default fee
    /// - `metadata`: all zeros
    pub fn new(config: &ChainConfig, sender: Address) -> Self {
        Self {
            sender,
            utxos: Vec::new(),
            payments: Vec::new(),
            fee: config.default_fee.clone(),
            metadata: B256::ZERO,
        }
    }

    /// Adds outputs available for spending, in preference order. Outputs
    /// owned by anyone other than the sender are ignored.
    pub fn utxos(mut self, utxos: impl IntoIterator<Item = Utxo>) -> Self {
        self.utxos.extend(utxos);
        self
    }

    /// Adds one payment.
    pub fn payment(mut self, payment: Payment) -> Self {
        self.payments.push(payment);
        self
    }

    /// Adds several payments, keeping their order.
    pub fn payments(mut self, payments: impl IntoIterator<Item = Payment>) -> Self {
        self.payments.extend(payments);
        self
    }

    /// Sets the fee. A zero fee adds no requirement.
    pub fn fee(mut self, fee: Fee) -> Self {
        self.fee = fee;
        self
    }

    /// Sets the 32-byte metadata word.
    pub fn metadata(mut self, metadata: B256) -> Self {
        self.metadata = metadata;
        self
    }

    /// Consumes the builder and produces an unsigned [`TransactionBody`].
    ///
    /// Inputs come out ascending by position; outputs are the payments in
    /// caller order followed by one change output per currency with excess,
    /// in requirement order.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - [`TransactionError::NoPayments`], [`TransactionError::ZeroAmount`]
    /// - [`TransactionError::AmountOverflow`] while summing a currency
    /// - [`TransactionError::InsufficientFunds`] for the first currency the
    ///   sender cannot cover
    /// - [`TransactionError::TooManyInputs`], then
    ///   [`TransactionError::TooManyOutputs`]
    pub fn build(self) -> Result<TransactionBody, TransactionError> {
        if self.payments.is_empty() {
            return Err(TransactionError::NoPayments);
        }
        if let Some(index) = self.payments.iter().position(|p| p.amount.is_zero()) {
            return Err(TransactionError::ZeroAmount { index });
        }

        let mut requirements = Vec::new();
        for payment in &self.payments {
            requirement_for(&mut requirements, payment.currency).add(payment.amount)?;
        }
        if !self.fee.amount.is_zero() {
            requirement_for(&mut requirements, self.fee.currency).add(self.fee.amount)?;
        }

        let mut spent = HashSet::new();
        for requirement in &mut requirements {
            self.select(requirement, &mut spent)?;
        }

        let mut inputs: Vec<Input> = requirements
            .iter()
            .flat_map(|r| r.inputs.iter().copied().map(Input::from))
            .collect();
        if inputs.len() > MAX_INPUTS {
            debug!(
                inputs = inputs.len(),
                max = MAX_INPUTS,
                "selection needs too many inputs"
            );
            return Err(TransactionError::TooManyInputs {
                count: inputs.len(),
                max: MAX_INPUTS,
            });
        }
        inputs.sort();

        let change = requirements.iter().filter_map(|r| {
            let excess = r.excess();
            (!excess.is_zero()).then(|| Output::payment(self.sender, r.currency, excess))
        });
        let outputs: Vec<Output> = self
            .payments
            .iter()
            .map(|p| Output::payment(p.owner, p.currency, p.amount))
            .chain(change)
            .collect();

        debug!(
            sender = %self.sender,
            inputs = inputs.len(),
            outputs = outputs.len(),
            "built payment transaction"
        );
        TransactionBody::payment(inputs, outputs, self.metadata)
    }

    /// Covers one requirement from the sender's outputs of its currency.
    ///
    /// `spent` is shared across currencies so a position is never selected
    /// twice in one body.
    fn select(
        &self,
        requirement: &mut Requirement,
        spent: &mut HashSet<UtxoPosition>,
    ) -> Result<(), TransactionError> {
        if requirement.required.is_zero() {
            return Ok(());
        }

        let currency = requirement.currency;
        let candidates = self
            .utxos
            .iter()
            .filter(|u| {
                u.owner == self.sender && u.currency == currency && !u.amount.is_zero()
            });

        for utxo in candidates.clone() {
            if requirement.selected >= requirement.required {
                break;
            }
            // The same output listed twice is only spent once.
            if !spent.insert(utxo.position) {
                continue;
            }
            requirement.selected = requirement
                .selected
                .checked_add(utxo.amount)
                .ok_or(TransactionError::AmountOverflow { currency })?;
            requirement.inputs.push(utxo.position);
        }

        if requirement.selected < requirement.required {
            let available = requirement.selected;
            debug!(
                currency = %requirement.currency,
                required = %requirement.required,
                %available,
                candidates = candidates.count(),
                "insufficient funds"
            );
            return Err(TransactionError::InsufficientFunds {
                currency: requirement.currency,
                required: requirement.required,
                available,
                shortfall: requirement.required - available,
            });
        }

        debug!(
            currency = %requirement.currency,
            required = %requirement.required,
            selected = %requirement.selected,
            inputs = requirement.inputs.len(),
            "selected inputs"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
