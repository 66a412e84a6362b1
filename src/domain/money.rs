use crate::error::{LedgerError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits every amount and balance is kept at.
pub const SCALE: u32 = 2;

/// Rounds to [`SCALE`] digits, ties to even, and pins the scale so that
/// `500` and `500.0` both render as `500.00`.
pub fn normalize(raw: Decimal) -> Decimal {
    let mut value = raw.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointNearestEven);
    value.rescale(SCALE);
    value
}

/// Parses a caller-supplied amount string.
///
/// Only checks that the text is a decimal number; range checks happen in
/// [`Amount::within`] so that they report `InvalidAmount` rather than
/// `InvalidInput`.
pub fn parse_amount(input: &str) -> Result<Decimal> {
    Decimal::from_str(input.trim())
        .map_err(|_| LedgerError::InvalidInput(format!("'{input}' is not a decimal amount")))
}

/// A validated transaction amount: positive, at most the configured ceiling,
/// held at two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Normalizes `raw` and checks `0 < amount <= max`.
    pub fn within(raw: Decimal, max: Decimal) -> Result<Self> {
        let amount = normalize(raw);
        if amount > Decimal::ZERO && amount <= max {
            Ok(Self(amount))
        } else {
            Err(LedgerError::InvalidAmount { amount, max })
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An account balance. Never negative: the only way to shrink it is
/// [`Balance::checked_sub`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(Decimal);

impl Balance {
    pub const ZERO: Self = Self(dec!(0.00));

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Adds `amount`, leaving the balance untouched if the sum does not fit.
    pub fn credit(&mut self, amount: Amount) -> Result<()> {
        self.0 = self
            .0
            .checked_add(amount.0)
            .ok_or(LedgerError::BalanceOverflow {
                balance: self.0,
                amount: amount.0,
            })?;
        Ok(())
    }

    /// Returns the reduced balance, or `None` if it would go below zero.
    pub fn checked_sub(self, amount: Amount) -> Option<Self> {
        let remaining = self.0 - amount.0;
        (remaining >= Decimal::ZERO).then_some(Self(remaining))
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<Balance> for Decimal {
    fn from(balance: Balance) -> Self {
        balance.0
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
