//! Engine configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::env;

/// Largest amount a single deposit, withdrawal or transfer may move.
pub const DEFAULT_MAX_AMOUNT: Decimal = dec!(10000.00);

/// Tunables for a [`Bank`](crate::application::bank::Bank).
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Inclusive upper bound for deposit, withdrawal and transfer amounts.
    pub max_amount: Decimal,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_amount: DEFAULT_MAX_AMOUNT,
        }
    }
}

impl LedgerConfig {
    /// Reads `LEDGER_MAX_AMOUNT`, falling back to the default when it is
    /// missing, unparsable or not positive.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_amount = lookup("LEDGER_MAX_AMOUNT")
            .and_then(|raw| raw.trim().parse::<Decimal>().ok())
            .filter(|max| *max > Decimal::ZERO)
            .unwrap_or(DEFAULT_MAX_AMOUNT);
        Self { max_amount }
    }
}
