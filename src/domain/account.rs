use super::money::{Amount, Balance};
use super::transfer::{Party, PendingTransfer};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// One entry in an account's action history.
///
/// The `Display` form is what `logs` prints, one line per event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AccountEvent {
    Registered,
    Deposited { amount: Amount },
    Withdrew { amount: Amount },
    CheckedBalance { balance: Balance },
    /// A pending transfer was turned down by its recipient and the funds came back.
    Refunded { amount: Amount, recipient: String },
}

impl fmt::Display for AccountEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountEvent::Registered => write!(f, "Account registered"),
            AccountEvent::Deposited { amount } => write!(f, "Deposited {amount}"),
            AccountEvent::Withdrew { amount } => write!(f, "Withdrew {amount}"),
            AccountEvent::CheckedBalance { balance } => write!(f, "Checked balance: {balance}"),
            AccountEvent::Refunded { amount, recipient } => {
                write!(f, "Refunded {amount} (transfer to {recipient} rejected)")
            }
        }
    }
}

/// A named account with its balance and append-only history.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Account {
    pub name: String,
    pub balance: Balance,
    pub log: Vec<AccountEvent>,
}

impl Account {
    /// Opens an empty account. The history starts with the registration itself.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            balance: Balance::ZERO,
            log: vec![AccountEvent::Registered],
        }
    }

    pub fn record(&mut self, event: AccountEvent) {
        self.log.push(event);
    }

    pub fn deposit(&mut self, amount: Amount) -> Result<()> {
        self.balance.credit(amount)?;
        self.record(AccountEvent::Deposited { amount });
        Ok(())
    }

    /// Debits `amount`, leaving the account untouched if funds are short.
    pub fn withdraw(&mut self, amount: Amount) -> Result<()> {
        let remaining =
            self.balance
                .checked_sub(amount)
                .ok_or_else(|| LedgerError::InsufficientFunds {
                    requested: amount.value(),
                    available: self.balance.value(),
                })?;
        self.balance = remaining;
        self.record(AccountEvent::Withdrew { amount });
        Ok(())
    }

    /// Credits back a transfer its recipient turned down.
    pub fn refund(&mut self, amount: Amount, recipient: &str) -> Result<()> {
        self.balance.credit(amount)?;
        self.record(AccountEvent::Refunded {
            amount,
            recipient: recipient.to_string(),
        });
        Ok(())
    }

    pub fn check_balance(&mut self) -> Balance {
        let balance = self.balance;
        self.record(AccountEvent::CheckedBalance { balance });
        balance
    }
}

/// End-of-run view of one account: its balance plus what is still in flight.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct AccountSummary {
    pub name: String,
    pub balance: Decimal,
    /// Sum of pending transfers waiting for this account to accept.
    pub pending_in: Decimal,
    /// Sum of pending transfers this account sent.
    pub pending_out: Decimal,
}

impl AccountSummary {
    pub fn new(account: &Account, pending: &[PendingTransfer]) -> Self {
        let sum = |party: Party| -> Decimal {
            pending
                .iter()
                .filter(|t| t.involves(&account.name, party))
                .fold(Balance::ZERO.value(), |acc, t| {
                    acc.saturating_add(t.amount.value())
                })
        };
        Self {
            name: account.name.clone(),
            balance: account.balance.value(),
            pending_in: sum(Party::Recipient),
            pending_out: sum(Party::Sender),
        }
    }
}
