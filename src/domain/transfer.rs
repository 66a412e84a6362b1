use super::money::Amount;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Identifier handed out when a transfer is initiated. Ids increase
/// monotonically within one bank, so ordering by id is insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TransferId(pub u64);

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for TransferId {
    type Err = std::num::ParseIntError;

    /// Accepts the `#<n>` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('#').unwrap_or(s).parse().map(TransferId)
    }
}

/// Funds already debited from `from` and waiting for `to` to accept them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingTransfer {
    pub id: TransferId,
    pub from: String,
    pub to: String,
    pub amount: Amount,
}

impl fmt::Display for PendingTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}: {}", self.id, self.from, self.to, self.amount)
    }
}

/// How a caller names the transfer to accept, reject or cancel.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferSelector {
    Id(TransferId),
    /// The other party and the exact amount. When several pending transfers
    /// share the same parties and amount, the oldest one is picked.
    Match {
        counterparty: String,
        amount: rust_decimal::Decimal,
    },
}

impl fmt::Display for TransferSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferSelector::Id(id) => write!(f, "{id}"),
            TransferSelector::Match {
                counterparty,
                amount,
            } => write!(f, "with {counterparty} for {amount}"),
        }
    }
}

/// Which side of a transfer the acting account must be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Recipient,
    Sender,
}

impl PendingTransfer {
    /// The account on the other side from `party`.
    pub fn counterparty(&self, party: Party) -> &str {
        match party {
            Party::Recipient => &self.from,
            Party::Sender => &self.to,
        }
    }

    /// Whether `account`, acting as `party`, may resolve this transfer.
    pub fn involves(&self, account: &str, party: Party) -> bool {
        match party {
            Party::Recipient => self.to == account,
            Party::Sender => self.from == account,
        }
    }
}
