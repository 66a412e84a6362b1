use crate::application::bank::Bank;
use crate::domain::account::AccountEvent;
use crate::domain::money::{Balance, normalize, parse_amount};
use crate::domain::transfer::{PendingTransfer, TransferId, TransferSelector};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use std::fmt;

/// A request to the ledger, parsed from positional string arguments.
///
/// Wherever the acting account is optional (`name: None`) the command runs as
/// whoever is currently logged in.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Register {
        name: String,
    },
    Login {
        name: String,
    },
    Logout {
        name: Option<String>,
    },
    Deposit {
        name: Option<String>,
        amount: Decimal,
    },
    Withdraw {
        name: Option<String>,
        amount: Decimal,
    },
    Balance {
        name: Option<String>,
    },
    Logs {
        name: Option<String>,
    },
    Transfer {
        name: Option<String>,
        recipient: String,
        amount: Decimal,
    },
    ListPending {
        name: Option<String>,
    },
    ListOutgoing {
        name: Option<String>,
    },
    Accept {
        name: Option<String>,
        selector: TransferSelector,
    },
    Reject {
        name: Option<String>,
        selector: TransferSelector,
    },
    Cancel {
        name: Option<String>,
        selector: TransferSelector,
    },
}

impl Command {
    /// Parses `verb arg...`.
    ///
    /// Unknown verbs, the wrong number of arguments and amounts that are not
    /// decimal numbers are all `InvalidInput`.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let tokens: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
        let Some((verb, args)) = tokens.split_first() else {
            return Err(LedgerError::InvalidInput("empty command".to_string()));
        };

        let usage = |text: &str| LedgerError::InvalidInput(format!("usage: {verb} {text}"));

        let command = match *verb {
            "register" | "register_account" => match args {
                [name] => Command::Register {
                    name: name.to_string(),
                },
                _ => return Err(usage("<name>")),
            },
            "login" => match args {
                [name] => Command::Login {
                    name: name.to_string(),
                },
                _ => return Err(usage("<name>")),
            },
            "logout" => Command::Logout {
                name: optional_name(args).ok_or_else(|| usage("[name]"))?,
            },
            "balance" => Command::Balance {
                name: optional_name(args).ok_or_else(|| usage("[name]"))?,
            },
            "logs" => Command::Logs {
                name: optional_name(args).ok_or_else(|| usage("[name]"))?,
            },
            "list_pending" => Command::ListPending {
                name: optional_name(args).ok_or_else(|| usage("[name]"))?,
            },
            "list_outgoing" => Command::ListOutgoing {
                name: optional_name(args).ok_or_else(|| usage("[name]"))?,
            },
            "deposit" | "withdraw" => {
                let (name, amount) = match args {
                    [amount] => (None, *amount),
                    [name, amount] => (Some(name.to_string()), *amount),
                    _ => return Err(usage("[name] <amount>")),
                };
                let amount = parse_amount(amount)?;
                if *verb == "deposit" {
                    Command::Deposit { name, amount }
                } else {
                    Command::Withdraw { name, amount }
                }
            }
            "transfer" => {
                let (name, recipient, amount) = match args {
                    [recipient, amount] => (None, *recipient, *amount),
                    [name, recipient, amount] => (Some(name.to_string()), *recipient, *amount),
                    _ => return Err(usage("[name] <recipient> <amount>")),
                };
                Command::Transfer {
                    name,
                    recipient: recipient.to_string(),
                    amount: parse_amount(amount)?,
                }
            }
            "accept_transfer" | "reject_transfer" | "cancel_transfer" => {
                let (name, selector) = parse_selector(args)
                    .ok_or_else(|| usage("[name] (<counterparty> <amount> | #<id>)"))??;
                match *verb {
                    "accept_transfer" => Command::Accept { name, selector },
                    "reject_transfer" => Command::Reject { name, selector },
                    _ => Command::Cancel { name, selector },
                }
            }
            other => {
                return Err(LedgerError::InvalidInput(format!(
                    "unknown command '{other}'"
                )));
            }
        };
        Ok(command)
    }
}

fn optional_name(args: &[&str]) -> Option<Option<String>> {
    match args {
        [] => Some(None),
        [name] => Some(Some(name.to_string())),
        _ => None,
    }
}

/// `None` means the argument count fits no form; the inner result carries
/// amount and id parse failures.
fn parse_selector(args: &[&str]) -> Option<Result<(Option<String>, TransferSelector)>> {
    let (name, rest) = match args {
        [id] if id.starts_with('#') => (None, args),
        [name, id] if id.starts_with('#') => (Some(name.to_string()), &args[1..]),
        [_, _] => (None, args),
        [name, _, _] => (Some(name.to_string()), &args[1..]),
        _ => return None,
    };
    let selector = match rest {
        [id] => id
            .parse::<TransferId>()
            .map(TransferSelector::Id)
            .map_err(|_| LedgerError::InvalidInput(format!("'{id}' is not a transfer id"))),
        [counterparty, amount] => parse_amount(amount).map(|amount| TransferSelector::Match {
            counterparty: counterparty.to_string(),
            amount,
        }),
        _ => return None,
    };
    Some(selector.map(|selector| (name, selector)))
}

/// What a successful command did, ready to print.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Registered {
        name: String,
    },
    LoggedIn {
        name: String,
    },
    LoggedOut {
        name: String,
    },
    Deposited {
        name: String,
        amount: Decimal,
        balance: Balance,
    },
    Withdrew {
        name: String,
        amount: Decimal,
        balance: Balance,
    },
    Balance {
        name: String,
        balance: Balance,
    },
    Logs {
        name: String,
        events: Vec<AccountEvent>,
    },
    TransferPending {
        id: TransferId,
        from: String,
        to: String,
        amount: Decimal,
    },
    Pending {
        name: String,
        transfers: Vec<PendingTransfer>,
    },
    Outgoing {
        name: String,
        transfers: Vec<PendingTransfer>,
    },
    Accepted(PendingTransfer),
    Rejected(PendingTransfer),
    Cancelled(PendingTransfer),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Registered { name } => write!(f, "Account {name} registered"),
            Outcome::LoggedIn { name } => write!(f, "Logged in as {name}"),
            Outcome::LoggedOut { name } => write!(f, "Logged out {name}"),
            Outcome::Deposited { name, amount, .. } => write!(f, "Deposited {amount} to {name}"),
            Outcome::Withdrew { name, amount, .. } => write!(f, "Withdrew {amount} from {name}"),
            Outcome::Balance { name, balance } => write!(f, "Balance for {name} is {balance}"),
            Outcome::Logs { name, events } => {
                write!(f, "Logs for {name}:")?;
                for event in events {
                    write!(f, "\n{event}")?;
                }
                Ok(())
            }
            Outcome::TransferPending {
                id,
                from,
                to,
                amount,
            } => write!(f, "Transfer {id} of {amount} from {from} to {to} is pending"),
            Outcome::Pending { name, transfers } if transfers.is_empty() => {
                write!(f, "No pending transfers for {name}")
            }
            Outcome::Pending { name, transfers } => {
                write!(f, "Pending transfers for {name}:")?;
                for t in transfers {
                    write!(f, "\n{} from {}: {}", t.id, t.from, t.amount)?;
                }
                Ok(())
            }
            Outcome::Outgoing { name, transfers } if transfers.is_empty() => {
                write!(f, "No outgoing transfers for {name}")
            }
            Outcome::Outgoing { name, transfers } => {
                write!(f, "Outgoing transfers for {name}:")?;
                for t in transfers {
                    write!(f, "\n{} to {}: {}", t.id, t.to, t.amount)?;
                }
                Ok(())
            }
            Outcome::Accepted(t) => write!(f, "Accepted {} of {} from {}", t.id, t.amount, t.from),
            Outcome::Rejected(t) => write!(
                f,
                "Rejected {} of {} from {}; refunded to {}",
                t.id, t.amount, t.from, t.from
            ),
            Outcome::Cancelled(t) => write!(f, "Cancelled {} of {} to {}", t.id, t.amount, t.to),
        }
    }
}

/// Resolves an omitted account name to the current session identity.
async fn acting(bank: &Bank, name: Option<String>) -> Result<String> {
    match name {
        Some(name) => Ok(name),
        None => bank.current_identity().await.ok_or(LedgerError::NotLoggedIn),
    }
}

/// Runs one command against `bank`.
pub async fn execute(bank: &Bank, command: Command) -> Result<Outcome> {
    let outcome = match command {
        Command::Register { name } => {
            bank.register(&name).await?;
            Outcome::Registered { name }
        }
        Command::Login { name } => {
            bank.login(&name).await?;
            Outcome::LoggedIn { name }
        }
        Command::Logout { name } => {
            let name = acting(bank, name).await?;
            bank.logout(&name).await?;
            Outcome::LoggedOut { name }
        }
        Command::Deposit { name, amount } => {
            let name = acting(bank, name).await?;
            let balance = bank.deposit(&name, amount).await?;
            Outcome::Deposited {
                name,
                amount: normalize(amount),
                balance,
            }
        }
        Command::Withdraw { name, amount } => {
            let name = acting(bank, name).await?;
            let balance = bank.withdraw(&name, amount).await?;
            Outcome::Withdrew {
                name,
                amount: normalize(amount),
                balance,
            }
        }
        Command::Balance { name } => {
            let name = acting(bank, name).await?;
            let balance = bank.balance(&name).await?;
            Outcome::Balance { name, balance }
        }
        Command::Logs { name } => {
            let name = acting(bank, name).await?;
            let events = bank.logs(&name).await?;
            Outcome::Logs { name, events }
        }
        Command::Transfer {
            name,
            recipient,
            amount,
        } => {
            let from = acting(bank, name).await?;
            let id = bank.transfer(&from, &recipient, amount).await?;
            Outcome::TransferPending {
                id,
                from,
                to: recipient,
                amount: normalize(amount),
            }
        }
        Command::ListPending { name } => {
            let name = acting(bank, name).await?;
            let transfers = bank.list_pending(&name).await?;
            Outcome::Pending { name, transfers }
        }
        Command::ListOutgoing { name } => {
            let name = acting(bank, name).await?;
            let transfers = bank.list_outgoing(&name).await?;
            Outcome::Outgoing { name, transfers }
        }
        Command::Accept { name, selector } => {
            let name = acting(bank, name).await?;
            Outcome::Accepted(bank.accept(&name, selector).await?)
        }
        Command::Reject { name, selector } => {
            let name = acting(bank, name).await?;
            Outcome::Rejected(bank.reject(&name, selector).await?)
        }
        Command::Cancel { name, selector } => {
            let name = acting(bank, name).await?;
            Outcome::Cancelled(bank.cancel(&name, selector).await?)
        }
    };
    Ok(outcome)
}
