use miette::Diagnostic;
use rust_decimal::Decimal;
use thiserror::Error;

/// Every way a ledger operation can fail.
///
/// None of these are fatal to the engine: a call that returns an error has not
/// mutated any account, session or pending transfer.
#[derive(Error, Diagnostic, Debug)]
pub enum LedgerError {
    #[error("account {0} already exists")]
    #[diagnostic(code(ledger::duplicate_account))]
    DuplicateAccount(String),

    #[error("account {0} does not exist")]
    #[diagnostic(code(ledger::account_not_found))]
    AccountNotFound(String),

    #[error("no one is logged in")]
    #[diagnostic(code(ledger::not_logged_in), help("log in with `login <name>` first"))]
    NotLoggedIn,

    #[error("logged into a different account: {active} cannot act as {requested}")]
    #[diagnostic(code(ledger::wrong_account))]
    WrongAccount { active: String, requested: String },

    #[error("already logged in as {0}")]
    #[diagnostic(code(ledger::already_logged_in), help("log out before switching accounts"))]
    AlreadyLoggedIn(String),

    #[error("invalid amount {amount}: must be greater than 0 and at most {max}")]
    #[diagnostic(code(ledger::invalid_amount))]
    InvalidAmount { amount: Decimal, max: Decimal },

    #[error("insufficient funds: requested {requested}, available {available}")]
    #[diagnostic(code(ledger::insufficient_funds))]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    #[error("balance {balance} cannot take another {amount}")]
    #[diagnostic(code(ledger::balance_overflow))]
    BalanceOverflow { balance: Decimal, amount: Decimal },

    #[error("no pending transfer {0}")]
    #[diagnostic(code(ledger::transfer_not_found))]
    TransferNotFound(String),

    #[error("invalid input: {0}")]
    #[diagnostic(code(ledger::invalid_input))]
    InvalidInput(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(ledger::io))]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    #[diagnostic(code(ledger::csv))]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
