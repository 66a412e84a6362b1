//! Ledger domain: money, accounts, the session and pending transfers, plus
//! the storage ports the application layer is written against.

pub mod account;
pub mod money;
pub mod ports;
pub mod session;
pub mod transfer;
