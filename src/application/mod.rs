//! Application layer containing the ledger orchestration.
//!
//! This module defines the `Bank`, the single entry point for account,
//! session and transfer operations. It owns the storage ports and serializes
//! every operation behind one `tokio` mutex.

pub mod bank;
