#![allow(dead_code)]

use p2p_ledger::application::bank::Bank;
use p2p_ledger::infrastructure::in_memory::{InMemoryAccountStore, InMemoryTransferStore};
use std::io::Write;
use tempfile::NamedTempFile;

pub fn new_bank() -> Bank {
    Bank::new(
        Box::new(InMemoryAccountStore::new()),
        Box::new(InMemoryTransferStore::new()),
    )
}

/// Logs out whoever is active and logs in as `name`.
pub async fn switch_to(bank: &Bank, name: &str) {
    if let Some(active) = bank.current_identity().await {
        bank.logout(&active).await.unwrap();
    }
    bank.login(name).await.unwrap();
}

/// Registers every name and leaves nobody logged in.
pub async fn register_all(bank: &Bank, names: &[&str]) {
    for name in names {
        bank.register(name).await.unwrap();
    }
}

pub fn write_script(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}
