use crate::domain::account::Account;
use crate::domain::ports::{AccountStore, TransferStore};
use crate::domain::transfer::{PendingTransfer, TransferId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for accounts.
///
/// Uses `Arc<RwLock<HashMap<String, Account>>>` so clones share the same data.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn store(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.name.clone(), account);
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(name).cloned())
    }

    async fn all_accounts(&self) -> Result<Vec<Account>> {
        let accounts = self.accounts.read().await;
        let mut all: Vec<Account> = accounts.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

/// A thread-safe in-memory store for pending transfers.
///
/// Keyed by [`TransferId`] in a `BTreeMap`, so iteration is oldest first.
#[derive(Default, Clone)]
pub struct InMemoryTransferStore {
    transfers: Arc<RwLock<BTreeMap<TransferId, PendingTransfer>>>,
}

impl InMemoryTransferStore {
    /// Creates a new, empty in-memory transfer store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransferStore for InMemoryTransferStore {
    async fn insert(&self, transfer: PendingTransfer) -> Result<()> {
        let mut transfers = self.transfers.write().await;
        transfers.insert(transfer.id, transfer);
        Ok(())
    }

    async fn get(&self, id: TransferId) -> Result<Option<PendingTransfer>> {
        let transfers = self.transfers.read().await;
        Ok(transfers.get(&id).cloned())
    }

    async fn remove(&self, id: TransferId) -> Result<Option<PendingTransfer>> {
        let mut transfers = self.transfers.write().await;
        Ok(transfers.remove(&id))
    }

    async fn all_pending(&self) -> Result<Vec<PendingTransfer>> {
        let transfers = self.transfers.read().await;
        Ok(transfers.values().cloned().collect())
    }
}
