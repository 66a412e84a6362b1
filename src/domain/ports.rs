use super::account::Account;
use super::transfer::{PendingTransfer, TransferId};
use crate::error::Result;
use async_trait::async_trait;

/// Storage for accounts, keyed by name.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts or replaces the account stored under `account.name`.
    async fn store(&self, account: Account) -> Result<()>;
    async fn get(&self, name: &str) -> Result<Option<Account>>;
    /// Every account, sorted by name.
    async fn all_accounts(&self) -> Result<Vec<Account>>;
}

/// Storage for transfers that are still waiting on their recipient.
#[async_trait]
pub trait TransferStore: Send + Sync {
    async fn insert(&self, transfer: PendingTransfer) -> Result<()>;
    async fn get(&self, id: TransferId) -> Result<Option<PendingTransfer>>;
    async fn remove(&self, id: TransferId) -> Result<Option<PendingTransfer>>;
    /// Every pending transfer, oldest first.
    async fn all_pending(&self) -> Result<Vec<PendingTransfer>>;
}

pub type AccountStoreBox = Box<dyn AccountStore>;
pub type TransferStoreBox = Box<dyn TransferStore>;
