use crate::config::LedgerConfig;
use crate::domain::account::{Account, AccountEvent, AccountSummary};
use crate::domain::money::{Amount, Balance, normalize};
use crate::domain::ports::{AccountStoreBox, TransferStoreBox};
use crate::domain::session::Session;
use crate::domain::transfer::{Party, PendingTransfer, TransferId, TransferSelector};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct EngineState {
    session: Session,
    last_transfer_id: u64,
}

/// The ledger engine.
///
/// `Bank` owns the account store, the pending-transfer store and the session.
/// Every public operation holds one lock for its whole duration, so compound
/// operations (a transfer's debit plus its pending record, a resolution's
/// removal plus its credit) are atomic even when the bank is shared between
/// tasks, and a logout can never land in the middle of another operation.
pub struct Bank {
    account_store: AccountStoreBox,
    transfer_store: TransferStoreBox,
    state: Mutex<EngineState>,
    config: LedgerConfig,
}

impl Bank {
    /// Creates a bank with the default [`LedgerConfig`].
    ///
    /// # Arguments
    ///
    /// * `account_store` - The store for accounts.
    /// * `transfer_store` - The store for pending transfers.
    pub fn new(account_store: AccountStoreBox, transfer_store: TransferStoreBox) -> Self {
        Self::with_config(account_store, transfer_store, LedgerConfig::default())
    }

    pub fn with_config(
        account_store: AccountStoreBox,
        transfer_store: TransferStoreBox,
        config: LedgerConfig,
    ) -> Self {
        Self {
            account_store,
            transfer_store,
            state: Mutex::new(EngineState::default()),
            config,
        }
    }

    /// Opens a new account with a zero balance.
    pub async fn register(&self, name: &str) -> Result<()> {
        let _state = self.state.lock().await;
        self.register_locked(name)
            .await
            .inspect_err(|err| debug!(account = name, error = %err, "register rejected"))
    }

    async fn register_locked(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                "account name must not be empty".to_string(),
            ));
        }
        if self.account_store.get(name).await?.is_some() {
            return Err(LedgerError::DuplicateAccount(name.to_string()));
        }
        self.account_store.store(Account::new(name)).await?;
        info!(account = name, "account registered");
        Ok(())
    }

    pub async fn login(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        self.account(name)
            .await
            .and_then(|_| state.session.login(name))
            .inspect(|_| info!(account = name, "logged in"))
            .inspect_err(|err| debug!(account = name, error = %err, "login rejected"))
    }

    pub async fn logout(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .session
            .logout(name)
            .inspect(|_| info!(account = name, "logged out"))
            .inspect_err(|err| debug!(account = name, error = %err, "logout rejected"))
    }

    /// The account the bank is currently acting for, if anyone is logged in.
    pub async fn current_identity(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.session.identity().map(str::to_string)
    }

    /// Credits `amount` (rounded half-to-even to cents) and returns the new balance.
    pub async fn deposit(&self, name: &str, amount: Decimal) -> Result<Balance> {
        let state = self.state.lock().await;
        self.deposit_locked(&state.session, name, amount)
            .await
            .inspect_err(|err| debug!(account = name, error = %err, "deposit rejected"))
    }

    async fn deposit_locked(
        &self,
        session: &Session,
        name: &str,
        raw: Decimal,
    ) -> Result<Balance> {
        session.require(name)?;
        let mut account = self.account(name).await?;
        let amount = self.amount(raw)?;
        account.deposit(amount)?;
        let balance = account.balance;
        self.account_store.store(account).await?;
        info!(account = name, %amount, %balance, "deposit applied");
        Ok(balance)
    }

    /// Debits `amount` and returns the new balance.
    pub async fn withdraw(&self, name: &str, amount: Decimal) -> Result<Balance> {
        let state = self.state.lock().await;
        self.withdraw_locked(&state.session, name, amount)
            .await
            .inspect_err(|err| debug!(account = name, error = %err, "withdraw rejected"))
    }

    async fn withdraw_locked(
        &self,
        session: &Session,
        name: &str,
        raw: Decimal,
    ) -> Result<Balance> {
        session.require(name)?;
        let mut account = self.account(name).await?;
        let amount = self.amount(raw)?;
        account.withdraw(amount)?;
        let balance = account.balance;
        self.account_store.store(account).await?;
        info!(account = name, %amount, %balance, "withdrawal applied");
        Ok(balance)
    }

    /// Returns the balance. Checking is itself recorded in the account log.
    pub async fn balance(&self, name: &str) -> Result<Balance> {
        let state = self.state.lock().await;
        let result = async {
            state.session.require(name)?;
            let mut account = self.account(name).await?;
            let balance = account.check_balance();
            self.account_store.store(account).await?;
            Ok::<_, LedgerError>(balance)
        }
        .await;
        result.inspect_err(|err| debug!(account = name, error = %err, "balance check rejected"))
    }

    /// The account's history, oldest first.
    pub async fn logs(&self, name: &str) -> Result<Vec<AccountEvent>> {
        let state = self.state.lock().await;
        let result = async {
            state.session.require(name)?;
            Ok::<_, LedgerError>(self.account(name).await?.log)
        }
        .await;
        result.inspect_err(|err| debug!(account = name, error = %err, "logs rejected"))
    }

    /// Moves `amount` out of `sender` into a pending transfer for `recipient`.
    ///
    /// The sender is debited immediately. If the debit fails nothing is
    /// recorded and the debit's error is returned as is.
    pub async fn transfer(
        &self,
        sender: &str,
        recipient: &str,
        amount: Decimal,
    ) -> Result<TransferId> {
        let mut state = self.state.lock().await;
        self.transfer_locked(&mut state, sender, recipient, amount)
            .await
            .inspect_err(|err| {
                debug!(sender, recipient, error = %err, "transfer rejected");
            })
    }

    async fn transfer_locked(
        &self,
        state: &mut EngineState,
        sender: &str,
        recipient: &str,
        raw: Decimal,
    ) -> Result<TransferId> {
        state.session.require(sender)?;
        let mut from = self.account(sender).await?;
        self.account(recipient).await?;
        let amount = self.amount(raw)?;

        let before = from.clone();
        from.withdraw(amount)?;
        self.account_store.store(from).await?;

        let id = TransferId(state.last_transfer_id + 1);
        let pending = PendingTransfer {
            id,
            from: sender.to_string(),
            to: recipient.to_string(),
            amount,
        };
        if let Err(err) = self.transfer_store.insert(pending).await {
            self.account_store.store(before).await?;
            return Err(err);
        }
        state.last_transfer_id = id.0;

        info!(transfer_id = id.0, sender, recipient, %amount, "transfer pending");
        Ok(id)
    }

    /// Transfers waiting for `account` to accept or reject, oldest first.
    pub async fn list_pending(&self, account: &str) -> Result<Vec<PendingTransfer>> {
        self.list_for(account, Party::Recipient).await
    }

    /// Transfers `account` has sent that are still waiting, oldest first.
    pub async fn list_outgoing(&self, account: &str) -> Result<Vec<PendingTransfer>> {
        self.list_for(account, Party::Sender).await
    }

    async fn list_for(&self, account: &str, party: Party) -> Result<Vec<PendingTransfer>> {
        let state = self.state.lock().await;
        state.session.require(account)?;
        self.account(account).await?;
        Ok(self
            .transfer_store
            .all_pending()
            .await?
            .into_iter()
            .filter(|t| t.involves(account, party))
            .collect())
    }

    /// Completes a transfer addressed to `account` and credits it.
    pub async fn accept(
        &self,
        account: &str,
        selector: TransferSelector,
    ) -> Result<PendingTransfer> {
        let state = self.state.lock().await;
        let result = async {
            state.session.require(account)?;
            let mut recipient = self.account(account).await?;
            let transfer = self.find(account, Party::Recipient, &selector).await?;
            recipient.deposit(transfer.amount)?;
            self.settle(&transfer, recipient).await?;
            Ok::<_, LedgerError>(transfer)
        }
        .await;
        result
            .inspect(|t| info!(transfer_id = t.id.0, account, amount = %t.amount, "transfer accepted"))
            .inspect_err(|err| debug!(account, error = %err, "accept failed"))
    }

    /// Turns down a transfer addressed to `account`; the sender gets the
    /// amount back.
    ///
    /// The refund is credited to the sender without a session check (the
    /// sender is not the one logged in) and without the amount ceiling (the
    /// amount already passed it when the transfer was made). It is still
    /// recorded in the sender's log.
    pub async fn reject(
        &self,
        account: &str,
        selector: TransferSelector,
    ) -> Result<PendingTransfer> {
        let state = self.state.lock().await;
        let result = async {
            state.session.require(account)?;
            self.account(account).await?;
            let transfer = self.find(account, Party::Recipient, &selector).await?;
            let mut sender = self.account(&transfer.from).await?;
            sender.refund(transfer.amount, &transfer.to)?;
            self.settle(&transfer, sender).await?;
            Ok::<_, LedgerError>(transfer)
        }
        .await;
        result
            .inspect(|t| info!(transfer_id = t.id.0, account, amount = %t.amount, "transfer rejected"))
            .inspect_err(|err| debug!(account, error = %err, "reject failed"))
    }

    /// Withdraws a transfer `account` sent before its recipient acted on it.
    pub async fn cancel(
        &self,
        account: &str,
        selector: TransferSelector,
    ) -> Result<PendingTransfer> {
        let state = self.state.lock().await;
        let result = async {
            state.session.require(account)?;
            let mut sender = self.account(account).await?;
            let transfer = self.find(account, Party::Sender, &selector).await?;
            sender.deposit(transfer.amount)?;
            self.settle(&transfer, sender).await?;
            Ok::<_, LedgerError>(transfer)
        }
        .await;
        result
            .inspect(|t| info!(transfer_id = t.id.0, account, amount = %t.amount, "transfer cancelled"))
            .inspect_err(|err| debug!(account, error = %err, "cancel failed"))
    }

    /// Consumes the bank and returns one summary row per account, sorted by name.
    pub async fn into_results(self) -> Result<Vec<AccountSummary>> {
        let pending = self.transfer_store.all_pending().await?;
        let accounts = self.account_store.all_accounts().await?;
        Ok(accounts
            .into_iter()
            .map(|account| AccountSummary::new(&account, &pending))
            .collect())
    }

    async fn account(&self, name: &str) -> Result<Account> {
        self.account_store
            .get(name)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(name.to_string()))
    }

    fn amount(&self, raw: Decimal) -> Result<Amount> {
        Amount::within(raw, self.config.max_amount)
    }

    async fn find(
        &self,
        account: &str,
        party: Party,
        selector: &TransferSelector,
    ) -> Result<PendingTransfer> {
        let found = match selector {
            TransferSelector::Id(id) => self
                .transfer_store
                .get(*id)
                .await?
                .filter(|t| t.involves(account, party)),
            TransferSelector::Match {
                counterparty,
                amount,
            } => {
                let amount = normalize(*amount);
                self.transfer_store
                    .all_pending()
                    .await?
                    .into_iter()
                    .find(|t| {
                        t.involves(account, party)
                            && t.counterparty(party) == counterparty
                            && t.amount.value() == amount
                    })
            }
        };
        found.ok_or_else(|| LedgerError::TransferNotFound(selector.to_string()))
    }

    /// Drops `transfer` from the pending set and stores the credited account.
    /// If the account cannot be stored the transfer is put back.
    async fn settle(&self, transfer: &PendingTransfer, credited: Account) -> Result<()> {
        self.transfer_store.remove(transfer.id).await?;
        if let Err(err) = self.account_store.store(credited).await {
            self.transfer_store.insert(transfer.clone()).await?;
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::{InMemoryAccountStore, InMemoryTransferStore};
    use rust_decimal_macros::dec;

    fn bank() -> Bank {
        Bank::new(
            Box::new(InMemoryAccountStore::new()),
            Box::new(InMemoryTransferStore::new()),
        )
    }

    async fn funded(name: &str, amount: Decimal) -> Bank {
        let bank = bank();
        bank.register(name).await.unwrap();
        bank.login(name).await.unwrap();
        bank.deposit(name, amount).await.unwrap();
        bank
    }

    fn matching(counterparty: &str, amount: Decimal) -> TransferSelector {
        TransferSelector::Match {
            counterparty: counterparty.to_string(),
            amount,
        }
    }

    #[tokio::test]
    async fn test_register_duplicate_leaves_account_untouched() {
        let bank = funded("alice", dec!(50)).await;

        let result = bank.register("alice").await;
        assert!(matches!(result, Err(LedgerError::DuplicateAccount(name)) if name == "alice"));

        assert_eq!(bank.balance("alice").await.unwrap().value(), dec!(50));
        let log: Vec<String> = bank
            .logs("alice")
            .await
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            log,
            vec!["Account registered", "Deposited 50.00", "Checked balance: 50.00"]
        );
    }

    #[tokio::test]
    async fn test_register_blank_name() {
        let bank = bank();
        assert!(matches!(
            bank.register("  ").await,
            Err(LedgerError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_login_unknown_account() {
        let bank = bank();
        assert!(matches!(
            bank.login("ghost").await,
            Err(LedgerError::AccountNotFound(_))
        ));
        assert_eq!(bank.current_identity().await, None);
    }

    #[tokio::test]
    async fn test_operations_require_matching_session() {
        let bank = bank();
        bank.register("alice").await.unwrap();
        bank.register("bob").await.unwrap();

        assert!(matches!(
            bank.deposit("alice", dec!(10)).await,
            Err(LedgerError::NotLoggedIn)
        ));

        bank.login("bob").await.unwrap();
        assert!(matches!(
            bank.deposit("alice", dec!(10)).await,
            Err(LedgerError::WrongAccount { .. })
        ));
        assert!(matches!(
            bank.balance("alice").await,
            Err(LedgerError::WrongAccount { .. })
        ));
        assert!(matches!(
            bank.list_pending("alice").await,
            Err(LedgerError::WrongAccount { .. })
        ));
    }

    #[tokio::test]
    async fn test_deposit_bounds() {
        let bank = funded("alice", dec!(1)).await;

        let balance = bank.deposit("alice", dec!(10000.00)).await.unwrap();
        assert_eq!(balance.value(), dec!(10001));

        assert!(matches!(
            bank.deposit("alice", dec!(10000.01)).await,
            Err(LedgerError::InvalidAmount { .. })
        ));
        assert!(matches!(
            bank.deposit("alice", dec!(0)).await,
            Err(LedgerError::InvalidAmount { .. })
        ));
        assert_eq!(bank.balance("alice").await.unwrap().value(), dec!(10001));
    }

    #[tokio::test]
    async fn test_withdraw_insufficient_funds() {
        let bank = funded("alice", dec!(300.00)).await;

        let result = bank.withdraw("alice", dec!(300.01)).await;
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(bank.balance("alice").await.unwrap().value(), dec!(300.00));

        let balance = bank.withdraw("alice", dec!(300.00)).await.unwrap();
        assert_eq!(balance, Balance::ZERO);
    }

    #[tokio::test]
    async fn test_deposit_withdraw_round_trip() {
        let bank = funded("alice", dec!(42.42)).await;
        bank.deposit("alice", dec!(999.99)).await.unwrap();
        let balance = bank.withdraw("alice", dec!(999.99)).await.unwrap();
        assert_eq!(balance.value(), dec!(42.42));
    }

    #[tokio::test]
    async fn test_transfer_debits_sender_immediately() {
        let bank = funded("alice", dec!(500)).await;
        bank.register("bob").await.unwrap();

        let id = bank.transfer("alice", "bob", dec!(200)).await.unwrap();
        assert_eq!(id, TransferId(1));
        assert_eq!(bank.balance("alice").await.unwrap().value(), dec!(300));

        let outgoing = bank.list_outgoing("alice").await.unwrap();
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing[0].to, "bob");
    }

    #[tokio::test]
    async fn test_transfer_to_unknown_recipient_is_noop() {
        let bank = funded("alice", dec!(500)).await;

        let result = bank.transfer("alice", "ghost", dec!(10)).await;
        assert!(matches!(result, Err(LedgerError::AccountNotFound(name)) if name == "ghost"));
        assert_eq!(bank.balance("alice").await.unwrap().value(), dec!(500));
        assert!(bank.list_outgoing("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_debit_creates_no_transfer() {
        let bank = funded("alice", dec!(50)).await;
        bank.register("bob").await.unwrap();

        assert!(matches!(
            bank.transfer("alice", "bob", dec!(50.01)).await,
            Err(LedgerError::InsufficientFunds { .. })
        ));
        assert!(matches!(
            bank.transfer("alice", "bob", dec!(-1)).await,
            Err(LedgerError::InvalidAmount { .. })
        ));
        assert!(bank.list_outgoing("alice").await.unwrap().is_empty());

        // Ids are only consumed by transfers that were actually created.
        let id = bank.transfer("alice", "bob", dec!(5)).await.unwrap();
        assert_eq!(id, TransferId(1));
    }

    #[tokio::test]
    async fn test_cancel_restores_sender() {
        let bank = funded("alice", dec!(500)).await;
        bank.register("bob").await.unwrap();
        bank.transfer("alice", "bob", dec!(200)).await.unwrap();

        let cancelled = bank.cancel("alice", matching("bob", dec!(200))).await.unwrap();
        assert_eq!(cancelled.to, "bob");
        assert_eq!(bank.balance("alice").await.unwrap().value(), dec!(500));

        assert!(matches!(
            bank.cancel("alice", matching("bob", dec!(200))).await,
            Err(LedgerError::TransferNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_accept_by_id_checks_recipient() {
        let bank = funded("alice", dec!(500)).await;
        bank.register("bob").await.unwrap();
        let id = bank.transfer("alice", "bob", dec!(200)).await.unwrap();

        // alice is the sender, not the recipient
        assert!(matches!(
            bank.accept("alice", TransferSelector::Id(id)).await,
            Err(LedgerError::TransferNotFound(_))
        ));

        bank.logout("alice").await.unwrap();
        bank.login("bob").await.unwrap();
        let accepted = bank.accept("bob", TransferSelector::Id(id)).await.unwrap();
        assert_eq!(accepted.id, id);
        assert_eq!(bank.balance("bob").await.unwrap().value(), dec!(200));
    }

    #[tokio::test]
    async fn test_match_uses_normalized_amount() {
        let bank = funded("alice", dec!(500)).await;
        bank.register("bob").await.unwrap();
        bank.transfer("alice", "bob", dec!(19.999)).await.unwrap();

        let cancelled = bank.cancel("alice", matching("bob", dec!(20))).await.unwrap();
        assert_eq!(cancelled.amount.value(), dec!(20.00));
    }

    #[tokio::test]
    async fn test_logs_require_session() {
        let bank = bank();
        bank.register("alice").await.unwrap();
        assert!(matches!(bank.logs("alice").await, Err(LedgerError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_into_results_includes_pending_totals() {
        let bank = funded("alice", dec!(500)).await;
        bank.register("bob").await.unwrap();
        bank.transfer("alice", "bob", dec!(200)).await.unwrap();
        bank.transfer("alice", "bob", dec!(50)).await.unwrap();

        let results = bank.into_results().await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "alice");
        assert_eq!(results[0].balance, dec!(250));
        assert_eq!(results[0].pending_out, dec!(250));
        assert_eq!(results[1].name, "bob");
        assert_eq!(results[1].pending_in, dec!(250));
    }

    #[tokio::test]
    async fn test_credit_overflow_is_rejected_without_changes() {
        let huge = dec!(50000000000000000000000000000);
        let bank = Bank::with_config(
            Box::new(InMemoryAccountStore::new()),
            Box::new(InMemoryTransferStore::new()),
            LedgerConfig {
                max_amount: Decimal::MAX,
            },
        );
        bank.register("alice").await.unwrap();
        bank.register("bob").await.unwrap();
        bank.login("bob").await.unwrap();
        bank.deposit("bob", huge).await.unwrap();
        assert!(matches!(
            bank.deposit("bob", huge).await,
            Err(LedgerError::BalanceOverflow { .. })
        ));
        bank.logout("bob").await.unwrap();

        bank.login("alice").await.unwrap();
        bank.deposit("alice", huge).await.unwrap();
        bank.transfer("alice", "bob", huge).await.unwrap();
        bank.logout("alice").await.unwrap();

        bank.login("bob").await.unwrap();
        assert!(matches!(
            bank.accept("bob", TransferSelector::Id(TransferId(1))).await,
            Err(LedgerError::BalanceOverflow { .. })
        ));
        assert_eq!(bank.balance("bob").await.unwrap().value(), huge);
        assert_eq!(bank.list_pending("bob").await.unwrap().len(), 1);
    }
}
