use crate::domain::account::{Account, AccountId, AccountRecord};
use crate::domain::ports::AccountStore;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct StoredAccount {
    live: Arc<Account>,
    record: AccountRecord,
}

/// A thread-safe in-memory store for accounts.
///
/// Keeps, per id, the shared live account (with its embedded lock) and the
/// last record written through `update`. The map lock is only held for the
/// duration of a single map operation and never while waiting on an
/// account lock.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<AccountId, StoredAccount>>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create(&self, mut account: Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(account.id()) {
            return Err(LedgerError::DuplicateId(account.id().clone()));
        }
        let record = account.record();
        accounts.insert(
            record.account.clone(),
            StoredAccount {
                live: Arc::new(account),
                record,
            },
        );
        Ok(())
    }

    async fn get(&self, id: &AccountId) -> Result<Arc<Account>> {
        let accounts = self.accounts.read().await;
        accounts
            .get(id)
            .map(|stored| Arc::clone(&stored.live))
            .ok_or_else(|| LedgerError::AccountNotFound(id.clone()))
    }

    async fn update(&self, record: &AccountRecord) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let stored = accounts
            .get_mut(&record.account)
            .ok_or_else(|| LedgerError::AccountNotFound(record.account.clone()))?;
        stored.record = record.clone();
        Ok(())
    }

    async fn all_records(&self) -> Result<Vec<AccountRecord>> {
        let accounts = self.accounts.read().await;
        let mut records: Vec<AccountRecord> =
            accounts.values().map(|stored| stored.record.clone()).collect();
        records.sort_by(|a, b| a.account.cmp(&b.account));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Balance;
    use rust_decimal_macros::dec;

    fn id(value: &str) -> AccountId {
        AccountId::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_account_store() {
        let store = InMemoryAccountStore::new();
        store
            .create(Account::new(id("Id-123"), Balance::new(dec!(1000))))
            .await
            .unwrap();

        let account = store.get(&id("Id-123")).await.unwrap();
        assert_eq!(account.id(), &id("Id-123"));
        assert_eq!(account.balance().await, Balance::new(dec!(1000)));

        assert!(matches!(
            store.get(&id("Id-999")).await,
            Err(LedgerError::AccountNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_fails_on_duplicate_id() {
        let store = InMemoryAccountStore::new();
        store
            .create(Account::new(id("Id-123"), Balance::ZERO))
            .await
            .unwrap();

        let err = store
            .create(Account::new(id("Id-123"), Balance::new(dec!(5))))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Account id Id-123 already exists!");

        // The first account is untouched.
        let records = store.all_records().await.unwrap();
        assert_eq!(records, vec![AccountRecord::new(id("Id-123"), Balance::ZERO)]);
    }

    #[tokio::test]
    async fn test_get_returns_shared_handle() {
        let store = InMemoryAccountStore::new();
        store
            .create(Account::new(id("Id-1"), Balance::ZERO))
            .await
            .unwrap();

        let first = store.get(&id("Id-1")).await.unwrap();
        let second = store.get(&id("Id-1")).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let _guard = first.try_lock().unwrap();
        assert!(second.try_lock().is_err());
    }

    #[tokio::test]
    async fn test_update_replaces_record() {
        let store = InMemoryAccountStore::new();
        store
            .create(Account::new(id("Id-1"), Balance::new(dec!(10))))
            .await
            .unwrap();

        store
            .update(&AccountRecord::new(id("Id-1"), Balance::new(dec!(7.5))))
            .await
            .unwrap();
        let records = store.all_records().await.unwrap();
        assert_eq!(records[0].balance, Balance::new(dec!(7.5)));
        // The live account keeps its own balance.
        let live = store.get(&id("Id-1")).await.unwrap();
        assert_eq!(live.balance().await, Balance::new(dec!(10)));

        let missing = store
            .update(&AccountRecord::new(id("Id-2"), Balance::ZERO))
            .await;
        assert!(matches!(missing, Err(LedgerError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_does_not_need_account_lock() {
        let store = InMemoryAccountStore::new();
        store
            .create(Account::new(id("Id-1"), Balance::new(dec!(10))))
            .await
            .unwrap();

        let account = store.get(&id("Id-1")).await.unwrap();
        let _guard = account.try_lock().unwrap();
        store
            .update(&AccountRecord::new(id("Id-1"), Balance::new(dec!(3))))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_all_records_sorted_by_id() {
        let store = InMemoryAccountStore::new();
        for name in ["b", "c", "a"] {
            store
                .create(Account::new(id(name), Balance::ZERO))
                .await
                .unwrap();
        }

        let all = store.all_records().await.unwrap();
        let ids: Vec<&str> = all.iter().map(|r| r.account.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
