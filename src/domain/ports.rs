use super::account::{Account, AccountId, AccountRecord};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Key-value storage for accounts.
///
/// `get` hands out shared handles to the live account so every caller sees
/// the same embedded lock. `update` replaces the stored record and must not
/// touch the live account's lock.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `DuplicateId` when the id is already taken.
    async fn create(&self, account: Account) -> Result<()>;
    /// Fails with `AccountNotFound` for unknown ids.
    async fn get(&self, id: &AccountId) -> Result<Arc<Account>>;
    async fn update(&self, record: &AccountRecord) -> Result<()>;
    async fn all_records(&self) -> Result<Vec<AccountRecord>>;
}

/// Best-effort delivery of human-readable notices to an account holder.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, account: &AccountRecord, message: &str) -> Result<()>;
}

pub type AccountStoreRef = Arc<dyn AccountStore>;
pub type NotifierRef = Arc<dyn Notifier>;
