#![allow(dead_code)]

use account_transfers::application::coordinator::TransferCoordinator;
use account_transfers::config::TransferConfig;
use account_transfers::domain::account::{AccountId, AccountRecord, Balance};
use account_transfers::domain::ports::Notifier;
use account_transfers::error::{LedgerError, Result};
use account_transfers::infrastructure::in_memory::InMemoryAccountStore;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn id(value: &str) -> AccountId {
    AccountId::new(value).unwrap()
}

/// Short backoff so contended tests finish quickly.
pub fn fast_config() -> TransferConfig {
    TransferConfig::default().with_backoff(Duration::from_millis(1), Duration::from_millis(5))
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<(AccountId, String)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, account: &AccountRecord, message: &str) -> Result<()> {
        self.notices
            .lock()
            .unwrap()
            .push((account.account.clone(), message.to_string()));
        Ok(())
    }
}

/// Fails every other notification.
#[derive(Default)]
pub struct FlakyNotifier {
    calls: AtomicUsize,
}

impl FlakyNotifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for FlakyNotifier {
    async fn notify(&self, _account: &AccountRecord, _message: &str) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call % 2 == 0 {
            Err(LedgerError::NotificationError("smtp timeout".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Builds a coordinator over a fresh in-memory store with the given accounts.
pub async fn coordinator_with_accounts(
    accounts: &[(&str, Decimal)],
    notifier: Arc<dyn Notifier>,
    config: TransferConfig,
) -> Arc<TransferCoordinator> {
    let coordinator =
        TransferCoordinator::new(Arc::new(InMemoryAccountStore::new()), notifier, config);
    for (name, balance) in accounts {
        coordinator
            .open_account(id(name), Balance::new(*balance))
            .await
            .unwrap();
    }
    Arc::new(coordinator)
}

pub async fn balance_of(coordinator: &TransferCoordinator, name: &str) -> Decimal {
    coordinator.account(&id(name)).await.unwrap().balance.0
}

pub async fn total(coordinator: &TransferCoordinator) -> Decimal {
    coordinator
        .accounts()
        .await
        .unwrap()
        .iter()
        .map(|record| record.balance.0)
        .sum()
}
