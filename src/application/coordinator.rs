use crate::config::TransferConfig;
use crate::domain::account::{Account, AccountId, AccountRecord, Amount, Balance};
use crate::domain::movement::{self, Direction};
use crate::domain::ports::{AccountStoreRef, NotifierRef};
use crate::domain::transfer::{TransferReceipt, TransferRequest};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use tokio::sync::MutexGuard;
use tracing::{debug, info, instrument, warn};

/// Result of one attempt at taking both account locks.
enum LockAttempt<'a> {
    Acquired(MutexGuard<'a, Balance>, MutexGuard<'a, Balance>),
    LowBusy,
    HighBusy,
}

/// Try-locks `low` then `high`. Never waits, and never returns holding
/// only one of the two locks.
fn try_lock_pair<'a>(low: &'a Account, high: &'a Account) -> LockAttempt<'a> {
    let Ok(low_guard) = low.try_lock() else {
        return LockAttempt::LowBusy;
    };
    match high.try_lock() {
        Ok(high_guard) => LockAttempt::Acquired(low_guard, high_guard),
        Err(_) => {
            drop(low_guard);
            LockAttempt::HighBusy
        }
    }
}

/// Moves money between accounts held in an `AccountStore`.
///
/// Every transfer locks exactly two accounts, always in ascending id order,
/// using non-blocking acquisition with a jittered backoff between attempts.
/// Transfers on disjoint account pairs never wait on each other.
pub struct TransferCoordinator {
    account_store: AccountStoreRef,
    notifier: NotifierRef,
    config: TransferConfig,
}

impl TransferCoordinator {
    /// Creates a new `TransferCoordinator`.
    ///
    /// # Arguments
    ///
    /// * `account_store` - Where accounts live.
    /// * `notifier` - Receives a notice for each party of a completed transfer.
    /// * `config` - Backoff and retry limits for lock acquisition.
    pub fn new(account_store: AccountStoreRef, notifier: NotifierRef, config: TransferConfig) -> Self {
        Self {
            account_store,
            notifier,
            config,
        }
    }

    /// Creates an account. Fails with `ValidationError` on a negative
    /// opening balance and with `DuplicateId` when the id is taken.
    pub async fn open_account(&self, id: AccountId, opening_balance: Balance) -> Result<()> {
        if opening_balance < Balance::ZERO {
            return Err(LedgerError::ValidationError(format!(
                "Opening balance for {} must not be negative",
                id
            )));
        }
        self.account_store
            .create(Account::new(id, opening_balance))
            .await
    }

    /// Current state of a single account.
    pub async fn account(&self, id: &AccountId) -> Result<AccountRecord> {
        let account = self.account_store.get(id).await?;
        Ok(account.snapshot().await)
    }

    /// All stored accounts, sorted by id.
    pub async fn accounts(&self) -> Result<Vec<AccountRecord>> {
        self.account_store.all_records().await
    }

    /// Transfers `request.amount` from `source` to `request.to`.
    pub async fn submit(&self, source: &AccountId, request: &TransferRequest) -> Result<TransferReceipt> {
        self.transfer(source, &request.to, request.amount).await
    }

    /// Transfers `amount` from `source` to `destination`.
    ///
    /// Fails without touching any lock when the amount is not positive, when
    /// both ids are the same or when either account does not exist. Funds are
    /// checked only once both locks are held. Lock contention is retried
    /// internally and only surfaces as `LockTimeout` when
    /// `max_lock_attempts` is set.
    #[instrument(skip_all, fields(source = %source, destination = %destination, amount = %amount))]
    pub async fn transfer(
        &self,
        source: &AccountId,
        destination: &AccountId,
        amount: Decimal,
    ) -> Result<TransferReceipt> {
        let amount = Amount::new(amount)?;
        if source == destination {
            return Err(LedgerError::SameAccount(source.clone()));
        }

        let source_account = self.account_store.get(source).await?;
        let destination_account = self.account_store.get(destination).await?;

        let source_is_low = source_account.id() < destination_account.id();
        let (low, high) = if source_is_low {
            (&*source_account, &*destination_account)
        } else {
            (&*destination_account, &*source_account)
        };

        let mut attempts = 0u32;
        let (low_guard, high_guard) = loop {
            attempts += 1;
            match try_lock_pair(low, high) {
                LockAttempt::Acquired(low_guard, high_guard) => break (low_guard, high_guard),
                LockAttempt::LowBusy => {
                    debug!(attempt = attempts, account = %low.id(), "First account lock busy");
                }
                LockAttempt::HighBusy => {
                    debug!(attempt = attempts, account = %high.id(), "Second account lock busy, released first");
                }
            }

            if let Some(max) = self.config.max_lock_attempts
                && attempts >= max
            {
                return Err(LedgerError::LockTimeout {
                    first: low.id().clone(),
                    second: high.id().clone(),
                    attempts,
                });
            }

            let delay = self.config.backoff_delay();
            debug!(attempt = attempts, ?delay, "Backing off before retrying locks");
            tokio::time::sleep(delay).await;
        };

        let (mut source_guard, mut destination_guard) = if source_is_low {
            (low_guard, high_guard)
        } else {
            (high_guard, low_guard)
        };

        if !source_guard.covers(amount) {
            return Err(LedgerError::InsufficientFunds {
                account: source.clone(),
                requested: amount.value(),
            });
        }

        let (source_before, destination_before) = (*source_guard, *destination_guard);
        *source_guard = movement::apply(source_before, amount, Direction::Debit);
        *destination_guard = movement::apply(destination_before, amount, Direction::Credit);

        let source_record = AccountRecord::new(source.clone(), *source_guard);
        let destination_record = AccountRecord::new(destination.clone(), *destination_guard);
        if let Err(e) = self.persist(&source_record, &destination_record).await {
            // Guards are still held: nobody has observed the new balances.
            *source_guard = source_before;
            *destination_guard = destination_before;
            let restored = self
                .persist(
                    &AccountRecord::new(source.clone(), source_before),
                    &AccountRecord::new(destination.clone(), destination_before),
                )
                .await;
            if let Err(restore_error) = restored {
                warn!(error = %restore_error, "Failed to restore account records after a failed write");
            }
            return Err(e);
        }

        if source_is_low {
            drop(destination_guard);
            drop(source_guard);
        } else {
            drop(source_guard);
            drop(destination_guard);
        }

        info!(lock_attempts = attempts, "Transfer completed");

        self.send_notice(
            &source_record,
            format!(
                "A transfer of {} has been made from your account {} to {}",
                amount, source, destination
            ),
        )
        .await;
        self.send_notice(
            &destination_record,
            format!(
                "A transfer of {} has been made to your account {} from {}",
                amount, destination, source
            ),
        )
        .await;

        Ok(TransferReceipt {
            source: source_record,
            destination: destination_record,
            amount: amount.value(),
            lock_attempts: attempts,
        })
    }

    async fn persist(&self, source: &AccountRecord, destination: &AccountRecord) -> Result<()> {
        self.account_store.update(source).await?;
        self.account_store.update(destination).await
    }

    async fn send_notice(&self, account: &AccountRecord, message: String) {
        let delivery = self.notifier.notify(account, &message);
        match tokio::time::timeout(self.config.notify_timeout, delivery).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(account = %account.account, error = %e, "Failed to deliver transfer notification");
            }
            Err(_) => {
                warn!(account = %account.account, timeout = ?self.config.notify_timeout, "Transfer notification timed out");
            }
        }
    }
}
