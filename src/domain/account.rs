use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use tokio::sync::{Mutex, MutexGuard, TryLockError};

/// Unique, immutable identifier of an account.
///
/// Identifiers are totally ordered by their string value. That order is the
/// only rule used to decide which of two account locks is taken first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(LedgerError::ValidationError(
                "Account id must not be empty".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountId {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for AccountId {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A monetary value held by an account.
///
/// Wraps `rust_decimal::Decimal` so balances and transfer amounts cannot be
/// mixed up by accident.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// A strictly positive amount of money moved by a transfer.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAmount(value))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Whether the balance can cover a debit of `amount` without going negative.
    pub fn covers(&self, amount: Amount) -> bool {
        self.0 >= amount.value()
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// A plain, lock-free copy of an account's state.
///
/// This is what the store persists and what callers get back when they look
/// an account up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account: AccountId,
    pub balance: Balance,
}

impl AccountRecord {
    pub fn new(account: AccountId, balance: Balance) -> Self {
        Self { account, balance }
    }
}

/// A live account.
///
/// The balance sits behind a mutex owned by the account itself, so the lock
/// lives exactly as long as the account does. Accounts are shared through
/// `Arc<Account>` handles handed out by the store.
#[derive(Debug)]
pub struct Account {
    id: AccountId,
    balance: Mutex<Balance>,
}

impl Account {
    pub fn new(id: AccountId, balance: Balance) -> Self {
        Self {
            id,
            balance: Mutex::new(balance),
        }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Attempts to take the account lock without waiting.
    pub fn try_lock(&self) -> std::result::Result<MutexGuard<'_, Balance>, TryLockError> {
        self.balance.try_lock()
    }

    /// Reads the current balance, waiting for any in-flight transfer to finish.
    pub async fn balance(&self) -> Balance {
        *self.balance.lock().await
    }

    pub async fn snapshot(&self) -> AccountRecord {
        AccountRecord::new(self.id.clone(), self.balance().await)
    }

    /// Snapshot taken through exclusive access, no locking needed.
    pub fn record(&mut self) -> AccountRecord {
        AccountRecord::new(self.id.clone(), *self.balance.get_mut())
    }
}
