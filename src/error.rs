use crate::domain::account::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Amount to be transferred must be greater than zero, got {0}")]
    InvalidAmount(Decimal),
    #[error("Account id {0} not found")]
    AccountNotFound(AccountId),
    #[error("There is no available balance on account: {account} (requested {requested})")]
    InsufficientFunds {
        account: AccountId,
        requested: Decimal,
    },
    #[error("Account id {0} already exists!")]
    DuplicateId(AccountId),
    #[error("Cannot transfer from account {0} to itself")]
    SameAccount(AccountId),
    #[error("Could not lock accounts {first} and {second} after {attempts} attempts")]
    LockTimeout {
        first: AccountId,
        second: AccountId,
        attempts: u32,
    },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Notification error: {0}")]
    NotificationError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}
