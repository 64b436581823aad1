use super::account::{AccountId, AccountRecord};
use rust_decimal::Decimal;
use serde::Deserialize;

/// A request to move `amount` from the caller's account to `to`.
///
/// Requests are built per call and dropped once processed. The amount is
/// only validated when the transfer is executed.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct TransferRequest {
    pub to: AccountId,
    pub amount: Decimal,
}

impl TransferRequest {
    pub fn new(to: AccountId, amount: Decimal) -> Self {
        Self { to, amount }
    }
}

/// Outcome of a completed transfer.
#[derive(Debug, PartialEq, Clone)]
pub struct TransferReceipt {
    /// Source account after the debit.
    pub source: AccountRecord,
    /// Destination account after the credit.
    pub destination: AccountRecord,
    pub amount: Decimal,
    /// How many times both locks were attempted before they were held together.
    pub lock_attempts: u32,
}
