use super::account::{Amount, Balance};

/// Which way money moves relative to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Credit,
    Debit,
}

/// Applies `amount` to `balance` in the given direction.
///
/// No bounds checking happens here: a debit can take the balance negative.
/// Callers confirm the balance covers a debit before calling.
pub fn apply(balance: Balance, amount: Amount, direction: Direction) -> Balance {
    match direction {
        Direction::Credit => balance + amount.into(),
        Direction::Debit => balance - amount.into(),
    }
}
