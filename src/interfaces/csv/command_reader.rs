use crate::domain::account::{AccountId, Balance};
use crate::domain::transfer::TransferRequest;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Open,
    Transfer,
}

/// One raw CSV row: `type, account, counterparty, amount`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CommandRow {
    pub r#type: CommandType,
    pub account: AccountId,
    pub counterparty: Option<AccountId>,
    pub amount: Option<Decimal>,
}

/// A validated command ready for the coordinator.
#[derive(Debug, PartialEq, Clone)]
pub enum Command {
    /// Create `account` with an opening balance (zero when omitted).
    Open { account: AccountId, balance: Balance },
    /// Move money out of `from`.
    Transfer {
        from: AccountId,
        request: TransferRequest,
    },
}

impl TryFrom<CommandRow> for Command {
    type Error = LedgerError;

    fn try_from(row: CommandRow) -> Result<Self> {
        match row.r#type {
            CommandType::Open => {
                let balance = row.amount.unwrap_or(Decimal::ZERO);
                if balance < Decimal::ZERO {
                    return Err(LedgerError::ValidationError(format!(
                        "Opening balance for {} must not be negative",
                        row.account
                    )));
                }
                Ok(Command::Open {
                    account: row.account,
                    balance: Balance::new(balance),
                })
            }
            CommandType::Transfer => {
                let to = row.counterparty.ok_or_else(|| {
                    LedgerError::ValidationError(format!(
                        "Transfer from {} has no counterparty",
                        row.account
                    ))
                })?;
                let amount = row.amount.ok_or_else(|| {
                    LedgerError::ValidationError(format!(
                        "Transfer from {} has no amount",
                        row.account
                    ))
                })?;
                Ok(Command::Transfer {
                    from: row.account,
                    request: TransferRequest::new(to, amount),
                })
            }
        }
    }
}

/// Reads account commands from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace and accepting short rows so the
/// optional trailing columns can be left out.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes and validates commands, one per row.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize::<CommandRow>()
            .map(|result| result.map_err(LedgerError::from).and_then(Command::try_from))
    }
}
