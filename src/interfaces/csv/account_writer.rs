use crate::domain::account::AccountRecord;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct AccountRow<'a> {
    account: &'a str,
    balance: Decimal,
}

/// Writes the final account table as CSV with an `account,balance` header.
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes one row per record, in the order given. Balances are printed
    /// without trailing zeros.
    pub fn write_accounts(&mut self, records: impl IntoIterator<Item = AccountRecord>) -> Result<()> {
        let mut wrote_any = false;
        for record in records {
            self.writer.serialize(AccountRow {
                account: record.account.as_str(),
                balance: record.balance.0.normalize(),
            })?;
            wrote_any = true;
        }
        if !wrote_any {
            self.writer.write_record(["account", "balance"])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
