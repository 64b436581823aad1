//! CSV input of account commands and CSV output of final balances.

pub mod account_writer;
pub mod command_reader;
