//! Application layer containing the transfer orchestration.
//!
//! `TransferCoordinator` is the entry point for moving money between accounts.
//! It owns the store and notifier handles and runs any number of transfers
//! concurrently, serializing only those that share an account.

pub mod coordinator;
