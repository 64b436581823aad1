//! Domain model: accounts, balance arithmetic, transfer value objects and the
//! ports the application layer talks to.

pub mod account;
pub mod movement;
pub mod ports;
pub mod transfer;
