//! Token Ledger Interface
//!
//! The order module never touches balances directly; it goes through the
//! `TokenKeeper` contract defined here. This crate also carries the product
//! metadata lookup and in-memory reference implementations of both, used by
//! the module's tests and by anything embedding the module without a chain.
//!
//! # Modules
//! - `errors`: Ledger error types
//! - `keeper`: `TokenKeeper` contract
//! - `ledger`: In-memory balance ledger (free/locked balances, fee pool)
//! - `pairs`: Token pair lookup and registry

pub mod errors;
pub mod keeper;
pub mod ledger;
pub mod pairs;

pub use errors::LedgerError;
pub use keeper::TokenKeeper;
pub use ledger::Ledger;
pub use pairs::{PairRegistry, TokenPairSource};
