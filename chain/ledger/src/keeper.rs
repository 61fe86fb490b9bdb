//! Balance ledger contract consumed by the order module

use types::coin::Coin;
use types::fee::FeeDetail;
use types::ids::Address;

use crate::errors::LedgerError;

/// Balance operations the order module relies on.
///
/// Every mutation either applies completely or fails with an explicit
/// insufficient-funds condition and leaves balances untouched.
pub trait TokenKeeper {
    /// True when the free balance covers `coin`.
    fn has_coins(&self, addr: &Address, coin: &Coin) -> bool;

    /// Remove `coin` from the free balance (the caller routes it onwards).
    fn subtract_coins(&mut self, addr: &Address, coin: &Coin) -> Result<(), LedgerError>;

    /// Move `coin` from the free into the locked balance.
    fn lock_coins(&mut self, addr: &Address, coin: &Coin) -> Result<(), LedgerError>;

    /// Move `coin` from the locked back into the free balance.
    fn unlock_coins(&mut self, addr: &Address, coin: &Coin) -> Result<(), LedgerError>;

    /// Destroy `coin` out of the locked balance.
    fn burn_locked_coins(&mut self, addr: &Address, coin: &Coin) -> Result<(), LedgerError>;

    /// Credit `coin` (released from a counterparty's escrow) to the free balance.
    fn receive_locked_coins(&mut self, addr: &Address, coin: &Coin) -> Result<(), LedgerError>;

    /// Record a fee for downstream accounting.
    fn add_fee_detail(&mut self, detail: FeeDetail);

    /// Credit an already-debited fee to the collected fee pool.
    fn add_collected_fees(&mut self, coin: &Coin) -> Result<(), LedgerError>;
}
