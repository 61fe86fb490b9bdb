//! Ledger: in-memory balance tracking with free/locked split and fee pool
//!
//! Balances are tracked per (address, denom) in `BTreeMap`s so that any
//! iteration over accounts or assets is ordered. All arithmetic is checked;
//! a failing operation leaves every balance untouched.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use types::coin::Coin;
use types::fee::FeeDetail;
use types::ids::Address;

use crate::errors::LedgerError;
use crate::keeper::TokenKeeper;

/// Free and locked balances of one account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountBalances {
    pub free: BTreeMap<String, Decimal>,
    pub locked: BTreeMap<String, Decimal>,
}

/// Reference balance ledger.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    accounts: BTreeMap<Address, AccountBalances>,
    fee_pool: BTreeMap<String, Decimal>,
    fee_details: Vec<FeeDetail>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── Issuance ─────────────────────────

    /// Credit newly issued coins to an address (genesis / test funding).
    pub fn mint(&mut self, addr: &Address, coin: &Coin) -> Result<(), LedgerError> {
        check_amount(coin)?;
        let free = &mut self.accounts.entry(addr.clone()).or_default().free;
        credit(free, coin)
    }

    // ───────────────────────── Balance Queries ─────────────────────────

    /// Free balance of `denom`.
    pub fn free_balance(&self, addr: &Address, denom: &str) -> Decimal {
        self.accounts
            .get(addr)
            .and_then(|acc| acc.free.get(denom))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Locked balance of `denom`.
    pub fn locked_balance(&self, addr: &Address, denom: &str) -> Decimal {
        self.accounts
            .get(addr)
            .and_then(|acc| acc.locked.get(denom))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Fees collected so far in `denom`.
    pub fn collected_fees(&self, denom: &str) -> Decimal {
        self.fee_pool.get(denom).copied().unwrap_or(Decimal::ZERO)
    }

    /// Sum of all free, locked and fee-pool holdings of `denom`.
    pub fn total_supply(&self, denom: &str) -> Decimal {
        let held: Decimal = self
            .accounts
            .values()
            .map(|acc| {
                acc.free.get(denom).copied().unwrap_or(Decimal::ZERO)
                    + acc.locked.get(denom).copied().unwrap_or(Decimal::ZERO)
            })
            .sum();
        held + self.collected_fees(denom)
    }

    /// Every fee recorded through `add_fee_detail`, in recording order.
    pub fn fee_details(&self) -> &[FeeDetail] {
        &self.fee_details
    }

    fn account_mut(&mut self, addr: &Address) -> &mut AccountBalances {
        self.accounts.entry(addr.clone()).or_default()
    }
}

impl TokenKeeper for Ledger {
    fn has_coins(&self, addr: &Address, coin: &Coin) -> bool {
        self.free_balance(addr, &coin.denom) >= coin.amount
    }

    fn subtract_coins(&mut self, addr: &Address, coin: &Coin) -> Result<(), LedgerError> {
        check_amount(coin)?;
        let free = &mut self.account_mut(addr).free;
        debit_free(free, coin)
    }

    fn lock_coins(&mut self, addr: &Address, coin: &Coin) -> Result<(), LedgerError> {
        check_amount(coin)?;
        let acc = self.account_mut(addr);
        debit_free(&mut acc.free, coin)?;
        if let Err(e) = credit(&mut acc.locked, coin) {
            // Put the debit back; the locked side overflowed.
            credit(&mut acc.free, coin)?;
            return Err(e);
        }
        Ok(())
    }

    fn unlock_coins(&mut self, addr: &Address, coin: &Coin) -> Result<(), LedgerError> {
        check_amount(coin)?;
        let acc = self.account_mut(addr);
        debit_locked(&mut acc.locked, coin)?;
        if let Err(e) = credit(&mut acc.free, coin) {
            credit(&mut acc.locked, coin)?;
            return Err(e);
        }
        Ok(())
    }

    fn burn_locked_coins(&mut self, addr: &Address, coin: &Coin) -> Result<(), LedgerError> {
        check_amount(coin)?;
        let locked = &mut self.account_mut(addr).locked;
        debit_locked(locked, coin)
    }

    fn receive_locked_coins(&mut self, addr: &Address, coin: &Coin) -> Result<(), LedgerError> {
        check_amount(coin)?;
        let free = &mut self.account_mut(addr).free;
        credit(free, coin)
    }

    fn add_fee_detail(&mut self, detail: FeeDetail) {
        self.fee_details.push(detail);
    }

    fn add_collected_fees(&mut self, coin: &Coin) -> Result<(), LedgerError> {
        check_amount(coin)?;
        credit(&mut self.fee_pool, coin)
    }
}

// ───────────────────────── Safe arithmetic ─────────────────────────

fn check_amount(coin: &Coin) -> Result<(), LedgerError> {
    if coin.amount.is_sign_negative() && !coin.amount.is_zero() {
        return Err(LedgerError::InvalidAmount {
            amount: coin.to_string(),
        });
    }
    Ok(())
}

fn credit(balances: &mut BTreeMap<String, Decimal>, coin: &Coin) -> Result<(), LedgerError> {
    if coin.is_zero() {
        return Ok(());
    }
    let current = balances.entry(coin.denom.clone()).or_insert(Decimal::ZERO);
    *current = current.checked_add(coin.amount).ok_or(LedgerError::Overflow)?;
    Ok(())
}

fn debit_free(balances: &mut BTreeMap<String, Decimal>, coin: &Coin) -> Result<(), LedgerError> {
    let available = balances.get(&coin.denom).copied().unwrap_or(Decimal::ZERO);
    if available < coin.amount {
        return Err(LedgerError::InsufficientBalance {
            denom: coin.denom.clone(),
            required: coin.amount.to_string(),
            available: available.to_string(),
        });
    }
    apply_debit(balances, coin, available)
}

fn debit_locked(balances: &mut BTreeMap<String, Decimal>, coin: &Coin) -> Result<(), LedgerError> {
    let locked = balances.get(&coin.denom).copied().unwrap_or(Decimal::ZERO);
    if locked < coin.amount {
        return Err(LedgerError::InsufficientLocked {
            denom: coin.denom.clone(),
            required: coin.amount.to_string(),
            locked: locked.to_string(),
        });
    }
    apply_debit(balances, coin, locked)
}

fn apply_debit(
    balances: &mut BTreeMap<String, Decimal>,
    coin: &Coin,
    current: Decimal,
) -> Result<(), LedgerError> {
    if coin.is_zero() {
        return Ok(());
    }
    let remaining = current.checked_sub(coin.amount).ok_or(LedgerError::Overflow)?;
    if remaining.is_zero() {
        balances.remove(&coin.denom);
    } else {
        balances.insert(coin.denom.clone(), remaining);
    }
    Ok(())
}
