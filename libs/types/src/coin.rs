//! Denominated amounts moved through the token ledger

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of a single asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Decimal,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: Decimal) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount.normalize(), self.denom)
    }
}

/// A multi-asset amount
///
/// Entries are kept sorted by denom with no zero amounts, so two equal sets
/// of coins always serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Merge a coin into the set
    pub fn add(&mut self, coin: &Coin) {
        if coin.is_zero() {
            return;
        }
        match self.0.binary_search_by(|c| c.denom.as_str().cmp(coin.denom.as_str())) {
            Ok(pos) => {
                self.0[pos].amount += coin.amount;
                if self.0[pos].amount.is_zero() {
                    self.0.remove(pos);
                }
            }
            Err(pos) => self.0.insert(pos, coin.clone()),
        }
    }

    /// Merge a coin into the set unless the sum overflows.
    ///
    /// Returns `false` and leaves the set untouched on overflow.
    pub fn try_add(&mut self, coin: &Coin) -> bool {
        let held = self.amount_of(&coin.denom);
        if held.checked_add(coin.amount).is_none() {
            return false;
        }
        self.add(coin);
        true
    }

    /// Amount held of `denom` (zero when absent)
    pub fn amount_of(&self, denom: &str) -> Decimal {
        self.0
            .iter()
            .find(|c| c.denom == denom)
            .map(|c| c.amount)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        let mut coins = Coins::new();
        coins.add(&coin);
        coins
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        f.write_str(&parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coins_stay_sorted_and_merged() {
        let mut coins = Coins::new();
        coins.add(&Coin::new("xxb", Decimal::new(3, 0)));
        coins.add(&Coin::new("okb", Decimal::new(1, 2)));
        coins.add(&Coin::new("xxb", Decimal::new(2, 0)));

        assert_eq!(coins.amount_of("xxb"), Decimal::new(5, 0));
        assert_eq!(coins.amount_of("okb"), Decimal::new(1, 2));
        assert_eq!(coins.to_string(), "0.01okb,5xxb");
    }

    #[test]
    fn test_zero_coins_are_dropped() {
        let mut coins = Coins::new();
        coins.add(&Coin::new("okb", Decimal::ZERO));
        assert!(coins.is_empty());
        assert_eq!(coins.to_string(), "");
    }

    #[test]
    fn test_try_add_refuses_overflow() {
        let mut coins = Coins::from(Coin::new("okb", Decimal::MAX));
        assert!(!coins.try_add(&Coin::new("okb", Decimal::ONE)));
        assert_eq!(coins.amount_of("okb"), Decimal::MAX);

        assert!(coins.try_add(&Coin::new("xxb", Decimal::ONE)));
        assert_eq!(coins.amount_of("xxb"), Decimal::ONE);
    }
}
