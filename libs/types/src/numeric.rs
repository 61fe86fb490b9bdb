//! Fixed-point decimal types for prices and quantities
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point errors).
//! Consensus rounding is round-half-to-even ("banker's rounding"); every
//! validator must reproduce it bit for bit.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

/// Round `value` to `digits` decimal places, half to even.
pub fn round_bankers(value: Decimal, digits: u32) -> Decimal {
    value.round_dp_with_strategy(digits, RoundingStrategy::MidpointNearestEven)
}

/// True when `value` survives rounding to `digits` places unchanged.
pub fn is_exact_at(value: Decimal, digits: u32) -> bool {
    round_bankers(value, digits) == value
}

/// Limit price of an order, always strictly positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Wrap a decimal
    ///
    /// # Panics
    /// Panics if the value is not strictly positive
    pub fn new(value: Decimal) -> Self {
        assert!(value > Decimal::ZERO, "Price must be positive");
        Self(value)
    }

    /// Try to create a price, returning None unless strictly positive
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn from_u64(value: u64) -> Self {
        Self::new(Decimal::from(value))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Canonical textual form used inside store keys ("10.0" and "10" agree)
    pub fn key_string(&self) -> String {
        self.0.normalize().to_string()
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str_exact(s)?;
        Self::try_new(value).ok_or(rust_decimal::Error::LessThanMinimumPossibleValue)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Price {
    /// `self * quantity`, or `None` when the product leaves the decimal range
    pub fn checked_mul(self, quantity: Quantity) -> Option<Decimal> {
        self.0.checked_mul(quantity.0)
    }
}

impl Mul<Quantity> for Price {
    type Output = Decimal;

    fn mul(self, rhs: Quantity) -> Decimal {
        self.0 * rhs.0
    }
}

/// Order or book quantity, never negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Wrap a decimal
    ///
    /// # Panics
    /// Panics if the value is negative
    pub fn new(value: Decimal) -> Self {
        assert!(!value.is_sign_negative() || value.is_zero(), "Quantity must not be negative");
        Self(value)
    }

    /// Try to create a quantity, returning None if negative
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Subtract, returning None when the result would be negative
    pub fn checked_sub(self, rhs: Quantity) -> Option<Quantity> {
        Self::try_new(self.0 - rhs.0)
    }
}

impl FromStr for Quantity {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str_exact(s)?;
        Self::try_new(value).ok_or(rust_decimal::Error::LessThanMinimumPossibleValue)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    /// # Panics
    /// Panics on underflow; a negative quantity is a book invariant violation.
    fn sub(self, rhs: Quantity) -> Quantity {
        self.checked_sub(rhs)
            .unwrap_or_else(|| panic!("Quantity underflow: {} - {}", self, rhs))
    }
}

impl std::iter::Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), |acc, q| acc + q)
    }
}
