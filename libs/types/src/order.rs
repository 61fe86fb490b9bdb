//! Order lifecycle types
//!
//! An order is placed `Open`, escrows its funds, and ends in exactly one
//! terminal state: filled, cancelled or expired (the latter two in a full or
//! partially-filled variant).

use crate::coin::{Coin, Coins};
use crate::ids::{Address, OrderId, Product};
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::BUY => f.write_str("BUY"),
            Side::SELL => f.write_str("SELL"),
        }
    }
}

/// Order status
///
/// State IDs are part of the stored/queried representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// State 0: resting, may still fill
    #[serde(rename = "OPEN")]
    Open,

    /// State 1: completely matched (terminal)
    #[serde(rename = "FILLED")]
    Filled,

    /// State 2: cancelled before any fill (terminal)
    #[serde(rename = "CANCELLED")]
    Cancelled,

    /// State 3: reached its TTL before any fill (terminal)
    #[serde(rename = "EXPIRED")]
    Expired,

    /// State 4: cancelled after at least one fill (terminal)
    #[serde(rename = "PARTIAL_FILLED_CANCELLED")]
    PartialFilledCancelled,

    /// State 5: reached its TTL after at least one fill (terminal)
    #[serde(rename = "PARTIAL_FILLED_EXPIRED")]
    PartialFilledExpired,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Open)
    }

    /// Get the state ID
    pub fn state_id(&self) -> u8 {
        match self {
            OrderStatus::Open => 0,
            OrderStatus::Filled => 1,
            OrderStatus::Cancelled => 2,
            OrderStatus::Expired => 3,
            OrderStatus::PartialFilledCancelled => 4,
            OrderStatus::PartialFilledExpired => 5,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Complete order record as kept in the module store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub tx_hash: String,
    pub sender: Address,
    pub product: Product,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub status: OrderStatus,
    /// Volume-weighted average of all fill prices; zero until the first fill
    pub filled_avg_price: Decimal,
    pub remain_quantity: Quantity,
    /// Fees charged against this order so far
    pub fees: Coins,
    /// Block time at placement (unix seconds)
    pub timestamp: i64,
}

impl Order {
    /// Create a new open order
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_id: OrderId,
        tx_hash: impl Into<String>,
        sender: Address,
        product: Product,
        side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: i64,
    ) -> Self {
        Self {
            order_id,
            tx_hash: tx_hash.into(),
            sender,
            product,
            side,
            price,
            quantity,
            status: OrderStatus::Open,
            filled_avg_price: Decimal::ZERO,
            remain_quantity: quantity,
            fees: Coins::new(),
            timestamp,
        }
    }

    /// Quantity filled so far
    pub fn filled_quantity(&self) -> Quantity {
        self.quantity - self.remain_quantity
    }

    /// Check quantity invariant: 0 <= remain <= quantity
    pub fn check_invariant(&self) -> bool {
        self.remain_quantity <= self.quantity
    }

    /// Check if order has any fills
    pub fn has_fills(&self) -> bool {
        self.remain_quantity < self.quantity
    }

    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }

    /// Asset escrowed while the order rests: quote for BUY, base for SELL
    pub fn escrow_denom(&self) -> &str {
        match self.side {
            Side::BUY => self.product.quote(),
            Side::SELL => self.product.base(),
        }
    }

    /// Asset credited on fills: base for BUY, quote for SELL
    pub fn received_denom(&self) -> &str {
        match self.side {
            Side::BUY => self.product.base(),
            Side::SELL => self.product.quote(),
        }
    }

    /// Escrow required at placement
    pub fn need_lock_coins(&self) -> Coin {
        self.escrow_for(self.quantity)
    }

    /// Escrow still held for the unfilled remainder
    pub fn need_unlock_coins(&self) -> Coin {
        self.escrow_for(self.remain_quantity)
    }

    fn escrow_for(&self, quantity: Quantity) -> Coin {
        match self.side {
            Side::BUY => Coin::new(self.product.quote(), self.price * quantity),
            Side::SELL => Coin::new(self.product.base(), quantity.as_decimal()),
        }
    }

    /// Apply a fill of `amount` at `price`
    ///
    /// # Panics
    /// Panics if the order is not open or the fill would exceed the remainder
    pub fn fill(&mut self, price: Price, amount: Quantity) {
        assert!(self.is_open(), "Cannot fill order {} in status {}", self.order_id, self.status);
        assert!(
            amount <= self.remain_quantity,
            "Fill would exceed order quantity: order {} remain {} fill {}",
            self.order_id,
            self.remain_quantity,
            amount
        );
        if amount.is_zero() {
            return;
        }

        let filled = self.filled_quantity().as_decimal();
        let new_filled = filled + amount.as_decimal();
        self.filled_avg_price =
            (self.filled_avg_price * filled + price * amount) / new_filled;
        self.remain_quantity = self.remain_quantity - amount;

        if self.remain_quantity.is_zero() {
            self.status = OrderStatus::Filled;
        }

        assert!(self.check_invariant(), "Invariant violated after fill");
    }

    /// Cancel the order
    ///
    /// # Panics
    /// Panics if order is already in terminal state
    pub fn cancel(&mut self) {
        assert!(self.is_open(), "Cannot cancel terminal order");
        self.status = if self.has_fills() {
            OrderStatus::PartialFilledCancelled
        } else {
            OrderStatus::Cancelled
        };
    }

    /// Expire the order
    ///
    /// # Panics
    /// Panics if order is already in terminal state
    pub fn expire(&mut self) {
        assert!(self.is_open(), "Cannot expire terminal order");
        self.status = if self.has_fills() {
            OrderStatus::PartialFilledExpired
        } else {
            OrderStatus::Expired
        };
    }

    /// Record a fee charged against this order
    pub fn record_fee(&mut self, fee: &Coin) {
        self.fees.add(fee);
    }
}
