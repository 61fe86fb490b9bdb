//! Depth book: aggregated quantity per price level
//!
//! Levels are kept in a `Vec` strictly descending by price. Each level holds
//! both the buy and the sell aggregate, so a crossed book (bids above asks)
//! is representable; clearing it is the auction's job.

use serde::{Deserialize, Serialize};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

/// One price level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthBookItem {
    pub price: Price,
    pub buy_quantity: Quantity,
    pub sell_quantity: Quantity,
}

impl DepthBookItem {
    fn new(price: Price) -> Self {
        Self {
            price,
            buy_quantity: Quantity::zero(),
            sell_quantity: Quantity::zero(),
        }
    }

    pub fn quantity(&self, side: Side) -> Quantity {
        match side {
            Side::BUY => self.buy_quantity,
            Side::SELL => self.sell_quantity,
        }
    }

    fn quantity_mut(&mut self, side: Side) -> &mut Quantity {
        match side {
            Side::BUY => &mut self.buy_quantity,
            Side::SELL => &mut self.sell_quantity,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buy_quantity.is_zero() && self.sell_quantity.is_zero()
    }
}

/// Aggregate book of one product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthBook {
    pub items: Vec<DepthBookItem>,
}

impl DepthBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Level at exactly `price`, if any
    pub fn item(&self, price: Price) -> Option<&DepthBookItem> {
        self.items.iter().find(|item| item.price == price)
    }

    /// Add the order's remaining quantity to its side at its price.
    pub fn insert_order(&mut self, order: &Order) {
        if order.remain_quantity.is_zero() {
            return;
        }
        // Linear scan: books hold few levels and stay sorted descending.
        let pos = self
            .items
            .iter()
            .position(|item| item.price <= order.price)
            .unwrap_or(self.items.len());

        if pos == self.items.len() || self.items[pos].price != order.price {
            self.items.insert(pos, DepthBookItem::new(order.price));
        }
        let level = self.items[pos].quantity_mut(order.side);
        *level = *level + order.remain_quantity;
    }

    /// Subtract the order's remaining quantity from its side at its price.
    ///
    /// # Panics
    /// Panics if the level is missing or holds less than the remainder; the
    /// book no longer reflects the resting orders.
    pub fn remove_order(&mut self, order: &Order) {
        if order.remain_quantity.is_zero() {
            return;
        }
        let pos = self
            .items
            .iter()
            .position(|item| item.price == order.price)
            .unwrap_or_else(|| {
                panic!(
                    "depth book has no level at {} for order {}",
                    order.price, order.order_id
                )
            });
        self.reduce(pos, order.side, order.remain_quantity);
        if self.items[pos].is_empty() {
            self.items.remove(pos);
        }
    }

    /// Shrink one side of the level at `index` by `quantity`.
    ///
    /// Emptied levels are kept until `remove_empty_items` so indices stay
    /// stable during a settlement walk.
    ///
    /// # Panics
    /// Panics if the side holds less than `quantity`.
    pub fn reduce(&mut self, index: usize, side: Side, quantity: Quantity) {
        let item = &mut self.items[index];
        let price = item.price;
        let level = item.quantity_mut(side);
        let held = *level;
        *level = held.checked_sub(quantity).unwrap_or_else(|| {
            panic!(
                "depth book {} level {} holds {} but {} was removed",
                side, price, held, quantity
            )
        });
    }

    /// Drop levels whose buy and sell sides are both zero.
    pub fn remove_empty_items(&mut self) {
        self.items.retain(|item| !item.is_empty());
    }

    /// Best `size` bid levels, highest price first
    pub fn bids(&self, size: usize) -> Vec<(Price, Quantity)> {
        self.items
            .iter()
            .filter(|item| !item.buy_quantity.is_zero())
            .take(size)
            .map(|item| (item.price, item.buy_quantity))
            .collect()
    }

    /// Best `size` ask levels, lowest price first
    pub fn asks(&self, size: usize) -> Vec<(Price, Quantity)> {
        self.items
            .iter()
            .rev()
            .filter(|item| !item.sell_quantity.is_zero())
            .take(size)
            .map(|item| (item.price, item.sell_quantity))
            .collect()
    }

    /// Strictly descending, no duplicate prices, no empty levels
    pub fn is_well_formed(&self) -> bool {
        self.items.windows(2).all(|w| w[0].price > w[1].price)
            && self.items.iter().all(|item| !item.is_empty())
    }
}
