//! Read-only queries over committed module state
//!
//! Queries read the store only; unflushed per-block caches are not visible.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::deal::BlockMatchResult;
use types::ids::{OrderId, Product};
use types::numeric::{Price, Quantity};
use types::order::Order;

use store::KvStore;

use crate::keeper::OrderKeeper;

/// Default number of levels per side in a depth query
pub const DEFAULT_DEPTH: usize = 200;

/// One aggregated level in a depth query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub quantity: Quantity,
}

/// Top of a product's book, best prices first on each side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookView {
    pub product: Product,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

pub fn query_order(store: &dyn KvStore, order_id: &OrderId) -> Option<Order> {
    OrderKeeper::get_order(store, order_id)
}

/// Up to `size` bid and ask levels; `size == 0` means `DEFAULT_DEPTH`.
pub fn query_depth_book(store: &dyn KvStore, product: &Product, size: usize) -> BookView {
    let size = if size == 0 { DEFAULT_DEPTH } else { size };
    let book = OrderKeeper::get_stored_depth_book(store, product);
    let level = |(price, quantity)| BookLevel { price, quantity };
    BookView {
        product: product.clone(),
        bids: book.bids(size).into_iter().map(level).collect(),
        asks: book.asks(size).into_iter().map(level).collect(),
    }
}

pub fn query_block_match_result(store: &dyn KvStore, height: u64) -> Option<BlockMatchResult> {
    OrderKeeper::get_block_match_result(store, height)
}

/// Ids of orders whose state changed at `height`
pub fn query_updated_order_ids(store: &dyn KvStore, height: u64) -> Vec<OrderId> {
    OrderKeeper::get_updated_order_ids(store, height)
}

/// Last clearing price of `product`, if it ever cleared
pub fn query_last_price(store: &dyn KvStore, product: &Product) -> Option<Decimal> {
    OrderKeeper::get_last_price(store, product)
}
