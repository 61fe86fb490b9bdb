//! Store key layout of the order module

use types::ids::{OrderId, Product};

use crate::book::OrderIdsKey;

pub const PARAMS_KEY: &str = "params";
pub const ORDER_PREFIX: &str = "order:";
pub const DEPTH_BOOK_PREFIX: &str = "depthbook:";

pub fn order_key(order_id: &OrderId) -> String {
    format!("{}{}", ORDER_PREFIX, order_id)
}

pub fn depth_book_key(product: &Product) -> String {
    format!("{}{}", DEPTH_BOOK_PREFIX, product)
}

pub fn last_price_key(product: &Product) -> String {
    format!("lastprice:{}", product)
}

/// Number of orders placed at `height`
pub fn order_num_key(height: u64) -> String {
    format!("orderNum:block({})", height)
}

/// `{product}:{price}:{side}` with the price in normalized form
pub fn order_ids_key(key: &OrderIdsKey) -> String {
    key.to_string()
}

pub fn block_match_result_key(height: u64) -> String {
    format!("blockMatchResult:{}", height)
}

/// Orders whose state changed at `height`
pub fn updated_order_ids_key(height: u64) -> String {
    format!("updatedAt({})", height)
}
