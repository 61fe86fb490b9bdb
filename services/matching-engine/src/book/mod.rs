//! Per-product book state
//!
//! - `DepthBook`: price-descending aggregate of resting buy/sell quantity
//! - `OrderIdsMap`: FIFO of order ids per (product, price, side)
//!
//! The two must agree: for every level and side, the remainders of the
//! queued orders sum to the level's aggregate.

pub mod depth_book;
pub mod order_ids;

pub use depth_book::{DepthBook, DepthBookItem};
pub use order_ids::{OrderIdsKey, OrderIdsMap};
