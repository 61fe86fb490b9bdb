//! Event structures for the order module
//!
//! Events are collected on the block `Context` in emission order and handed
//! to the host chain after each transaction or end-block pass.

use serde::{Deserialize, Serialize};
use types::coin::Coins;
use types::ids::{OrderId, Product};
use types::numeric::{Price, Quantity};

/// Order module event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderEvent {
    /// An order was accepted and its funds escrowed
    NewOrder { order_id: OrderId },
    /// Number of orders placed by one `NewOrders` transaction
    BatchSize { size: usize },
    /// A resting order was cancelled by its owner
    CancelOrder { order_id: OrderId, fee: Coins },
    /// An order reached its TTL and was swept
    Expired { order_id: OrderId, fee: Coins },
    /// A product cleared in the periodic auction
    Matched {
        product: Product,
        price: Price,
        quantity: Quantity,
    },
}
