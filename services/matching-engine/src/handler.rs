//! Transaction handling
//!
//! Every check runs before the first side effect, so a rejected transaction
//! leaves the store and the ledger untouched.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use types::coin::{Coin, Coins};
use types::errors::OrderError;
use types::ids::{Address, OrderId, Product};
use types::numeric::{is_exact_at, Price, Quantity};
use types::order::{Order, Side};

use crate::context::Context;
use crate::events::OrderEvent;
use crate::keeper::OrderKeeper;

/// One order as submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: String,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsgNewOrder {
    pub sender: Address,
    pub product: String,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsgNewOrders {
    pub sender: Address,
    pub orders: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsgCancelOrder {
    pub sender: Address,
    /// `"{height}-{sequence}"`
    pub order_id: String,
}

/// Order module transaction messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Msg {
    NewOrder(MsgNewOrder),
    NewOrders(MsgNewOrders),
    CancelOrder(MsgCancelOrder),
}

/// A transaction carrying one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tx {
    pub hash: String,
    pub msg: Msg,
}

impl Tx {
    pub fn new(hash: impl Into<String>, msg: Msg) -> Self {
        Self {
            hash: hash.into(),
            msg,
        }
    }
}

/// An order that passed validation against its token pair
#[derive(Debug, Clone, PartialEq)]
struct ValidOrder {
    product: Product,
    side: Side,
    price: Price,
    quantity: Quantity,
    /// Funds locked at placement
    escrow: Coin,
}

/// Deliver a transaction.
///
/// Returns the ids of the orders placed or cancelled.
pub fn handle_tx(
    ctx: &mut Context<'_>,
    keeper: &mut OrderKeeper,
    tx: &Tx,
) -> Result<Vec<OrderId>, OrderError> {
    let result = match &tx.msg {
        Msg::NewOrder(msg) => handle_new_order(ctx, keeper, &tx.hash, msg).map(|id| vec![id]),
        Msg::NewOrders(msg) => handle_new_orders(ctx, keeper, &tx.hash, msg),
        Msg::CancelOrder(msg) => handle_cancel_order(ctx, keeper, msg).map(|id| vec![id]),
    };
    if let Err(e) = &result {
        warn!(tx = %tx.hash, code = e.code(), error = %e, "order tx rejected");
    }
    result
}

fn handle_new_order(
    ctx: &mut Context<'_>,
    keeper: &mut OrderKeeper,
    tx_hash: &str,
    msg: &MsgNewOrder,
) -> Result<OrderId, OrderError> {
    let valid = validate_order(ctx, &msg.product, msg.side, msg.price, msg.quantity)?;
    place(ctx, keeper, tx_hash, &msg.sender, valid)
}

fn handle_new_orders(
    ctx: &mut Context<'_>,
    keeper: &mut OrderKeeper,
    tx_hash: &str,
    msg: &MsgNewOrders,
) -> Result<Vec<OrderId>, OrderError> {
    let max = keeper.params().max_batch_orders;
    if msg.orders.is_empty() || msg.orders.len() > max {
        return Err(OrderError::InvalidBatchSize {
            size: msg.orders.len(),
            max,
        });
    }

    let mut valid = Vec::with_capacity(msg.orders.len());
    for item in &msg.orders {
        valid.push(validate_order(ctx, &item.product, item.side, item.price, item.quantity)?);
    }

    // The whole batch must be escrowable before any order is placed.
    let mut escrow = Coins::new();
    for order in &valid {
        if !escrow.try_add(&order.escrow) {
            return Err(OrderError::InvalidQuantity(format!(
                "batch escrow of {} overflows",
                order.escrow.denom
            )));
        }
    }
    for coin in escrow.iter() {
        if !ctx.tokens.has_coins(&msg.sender, coin) {
            return Err(OrderError::InsufficientFunds(format!(
                "{} cannot escrow {} for a batch of {}",
                msg.sender,
                coin,
                valid.len()
            )));
        }
    }

    let size = valid.len();
    let mut ids = Vec::with_capacity(size);
    for order in valid {
        ids.push(place(ctx, keeper, tx_hash, &msg.sender, order)?);
    }
    ctx.emit(OrderEvent::BatchSize { size });
    debug!(tx = %tx_hash, size, "order batch placed");
    Ok(ids)
}

fn handle_cancel_order(
    ctx: &mut Context<'_>,
    keeper: &mut OrderKeeper,
    msg: &MsgCancelOrder,
) -> Result<OrderId, OrderError> {
    let order_id: OrderId = msg.order_id.parse()?;
    let order = OrderKeeper::get_order(&*ctx.store, &order_id).ok_or_else(|| {
        OrderError::NotFound {
            order_id: order_id.to_string(),
        }
    })?;
    if order.sender != msg.sender {
        return Err(OrderError::NotOrderOwner {
            order_id: order_id.to_string(),
        });
    }
    if !order.is_open() {
        return Err(OrderError::NotOpen {
            order_id: order_id.to_string(),
            status: order.status.to_string(),
        });
    }
    keeper.cancel_order(ctx, order);
    Ok(order_id)
}

/// Check an order against its token pair.
///
/// Checks performed (in order):
/// 1. Product is `base_quote` and listed
/// 2. Price and quantity are positive
/// 3. Both are representable at the pair's precision
/// 4. Quantity meets the pair minimum
/// 5. The escrow amount fits in a decimal
fn validate_order(
    ctx: &Context<'_>,
    product: &str,
    side: Side,
    price: Decimal,
    quantity: Decimal,
) -> Result<ValidOrder, OrderError> {
    // 1. Product
    let product =
        Product::try_new(product).ok_or_else(|| OrderError::InvalidProduct(product.to_string()))?;
    let pair = ctx
        .pairs
        .token_pair(&product)
        .ok_or_else(|| OrderError::TokenPairNotFound {
            product: product.to_string(),
        })?;

    // 2. Positive amounts
    let price_value = Price::try_new(price)
        .ok_or_else(|| OrderError::InvalidPrice(format!("{} is not positive", price)))?;
    if quantity <= Decimal::ZERO {
        return Err(OrderError::InvalidQuantity(format!(
            "{} is not positive",
            quantity
        )));
    }

    // 3. Precision
    if !is_exact_at(price, pair.price_precision) {
        return Err(OrderError::PricePrecision {
            price: price.to_string(),
            digits: pair.price_precision,
        });
    }
    if !is_exact_at(quantity, pair.quantity_precision) {
        return Err(OrderError::QuantityPrecision {
            quantity: quantity.to_string(),
            digits: pair.quantity_precision,
        });
    }

    // 4. Minimum size
    if quantity < pair.min_quantity {
        return Err(OrderError::QuantityBelowMinimum {
            quantity: quantity.to_string(),
            min_quantity: pair.min_quantity.to_string(),
        });
    }

    // 5. Escrow must be representable
    let quantity = Quantity::new(quantity);
    let escrow = match side {
        Side::BUY => {
            let cost = price_value.checked_mul(quantity).ok_or_else(|| {
                OrderError::InvalidQuantity(format!(
                    "{} at {} overflows the escrow amount",
                    quantity, price_value
                ))
            })?;
            Coin::new(product.quote(), cost)
        }
        Side::SELL => Coin::new(product.base(), quantity.as_decimal()),
    };

    Ok(ValidOrder {
        product,
        side,
        price: price_value,
        quantity,
        escrow,
    })
}

fn place(
    ctx: &mut Context<'_>,
    keeper: &mut OrderKeeper,
    tx_hash: &str,
    sender: &Address,
    valid: ValidOrder,
) -> Result<OrderId, OrderError> {
    let order_id = OrderKeeper::next_order_id(&*ctx.store, ctx.height());
    let order = Order::new(
        order_id,
        tx_hash,
        sender.clone(),
        valid.product,
        valid.side,
        valid.price,
        valid.quantity,
        ctx.time(),
    );
    keeper.place_order(ctx, order)?;
    Ok(order_id)
}
