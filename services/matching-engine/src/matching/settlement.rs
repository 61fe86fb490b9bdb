//! Settlement of a product's clearing
//!
//! Buy levels are walked from the highest price down and sell levels from the
//! lowest price up, each until `max_execution` is filled. Within a level the
//! order-id queue decides who fills first. Every fill burns the order's
//! escrow for the traded amount, credits the received asset less the trade
//! fee and persists the order.

use types::coin::{Coin, Coins};
use types::deal::Deal;
use types::ids::{OrderId, Product};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

use crate::book::{DepthBook, OrderIdsKey, OrderIdsMap};
use crate::config::OrderParams;
use crate::context::Context;
use crate::fees;
use crate::keeper::{OrderKeeper, SettlementParts};

/// Execute `max_execution` at `best_price` against the product's book.
///
/// Returns the deals in settlement order: buy side first, then sell side.
///
/// # Panics
/// Panics if either side of the book cannot supply `max_execution`, or if
/// the order-id index disagrees with the book.
pub fn fill_depth_book(
    ctx: &mut Context<'_>,
    keeper: &mut OrderKeeper,
    product: &Product,
    best_price: Price,
    max_execution: Quantity,
) -> Vec<Deal> {
    let SettlementParts {
        book,
        order_ids,
        updated,
        params,
    } = keeper.settlement_parts(&*ctx.store, product);
    let mut deals = Vec::new();
    let mut walk = SideWalk {
        ctx,
        params,
        order_ids,
        updated,
        deals: &mut deals,
        product,
        best_price,
    };

    let buy_levels: Vec<usize> = (0..book.len()).collect();
    let bought = walk.fill_side(book, Side::BUY, &buy_levels, max_execution);
    let sell_levels: Vec<usize> = (0..book.len()).rev().collect();
    let sold = walk.fill_side(book, Side::SELL, &sell_levels, max_execution);

    assert_eq!(
        bought, max_execution,
        "{} buy side filled {} of {}",
        product, bought, max_execution
    );
    assert_eq!(
        sold, max_execution,
        "{} sell side filled {} of {}",
        product, sold, max_execution
    );

    book.remove_empty_items();
    deals
}

struct SideWalk<'w, 'c> {
    ctx: &'w mut Context<'c>,
    params: &'w OrderParams,
    order_ids: &'w mut OrderIdsMap,
    updated: &'w mut Vec<OrderId>,
    deals: &'w mut Vec<Deal>,
    product: &'w Product,
    best_price: Price,
}

impl SideWalk<'_, '_> {
    /// Fill one side across `levels` (visited in order) and return the total.
    fn fill_side(
        &mut self,
        book: &mut DepthBook,
        side: Side,
        levels: &[usize],
        max_execution: Quantity,
    ) -> Quantity {
        let mut filled = Quantity::zero();
        for &index in levels {
            if filled >= max_execution {
                break;
            }
            let item = &book.items[index];
            let crosses = match side {
                Side::BUY => item.price >= self.best_price,
                Side::SELL => item.price <= self.best_price,
            };
            if !crosses {
                break;
            }
            let available = item.quantity(side);
            if available.is_zero() {
                continue;
            }
            let need = available.min(max_execution - filled);
            let key = OrderIdsKey::new(self.product.clone(), item.price, side);
            self.fill_level(&key, need);
            book.reduce(index, side, need);
            filled = filled + need;
        }
        filled
    }

    fn fill_level(&mut self, key: &OrderIdsKey, need: Quantity) {
        let ctx = &mut *self.ctx;
        let params = self.params;
        let updated = &mut *self.updated;
        let deals = &mut *self.deals;
        let best_price = self.best_price;

        let slot = self
            .order_ids
            .hydrate(key, || OrderKeeper::get_stored_order_ids(&*ctx.store, key));
        self.order_ids.fill(slot, need, |order_id, left| {
            let mut order = OrderKeeper::get_order(&*ctx.store, &order_id)
                .unwrap_or_else(|| panic!("order {} queued at {} is not stored", order_id, key));
            let amount = order.remain_quantity.min(left);
            let fee = settle_fill(ctx, params, &mut order, best_price, amount);
            OrderKeeper::set_order(ctx.store, &order);
            updated.push(order_id);
            deals.push(Deal {
                order_id,
                side: order.side,
                quantity: amount,
                fee,
            });
            (amount, order.remain_quantity.is_zero())
        });
    }
}

/// Apply one fill to `order` and move its funds. Returns the fee charged.
fn settle_fill(
    ctx: &mut Context<'_>,
    params: &OrderParams,
    order: &mut Order,
    best_price: Price,
    amount: Quantity,
) -> Coins {
    order.fill(best_price, amount);

    let (paid, received) = match order.side {
        Side::BUY => {
            let cost = Coin::new(order.product.quote(), best_price * amount);
            burn_escrow(ctx, order, &cost);
            // Escrow was locked at the limit price; release the improvement.
            let improvement = (order.price * amount) - cost.amount;
            if !improvement.is_zero() {
                let refund = Coin::new(order.product.quote(), improvement);
                if let Err(e) = ctx.tokens.unlock_coins(&order.sender, &refund) {
                    panic!("cannot unlock {} for order {}: {}", refund, order.order_id, e);
                }
            }
            (cost, Coin::new(order.product.base(), amount.as_decimal()))
        }
        Side::SELL => {
            let sold = Coin::new(order.product.base(), amount.as_decimal());
            burn_escrow(ctx, order, &sold);
            (sold, Coin::new(order.product.quote(), best_price * amount))
        }
    };

    let charge = fees::charge_deal_fee(ctx, params, order, &received, &paid);
    let credit = if charge.from_order_leg() {
        received.amount - charge.coin.amount
    } else {
        received.amount
    };
    let credit = Coin::new(received.denom.as_str(), credit);
    if let Err(e) = ctx.tokens.receive_locked_coins(&order.sender, &credit) {
        panic!("cannot credit {} to order {}: {}", credit, order.order_id, e);
    }
    charge.coins()
}

fn burn_escrow(ctx: &mut Context<'_>, order: &Order, coin: &Coin) {
    if let Err(e) = ctx.tokens.burn_locked_coins(&order.sender, coin) {
        panic!("escrow of order {} cannot cover {}: {}", order.order_id, coin, e);
    }
}
