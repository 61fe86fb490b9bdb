//! Block boundary processing
//!
//! End-block runs a fixed sequence of phases:
//! `ExpireSweep → BookBuild → Match → Settle → Persist → RetentionSweep`.
//! Products are visited in `BTreeSet` order and orders in sequence order, so
//! every validator executes the same steps.

use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, warn};
use types::deal::{BlockMatchResult, MatchResult};
use types::ids::{OrderId, Product};
use types::numeric::{Price, Quantity};

use crate::context::Context;
use crate::events::OrderEvent;
use crate::keeper::OrderKeeper;
use crate::matching::{fill_depth_book, periodic_auction_match};

/// End-block phases in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    ExpireSweep,
    BookBuild,
    Match,
    Settle,
    Persist,
    RetentionSweep,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::ExpireSweep => "expire_sweep",
            Phase::BookBuild => "book_build",
            Phase::Match => "match",
            Phase::Settle => "settle",
            Phase::Persist => "persist",
            Phase::RetentionSweep => "retention_sweep",
        };
        f.write_str(name)
    }
}

/// A product that clears this block
#[derive(Debug, Clone, PartialEq)]
struct Clearing {
    product: Product,
    price: Price,
    quantity: Quantity,
}

/// Reset the keeper's per-block caches.
pub fn begin_block(keeper: &mut OrderKeeper) {
    keeper.begin_block();
}

/// Run the end-block phases and return the block's match result.
///
/// The result is persisted only when at least one product cleared.
///
/// # Panics
/// Panics on any book, index or ledger invariant violation.
pub fn end_block(ctx: &mut Context<'_>, keeper: &mut OrderKeeper) -> BlockMatchResult {
    let height = ctx.height();

    expire_sweep(ctx, keeper);
    let products = book_build(ctx, keeper);
    let clearings = match_products(ctx, keeper, &products);
    let result = settle(ctx, keeper, clearings);
    persist(ctx, keeper, &result);
    retention_sweep(ctx, keeper);

    ctx.metrics.log_summary(height);
    result
}

fn expire_sweep(ctx: &mut Context<'_>, keeper: &mut OrderKeeper) {
    let expire_blocks = keeper.params().order_expire_blocks;
    let target = match ctx.height().checked_sub(expire_blocks) {
        Some(h) if h > 0 => h,
        _ => return,
    };

    let count = OrderKeeper::get_block_order_num(&*ctx.store, target);
    let mut expired = 0;
    for sequence in 1..=count {
        let order_id = OrderId::new(target, sequence);
        match OrderKeeper::get_order(&*ctx.store, &order_id) {
            Some(order) if order.is_open() => {
                keeper.expire_order(ctx, order);
                expired += 1;
            }
            _ => {}
        }
    }
    debug!(phase = %Phase::ExpireSweep, target, scanned = count, expired, "phase done");
}

/// Book every open order placed at this height; returns the touched products.
fn book_build(ctx: &mut Context<'_>, keeper: &mut OrderKeeper) -> BTreeSet<Product> {
    let height = ctx.height();
    let count = OrderKeeper::get_block_order_num(&*ctx.store, height);
    let mut products = BTreeSet::new();

    for sequence in 1..=count {
        let order_id = OrderId::new(height, sequence);
        let order = OrderKeeper::get_order(&*ctx.store, &order_id)
            .unwrap_or_else(|| panic!("order {} counted but not stored", order_id));
        products.insert(order.product.clone());
        // Cancelled in the same block: never booked.
        if order.is_open() {
            keeper.insert_order_to_book(&*ctx.store, &order);
        }
    }
    debug!(phase = %Phase::BookBuild, orders = count, products = products.len(), "phase done");
    products
}

fn match_products(
    ctx: &mut Context<'_>,
    keeper: &mut OrderKeeper,
    products: &BTreeSet<Product>,
) -> Vec<Clearing> {
    let mut clearings = Vec::new();
    for product in products {
        let pair = match ctx.pairs.token_pair(product) {
            Some(pair) => pair,
            None => {
                warn!(%product, "no token pair for booked product, skipping auction");
                continue;
            }
        };
        let reference = OrderKeeper::reference_price(&*ctx.store, &pair);
        let book = keeper.depth_book(&*ctx.store, product);
        let (price, quantity) = periodic_auction_match(book, reference, pair.price_precision);
        debug!(
            phase = %Phase::Match,
            %product,
            levels = book.len(),
            %reference,
            %price,
            %quantity,
            "auction computed"
        );
        if !quantity.is_zero() {
            clearings.push(Clearing {
                product: product.clone(),
                price: Price::new(price),
                quantity,
            });
        }
    }
    clearings
}

fn settle(
    ctx: &mut Context<'_>,
    keeper: &mut OrderKeeper,
    clearings: Vec<Clearing>,
) -> BlockMatchResult {
    let height = ctx.height();
    let mut result = BlockMatchResult::new(height, ctx.time());

    for Clearing {
        product,
        price,
        quantity,
    } in clearings
    {
        let deals = fill_depth_book(ctx, keeper, &product, price, quantity);
        OrderKeeper::set_last_price(ctx.store, &product, price.as_decimal());
        ctx.metrics.record_match(deals.len());
        ctx.emit(OrderEvent::Matched {
            product: product.clone(),
            price,
            quantity,
        });
        info!(%product, %price, %quantity, deals = deals.len(), "product cleared");

        result.result_map.insert(
            product,
            MatchResult {
                block_height: height,
                price: price.as_decimal(),
                quantity: quantity.as_decimal(),
                deals,
            },
        );
    }
    result
}

fn persist(ctx: &mut Context<'_>, keeper: &mut OrderKeeper, result: &BlockMatchResult) {
    keeper.flush(ctx.store, ctx.header.height);
    if !result.is_empty() {
        OrderKeeper::set_block_match_result(ctx.store, result);
    }
    debug!(phase = %Phase::Persist, cleared = result.result_map.len(), "phase done");
}

fn retention_sweep(ctx: &mut Context<'_>, keeper: &OrderKeeper) {
    let data_blocks = keeper.params().data_expire_blocks;
    let target = match ctx.height().checked_sub(data_blocks) {
        Some(h) if h > 0 => h,
        _ => return,
    };
    let pruned = OrderKeeper::prune_height(ctx.store, target);
    ctx.metrics.record_pruned(pruned);
    debug!(phase = %Phase::RetentionSweep, target, pruned, "phase done");
}
