//! Order keeper
//!
//! Owns the module's store partition and the per-block caches:
//! - depth books, hydrated per product on first touch
//! - the order-id index (`OrderIdsMap`)
//! - ids of orders whose state changed this block
//!
//! Stored records are read and written through typed accessors. A record
//! that fails to decode means the state is corrupt and aborts the block.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error, info};
use types::coin::{Coin, Coins};
use types::deal::BlockMatchResult;
use types::errors::OrderError;
use types::fee::FeeType;
use types::ids::{OrderId, Product};
use types::order::Order;
use types::pair::TokenPair;

use store::KvStore;

use crate::book::{DepthBook, OrderIdsKey, OrderIdsMap};
use crate::config::{ConfigError, OrderParams};
use crate::context::Context;
use crate::events::OrderEvent;
use crate::fees;
use crate::keys;

/// Mutable views handed to settlement for one product
pub(crate) struct SettlementParts<'k> {
    pub book: &'k mut DepthBook,
    pub order_ids: &'k mut OrderIdsMap,
    pub updated: &'k mut Vec<OrderId>,
    pub params: &'k OrderParams,
}

pub struct OrderKeeper {
    params: OrderParams,
    depth_books: BTreeMap<Product, DepthBook>,
    dirty_books: BTreeSet<Product>,
    order_ids: OrderIdsMap,
    updated_order_ids: Vec<OrderId>,
}

impl OrderKeeper {
    pub fn new(params: OrderParams) -> Self {
        Self {
            params,
            depth_books: BTreeMap::new(),
            dirty_books: BTreeSet::new(),
            order_ids: OrderIdsMap::new(),
            updated_order_ids: Vec::new(),
        }
    }

    /// Validate `params`, persist them and build a keeper.
    pub fn init_genesis(store: &mut dyn KvStore, params: OrderParams) -> Result<Self, ConfigError> {
        params.validate()?;
        write(store, keys::PARAMS_KEY, &params);
        info!(native_asset = %params.native_asset, "order module initialised");
        Ok(Self::new(params))
    }

    /// Keeper over previously initialised state; defaults if none stored.
    pub fn load(store: &dyn KvStore) -> Self {
        let params = read(store, keys::PARAMS_KEY).unwrap_or_default();
        Self::new(params)
    }

    pub fn params(&self) -> &OrderParams {
        &self.params
    }

    /// Drop every per-block cache.
    pub fn begin_block(&mut self) {
        self.depth_books.clear();
        self.dirty_books.clear();
        self.order_ids.clear();
        self.updated_order_ids.clear();
    }

    // ───────────────────────── Stored records ─────────────────────────

    pub fn get_order(store: &dyn KvStore, order_id: &OrderId) -> Option<Order> {
        read(store, &keys::order_key(order_id))
    }

    pub fn set_order(store: &mut dyn KvStore, order: &Order) {
        write(store, &keys::order_key(&order.order_id), order);
    }

    /// Orders placed at `height`
    pub fn get_block_order_num(store: &dyn KvStore, height: u64) -> u64 {
        read(store, &keys::order_num_key(height)).unwrap_or(0)
    }

    /// Next free order id at `height`; sequences start at 1.
    pub fn next_order_id(store: &dyn KvStore, height: u64) -> OrderId {
        OrderId::new(height, Self::get_block_order_num(store, height) + 1)
    }

    pub fn get_last_price(store: &dyn KvStore, product: &Product) -> Option<Decimal> {
        read(store, &keys::last_price_key(product))
    }

    pub fn set_last_price(store: &mut dyn KvStore, product: &Product, price: Decimal) {
        write(store, &keys::last_price_key(product), &price);
    }

    /// Last clearing price, or the listing price before the first clearing
    pub fn reference_price(store: &dyn KvStore, pair: &TokenPair) -> Decimal {
        Self::get_last_price(store, &pair.product()).unwrap_or(pair.init_price)
    }

    pub fn get_block_match_result(store: &dyn KvStore, height: u64) -> Option<BlockMatchResult> {
        read(store, &keys::block_match_result_key(height))
    }

    pub fn set_block_match_result(store: &mut dyn KvStore, result: &BlockMatchResult) {
        write(store, &keys::block_match_result_key(result.block_height), result);
    }

    pub fn get_updated_order_ids(store: &dyn KvStore, height: u64) -> Vec<OrderId> {
        read(store, &keys::updated_order_ids_key(height)).unwrap_or_default()
    }

    /// Depth book as last flushed
    pub fn get_stored_depth_book(store: &dyn KvStore, product: &Product) -> DepthBook {
        read(store, &keys::depth_book_key(product)).unwrap_or_default()
    }

    /// Order-id queue as last flushed
    pub fn get_stored_order_ids(store: &dyn KvStore, key: &OrderIdsKey) -> Vec<OrderId> {
        read(store, &keys::order_ids_key(key)).unwrap_or_default()
    }

    /// Delete everything recorded for orders placed at `height`.
    ///
    /// Returns the number of records removed.
    pub fn prune_height(store: &mut dyn KvStore, height: u64) -> u64 {
        let count = Self::get_block_order_num(store, height);
        let mut pruned = 0;
        for sequence in 1..=count {
            let key = keys::order_key(&OrderId::new(height, sequence));
            if store.has(key.as_bytes()) {
                store::delete(store, &key);
                pruned += 1;
            }
        }
        for key in [
            keys::order_num_key(height),
            keys::updated_order_ids_key(height),
            keys::block_match_result_key(height),
        ] {
            if store.has(key.as_bytes()) {
                store::delete(store, &key);
                pruned += 1;
            }
        }
        pruned
    }

    // ───────────────────────── Cached book ─────────────────────────

    /// Current depth book of `product`, including unflushed changes.
    pub fn depth_book(&mut self, store: &dyn KvStore, product: &Product) -> &DepthBook {
        self.depth_books
            .entry(product.clone())
            .or_insert_with(|| Self::get_stored_depth_book(store, product))
    }

    fn depth_book_mut(&mut self, store: &dyn KvStore, product: &Product) -> &mut DepthBook {
        self.dirty_books.insert(product.clone());
        self.depth_books
            .entry(product.clone())
            .or_insert_with(|| Self::get_stored_depth_book(store, product))
    }

    /// Rest an open order in its product's book and queue.
    pub fn insert_order_to_book(&mut self, store: &dyn KvStore, order: &Order) {
        self.depth_book_mut(store, &order.product).insert_order(order);
        let key = OrderIdsKey::for_order(order);
        let slot = self
            .order_ids
            .hydrate(&key, || Self::get_stored_order_ids(store, &key));
        self.order_ids.insert(slot, order.order_id);
    }

    /// Take a resting order out of its product's book and queue.
    pub fn remove_order_from_book(&mut self, store: &dyn KvStore, order: &Order) {
        self.depth_book_mut(store, &order.product).remove_order(order);
        let key = OrderIdsKey::for_order(order);
        let slot = self
            .order_ids
            .hydrate(&key, || Self::get_stored_order_ids(store, &key));
        self.order_ids.remove(slot, &order.order_id);
    }

    pub(crate) fn settlement_parts(
        &mut self,
        store: &dyn KvStore,
        product: &Product,
    ) -> SettlementParts<'_> {
        self.dirty_books.insert(product.clone());
        let book = self
            .depth_books
            .entry(product.clone())
            .or_insert_with(|| Self::get_stored_depth_book(store, product));
        SettlementParts {
            book,
            order_ids: &mut self.order_ids,
            updated: &mut self.updated_order_ids,
            params: &self.params,
        }
    }

    pub fn mark_updated(&mut self, order_id: OrderId) {
        self.updated_order_ids.push(order_id);
    }

    /// Write every modified book and queue plus this block's updated ids,
    /// then drop the caches.
    pub fn flush(&mut self, store: &mut dyn KvStore, height: u64) {
        for product in std::mem::take(&mut self.dirty_books) {
            let key = keys::depth_book_key(&product);
            match self.depth_books.get(&product) {
                Some(book) if !book.is_empty() => write(store, &key, book),
                _ => store::delete(store, &key),
            }
        }
        for (key, ids) in self.order_ids.drain_dirty() {
            write(store, &keys::order_ids_key(&key), &ids);
        }
        if !self.updated_order_ids.is_empty() {
            let key = keys::updated_order_ids_key(height);
            let mut ids: Vec<OrderId> = read(store, &key).unwrap_or_default();
            ids.append(&mut self.updated_order_ids);
            write(store, &key, &ids);
        }
        self.depth_books.clear();
    }

    // ───────────────────────── Order lifecycle ─────────────────────────

    /// Escrow funds and record a new open order.
    ///
    /// The order is booked during end-block, not here.
    pub fn place_order(&mut self, ctx: &mut Context<'_>, order: Order) -> Result<(), OrderError> {
        let escrow = order.need_lock_coins();
        ctx.tokens
            .lock_coins(&order.sender, &escrow)
            .map_err(|e| OrderError::InsufficientFunds(e.to_string()))?;

        Self::set_order(ctx.store, &order);
        write(
            ctx.store,
            &keys::order_num_key(order.order_id.block_height),
            &order.order_id.sequence,
        );
        ctx.emit(OrderEvent::NewOrder {
            order_id: order.order_id,
        });
        ctx.metrics.record_placed();
        debug!(
            order_id = %order.order_id,
            product = %order.product,
            side = %order.side,
            price = %order.price,
            quantity = %order.quantity,
            escrow = %escrow,
            "order placed"
        );
        Ok(())
    }

    /// Cancel an open order, refunding escrow less the cancel fee.
    pub fn cancel_order(&mut self, ctx: &mut Context<'_>, mut order: Order) {
        // Orders placed in this block are only booked at end-block.
        if order.order_id.block_height < ctx.height() {
            self.remove_order_from_book(&*ctx.store, &order);
        }
        order.cancel();
        let fee = if order.has_fills() {
            Decimal::ZERO
        } else {
            self.params.fee_cancel
        };
        let charged = self.release_escrow(ctx, &mut order, FeeType::OrderCancel, fee);

        Self::set_order(ctx.store, &order);
        self.mark_updated(order.order_id);
        ctx.emit(OrderEvent::CancelOrder {
            order_id: order.order_id,
            fee: charged,
        });
        ctx.metrics.record_cancelled();
        debug!(order_id = %order.order_id, status = %order.status, "order cancelled");
    }

    /// Expire an open order at the end of its TTL.
    pub fn expire_order(&mut self, ctx: &mut Context<'_>, mut order: Order) {
        self.remove_order_from_book(&*ctx.store, &order);
        order.expire();
        let fee = if order.has_fills() {
            Decimal::ZERO
        } else {
            self.params.fee_expire
        };
        let charged = self.release_escrow(ctx, &mut order, FeeType::OrderExpire, fee);

        Self::set_order(ctx.store, &order);
        self.mark_updated(order.order_id);
        ctx.emit(OrderEvent::Expired {
            order_id: order.order_id,
            fee: charged,
        });
        ctx.metrics.record_expired();
        debug!(order_id = %order.order_id, status = %order.status, "order expired");
    }

    /// Charge `fee` through the waterfall and unlock what is left of the
    /// order's escrow.
    fn release_escrow(
        &self,
        ctx: &mut Context<'_>,
        order: &mut Order,
        fee_type: FeeType,
        fee: Decimal,
    ) -> Coins {
        let escrow = order.need_unlock_coins();
        let charge = fees::charge_escrow_fee(ctx, &self.params, order, fee_type, fee, &escrow);
        let refund = if charge.from_order_leg() {
            escrow.amount - charge.coin.amount
        } else {
            escrow.amount
        };
        let refund = Coin::new(escrow.denom.as_str(), refund);
        if let Err(e) = ctx.tokens.unlock_coins(&order.sender, &refund) {
            panic!("cannot unlock {} for order {}: {}", refund, order.order_id, e);
        }
        charge.coins()
    }
}

fn read<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Option<T> {
    match store::get_typed(store, key) {
        Ok(value) => value,
        Err(e) => {
            error!(key, error = %e, "corrupted order module record");
            panic!("corrupted order module record {}: {}", key, e);
        }
    }
}

fn write<T: Serialize>(store: &mut dyn KvStore, key: &str, value: &T) {
    if let Err(e) = store::set_typed(store, key, value) {
        panic!("cannot encode order module record {}: {}", key, e);
    }
}
