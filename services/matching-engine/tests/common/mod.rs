//! Block-level test harness
//!
//! Runs the order module against the in-memory store, ledger and pair
//! registry one block at a time.

#![allow(dead_code)]

use ledger::{Ledger, PairRegistry};
use matching_engine::handler::{MsgCancelOrder, MsgNewOrder};
use matching_engine::{
    begin_block, end_block, handle_tx, BlockHeader, Context, Msg, OrderEvent, OrderKeeper,
    OrderParams, Tx,
};
use rust_decimal::Decimal;
use store::MemStore;
use types::coin::Coin;
use types::deal::BlockMatchResult;
use types::errors::OrderError;
use types::ids::{Address, OrderId, Product};
use types::order::{Order, Side};
use types::pair::TokenPair;

pub const BLOCK_SECONDS: i64 = 3;

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

pub fn product() -> Product {
    Product::new("xxb_okb")
}

/// xxb_okb: prices to 0.1, quantities to 0.01, first reference price 10
pub fn xxb_okb() -> TokenPair {
    TokenPair {
        base_asset: "xxb".to_string(),
        quote_asset: "okb".to_string(),
        price_precision: 1,
        quantity_precision: 2,
        min_quantity: dec("0.01"),
        init_price: dec("10"),
    }
}

/// Default params without the trade fee
pub fn fee_free_params() -> OrderParams {
    OrderParams {
        trade_fee_rate: Decimal::ZERO,
        ..OrderParams::default()
    }
}

pub struct BlockOutcome {
    pub results: Vec<Result<Vec<OrderId>, OrderError>>,
    pub matched: BlockMatchResult,
    pub events: Vec<OrderEvent>,
}

impl BlockOutcome {
    /// Ids returned by the i-th transaction
    pub fn ids(&self, i: usize) -> &[OrderId] {
        self.results[i].as_ref().unwrap()
    }
}

pub struct Chain {
    pub store: MemStore,
    pub ledger: Ledger,
    pub pairs: PairRegistry,
    pub keeper: OrderKeeper,
    pub height: u64,
    tx_count: u64,
}

impl Chain {
    pub fn new(params: OrderParams) -> Self {
        let mut store = MemStore::new();
        let keeper = OrderKeeper::init_genesis(&mut store, params).unwrap();
        let mut pairs = PairRegistry::new();
        pairs.add_pair(xxb_okb()).unwrap();
        Self {
            store,
            ledger: Ledger::new(),
            pairs,
            keeper,
            height: 0,
            tx_count: 0,
        }
    }

    pub fn fund(&mut self, who: &str, denom: &str, amount: &str) {
        self.ledger
            .mint(&Address::new(who), &Coin::new(denom, dec(amount)))
            .unwrap();
    }

    pub fn new_order(&mut self, who: &str, side: Side, price: &str, quantity: &str) -> Tx {
        self.tx(Msg::NewOrder(MsgNewOrder {
            sender: Address::new(who),
            product: product().to_string(),
            side,
            price: dec(price),
            quantity: dec(quantity),
        }))
    }

    pub fn cancel(&mut self, who: &str, order_id: &OrderId) -> Tx {
        self.tx(Msg::CancelOrder(MsgCancelOrder {
            sender: Address::new(who),
            order_id: order_id.to_string(),
        }))
    }

    pub fn tx(&mut self, msg: Msg) -> Tx {
        self.tx_count += 1;
        Tx::new(format!("tx{:04}", self.tx_count), msg)
    }

    /// Execute one block delivering `txs` in order.
    pub fn block(&mut self, txs: &[Tx]) -> BlockOutcome {
        self.height += 1;
        begin_block(&mut self.keeper);
        let mut ctx = Context::new(
            BlockHeader::new(self.height, self.height as i64 * BLOCK_SECONDS),
            &mut self.store,
            &mut self.ledger,
            &self.pairs,
        );
        let results = txs
            .iter()
            .map(|tx| handle_tx(&mut ctx, &mut self.keeper, tx))
            .collect();
        let matched = end_block(&mut ctx, &mut self.keeper);
        let events = ctx.take_events();
        BlockOutcome {
            results,
            matched,
            events,
        }
    }

    pub fn order(&self, order_id: &OrderId) -> Order {
        OrderKeeper::get_order(&self.store, order_id).unwrap()
    }

    pub fn free(&self, who: &str, denom: &str) -> Decimal {
        self.ledger.free_balance(&Address::new(who), denom)
    }

    pub fn locked(&self, who: &str, denom: &str) -> Decimal {
        self.ledger.locked_balance(&Address::new(who), denom)
    }
}
