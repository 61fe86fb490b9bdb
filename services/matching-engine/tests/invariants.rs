//! Property tests over random block sequences
//!
//! After every block:
//! - book aggregates equal the remainders of the queued open orders
//! - every open order sits in exactly the queue of its price and side
//! - locked balances equal the escrow of open orders
//! - no asset is created or destroyed, fees included
//!
//! Replaying the same sequence yields the same state hash.

mod common;

use common::*;
use matching_engine::book::OrderIdsKey;
use matching_engine::OrderKeeper;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use store::state_hash;
use types::ids::OrderId;
use types::numeric::Quantity;
use types::order::{Order, Side};

const OWNERS: [&str; 3] = ["alice", "bob", "carol"];

#[derive(Debug, Clone)]
enum Op {
    Place {
        owner: usize,
        buy: bool,
        tick: u32,
        quantity: u32,
    },
    Cancel {
        owner: usize,
        pick: usize,
    },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..OWNERS.len(), any::<bool>(), 95u32..=105, 1u32..=5).prop_map(
            |(owner, buy, tick, quantity)| Op::Place {
                owner,
                buy,
                tick,
                quantity,
            }
        ),
        1 => (0..OWNERS.len(), any::<usize>()).prop_map(|(owner, pick)| Op::Cancel { owner, pick }),
    ]
}

fn blocks() -> impl Strategy<Value = Vec<Vec<Op>>> {
    proptest::collection::vec(proptest::collection::vec(op(), 0..6), 1..9)
}

fn new_chain() -> Chain {
    let params = matching_engine::OrderParams {
        order_expire_blocks: 3,
        data_expire_blocks: 6,
        ..matching_engine::OrderParams::default()
    };
    let mut chain = Chain::new(params);
    for owner in OWNERS {
        chain.fund(owner, "okb", "10000");
        chain.fund(owner, "xxb", "1000");
    }
    chain
}

/// Run one block of `ops`; cancels pick among orders placed earlier.
fn run_block(chain: &mut Chain, ops: &[Op], placed: &mut Vec<OrderId>) {
    let txs: Vec<_> = ops
        .iter()
        .filter_map(|op| match *op {
            Op::Place {
                owner,
                buy,
                tick,
                quantity,
            } => {
                let side = if buy { Side::BUY } else { Side::SELL };
                let price = format!("{}.{}", tick / 10, tick % 10);
                Some(chain.new_order(OWNERS[owner], side, &price, &quantity.to_string()))
            }
            Op::Cancel { owner, pick } if !placed.is_empty() => {
                let target = placed[pick % placed.len()];
                Some(chain.cancel(OWNERS[owner], &target))
            }
            Op::Cancel { .. } => None,
        })
        .collect();

    let out = chain.block(&txs);
    for ids in out.results.into_iter().flatten() {
        placed.extend(ids);
    }
    placed.sort();
    placed.dedup();
}

/// Every stored order still open
fn open_orders(chain: &Chain) -> Vec<Order> {
    (1..=chain.height)
        .flat_map(|height| {
            let count = OrderKeeper::get_block_order_num(&chain.store, height);
            (1..=count).map(move |seq| OrderId::new(height, seq))
        })
        .filter_map(|id| OrderKeeper::get_order(&chain.store, &id))
        .filter(|order| order.is_open())
        .collect()
}

fn check_book(chain: &Chain) -> Result<(), TestCaseError> {
    let book = OrderKeeper::get_stored_depth_book(&chain.store, &product());
    prop_assert!(book.is_well_formed());

    let mut queued = 0;
    for item in &book.items {
        for side in [Side::BUY, Side::SELL] {
            let key = OrderIdsKey::new(product(), item.price, side);
            let ids = OrderKeeper::get_stored_order_ids(&chain.store, &key);
            let mut total = Quantity::zero();
            for id in &ids {
                let order = chain.order(id);
                prop_assert!(order.is_open(), "{} queued but {}", id, order.status);
                prop_assert_eq!(order.price, item.price);
                prop_assert_eq!(order.side, side);
                total = total + order.remain_quantity;
            }
            prop_assert_eq!(total, item.quantity(side), "level {} {}", item.price, side);
            queued += ids.len();
        }
    }
    prop_assert_eq!(queued, open_orders(chain).len());
    Ok(())
}

fn check_escrow(chain: &Chain) -> Result<(), TestCaseError> {
    let mut escrow: BTreeMap<(&str, String), Decimal> = BTreeMap::new();
    let open = open_orders(chain);
    for order in &open {
        let coin = order.need_unlock_coins();
        *escrow
            .entry((order.sender.as_str(), coin.denom))
            .or_insert(Decimal::ZERO) += coin.amount;
    }
    for owner in OWNERS {
        for denom in ["okb", "xxb"] {
            let expected = escrow
                .get(&(owner, denom.to_string()))
                .copied()
                .unwrap_or(Decimal::ZERO);
            prop_assert_eq!(chain.locked(owner, denom), expected, "{} {}", owner, denom);
        }
    }
    Ok(())
}

fn check_supply(chain: &Chain) -> Result<(), TestCaseError> {
    prop_assert_eq!(chain.ledger.total_supply("okb"), dec("30000"));
    prop_assert_eq!(chain.ledger.total_supply("xxb"), dec("3000"));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_state_stays_consistent(blocks in blocks()) {
        let mut chain = new_chain();
        let mut placed = Vec::new();
        for ops in &blocks {
            run_block(&mut chain, ops, &mut placed);
            check_book(&chain)?;
            check_escrow(&chain)?;
            check_supply(&chain)?;
        }
    }

    #[test]
    fn prop_replay_is_deterministic(blocks in blocks()) {
        let mut first = new_chain();
        let mut second = new_chain();
        let (mut placed_a, mut placed_b) = (Vec::new(), Vec::new());
        for ops in &blocks {
            run_block(&mut first, ops, &mut placed_a);
            run_block(&mut second, ops, &mut placed_b);
            prop_assert_eq!(state_hash(&first.store), state_hash(&second.store));
        }
        prop_assert_eq!(first.ledger.fee_details(), second.ledger.fee_details());
        for owner in OWNERS {
            for denom in ["okb", "xxb"] {
                prop_assert_eq!(first.free(owner, denom), second.free(owner, denom));
            }
        }
    }
}
