//! Fill records and per-block match results
//!
//! A `BlockMatchResult` is written once per block height that cleared at
//! least one product and is read by downstream consumers of the chain state.

use crate::coin::Coins;
use crate::ids::{OrderId, Product};
use crate::numeric::Quantity;
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One order's share of a product's clearing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub order_id: OrderId,
    pub side: Side,
    pub quantity: Quantity,
    /// Fee charged on this fill
    pub fee: Coins,
}

/// Outcome of one product's periodic auction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub block_height: u64,
    pub price: Decimal,
    pub quantity: Decimal,
    /// Deals in settlement order: buy side first, then sell side
    pub deals: Vec<Deal>,
}

impl MatchResult {
    /// Total quantity filled on one side; equals `quantity` for both sides
    pub fn filled_on(&self, side: Side) -> Quantity {
        self.deals
            .iter()
            .filter(|d| d.side == side)
            .map(|d| d.quantity)
            .sum()
    }
}

/// All clearings of one block, keyed by product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockMatchResult {
    pub block_height: u64,
    /// Block time (unix seconds)
    pub timestamp: i64,
    pub result_map: BTreeMap<Product, MatchResult>,
}

impl BlockMatchResult {
    pub fn new(block_height: u64, timestamp: i64) -> Self {
        Self {
            block_height,
            timestamp,
            result_map: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.result_map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(seq: u64, side: Side, qty: u64) -> Deal {
        Deal {
            order_id: OrderId::new(7, seq),
            side,
            quantity: Quantity::from_u64(qty),
            fee: Coins::new(),
        }
    }

    #[test]
    fn test_filled_on_sums_each_side() {
        let result = MatchResult {
            block_height: 7,
            price: Decimal::new(99, 1),
            quantity: Decimal::from(3),
            deals: vec![deal(1, Side::BUY, 3), deal(2, Side::SELL, 2), deal(3, Side::SELL, 1)],
        };
        assert_eq!(result.filled_on(Side::BUY), Quantity::from_u64(3));
        assert_eq!(result.filled_on(Side::SELL), Quantity::from_u64(3));
    }

    #[test]
    fn test_block_match_result_serialization() {
        let mut block = BlockMatchResult::new(7, 1_700_000_000);
        block.result_map.insert(
            Product::new("xxb_okb"),
            MatchResult {
                block_height: 7,
                price: Decimal::from(10),
                quantity: Decimal::from(5),
                deals: vec![deal(1, Side::BUY, 5), deal(2, Side::SELL, 5)],
            },
        );

        let json = serde_json::to_string(&block).unwrap();
        let back: BlockMatchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(block, back);
    }
}
