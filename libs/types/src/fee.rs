//! Fee classification types

use crate::coin::Coins;
use crate::ids::{Address, OrderId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What an order fee was charged for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeType {
    /// Charged when a resting order is cancelled
    OrderCancel,
    /// Charged when an order reaches its TTL
    OrderExpire,
    /// Charged on every fill
    OrderDeal,
}

impl fmt::Display for FeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FeeType::OrderCancel => "cancel",
            FeeType::OrderExpire => "expire",
            FeeType::OrderDeal => "deal",
        };
        f.write_str(label)
    }
}

/// Where a fee was actually taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeSource {
    /// The order's own native-asset leg (escrow or proceeds)
    NativeLeg,
    /// The sender's free native balance
    FreeBalance,
    /// The non-native leg, converted through a reference price
    Converted,
    /// Nothing could be charged
    Waived,
}

/// Ledger-side record of a fee, kept for downstream accounting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeDetail {
    pub address: Address,
    pub order_id: OrderId,
    pub fee: Coins,
    pub fee_type: FeeType,
}
