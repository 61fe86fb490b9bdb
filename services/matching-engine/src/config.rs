//! Module parameters
//!
//! Loaded once from genesis JSON and persisted under the `params` key so that
//! the store alone describes module behaviour. Decimal fields are JSON
//! strings (`"0.01"`), never JSON numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Blocks per day at one block per second.
pub const BLOCKS_PER_DAY: u64 = 86_400;

/// Decimal places kept on converted and rate-based fees.
pub const FEE_PRECISION: u32 = 8;

/// Errors raised while loading or validating parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to parse order params: {0}")]
    Parse(String),

    #[error("Invalid order params: {0}")]
    Invalid(String),
}

/// Parameters of the order module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderParams {
    /// Asset fees are denominated in
    pub native_asset: String,
    /// Blocks an order may rest before it is expired
    pub order_expire_blocks: u64,
    /// Blocks after which order data and match results are deleted
    pub data_expire_blocks: u64,
    /// Upper bound on orders in one `NewOrders` transaction
    pub max_batch_orders: usize,
    /// Native fee for cancelling an unfilled order
    pub fee_cancel: Decimal,
    /// Native fee for an order that expires without any fill
    pub fee_expire: Decimal,
    /// Fraction of the received amount charged on every fill
    pub trade_fee_rate: Decimal,
}

impl Default for OrderParams {
    fn default() -> Self {
        Self {
            native_asset: "okb".to_string(),
            order_expire_blocks: BLOCKS_PER_DAY,
            data_expire_blocks: 3 * BLOCKS_PER_DAY,
            max_batch_orders: 200,
            fee_cancel: Decimal::new(1, 2),
            fee_expire: Decimal::new(1, 2),
            trade_fee_rate: Decimal::new(1, 3),
        }
    }
}

impl OrderParams {
    /// Parse and validate parameters from JSON; absent fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let params: OrderParams =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.native_asset.is_empty() || self.native_asset.contains('_') {
            return Err(ConfigError::Invalid(format!(
                "native asset {:?} is not a plain denom",
                self.native_asset
            )));
        }
        if self.order_expire_blocks == 0 {
            return Err(ConfigError::Invalid("order_expire_blocks must be positive".into()));
        }
        // Expired orders must leave the book before their records are deleted.
        if self.data_expire_blocks <= self.order_expire_blocks {
            return Err(ConfigError::Invalid(format!(
                "data_expire_blocks ({}) must exceed order_expire_blocks ({})",
                self.data_expire_blocks, self.order_expire_blocks
            )));
        }
        if self.max_batch_orders == 0 {
            return Err(ConfigError::Invalid("max_batch_orders must be positive".into()));
        }
        if self.fee_cancel.is_sign_negative() || self.fee_expire.is_sign_negative() {
            return Err(ConfigError::Invalid("fees must not be negative".into()));
        }
        if self.trade_fee_rate.is_sign_negative() || self.trade_fee_rate >= Decimal::ONE {
            return Err(ConfigError::Invalid(format!(
                "trade_fee_rate {} must be in [0, 1)",
                self.trade_fee_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = OrderParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.order_expire_blocks, 86_400);
        assert_eq!(params.data_expire_blocks, 259_200);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let params = OrderParams::from_json(
            r#"{"native_asset": "tok", "order_expire_blocks": 10, "data_expire_blocks": 30, "fee_cancel": "0.5"}"#,
        )
        .unwrap();

        assert_eq!(params.native_asset, "tok");
        assert_eq!(params.order_expire_blocks, 10);
        assert_eq!(params.fee_cancel, Decimal::new(5, 1));
        assert_eq!(params.trade_fee_rate, Decimal::new(1, 3));
    }

    #[test]
    fn test_retention_must_outlive_expiry() {
        let err = OrderParams::from_json(r#"{"order_expire_blocks": 10, "data_expire_blocks": 10}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_rate_and_garbage() {
        assert!(OrderParams::from_json(r#"{"trade_fee_rate": "1"}"#).is_err());
        assert!(OrderParams::from_json(r#"{"native_asset": ""}"#).is_err());
        assert!(matches!(
            OrderParams::from_json("not json").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }
}
