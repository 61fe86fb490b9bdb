//! Error types for the order module
//!
//! User-facing failures are returned to the transaction submitter together
//! with a stable numeric code. Invariant violations are not represented here:
//! they abort the block.

use thiserror::Error;

/// Rejection reasons for order transactions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderError {
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    #[error("Token pair not found: {product}")]
    TokenPairNotFound { product: String },

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Price {price} exceeds precision of {digits} decimal places")]
    PricePrecision { price: String, digits: u32 },

    #[error("Quantity {quantity} exceeds precision of {digits} decimal places")]
    QuantityPrecision { quantity: String, digits: u32 },

    #[error("Quantity {quantity} below minimum {min_quantity}")]
    QuantityBelowMinimum { quantity: String, min_quantity: String },

    #[error("Invalid order id: {0}")]
    InvalidOrderId(String),

    #[error("Order not found: {order_id}")]
    NotFound { order_id: String },

    #[error("Not the owner of order {order_id}")]
    NotOrderOwner { order_id: String },

    #[error("Order {order_id} is not open: {status}")]
    NotOpen { order_id: String, status: String },

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Batch of {size} orders is outside 1..={max}")]
    InvalidBatchSize { size: usize, max: usize },
}

impl OrderError {
    /// Machine-readable code reported with a rejected transaction
    pub fn code(&self) -> u32 {
        match self {
            OrderError::InvalidProduct(_) => 61001,
            OrderError::TokenPairNotFound { .. } => 61002,
            OrderError::InvalidPrice(_) => 61003,
            OrderError::InvalidQuantity(_) => 61004,
            OrderError::PricePrecision { .. } => 61005,
            OrderError::QuantityPrecision { .. } => 61006,
            OrderError::QuantityBelowMinimum { .. } => 61007,
            OrderError::InvalidOrderId(_) => 61008,
            OrderError::NotFound { .. } => 61009,
            OrderError::NotOrderOwner { .. } => 61010,
            OrderError::NotOpen { .. } => 61011,
            OrderError::InsufficientFunds(_) => 61012,
            OrderError::InvalidBatchSize { .. } => 61013,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_error_display() {
        let err = OrderError::InvalidPrice("negative".to_string());
        assert_eq!(err.to_string(), "Invalid price: negative");
    }

    #[test]
    fn test_precision_error_mentions_digits() {
        let err = OrderError::PricePrecision {
            price: "10.15".to_string(),
            digits: 1,
        };
        assert!(err.to_string().contains("10.15"));
        assert!(err.to_string().contains('1'));
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = vec![
            OrderError::InvalidProduct(String::new()),
            OrderError::TokenPairNotFound { product: String::new() },
            OrderError::InvalidPrice(String::new()),
            OrderError::InvalidQuantity(String::new()),
            OrderError::PricePrecision { price: String::new(), digits: 0 },
            OrderError::QuantityPrecision { quantity: String::new(), digits: 0 },
            OrderError::QuantityBelowMinimum { quantity: String::new(), min_quantity: String::new() },
            OrderError::InvalidOrderId(String::new()),
            OrderError::NotFound { order_id: String::new() },
            OrderError::NotOrderOwner { order_id: String::new() },
            OrderError::NotOpen { order_id: String::new(), status: String::new() },
            OrderError::InsufficientFunds(String::new()),
            OrderError::InvalidBatchSize { size: 0, max: 0 },
        ];
        let mut codes: Vec<u32> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
