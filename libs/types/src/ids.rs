//! Identifier types for order module entities
//!
//! Order identifiers are derived from consensus data only (block height and
//! position inside the block), so every validator assigns the same id to the
//! same order without consulting a clock or a random source.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::OrderError;

/// Unique identifier for an order
///
/// Rendered as `"{block_height}-{sequence}"`. `sequence` starts at 1 for the
/// first order placed in a block. Ordering is (height, sequence), which is
/// also arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId {
    pub block_height: u64,
    pub sequence: u64,
}

impl OrderId {
    /// Create the id for the `sequence`-th order of block `block_height`
    pub fn new(block_height: u64, sequence: u64) -> Self {
        Self {
            block_height,
            sequence,
        }
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.block_height, self.sequence)
    }
}

impl FromStr for OrderId {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || OrderError::InvalidOrderId(s.to_string());
        let (height, seq) = s.split_once('-').ok_or_else(invalid)?;
        let block_height = height.parse::<u64>().map_err(|_| invalid())?;
        let sequence = seq.parse::<u64>().map_err(|_| invalid())?;
        if sequence == 0 {
            return Err(invalid());
        }
        Ok(Self::new(block_height, sequence))
    }
}

/// Account address of a transaction sender
///
/// Signature verification happens upstream; here an address is an opaque,
/// already-authenticated string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Product identifier (trading pair)
///
/// Format: "base_quote" (e.g., "xxb_okb", "btc_usdk")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Product(String);

impl Product {
    /// Create a new Product from a string
    ///
    /// # Panics
    /// Panics if the format is invalid (must be `base_quote`)
    pub fn new(symbol: impl Into<String>) -> Self {
        let s = symbol.into();
        assert!(Self::is_valid(&s), "Product must be in base_quote format");
        Self(s)
    }

    /// Try to create a Product, returning None if invalid
    pub fn try_new(symbol: impl Into<String>) -> Option<Self> {
        let s = symbol.into();
        if Self::is_valid(&s) {
            Some(Self(s))
        } else {
            None
        }
    }

    /// Build the product string for a base and a quote asset
    pub fn from_assets(base: &str, quote: &str) -> Self {
        Self::new(format!("{}_{}", base, quote))
    }

    fn is_valid(s: &str) -> bool {
        match s.split_once('_') {
            Some((base, quote)) => !base.is_empty() && !quote.is_empty() && !quote.contains('_'),
            None => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base asset (left of the underscore)
    pub fn base(&self) -> &str {
        self.split().0
    }

    /// Quote asset (right of the underscore)
    pub fn quote(&self) -> &str {
        self.split().1
    }

    /// Split into base and quote assets
    pub fn split(&self) -> (&str, &str) {
        // Validity is checked at construction.
        self.0.split_once('_').unwrap_or((self.0.as_str(), ""))
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Product {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_display_and_parse() {
        let id = OrderId::new(120, 3);
        assert_eq!(id.to_string(), "120-3");
        assert_eq!("120-3".parse::<OrderId>().unwrap(), id);
    }

    #[test]
    fn test_order_id_rejects_garbage() {
        assert!("120".parse::<OrderId>().is_err());
        assert!("a-1".parse::<OrderId>().is_err());
        assert!("5-0".parse::<OrderId>().is_err());
    }

    #[test]
    fn test_order_id_ordering_is_arrival_order() {
        assert!(OrderId::new(10, 2) < OrderId::new(10, 3));
        assert!(OrderId::new(10, 9) < OrderId::new(11, 1));
    }

    #[test]
    fn test_product_split() {
        let product = Product::new("xxb_okb");
        assert_eq!(product.base(), "xxb");
        assert_eq!(product.quote(), "okb");
        assert_eq!(Product::from_assets("xxb", "okb"), product);
    }

    #[test]
    fn test_product_try_new() {
        assert!(Product::try_new("btc_usdk").is_some());
        assert!(Product::try_new("INVALID").is_none());
        assert!(Product::try_new("_okb").is_none());
        assert!(Product::try_new("a_b_c").is_none());
    }

    #[test]
    #[should_panic(expected = "Product must be in base_quote format")]
    fn test_product_invalid_format() {
        Product::new("INVALID");
    }

    #[test]
    fn test_product_serialization() {
        let product = Product::new("eth_usdk");
        let json = serde_json::to_string(&product).unwrap();
        assert_eq!(json, "\"eth_usdk\"");
        let deserialized: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(product, deserialized);
    }
}
