//! Token pair metadata consumed from the token ledger

use crate::ids::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Listing parameters of a tradable product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub base_asset: String,
    pub quote_asset: String,
    /// Decimal places allowed in prices
    pub price_precision: u32,
    /// Decimal places allowed in quantities
    pub quantity_precision: u32,
    pub min_quantity: Decimal,
    /// Reference price used until the first clearing
    pub init_price: Decimal,
}

impl TokenPair {
    pub fn product(&self) -> Product {
        Product::from_assets(&self.base_asset, &self.quote_asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_product() {
        let pair = TokenPair {
            base_asset: "xxb".to_string(),
            quote_asset: "okb".to_string(),
            price_precision: 1,
            quantity_precision: 2,
            min_quantity: Decimal::new(1, 2),
            init_price: Decimal::from(10),
        };
        assert_eq!(pair.product(), Product::new("xxb_okb"));
    }
}
