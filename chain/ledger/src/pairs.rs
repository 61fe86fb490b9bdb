//! Token pair lookup
//!
//! Product metadata (precision, minimum size, initial reference price) is
//! owned by the token listing process; the order module only reads it.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use types::ids::Product;
use types::pair::TokenPair;

use crate::errors::LedgerError;

/// Read access to listed token pairs.
pub trait TokenPairSource {
    fn token_pair(&self, product: &Product) -> Option<TokenPair>;
}

/// Upper bound on price/quantity decimal places.
pub const MAX_PRECISION: u32 = 18;

/// In-memory registry of listed pairs.
#[derive(Debug, Clone, Default)]
pub struct PairRegistry {
    pairs: BTreeMap<Product, TokenPair>,
}

impl PairRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// List a pair, replacing any previous listing of the same product.
    pub fn add_pair(&mut self, pair: TokenPair) -> Result<(), LedgerError> {
        if pair.base_asset.is_empty()
            || pair.quote_asset.is_empty()
            || pair.base_asset == pair.quote_asset
            || pair.base_asset.contains('_')
            || pair.quote_asset.contains('_')
        {
            return Err(LedgerError::InvalidPair(format!(
                "{}_{}",
                pair.base_asset, pair.quote_asset
            )));
        }
        if pair.price_precision > MAX_PRECISION || pair.quantity_precision > MAX_PRECISION {
            return Err(LedgerError::InvalidPair(format!(
                "precision above {}",
                MAX_PRECISION
            )));
        }
        if pair.init_price <= Decimal::ZERO || pair.min_quantity.is_sign_negative() {
            return Err(LedgerError::InvalidPair(format!(
                "init price {} / min quantity {}",
                pair.init_price, pair.min_quantity
            )));
        }
        self.pairs.insert(pair.product(), pair);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl TokenPairSource for PairRegistry {
    fn token_pair(&self, product: &Product) -> Option<TokenPair> {
        self.pairs.get(product).cloned()
    }
}
