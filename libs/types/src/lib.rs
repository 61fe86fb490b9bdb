//! Types library for the on-chain order module
//!
//! This library provides the core type definitions shared by the order
//! module, the token ledger and the store, keeping every value that reaches
//! consensus state in deterministic fixed-point form.
//!
//! # Modules
//! - `ids`: Identifiers (OrderId, Address, Product)
//! - `numeric`: Fixed-point decimal types (Price, Quantity) and rounding
//! - `coin`: Denominated amounts (Coin, Coins)
//! - `order`: Order lifecycle types
//! - `deal`: Fill records and per-block match results
//! - `pair`: Token pair metadata
//! - `fee`: Fee classification types
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod numeric;
pub mod coin;
pub mod order;
pub mod deal;
pub mod pair;
pub mod fee;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::coin::*;
    pub use crate::order::*;
    pub use crate::deal::*;
    pub use crate::pair::*;
    pub use crate::fee::*;
    pub use crate::errors::*;
}
