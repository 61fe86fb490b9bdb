//! Periodic auction
//!
//! `auction` computes a product's clearing price and volume from its depth
//! book; `settlement` executes that clearing against the resting orders.

pub mod auction;
pub mod settlement;

pub use auction::periodic_auction_match;
pub use settlement::fill_depth_book;
