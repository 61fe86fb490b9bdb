//! Order module
//!
//! On-chain periodic-auction matching: orders placed during a block are
//! booked at end-block, each touched product clears once at a single price,
//! and fills settle through the token ledger.
//!
//! **Key Invariants:**
//! - Deterministic: ordered collections only, no floats, no wall clock
//! - Price-time priority inside the book (levels by price, FIFO per level)
//! - Book aggregates equal the sum of queued order remainders
//! - Conservation: escrowed funds are released, burned for fills or paid as fees

pub mod book;
pub mod config;
pub mod context;
pub mod end_block;
pub mod events;
pub mod fees;
pub mod handler;
pub mod keeper;
pub mod keys;
pub mod matching;
pub mod metrics;
pub mod query;

pub use config::{ConfigError, OrderParams};
pub use context::{BlockHeader, Context};
pub use end_block::{begin_block, end_block};
pub use events::OrderEvent;
pub use handler::{handle_tx, Msg, MsgCancelOrder, MsgNewOrder, MsgNewOrders, OrderItem, Tx};
pub use keeper::OrderKeeper;
pub use metrics::BlockMetrics;
