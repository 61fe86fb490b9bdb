//! Module State Store
//!
//! Narrow interface to the chain's versioned key-value store as seen by one
//! module partition, plus the entry codec and the state commitment hash.
//!
//! # Guarantees
//! - Iteration is always in ascending key order
//! - Every value is framed with a CRC32C checksum; a mismatch is reported as
//!   corruption instead of being decoded
//! - `state_hash` depends only on the ordered contents of the store

pub mod kv;
pub mod codec;
pub mod commitment;

pub use codec::{decode, delete, encode, get_typed, set_typed, StoreError};
pub use commitment::state_hash;
pub use kv::{KvStore, MemStore};
