//! State commitment: SHA-256 over the ordered store contents
//!
//! Two validators that applied the same blocks must produce the same hash;
//! this is what replay tests compare.

use sha2::{Digest, Sha256};

use crate::kv::KvStore;

/// Compute a deterministic SHA-256 hash of every entry in the store.
///
/// Keys and values are length-prefixed so that entry boundaries cannot be
/// shifted to produce a collision.
pub fn state_hash<S: KvStore + ?Sized>(store: &S) -> String {
    let mut hasher = Sha256::new();
    for (key, value) in store.prefix_entries(b"") {
        hasher.update((key.len() as u64).to_le_bytes());
        hasher.update(&key);
        hasher.update((value.len() as u64).to_le_bytes());
        hasher.update(&value);
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemStore;

    #[test]
    fn test_hash_ignores_insertion_order() {
        let mut a = MemStore::new();
        a.set(b"x", vec![1]);
        a.set(b"y", vec![2]);

        let mut b = MemStore::new();
        b.set(b"y", vec![2]);
        b.set(b"x", vec![1]);

        assert_eq!(state_hash(&a), state_hash(&b));
    }

    #[test]
    fn test_hash_detects_boundary_shift() {
        let mut a = MemStore::new();
        a.set(b"ab", vec![1]);

        let mut b = MemStore::new();
        b.set(b"a", vec![b'b', 1]);

        assert_ne!(state_hash(&a), state_hash(&b));
    }

    #[test]
    fn test_hash_changes_with_value() {
        let mut store = MemStore::new();
        store.set(b"k", vec![1]);
        let before = state_hash(&store);
        store.set(b"k", vec![2]);
        assert_ne!(before, state_hash(&store));
    }
}
