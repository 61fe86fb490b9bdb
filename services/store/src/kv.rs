//! Key-value store interface
//!
//! The surrounding framework supplies the real versioned store; modules only
//! see get/set/delete and ordered prefix iteration.

use std::collections::BTreeMap;

/// Ordered byte-keyed store for one module partition.
pub trait KvStore {
    /// Fetch the raw value at `key`.
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Write the raw value at `key`.
    fn set(&mut self, key: &[u8], value: Vec<u8>);

    /// Remove `key`; removing an absent key is a no-op.
    fn delete(&mut self, key: &[u8]);

    /// All entries whose key starts with `prefix`, ascending by key.
    fn prefix_entries(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)>;

    fn has(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }
}

/// In-memory store backed by a `BTreeMap` for deterministic iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemStore {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) {
        self.entries.insert(key.to_vec(), value);
    }

    fn delete(&mut self, key: &[u8]) {
        self.entries.remove(key);
    }

    fn prefix_entries(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.entries
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let mut store = MemStore::new();
        store.set(b"a", vec![1]);
        assert_eq!(store.get(b"a"), Some(vec![1]));
        assert!(store.has(b"a"));

        store.delete(b"a");
        assert_eq!(store.get(b"a"), None);
        store.delete(b"a");
        assert!(store.is_empty());
    }

    #[test]
    fn test_prefix_entries_are_ordered_and_bounded() {
        let mut store = MemStore::new();
        store.set(b"order:2", vec![2]);
        store.set(b"order:1", vec![1]);
        store.set(b"orderNum:1", vec![9]);
        store.set(b"depthbook:x_y", vec![7]);

        let entries = store.prefix_entries(b"order:");
        let keys: Vec<&[u8]> = entries.iter().map(|(k, _)| k.as_slice()).collect();
        assert_eq!(keys, vec![b"order:1".as_slice(), b"order:2".as_slice()]);

        assert_eq!(store.prefix_entries(b"").len(), 4);
        assert!(store.prefix_entries(b"zzz").is_empty());
    }
}
