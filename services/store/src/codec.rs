//! Entry codec: bincode payloads framed with a CRC32C checksum
//!
//! # Binary Format (per value)
//! ```text
//! [checksum: u32 LE]  // CRC32C over payload
//! [payload:  bytes]   // bincode
//! ```

use crc32c::crc32c;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::kv::KvStore;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error at {key}: {reason}")]
    Deserialization { key: String, reason: String },

    #[error("Checksum mismatch at {key}: expected {expected:#010x}, got {actual:#010x}")]
    Corrupted { key: String, expected: u32, actual: u32 },

    #[error("Truncated entry at {key}: {len} bytes")]
    Truncated { key: String, len: usize },
}

// ── Encoding ────────────────────────────────────────────────────────

/// Encode a value into its framed stored form.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    let payload =
        bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let mut framed = Vec::with_capacity(payload.len() + 4);
    framed.extend_from_slice(&crc32c(&payload).to_le_bytes());
    framed.extend_from_slice(&payload);
    Ok(framed)
}

/// Decode a framed value; `key` is only used in error messages.
pub fn decode<T: DeserializeOwned>(key: &[u8], bytes: &[u8]) -> Result<T, StoreError> {
    let key_str = || String::from_utf8_lossy(key).into_owned();
    if bytes.len() < 4 {
        return Err(StoreError::Truncated {
            key: key_str(),
            len: bytes.len(),
        });
    }
    let (header, payload) = bytes.split_at(4);
    let expected = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let actual = crc32c(payload);
    if expected != actual {
        return Err(StoreError::Corrupted {
            key: key_str(),
            expected,
            actual,
        });
    }
    bincode::deserialize(payload).map_err(|e| StoreError::Deserialization {
        key: key_str(),
        reason: e.to_string(),
    })
}

// ── Typed access ────────────────────────────────────────────────────

/// Read and decode the value at `key`; absent keys are `Ok(None)`.
pub fn get_typed<S, T>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    S: KvStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(key.as_bytes()) {
        Some(bytes) => decode(key.as_bytes(), &bytes).map(Some),
        None => Ok(None),
    }
}

/// Encode and write `value` at `key`.
pub fn set_typed<S, T>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    S: KvStore + ?Sized,
    T: Serialize,
{
    let bytes = encode(value)?;
    store.set(key.as_bytes(), bytes);
    Ok(())
}

/// Remove `key`.
pub fn delete<S: KvStore + ?Sized>(store: &mut S, key: &str) {
    store.delete(key.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Level {
        price: String,
        quantities: Vec<u64>,
    }

    fn sample() -> Level {
        Level {
            price: "10.1".to_string(),
            quantities: vec![3, 0, 5],
        }
    }

    #[test]
    fn test_typed_set_then_get() {
        let mut store = MemStore::new();
        set_typed(&mut store, "depthbook:xxb_okb", &sample()).unwrap();

        let loaded: Option<Level> = get_typed(&store, "depthbook:xxb_okb").unwrap();
        assert_eq!(loaded, Some(sample()));

        let missing: Option<Level> = get_typed(&store, "depthbook:none_okb").unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_flipped_byte_is_detected() {
        let mut bytes = encode(&sample()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;

        let err = decode::<Level>(b"k", &bytes).unwrap_err();
        assert!(matches!(err, StoreError::Corrupted { .. }));
    }

    #[test]
    fn test_truncated_entry_is_detected() {
        let err = decode::<Level>(b"k", &[1, 2]).unwrap_err();
        assert_eq!(
            err,
            StoreError::Truncated {
                key: "k".to_string(),
                len: 2
            }
        );
    }

    #[test]
    fn test_delete_removes_entry() {
        let mut store = MemStore::new();
        set_typed(&mut store, "a", &1u64).unwrap();
        delete(&mut store, "a");
        assert!(store.is_empty());
    }
}
