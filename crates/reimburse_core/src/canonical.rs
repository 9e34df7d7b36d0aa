//! Canonical JSON encoding and BLAKE3 fingerprints for model documents
//!
//! Two model files describing the same tree must hash identically regardless
//! of key order or whitespace, so hashing always goes through the canonical
//! form: object keys sorted recursively, compact separators.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanonicalError {
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Serialize a value to canonical JSON (sorted keys, no whitespace)
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    let tree =
        serde_json::to_value(value).map_err(|e| CanonicalError::Serialization(e.to_string()))?;
    serde_json::to_string(&sort_keys(tree)).map_err(|e| CanonicalError::Serialization(e.to_string()))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// BLAKE3 digest of the canonical JSON form
pub fn hash_canonical<T: Serialize>(value: &T) -> Result<[u8; 32], CanonicalError> {
    let json = to_canonical_json(value)?;
    Ok(*blake3::hash(json.as_bytes()).as_bytes())
}

/// BLAKE3 digest of the canonical JSON form, hex encoded
pub fn hash_canonical_hex<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    hash_canonical(value).map(hex::encode)
}
