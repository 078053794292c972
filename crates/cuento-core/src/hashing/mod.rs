//! Hashing y canonicalización JSON para fingerprints de estado.

pub mod canonical_json;

pub use canonical_json::to_canonical_json;

use blake3::Hasher;
use serde::Serialize;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Fingerprint de cualquier valor serializable: blake3 sobre su JSON canónico.
/// Un valor que no serializa produce el hash de `null`.
pub fn fingerprint<T: Serialize>(value: &T) -> String {
    let v = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
    hash_str(&to_canonical_json(&v))
}
