//! Cursor codec shared by the in-tree datastore backends.
//!
//! A cursor names the last key a scan returned. It is handed to callers as
//! URL-safe base64 over a small JSON document and is only ever decoded here.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

use models::{PathElement, StorageKey};

use crate::errors::{StoreError, StoreResult};

const CURSOR_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    v: u8,
    kind: String,
    after: Vec<PathElement>,
}

impl Cursor {
    /// Resume point just past `last` in a scan over `kind`.
    pub fn after(kind: &str, last: &StorageKey) -> Self {
        Self { v: CURSOR_VERSION, kind: kind.to_string(), after: last.path() }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Key the scan resumes after.
    pub fn last_key(&self) -> StoreResult<StorageKey> {
        StorageKey::from_path(&self.after).ok_or_else(|| StoreError::BadCursor("cursor has an empty key path".into()))
    }

    pub fn encode(&self) -> String {
        // serializing a struct of strings cannot fail
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    pub fn decode(token: &str) -> StoreResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| StoreError::BadCursor(format!("not base64: {e}")))?;
        let cursor: Cursor = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::BadCursor(format!("undecodable payload: {e}")))?;
        if cursor.v != CURSOR_VERSION {
            return Err(StoreError::BadCursor(format!("unsupported cursor version {}", cursor.v)));
        }
        if cursor.after.is_empty() {
            return Err(StoreError::BadCursor("cursor has an empty key path".into()));
        }
        Ok(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::derive_key;

    #[test]
    fn decode_accepts_what_encode_produced() {
        let key = derive_key("Book", "b1", Some(derive_key("User", "u1", None)));
        let token = Cursor::after("Book", &key).encode();
        assert!(!token.contains('='));
        let cursor = Cursor::decode(&token).unwrap();
        assert_eq!(cursor.kind(), "Book");
        assert_eq!(cursor.last_key().unwrap(), key);
    }

    #[test]
    fn garbage_is_a_bad_cursor() {
        for token in ["%%%", "bm90LWpzb24", "", "eyJ2IjoxfQ"] {
            assert!(matches!(Cursor::decode(token), Err(StoreError::BadCursor(_))), "token {token:?}");
        }
    }

    #[test]
    fn wrong_version_is_rejected() {
        let json = br#"{"v":9,"kind":"User","after":[{"kind":"User","name":"u1"}]}"#;
        let token = URL_SAFE_NO_PAD.encode(json);
        assert!(matches!(Cursor::decode(&token), Err(StoreError::BadCursor(_))));
    }
}
