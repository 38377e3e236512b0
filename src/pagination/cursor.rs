//! Opaque cursor encoding.
//!
//! A cursor marks a position in an id-ordered result set. On the wire it is the
//! URL-safe base64 (unpadded) of its JSON form; clients must return it unchanged.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use super::PaginationError;

/// Position marker keyed by the last seen primary identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, serde_json::Value>>,
}

impl Cursor {
    pub fn new(id: u64) -> Self {
        Self { id, fields: None }
    }

    /// Attach an extra scalar to the cursor payload.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Id 0 is the "no position" sentinel.
    pub fn is_start(&self) -> bool {
        self.id == 0
    }

    /// Encode for transport. The sentinel encodes to the empty string.
    pub fn encode(&self) -> String {
        if self.is_start() {
            return String::new();
        }
        serde_json::to_vec(self)
            .map(|bytes| URL_SAFE_NO_PAD.encode(bytes))
            .unwrap_or_default()
    }

    /// Decode a client supplied cursor. Empty input yields the sentinel.
    pub fn decode(raw: &str) -> Result<Self, PaginationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::new(0));
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(raw)
            .map_err(|e| PaginationError::InvalidCursor(format!("not base64: {}", e)))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| PaginationError::InvalidCursor(format!("malformed payload: {}", e)))
    }
}

/// Shorthand for `Cursor::new(id).encode()`.
pub fn encode_id(id: u64) -> String {
    Cursor::new(id).encode()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_preserves_id() {
        for id in [1u64, 2, 20, 21, 4_096, u32::MAX as u64, u64::MAX] {
            let decoded = Cursor::decode(&encode_id(id)).unwrap();
            assert_eq!(decoded.id, id);
            assert!(decoded.fields.is_none());
        }
    }

    #[test]
    fn test_zero_encodes_to_empty() {
        assert_eq!(encode_id(0), "");
        assert_eq!(Cursor::new(0).with_field("title", "x").encode(), "");
    }

    #[test]
    fn test_empty_decodes_to_start() {
        assert!(Cursor::decode("").unwrap().is_start());
        assert!(Cursor::decode("   ").unwrap().is_start());
    }

    #[test]
    fn test_fields_survive_round_trip() {
        let cursor = Cursor::new(42)
            .with_field("title", "Night Watch")
            .with_field("number", 7);
        let decoded = Cursor::decode(&cursor.encode()).unwrap();
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn test_encoding_is_url_safe() {
        let encoded = Cursor::new(u64::MAX).with_field("k", "??>>").encode();
        assert!(
            encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        assert!(matches!(
            Cursor::decode("%%%not-base64%%%"),
            Err(PaginationError::InvalidCursor(_))
        ));

        let not_json = URL_SAFE_NO_PAD.encode(b"hello");
        assert!(matches!(
            Cursor::decode(&not_json),
            Err(PaginationError::InvalidCursor(_))
        ));

        let negative = URL_SAFE_NO_PAD.encode(br#"{"id":-4}"#);
        assert!(Cursor::decode(&negative).is_err());
    }
}
