//! Sync round-trip messages.
//!
//! One [`SyncRequest`] goes out, one [`SyncResponse`] comes back. Both are
//! JSON objects with camelCase keys.

use serde::{Deserialize, Serialize};

use crate::{CipherId, EncryptedCipher, WireError};

/// Client to server: local changes since the last successful sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    /// Unix seconds of the previous successful sync (0 for the first sync)
    pub last_sync_timestamp: u64,
    /// Ciphers created or modified locally
    pub updated: Vec<EncryptedCipher>,
    /// Ciphers deleted locally
    pub deleted: Vec<CipherId>,
}

impl SyncRequest {
    /// Whether the request carries no local changes.
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, WireError> {
        serde_json::to_vec(self).map_err(WireError::Serialization)
    }

    /// Deserialize from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, WireError> {
        serde_json::from_slice(bytes).map_err(WireError::Deserialization)
    }
}

/// Server to client: the authoritative ID set plus changed ciphers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncResponse {
    /// Every cipher ID the caller currently owns
    pub ids: Vec<CipherId>,
    /// Ciphers new or changed since `lastSyncTimestamp`
    pub ciphers: Vec<EncryptedCipher>,
}

impl SyncResponse {
    /// Apply the default-fill pass to every returned cipher.
    pub fn normalize(&mut self) {
        for cipher in &mut self.ciphers {
            cipher.normalize();
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, WireError> {
        serde_json::to_vec(self).map_err(WireError::Serialization)
    }

    /// Deserialize from JSON bytes. Does not normalize.
    pub fn from_json(bytes: &[u8]) -> Result<Self, WireError> {
        serde_json::from_slice(bytes).map_err(WireError::Deserialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_wire_key_names() {
        let request = SyncRequest {
            last_sync_timestamp: 1_705_000_000,
            updated: vec![],
            deleted: vec![CipherId::from("gone")],
        };

        let value: serde_json::Value =
            serde_json::from_slice(&request.to_json().unwrap()).unwrap();
        assert_eq!(value["lastSyncTimestamp"], 1_705_000_000u64);
        assert_eq!(value["updated"], serde_json::json!([]));
        assert_eq!(value["deleted"], serde_json::json!(["gone"]));
    }

    #[test]
    fn request_roundtrip() {
        let request = SyncRequest {
            last_sync_timestamp: 0,
            updated: vec![],
            deleted: vec![CipherId::from("a"), CipherId::from("b")],
        };

        let restored = SyncRequest::from_json(&request.to_json().unwrap()).unwrap();
        assert_eq!(request, restored);
        assert!(!restored.is_empty());
    }

    #[test]
    fn empty_request_is_empty() {
        let request = SyncRequest {
            last_sync_timestamp: 42,
            updated: vec![],
            deleted: vec![],
        };
        assert!(request.is_empty());
    }

    #[test]
    fn response_normalizes_every_cipher() {
        let json = br#"{
            "ids": ["a", "b"],
            "ciphers": [
                {"id": "a", "owner": "u1", "protectedData": "..."},
                {"id": "b", "owner": "u1", "type": 2, "protectedData": "...", "favorite": true}
            ]
        }"#;

        let mut response = SyncResponse::from_json(json).unwrap();
        response.normalize();

        let a = &response.ciphers[0];
        assert_eq!(a.cipher_type, Some(0));
        assert_eq!(a.favorite, Some(false));
        assert_eq!(a.re_prompt, Some(false));

        let b = &response.ciphers[1];
        assert_eq!(b.cipher_type, Some(2));
        assert_eq!(b.favorite, Some(true));
        assert_eq!(b.re_prompt, Some(false));
    }

    #[test]
    fn response_with_out_of_range_type_still_parses() {
        let json = br#"{
            "ids": ["a", "b"],
            "ciphers": [
                {"id": "a", "owner": "u1", "protectedData": "..."},
                {"id": "b", "owner": "u1", "type": 256, "protectedData": "..."}
            ]
        }"#;

        let mut response = SyncResponse::from_json(json).unwrap();
        response.normalize();

        assert_eq!(response.ciphers.len(), 2);
        assert!(response.ciphers[0].cipher_type().is_ok());
        assert!(response.ciphers[1].cipher_type().is_err());
    }

    #[test]
    fn response_missing_ids_is_rejected() {
        let json = br#"{"ciphers": []}"#;
        assert!(SyncResponse::from_json(json).is_err());
    }
}
