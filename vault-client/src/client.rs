//! SyncClient - the main interface for vaultsync.
//!
//! This module provides [`SyncClient`], the primary API for applications to
//! encrypt ciphers and reconcile them with the remote vault.
//!
//! # Architecture
//!
//! SyncClient uses pure logic (from vault-core) for envelopes and merging,
//! and performs the single network exchange via the Transport trait.
//!
//! ```text
//! Application → SyncClient → Transport → Network
//!                   ↓
//!              vault-core (codec, reconcile, store)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use vault_client::{ClientConfig, HttpTransport, SyncClient};
//!
//! let config = ClientConfig::from_file(Path::new("vault.toml"))?;
//! let transport = HttpTransport::from_config(&config)?;
//! let client = SyncClient::new(config, key, transport);
//!
//! store.upsert_local(client.encrypt(&cipher)?);
//! let outcome = client.sync(&mut store).await?;
//! ```

use thiserror::Error;
use tracing::{debug, info, warn};
use vault_core::{Cipher, CipherError, CipherStore, MergeOutcome, VaultKey};
use vault_types::{EncryptedCipher, SyncRequest, SyncResponse, WireError};

use crate::config::ClientConfig;
use crate::transport::{Transport, TransportError};

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport error (network, auth, server rejection).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Cipher encryption or decryption error.
    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),

    /// Request or response did not match the wire format.
    #[error("wire format error: {0}")]
    Wire(#[from] WireError),
}

/// The main sync client.
///
/// Holds the vault key and the transport. Local state lives in a
/// [`CipherStore`] owned by the caller; `sync` borrows it mutably, so two
/// syncs against the same store cannot overlap.
pub struct SyncClient<T: Transport> {
    config: ClientConfig,
    key: VaultKey,
    transport: T,
}

impl<T: Transport> SyncClient<T> {
    /// Create a new SyncClient.
    pub fn new(config: ClientConfig, key: VaultKey, transport: T) -> Self {
        Self {
            config,
            key,
            transport,
        }
    }

    /// Encrypt a cipher with the client's key.
    pub fn encrypt(&self, cipher: &Cipher) -> Result<EncryptedCipher, ClientError> {
        Ok(cipher.to_encrypted(&self.key)?)
    }

    /// Decrypt an envelope with the client's key.
    pub fn decrypt(&self, encrypted: &EncryptedCipher) -> Result<Cipher, ClientError> {
        Ok(Cipher::from_encrypted(encrypted, &self.key)?)
    }

    /// Perform one exchange with the server.
    ///
    /// Returns the response with the default-fill pass already applied.
    /// No retries; any failure is returned unchanged.
    pub async fn round_trip(&self, request: &SyncRequest) -> Result<SyncResponse, ClientError> {
        let body = request.to_json()?;
        debug!(
            "Sync request: {} updated, {} deleted, since {}",
            request.updated.len(),
            request.deleted.len(),
            request.last_sync_timestamp
        );

        let response_bytes = self
            .transport
            .post(&self.config.server.sync_path, &body)
            .await
            .inspect_err(|e| warn!("Sync round trip failed: {}", e))?;

        let mut response = SyncResponse::from_json(&response_bytes)
            .inspect_err(|e| warn!("Invalid sync response: {}", e))?;
        response.normalize();

        debug!(
            "Sync response: {} ids, {} ciphers",
            response.ids.len(),
            response.ciphers.len()
        );
        Ok(response)
    }

    /// Reconcile `store` with the server, stamping the sync with the current time.
    pub async fn sync(&self, store: &mut CipherStore) -> Result<MergeOutcome, ClientError> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.sync_at(store, now).await
    }

    /// Reconcile `store` with the server, stamping the sync with `synced_at`.
    ///
    /// `synced_at` should be taken before the request is sent so changes
    /// made remotely during the round trip are picked up next time. If the
    /// round trip fails or is cancelled, `store` is left untouched.
    pub async fn sync_at(
        &self,
        store: &mut CipherStore,
        synced_at: u64,
    ) -> Result<MergeOutcome, ClientError> {
        let request = store.prepare_request();
        let response = self.round_trip(&request).await?;

        let outcome = store.apply(response, synced_at);
        info!(
            "Sync complete: {} upserted, {} purged, {} retained",
            outcome.upserted.len(),
            outcome.purged.len(),
            outcome.retained
        );
        Ok(outcome)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get a reference to the underlying transport (for testing).
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use std::time::Duration;
    use vault_core::{CipherData, LoginData, SecureNoteData};
    use vault_types::{CipherId, UserId};

    fn test_client(transport: MockTransport) -> SyncClient<MockTransport> {
        let key = VaultKey::from_bytes([0x42; 32]);
        SyncClient::new(ClientConfig::default(), key, transport)
    }

    fn login(name: &str) -> Cipher {
        Cipher::new(UserId::from("u1"), CipherData::Login(LoginData::new(name)))
    }

    fn response(ids: &[&str], ciphers: Vec<EncryptedCipher>) -> Vec<u8> {
        SyncResponse {
            ids: ids.iter().map(|id| CipherId::from(*id)).collect(),
            ciphers,
        }
        .to_json()
        .unwrap()
    }

    // ===========================================
    // Envelope Tests
    // ===========================================

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let client = test_client(MockTransport::new());
        let cipher = login("Mail");

        let encrypted = client.encrypt(&cipher).unwrap();
        assert_eq!(client.decrypt(&encrypted).unwrap(), cipher);
    }

    #[test]
    fn decrypt_with_other_key_fails() {
        let client = test_client(MockTransport::new());
        let other = SyncClient::new(
            ClientConfig::default(),
            VaultKey::from_bytes([0x07; 32]),
            MockTransport::new(),
        );

        let encrypted = other.encrypt(&login("Mail")).unwrap();
        assert!(matches!(
            client.decrypt(&encrypted),
            Err(ClientError::Cipher(CipherError::Decryption))
        ));
    }

    // ===========================================
    // Round Trip Tests
    // ===========================================

    #[tokio::test]
    async fn round_trip_posts_request_to_sync_path() {
        let transport = MockTransport::new();
        transport.queue_response(response(&[], vec![]));
        let client = test_client(transport.clone());

        let request = SyncRequest {
            last_sync_timestamp: 77,
            updated: vec![],
            deleted: vec![CipherId::from("x")],
        };
        client.round_trip(&request).await.unwrap();

        let sent = transport.last_sent().unwrap();
        assert_eq!(sent.path, "/api/sync");
        assert_eq!(SyncRequest::from_json(&sent.body).unwrap(), request);
    }

    #[tokio::test]
    async fn round_trip_normalizes_response() {
        let transport = MockTransport::new();
        transport.queue_response(
            br#"{"ids":["a","b"],"ciphers":[{"id":"a","owner":"u1","protectedData":"..."}]}"#
                .to_vec(),
        );
        let client = test_client(transport);

        let request = CipherStore::new().prepare_request();
        let response = client.round_trip(&request).await.unwrap();

        let a = &response.ciphers[0];
        assert_eq!(a.cipher_type, Some(0));
        assert_eq!(a.favorite, Some(false));
        assert_eq!(a.re_prompt, Some(false));
        assert_eq!(a.protected_data, "...");
    }

    #[tokio::test]
    async fn invalid_response_is_wire_error() {
        let transport = MockTransport::new();
        transport.queue_response(b"<html>oops</html>".to_vec());
        let client = test_client(transport);

        let result = client.round_trip(&CipherStore::new().prepare_request()).await;
        assert!(matches!(result, Err(ClientError::Wire(_))));
    }

    // ===========================================
    // Sync Tests
    // ===========================================

    #[tokio::test]
    async fn sync_pushes_local_changes_and_merges() {
        let transport = MockTransport::new();
        let client = test_client(transport.clone());

        let mine = login("Mine");
        let remote = Cipher::new(
            UserId::from("u1"),
            CipherData::SecureNote(SecureNoteData {
                title: "From another device".into(),
                note: "hello".into(),
                fields: vec![],
            }),
        );

        let mut store = CipherStore::with_last_sync(100);
        store.upsert_local(client.encrypt(&mine).unwrap());
        store.upsert_local(client.encrypt(&login("Doomed")).unwrap());
        let doomed = store
            .iter()
            .find(|c| c.id != mine.id)
            .map(|c| c.id.clone())
            .unwrap();
        store.delete_local(&doomed);

        transport.queue_response(response(
            &[mine.id.as_str(), remote.id.as_str()],
            vec![client.encrypt(&remote).unwrap()],
        ));

        let outcome = client.sync_at(&mut store, 200).await.unwrap();

        // What went out
        let sent = SyncRequest::from_json(&transport.last_sent().unwrap().body).unwrap();
        assert_eq!(sent.last_sync_timestamp, 100);
        assert_eq!(sent.updated.len(), 1);
        assert_eq!(sent.updated[0].id, mine.id);
        assert_eq!(sent.deleted, vec![doomed]);

        // What came back
        assert_eq!(outcome.upserted, vec![remote.id.clone()]);
        assert!(outcome.purged.is_empty());
        assert_eq!(outcome.retained, 1);
        assert_eq!(store.last_sync(), 200);
        assert!(store.pending().is_empty());

        let mut plaintext = store.decrypt_all(&VaultKey::from_bytes([0x42; 32])).unwrap();
        plaintext.sort_by(|a, b| a.id.cmp(&b.id));
        let mut expected = vec![mine, remote];
        expected.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(plaintext, expected);
    }

    #[tokio::test]
    async fn sync_purges_ids_missing_from_response() {
        let transport = MockTransport::new();
        let client = test_client(transport.clone());

        let mut store = CipherStore::new();
        let keep = login("Keep");
        let gone = login("Gone");
        store.upsert_local(client.encrypt(&keep).unwrap());
        store.upsert_local(client.encrypt(&gone).unwrap());

        transport.queue_response(response(&[keep.id.as_str()], vec![]));
        let outcome = client.sync_at(&mut store, 1).await.unwrap();

        assert_eq!(outcome.purged, vec![gone.id.clone()]);
        assert!(store.get(&gone.id).is_none());
        assert!(store.get(&keep.id).is_some());
    }

    #[tokio::test]
    async fn failed_sync_leaves_store_untouched() {
        let transport = MockTransport::new();
        transport.fail_next(TransportError::Status {
            status: 401,
            body: "unauthorized".into(),
        });
        let client = test_client(transport.clone());

        let mut store = CipherStore::with_last_sync(50);
        store.upsert_local(client.encrypt(&login("Pending")).unwrap());
        let pending_before = store.pending().clone();

        let result = client.sync_at(&mut store, 99).await;

        match result {
            Err(ClientError::Transport(e)) => assert!(e.is_auth_failure()),
            other => panic!("Expected transport error, got {:?}", other),
        }
        assert_eq!(store.last_sync(), 50);
        assert_eq!(store.pending(), &pending_before);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn malformed_response_leaves_store_untouched() {
        let transport = MockTransport::new();
        transport.queue_response(br#"{"ciphers":[]}"#.to_vec());
        let client = test_client(transport);

        let mut store = CipherStore::new();
        store.upsert_local(client.encrypt(&login("Pending")).unwrap());

        assert!(client.sync_at(&mut store, 99).await.is_err());
        assert_eq!(store.last_sync(), 0);
        assert_eq!(store.pending().len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn cancelled_sync_leaves_store_untouched() {
        let transport = MockTransport::new();
        transport.delay_next(Duration::from_secs(5));
        transport.queue_response(response(&[], vec![]));
        let client = test_client(transport);

        let mut store = CipherStore::new();
        store.upsert_local(client.encrypt(&login("Pending")).unwrap());

        let result =
            tokio::time::timeout(Duration::from_millis(20), client.sync_at(&mut store, 99)).await;

        assert!(result.is_err(), "sync should have been cancelled");
        assert_eq!(store.last_sync(), 0);
        assert_eq!(store.pending().len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn second_sync_sends_new_timestamp_and_no_changes() {
        let transport = MockTransport::new();
        let client = test_client(transport.clone());
        let mut store = CipherStore::new();
        store.upsert_local(client.encrypt(&login("Once")).unwrap());
        let id = store.iter().next().map(|c| c.id.clone()).unwrap();

        transport.queue_response(response(&[id.as_str()], vec![]));
        client.sync_at(&mut store, 300).await.unwrap();

        transport.queue_response(response(&[id.as_str()], vec![]));
        client.sync_at(&mut store, 400).await.unwrap();

        let sent = SyncRequest::from_json(&transport.last_sent().unwrap().body).unwrap();
        assert_eq!(sent.last_sync_timestamp, 300);
        assert!(sent.is_empty());
        assert_eq!(store.last_sync(), 400);
    }
}
