//! Local cipher cache with pending-change tracking.
//!
//! [`CipherStore`] holds the caller's encrypted ciphers between syncs, the
//! local edits not yet pushed, and the time of the last successful sync.
//! It is plain data: applying a response either replaces the whole state
//! or, if the caller never gets a response, leaves it exactly as it was.

use std::collections::BTreeMap;

use vault_types::{CipherId, EncryptedCipher, SyncRequest, SyncResponse};

use crate::cipher::Cipher;
use crate::codec::VaultKey;
use crate::reconcile::{build_request, merge_response};
use crate::CipherError;

/// Local edits waiting for the next sync.
///
/// An ID is never both updated and deleted: the later edit wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingChanges {
    updated: Vec<EncryptedCipher>,
    deleted: Vec<CipherId>,
}

impl PendingChanges {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a created or modified cipher. Replaces an earlier pending copy.
    pub fn record_update(&mut self, cipher: EncryptedCipher) {
        self.deleted.retain(|id| *id != cipher.id);
        match self.updated.iter_mut().find(|c| c.id == cipher.id) {
            Some(existing) => *existing = cipher,
            None => self.updated.push(cipher),
        }
    }

    /// Record a deletion. Drops any pending update for the same ID.
    pub fn record_delete(&mut self, id: CipherId) {
        self.updated.retain(|c| c.id != id);
        if !self.deleted.contains(&id) {
            self.deleted.push(id);
        }
    }

    /// Pending updates in first-recorded order.
    pub fn updated(&self) -> &[EncryptedCipher] {
        &self.updated
    }

    /// Pending deletions in first-recorded order.
    pub fn deleted(&self) -> impl Iterator<Item = &CipherId> {
        self.deleted.iter()
    }

    /// Number of pending edits.
    pub fn len(&self) -> usize {
        self.updated.len() + self.deleted.len()
    }

    /// Whether there is nothing to push.
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Forget all pending edits.
    pub fn clear(&mut self) {
        self.updated.clear();
        self.deleted.clear();
    }
}

/// Summary of an applied sync response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Ciphers written from the response
    pub upserted: Vec<CipherId>,
    /// Ciphers dropped because the server no longer lists them
    pub purged: Vec<CipherId>,
    /// Cached ciphers kept as-is
    pub retained: usize,
}

/// The caller's local set of encrypted ciphers.
#[derive(Debug, Clone, Default)]
pub struct CipherStore {
    ciphers: BTreeMap<CipherId, EncryptedCipher>,
    pending: PendingChanges,
    last_sync: u64,
}

impl CipherStore {
    /// Create an empty store that has never synced.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store resuming from a persisted sync time.
    pub fn with_last_sync(last_sync: u64) -> Self {
        Self {
            last_sync,
            ..Self::default()
        }
    }

    /// Unix time of the last successful sync (0 if never).
    pub fn last_sync(&self) -> u64 {
        self.last_sync
    }

    /// Look up a cached cipher.
    pub fn get(&self, id: &CipherId) -> Option<&EncryptedCipher> {
        self.ciphers.get(id)
    }

    /// Iterate over cached ciphers in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &EncryptedCipher> {
        self.ciphers.values()
    }

    /// Number of cached ciphers.
    pub fn len(&self) -> usize {
        self.ciphers.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.ciphers.is_empty()
    }

    /// Local edits not yet pushed.
    pub fn pending(&self) -> &PendingChanges {
        &self.pending
    }

    /// Store a locally created or modified cipher and queue it for push.
    pub fn upsert_local(&mut self, cipher: EncryptedCipher) {
        self.ciphers.insert(cipher.id.clone(), cipher.clone());
        self.pending.record_update(cipher);
    }

    /// Remove a cipher locally and queue the deletion.
    ///
    /// Returns whether the cipher was cached.
    pub fn delete_local(&mut self, id: &CipherId) -> bool {
        let existed = self.ciphers.remove(id).is_some();
        self.pending.record_delete(id.clone());
        existed
    }

    /// Build the request for the next round trip from pending edits.
    pub fn prepare_request(&self) -> SyncRequest {
        build_request(
            self.last_sync,
            self.pending.updated().to_vec(),
            self.pending.deleted().cloned().collect(),
        )
    }

    /// Apply a server response.
    ///
    /// The new cipher set is built completely before it replaces the old
    /// one. Pending edits are cleared and the sync time advances to
    /// `synced_at`.
    pub fn apply(&mut self, response: SyncResponse, synced_at: u64) -> MergeOutcome {
        let plan = merge_response(response);
        let purged = plan.purged(self.ciphers.keys());

        let mut next: BTreeMap<CipherId, EncryptedCipher> = self
            .ciphers
            .iter()
            .filter(|(id, _)| plan.is_live(id))
            .map(|(id, cipher)| (id.clone(), cipher.clone()))
            .collect();

        let retained = next.len()
            - plan
                .upserted
                .iter()
                .filter(|c| next.contains_key(&c.id))
                .count();

        let mut upserted = Vec::with_capacity(plan.upserted.len());
        for cipher in plan.upserted {
            upserted.push(cipher.id.clone());
            next.insert(cipher.id.clone(), cipher);
        }

        self.ciphers = next;
        self.pending.clear();
        self.last_sync = synced_at;

        MergeOutcome {
            upserted,
            purged,
            retained,
        }
    }

    /// Decrypt every cached cipher. Fails as a whole on the first error.
    pub fn decrypt_all(&self, key: &VaultKey) -> Result<Vec<Cipher>, CipherError> {
        self.ciphers
            .values()
            .map(|encrypted| Cipher::from_encrypted(encrypted, key))
            .collect()
    }
}
