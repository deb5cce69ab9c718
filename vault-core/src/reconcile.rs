//! Sync reconciliation: building requests and merging responses.
//!
//! One round trip is two pure steps around a single network call:
//!
//! ```text
//! build_request(last_sync, updated, deleted) ──▶ SyncRequest ──▶ server
//! server ──▶ SyncResponse ──▶ merge_response() ──▶ MergePlan
//! ```
//!
//! The server is authoritative. Conflicts are resolved there (last write
//! wins by `lastModified`); the client never second-guesses the response.

use std::collections::BTreeSet;

use vault_types::{CipherId, EncryptedCipher, SyncRequest, SyncResponse};

/// Build the outgoing request for one round trip.
///
/// `last_sync` is the unix time of the previous successful sync, or 0 for
/// the first one. Nothing is validated beyond what the types already
/// guarantee.
pub fn build_request(
    last_sync: u64,
    updated: Vec<EncryptedCipher>,
    deleted: Vec<CipherId>,
) -> SyncRequest {
    SyncRequest {
        last_sync_timestamp: last_sync,
        updated,
        deleted,
    }
}

/// What a response means for the local cipher set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    /// Every cipher ID that exists remotely after this sync
    pub live: BTreeSet<CipherId>,
    /// Returned ciphers, normalized; replace any cached copy
    pub upserted: Vec<EncryptedCipher>,
    /// Live IDs that were not returned; a cached copy is still valid
    pub retained: Vec<CipherId>,
}

impl MergePlan {
    /// Whether `id` still exists remotely.
    pub fn is_live(&self, id: &CipherId) -> bool {
        self.live.contains(id)
    }

    /// Local IDs absent from the live set. The caller must treat these as deleted.
    pub fn purged<'a, I>(&self, local: I) -> Vec<CipherId>
    where
        I: IntoIterator<Item = &'a CipherId>,
    {
        local
            .into_iter()
            .filter(|id| !self.is_live(id))
            .cloned()
            .collect()
    }
}

/// Normalize a response and classify its contents.
///
/// Every returned cipher goes through the default-fill pass. A returned
/// cipher whose ID is missing from `ids` is still counted as live: the
/// server just sent it as current. Duplicate returns keep the last copy.
pub fn merge_response(mut response: SyncResponse) -> MergePlan {
    response.normalize();

    let mut live: BTreeSet<CipherId> = response.ids.into_iter().collect();

    let mut upserted: Vec<EncryptedCipher> = Vec::with_capacity(response.ciphers.len());
    for cipher in response.ciphers {
        live.insert(cipher.id.clone());
        match upserted.iter_mut().find(|c| c.id == cipher.id) {
            Some(existing) => *existing = cipher,
            None => upserted.push(cipher),
        }
    }

    let returned: BTreeSet<&CipherId> = upserted.iter().map(|c| &c.id).collect();
    let retained = live
        .iter()
        .filter(|id| !returned.contains(id))
        .cloned()
        .collect();

    MergePlan {
        live,
        upserted,
        retained,
    }
}
