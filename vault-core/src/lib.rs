//! # vault-core
//!
//! Pure logic for vaultsync (no I/O, instant tests).
//!
//! This crate implements the cipher envelope and the sync reconciliation
//! rules without any network or disk I/O.
//!
//! ## Modules
//!
//! - [`codec`]: XChaCha20-Poly1305 envelope for `protectedData`
//! - [`cipher`]: the plaintext [`Cipher`] model and its conversions
//! - [`reconcile`]: request building and response merging
//! - [`store`]: local cipher cache with pending-change tracking
//!
//! The single network round trip is performed by `vault-client`, which
//! feeds responses back into these functions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cipher;
pub mod codec;
mod error;
pub mod reconcile;
pub mod store;

pub use cipher::{
    CardData, Cipher, CipherData, CipherParts, CustomField, FieldType, LoginData,
    PasswordHistoryEntry, SecureNoteData,
};
pub use codec::{VaultKey, KEY_SIZE, NONCE_SIZE};
pub use error::CipherError;
pub use reconcile::{build_request, merge_response, MergePlan};
pub use store::{CipherStore, MergeOutcome, PendingChanges};
