//! # vault-types
//!
//! Wire format types for the vaultsync cipher sync protocol.
//!
//! This crate provides the foundational types used across all vaultsync crates:
//! - [`CipherId`], [`UserId`], [`CollectionId`] - Opaque identity types
//! - [`EncryptedCipher`] - The at-rest/wire form of a cipher record
//! - [`SyncRequest`], [`SyncResponse`] - The reconciliation round trip
//! - [`WireError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod encrypted;
mod error;
mod ids;
mod messages;

pub use encrypted::{CipherType, EncryptedCipher};
pub use error::WireError;
pub use ids::{CipherId, CollectionId, UserId};
pub use messages::{SyncRequest, SyncResponse};
