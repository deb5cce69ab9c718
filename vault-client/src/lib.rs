//! # vault-client
//!
//! Client library for the vaultsync cipher sync protocol.
//!
//! This is the main library that applications use to sync their vault.
//!
//! ## Features
//!
//! - **E2E Encryption**: cipher payloads sealed with XChaCha20-Poly1305
//!   before they leave the device (via vault-core)
//! - **Transport Abstraction**: Pluggable transport layer (HTTPS, mock)
//! - **Atomic Merge**: a failed or cancelled round trip changes nothing
//! - **TOML Configuration**: server URL, sync path, timeout, token
//!
//! ## Example
//!
//! ```ignore
//! use vault_client::{ClientConfig, HttpTransport, SyncClient};
//! use vault_core::CipherStore;
//!
//! let config = ClientConfig::from_file(Path::new("vault.toml"))?;
//! let transport = HttpTransport::from_config(&config)?;
//! let client = SyncClient::new(config, key, transport);
//!
//! let mut store = CipherStore::new();
//! store.upsert_local(client.encrypt(&cipher)?);
//! client.sync(&mut store).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod transport;

pub use client::{ClientError, SyncClient};
pub use config::{AuthConfig, ClientConfig, ConfigError, ServerConfig};
pub use transport::{HttpTransport, MockTransport, SentRequest, Transport, TransportError};
