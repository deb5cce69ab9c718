//! Transport abstraction for vaultsync.
//!
//! This module provides a pluggable transport layer that abstracts the
//! authenticated HTTP exchange with the remote vault (reqwest, mock for
//! testing).
//!
//! # Design
//!
//! A sync is exactly one request/response exchange, so the trait has a
//! single operation:
//! - `post()` sends a JSON body to a path and returns the response body
//!
//! Retries, backoff and authentication refresh belong to implementations,
//! not to the sync client.
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new();
//! transport.queue_response(response_bytes);
//! let body = transport.post("/api/sync", &request_bytes).await?;
//! ```

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::{MockTransport, SentRequest};

use async_trait::async_trait;
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the response not read.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The request timed out.
    #[error("request timeout")]
    Timeout,

    /// The transport could not be built from its configuration.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),
}

impl TransportError {
    /// Whether the server rejected the caller's credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, TransportError::Status { status: 401 | 403, .. })
    }
}

/// Transport trait for the sync round trip.
///
/// Implementations handle the underlying mechanism and authentication
/// (HTTPS with a bearer token, mock, etc).
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` (JSON) to `path` and return the response body.
    ///
    /// Only a success status yields `Ok`. Nothing is retried.
    async fn post(&self, path: &str, body: &[u8]) -> Result<Vec<u8>, TransportError>;
}
