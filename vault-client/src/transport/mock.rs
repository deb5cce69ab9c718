//! Mock transport for testing.
//!
//! Allows queueing responses and capturing sent requests for verification.

use super::{Transport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// A request captured by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRequest {
    /// Path the body was posted to.
    pub path: String,
    /// Raw request body.
    pub body: Vec<u8>,
}

/// Mock transport for testing.
///
/// Allows queueing responses and capturing sent requests for verification.
/// Clones share state.
#[derive(Debug, Default, Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    sent: Vec<SentRequest>,
    responses: VecDeque<Vec<u8>>,
    fail_next: Option<TransportError>,
    delay_next: Option<Duration>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only happens if a test already panicked.
    fn lock(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a body to be returned by the next `post()` call.
    pub fn queue_response(&self, body: Vec<u8>) {
        self.lock().responses.push_back(body);
    }

    /// Get all requests that were sent.
    pub fn sent_requests(&self) -> Vec<SentRequest> {
        self.lock().sent.clone()
    }

    /// Get the last request that was sent.
    pub fn last_sent(&self) -> Option<SentRequest> {
        self.lock().sent.last().cloned()
    }

    /// Cause the next `post()` to fail with the given error.
    pub fn fail_next(&self, error: TransportError) {
        self.lock().fail_next = Some(error);
    }

    /// Delay the next `post()` before it answers.
    pub fn delay_next(&self, delay: Duration) {
        self.lock().delay_next = Some(delay);
    }

    /// Clear all state (requests, queue, forced failures).
    pub fn reset(&self) {
        *self.lock() = MockTransportInner::default();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, path: &str, body: &[u8]) -> Result<Vec<u8>, TransportError> {
        let delay = {
            let mut inner = self.lock();
            inner.sent.push(SentRequest {
                path: path.to_string(),
                body: body.to_vec(),
            });
            inner.delay_next.take()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.lock();

        // Check for forced failure
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }

        inner
            .responses
            .pop_front()
            .ok_or_else(|| TransportError::Request("no queued response".into()))
    }
}
