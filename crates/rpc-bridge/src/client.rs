//! # Request Client
//!
//! Caller side of the convention. [`BusClient::send`] does what a client proxy
//! does: it picks a correlation id, opens a private reply inbox, publishes the
//! request envelope, and waits a bounded time for the single reply.

use crate::bus::MessageBus;
use crate::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::error::ClientError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// How long [`BusClient`] waits for a reply unless told otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A cloneable request/response client over a [`MessageBus`].
#[derive(Clone)]
pub struct BusClient {
    bus: Arc<dyn MessageBus>,
    timeout: Duration,
    next_id: Arc<AtomicU64>,
}

impl BusClient {
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self {
            bus,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sends `data` to `pattern` and returns the `response` value.
    ///
    /// A populated `err` field comes back as [`ClientError::Remote`].
    #[instrument(skip(self, data))]
    pub async fn send(&self, pattern: &str, data: Value) -> Result<Value, ClientError> {
        let id = format!("req-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        self.send_with_id(pattern, &id, data).await
    }

    /// Like [`send`](Self::send) with a caller-chosen correlation id.
    pub async fn send_with_id(
        &self,
        pattern: &str,
        id: &str,
        data: Value,
    ) -> Result<Value, ClientError> {
        let inbox = self.bus.new_inbox();
        let request = RequestEnvelope::new(id, pattern, data);

        // The window covers the publish too: a backed-up subscriber queue
        // must not hold the caller past its timeout.
        let exchange = async {
            let mut replies = self.bus.subscribe(&inbox).await?;
            debug!(id, inbox = %inbox, "Sending request");
            self.bus
                .publish(pattern, Some(&inbox), request.to_bytes())
                .await?;
            replies.recv().await.ok_or(ClientError::Timeout(self.timeout))
        };
        let message = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))??;

        let envelope: ResponseEnvelope = serde_json::from_slice(&message.payload)
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        if envelope.id != id {
            return Err(ClientError::CorrelationMismatch {
                expected: id.to_string(),
                actual: envelope.id,
            });
        }
        envelope.into_outcome().map_err(ClientError::Remote)
    }

    /// Typed convenience over [`send`](Self::send).
    pub async fn request<Req, Res>(&self, pattern: &str, request: &Req) -> Result<Res, ClientError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let data = serde_json::to_value(request).map_err(|e| ClientError::Decode(e.to_string()))?;
        let response = self.send(pattern, data).await?;
        serde_json::from_value(response).map_err(|e| ClientError::Decode(e.to_string()))
    }
}
