//! # Bridge Errors
//!
//! This module defines the error types shared by the codec, the bus, the router
//! and the request client. Domain crates convert their own errors into
//! [`HandlerError`] at the handler boundary.

use std::time::Duration;

/// A request envelope or its payload could not be decoded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The raw bytes are not a well-formed `{id, pattern, data}` envelope.
    ///
    /// `id` holds the correlation id when it could still be read from the bytes.
    #[error("Malformed request envelope: {reason}")]
    Envelope { reason: String, id: Option<String> },
    /// The envelope is fine but `data` does not match what the handler expects.
    #[error("Payload does not match the expected shape: {0}")]
    Payload(String),
}

impl DecodeError {
    /// The correlation id recovered from the raw message, if any.
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            DecodeError::Envelope { id, .. } => id.as_deref(),
            DecodeError::Payload(_) => None,
        }
    }
}

/// Errors raised by a [`MessageBus`](crate::bus::MessageBus) implementation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BusError {
    #[error("Bus connection closed")]
    Closed,
    #[error("Publish to {subject} failed: {reason}")]
    Publish { subject: String, reason: String },
    #[error("Subscribe to {subject} failed: {reason}")]
    Subscribe { subject: String, reason: String },
}

/// Configuration and startup errors of the [`PatternRouter`](crate::router::PatternRouter).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouterError {
    #[error("A handler is already registered for topic {0}")]
    DuplicateTopic(String),
    #[error(transparent)]
    Bus(#[from] BusError),
}

/// Per-request failure produced inside a handler.
///
/// Every variant ends up in the `err` field of the response envelope as
/// `{"error": "<message>"}`; none of them escapes the handling task.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    /// Wraps any displayable domain error.
    pub fn failed(err: impl std::fmt::Display) -> Self {
        HandlerError::Failed(err.to_string())
    }

    /// Renders the error as the `err` value of a response envelope.
    pub fn to_err_value(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.to_string() })
    }
}

/// Errors seen by the caller side ([`BusClient`](crate::client::BusClient)).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Bus(#[from] BusError),
    #[error("No reply within {0:?}")]
    Timeout(Duration),
    #[error("Remote handler failed: {0}")]
    Remote(serde_json::Value),
    #[error("Undecodable reply: {0}")]
    Decode(String),
    #[error("Reply correlation id mismatch: expected {expected}, got {actual}")]
    CorrelationMismatch { expected: String, actual: String },
}

impl ClientError {
    /// The `error` message carried by a remote failure, when present.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            ClientError::Remote(value) => value.get("error").and_then(|v| v.as_str()),
            _ => None,
        }
    }
}
