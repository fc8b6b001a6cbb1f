//! # Envelope Codec
//!
//! Callers speak a client-proxy convention: every request is wrapped as
//! `{"id", "pattern", "data"}` and every reply must come back as
//! `{"response", "id", "isDisposed", "err"}`.
//!
//! - The `id` is opaque and caller-assigned. It is copied verbatim into the
//!   reply, including the empty string.
//! - `isDisposed` is always `true`: one request, one reply, no streaming.
//! - `response` and `err` are both always present. The unused one is `null`.

use crate::error::DecodeError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An inbound request as sent by the caller.
///
/// `pattern` is informational only; routing uses the subscribed topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub data: Value,
}

impl RequestEnvelope {
    pub fn new(id: impl Into<String>, pattern: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            pattern: pattern.into(),
            data,
        }
    }

    /// Serializes the envelope for publication.
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::json!({
            "id": self.id,
            "pattern": self.pattern,
            "data": self.data,
        })
        .to_string()
        .into_bytes()
    }
}

/// The reply envelope, as read back by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub response: Value,
    pub id: String,
    pub is_disposed: bool,
    pub err: Value,
}

impl ResponseEnvelope {
    /// Splits the envelope into the caller-visible outcome.
    pub fn into_outcome(self) -> Outcome {
        if self.err.is_null() {
            Ok(self.response)
        } else {
            Err(self.err)
        }
    }
}

/// The result of one request: `Ok` fills `response`, `Err` fills `err`.
pub type Outcome = Result<Value, Value>;

/// Decodes raw bytes into a [`RequestEnvelope`].
///
/// When the bytes are not a valid envelope, the returned error still carries the
/// correlation id if one can be read, so the caller can be answered.
pub fn decode_request(raw: &[u8]) -> Result<RequestEnvelope, DecodeError> {
    serde_json::from_slice::<RequestEnvelope>(raw).map_err(|e| DecodeError::Envelope {
        reason: e.to_string(),
        id: recover_id(raw),
    })
}

fn recover_id(raw: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(raw).ok()?;
    value.get("id")?.as_str().map(str::to_owned)
}

/// Decodes the `data` field into the shape a handler expects.
pub fn decode_payload<T: DeserializeOwned>(data: Value) -> Result<T, DecodeError> {
    serde_json::from_value(data).map_err(|e| DecodeError::Payload(e.to_string()))
}

/// Encodes a reply envelope. Never fails: both payloads are already JSON values.
pub fn encode_response(id: &str, outcome: &Outcome) -> Vec<u8> {
    let (response, err) = match outcome {
        Ok(response) => (response.clone(), Value::Null),
        Err(err) => (Value::Null, err.clone()),
    };
    serde_json::json!({
        "response": response,
        "id": id,
        "isDisposed": true,
        "err": err,
    })
    .to_string()
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_request_reads_all_fields() {
        let raw = br#"{"id":"abc-1","pattern":"auth.loginUser","data":{"email":"a@b.com"}}"#;
        let envelope = decode_request(raw).unwrap();
        assert_eq!(envelope.id, "abc-1");
        assert_eq!(envelope.pattern, "auth.loginUser");
        assert_eq!(envelope.data, json!({"email": "a@b.com"}));
    }

    #[test]
    fn test_decode_request_accepts_missing_fields() {
        let envelope = decode_request(br#"{"data":""}"#).unwrap();
        assert_eq!(envelope.id, "");
        assert_eq!(envelope.data, json!(""));
    }

    #[test]
    fn test_decode_request_recovers_id_from_bad_envelope() {
        // `pattern` has the wrong type, but the id is still readable
        let err = decode_request(br#"{"id":"req-7","pattern":42}"#).unwrap_err();
        assert_eq!(err.correlation_id(), Some("req-7"));
    }

    #[test]
    fn test_decode_request_garbage_has_no_id() {
        let err = decode_request(b"not json at all").unwrap_err();
        assert!(matches!(err, DecodeError::Envelope { id: None, .. }));
    }

    #[test]
    fn test_encode_response_keeps_both_fields_present() {
        let bytes = encode_response("", &Ok(json!("token")));
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            json!({"response": "token", "id": "", "isDisposed": true, "err": null})
        );

        let bytes = encode_response("x", &Err(json!({"error": "boom"})));
        let envelope: ResponseEnvelope = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(envelope.response, Value::Null);
        assert!(envelope.is_disposed);
        assert_eq!(envelope.into_outcome(), Err(json!({"error": "boom"})));
    }

    #[test]
    fn test_decode_payload_reports_shape_mismatch() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Login {
            email: String,
        }
        let err = decode_payload::<Login>(json!({"mail": 1})).unwrap_err();
        assert!(matches!(err, DecodeError::Payload(_)));
    }
}
