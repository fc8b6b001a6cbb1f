//! # Mock Framework
//!
//! Utilities for testing topic wiring without real domain services.
//!
//! [`MockHandler`] is a [`Route`] that answers from a queue of expectations.
//! Each call pops the next expectation and replies with its canned outcome.
//! A call with no expectation left panics inside the handler task, which also
//! exercises the router's panic path: the caller still gets an error envelope.
//!
//! ```rust,ignore
//! let mut mock = MockHandler::new();
//! mock.expect_request().return_ok(json!({"message": "ok", "context": true}));
//! mock.expect_request().return_err(json!({"error": "boom"}));
//!
//! router.register_route("auth.loginUser", mock.route())?;
//! // ... drive requests ...
//! mock.verify(); // every expectation was consumed
//! ```
//!
//! [`send_raw`] pushes arbitrary bytes at a topic and hands back the reply
//! inbox, for tests that need to send malformed envelopes.

use crate::bus::{MessageBus, Subscription};
use crate::envelope::Outcome;
use crate::error::BusError;
use crate::handler::Route;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

struct Expectation {
    response: Outcome,
}

#[derive(Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    received: Vec<Value>,
}

/// A route with scripted replies and call recording.
#[derive(Clone, Default)]
pub struct MockHandler {
    state: Arc<Mutex<MockState>>,
}

impl MockHandler {
    /// Creates a mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mock as a router-ready route. Clones share state.
    pub fn route(&self) -> Arc<dyn Route> {
        Arc::new(self.clone())
    }

    /// Queues an expectation for the next request.
    pub fn expect_request(&mut self) -> RequestExpectationBuilder {
        RequestExpectationBuilder {
            state: self.state.clone(),
        }
    }

    /// The `data` payloads received so far, in arrival order.
    pub fn received(&self) -> Vec<Value> {
        self.state.lock().unwrap().received.clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let state = self.state.lock().unwrap();
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }
}

#[async_trait]
impl Route for MockHandler {
    async fn dispatch(&self, data: Value) -> Outcome {
        let expectation = {
            let mut state = self.state.lock().unwrap();
            state.received.push(data);
            state.expectations.pop_front()
        };
        match expectation {
            Some(expectation) => expectation.response,
            None => panic!("Unexpected request: no expectation left"),
        }
    }
}

/// Builder for request expectations.
pub struct RequestExpectationBuilder {
    state: Arc<Mutex<MockState>>,
}

impl RequestExpectationBuilder {
    /// Replies with `value` in the `response` field.
    pub fn return_ok(self, value: Value) {
        self.push(Ok(value));
    }

    /// Replies with `value` in the `err` field.
    pub fn return_err(self, value: Value) {
        self.push(Err(value));
    }

    fn push(self, response: Outcome) {
        let mut state = self.state.lock().unwrap();
        state.expectations.push_back(Expectation { response });
    }
}

/// Publishes raw bytes on `topic` with a fresh reply inbox and returns the
/// subscription on which replies will arrive.
pub async fn send_raw(
    bus: &dyn MessageBus,
    topic: &str,
    payload: Vec<u8>,
) -> Result<Subscription, BusError> {
    let inbox = bus.new_inbox();
    let replies = bus.subscribe(&inbox).await?;
    bus.publish(topic, Some(&inbox), payload).await?;
    Ok(replies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_handler_replays_expectations_in_order() {
        let mut mock = MockHandler::new();
        mock.expect_request().return_ok(json!(1));
        mock.expect_request().return_err(json!({"error": "two"}));

        let route = mock.route();
        assert_eq!(route.dispatch(json!("a")).await, Ok(json!(1)));
        assert_eq!(route.dispatch(json!("b")).await, Err(json!({"error": "two"})));

        assert_eq!(mock.received(), vec![json!("a"), json!("b")]);
        mock.verify();
    }

    #[test]
    #[should_panic(expected = "Not all expectations were met")]
    fn test_verify_panics_on_leftovers() {
        let mut mock = MockHandler::new();
        mock.expect_request().return_ok(Value::Null);
        mock.verify();
    }
}
