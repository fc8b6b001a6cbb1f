//! # RPC Bridge
//!
//! This crate lets services that speak a client-proxy RPC convention call
//! handlers registered on publish-subscribe topics. The caller sends
//! `{id, pattern, data}` on a topic and waits on a private inbox. The bridge
//! decodes the envelope, runs the handler bound to that topic, and publishes
//! `{response, id, isDisposed, err}` back to the inbox.
//!
//! ## 🏗️ Layers
//!
//! 1. **Transport** ([`bus`]) - the [`MessageBus`] capability and the in-process
//!    [`InMemoryBus`].
//! 2. **Wire format** ([`envelope`]) - decoding requests, encoding replies.
//! 3. **Dispatch** ([`router`], [`handler`], [`reply`]) - topic routing,
//!    per-request tasks, and the exactly-once reply guard.
//! 4. **Caller side** ([`client`]) - [`BusClient`], the request half of the convention.
//!
//! ## 🚀 Quick Start
//!
//! ```rust
//! use rpc_bridge::{handler_fn, BusClient, HandlerError, InMemoryBus, PatternRouter};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = Arc::new(InMemoryBus::new());
//!
//!     // 1. Register
//!     let mut router = PatternRouter::new(bus.clone());
//!     router.register(
//!         "greeter.hello",
//!         handler_fn(|name: String| async move { Ok::<_, HandlerError>(format!("hello {name}")) }),
//!     )?;
//!
//!     // 2. Serve
//!     let handle = router.serve().await?;
//!
//!     // 3. Call
//!     let client = BusClient::new(bus);
//!     let reply = client.send("greeter.hello", json!("alice")).await?;
//!     assert_eq!(reply, json!("hello alice"));
//!
//!     handle.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - One listener task per topic.
//! - One task per inbound message, on the multi-threaded Tokio runtime.
//! - No ordering between requests, even on the same topic.
//! - A per-topic semaphore bounds the number of requests in flight, so a
//!   saturated topic never holds up another.
//! - The client timeout covers publishing as well as waiting for the reply.
//!
//! ## Error Model
//!
//! Per-request failures never escape the request's task. Decode errors,
//! handler errors and handler panics all become a reply with `err` set.
//! Only configuration problems (duplicate topics, failed subscriptions)
//! surface as [`RouterError`].
//!
//! ## Testing
//!
//! See [`mock`] for a scripted [`Route`](handler::Route) and a raw-bytes sender.

pub mod bus;
pub mod client;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod mock;
pub mod reply;
pub mod router;
pub mod tracing;

// Re-export core types for convenience
pub use bus::{InMemoryBus, Message, MessageBus, Subscription};
pub use client::BusClient;
pub use envelope::{decode_request, encode_response, Outcome, RequestEnvelope, ResponseEnvelope};
pub use error::{BusError, ClientError, DecodeError, HandlerError, RouterError};
pub use handler::{handler_fn, Route, TopicHandler};
pub use reply::{ReplyDispatcher, ReplyGuard};
pub use router::{PatternRouter, RouterHandle};
