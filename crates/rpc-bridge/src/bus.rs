//! # Message Bus
//!
//! The bridge only needs three primitives from a publish-subscribe bus: publish
//! a payload (optionally naming a reply subject), subscribe to a subject, and
//! mint a unique reply inbox. [`MessageBus`] captures exactly that, so the
//! router and the client never depend on a concrete bus client.
//!
//! [`InMemoryBus`] is the in-process implementation used by the demo binary and
//! by tests. Delivery is at-most-once: publishing to a subject nobody listens
//! on is silently dropped, the same way a real bus drops a reply to a vanished
//! inbox.

use crate::error::BusError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::trace;

/// Capacity of each subscription queue.
pub const SUBSCRIPTION_BUFFER: usize = 256;

/// A message as delivered to a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub subject: String,
    /// Where the receiver should publish its answer, if anywhere.
    pub reply: Option<String>,
    pub payload: Vec<u8>,
}

/// Receiving end of a subscription. Closed when the bus drops the subject.
pub type Subscription = mpsc::Receiver<Message>;

/// Publish/subscribe primitives the bridge is built on.
#[async_trait]
pub trait MessageBus: Send + Sync + 'static {
    /// Publishes `payload` on `subject`, asking receivers to answer on `reply`.
    async fn publish(
        &self,
        subject: &str,
        reply: Option<&str>,
        payload: Vec<u8>,
    ) -> Result<(), BusError>;

    /// Starts receiving every message published on `subject`.
    async fn subscribe(&self, subject: &str) -> Result<Subscription, BusError>;

    /// Returns a subject name no other caller will be handed.
    fn new_inbox(&self) -> String;
}

/// In-process bus with per-subject fan-out over tokio channels.
///
/// Cheap to clone; clones share the same subscriptions.
#[derive(Clone, Default)]
pub struct InMemoryBus {
    subjects: Arc<Mutex<HashMap<String, Vec<mpsc::Sender<Message>>>>>,
    next_inbox: Arc<AtomicU64>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every subscription, closing all subscriber queues.
    pub fn close(&self) {
        if let Ok(mut subjects) = self.subjects.lock() {
            subjects.clear();
        }
    }

    fn senders(&self, subject: &str) -> Result<Vec<mpsc::Sender<Message>>, BusError> {
        let mut subjects = self.subjects.lock().map_err(|_| BusError::Closed)?;
        let Some(senders) = subjects.get_mut(subject) else {
            return Ok(Vec::new());
        };
        senders.retain(|s| !s.is_closed());
        Ok(senders.clone())
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn publish(
        &self,
        subject: &str,
        reply: Option<&str>,
        payload: Vec<u8>,
    ) -> Result<(), BusError> {
        let senders = self.senders(subject)?;
        if senders.is_empty() {
            trace!(subject, "No subscribers, message dropped");
            return Ok(());
        }
        let message = Message {
            subject: subject.to_string(),
            reply: reply.map(str::to_string),
            payload,
        };
        for sender in senders {
            // A subscriber that went away in the meantime is not an error.
            if sender.send(message.clone()).await.is_err() {
                trace!(subject, "Subscriber closed during publish");
            }
        }
        Ok(())
    }

    async fn subscribe(&self, subject: &str) -> Result<Subscription, BusError> {
        let (sender, receiver) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let mut subjects = self.subjects.lock().map_err(|_| BusError::Subscribe {
            subject: subject.to_string(),
            reason: "subscription table poisoned".to_string(),
        })?;
        subjects.entry(subject.to_string()).or_default().push(sender);
        Ok(receiver)
    }

    fn new_inbox(&self) -> String {
        let n = self.next_inbox.fetch_add(1, Ordering::Relaxed);
        format!("_INBOX.{n}")
    }
}
