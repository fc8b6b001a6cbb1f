//! # Reply Dispatcher
//!
//! Every inbound request gets exactly one reply, on every code path. The
//! [`ReplyDispatcher`] publishes a reply. The [`ReplyGuard`] makes sure a reply
//! goes out exactly once:
//!
//! - [`ReplyGuard::complete`] consumes the guard, so a second reply through the
//!   same guard does not compile.
//! - If the guard is dropped without being completed (the handler panicked, or
//!   the task was cancelled), its `Drop` impl publishes an error reply instead.

use crate::bus::MessageBus;
use crate::envelope::{encode_response, Outcome};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Publishes response envelopes on the bus.
#[derive(Clone)]
pub struct ReplyDispatcher {
    bus: Arc<dyn MessageBus>,
}

impl ReplyDispatcher {
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self { bus }
    }

    /// Publishes one response envelope for `id` on `reply_to`.
    ///
    /// A missing reply subject or a failed publish is logged and swallowed:
    /// the caller is gone and there is nobody left to tell.
    pub async fn reply(&self, reply_to: Option<&str>, id: &str, outcome: Outcome) {
        let Some(subject) = reply_to else {
            warn!(id, "Request carried no reply subject, reply dropped");
            return;
        };
        let ok = outcome.is_ok();
        let payload = encode_response(id, &outcome);
        match self.bus.publish(subject, None, payload).await {
            Ok(()) => debug!(id, subject, ok, "Replied"),
            Err(e) => warn!(id, subject, error = %e, "Reply publish failed"),
        }
    }
}

/// Scoped completion guard for one request.
#[must_use = "a ReplyGuard must be completed or it replies with an error on drop"]
pub struct ReplyGuard {
    dispatcher: ReplyDispatcher,
    reply_to: Option<String>,
    id: String,
    armed: bool,
}

impl ReplyGuard {
    pub fn new(dispatcher: ReplyDispatcher, reply_to: Option<String>, id: impl Into<String>) -> Self {
        Self {
            dispatcher,
            reply_to,
            id: id.into(),
            armed: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sends the final reply and disarms the guard.
    pub async fn complete(mut self, outcome: Outcome) {
        self.armed = false;
        let reply_to = self.reply_to.take();
        let id = std::mem::take(&mut self.id);
        self.dispatcher.reply(reply_to.as_deref(), &id, outcome).await;
    }
}

impl Drop for ReplyGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        error!(id = %self.id, "Handler ended without replying");
        let outcome: Outcome = Err(json!({ "error": "Internal error while handling request" }));
        let dispatcher = self.dispatcher.clone();
        let reply_to = self.reply_to.take();
        let id = std::mem::take(&mut self.id);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    dispatcher.reply(reply_to.as_deref(), &id, outcome).await;
                });
            }
            Err(_) => error!(id, "No runtime available, error reply lost"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::InMemoryBus;
    use crate::envelope::ResponseEnvelope;

    async fn inbox(bus: &InMemoryBus) -> (String, crate::bus::Subscription) {
        let subject = bus.new_inbox();
        let sub = bus.subscribe(&subject).await.unwrap();
        (subject, sub)
    }

    #[tokio::test]
    async fn test_complete_sends_exactly_one_reply() {
        let bus = InMemoryBus::new();
        let (subject, mut sub) = inbox(&bus).await;
        let guard = ReplyGuard::new(
            ReplyDispatcher::new(Arc::new(bus.clone())),
            Some(subject),
            "req-1",
        );

        guard.complete(Ok(json!({"ok": true}))).await;

        let msg = sub.recv().await.unwrap();
        let envelope: ResponseEnvelope = serde_json::from_slice(&msg.payload).unwrap();
        assert_eq!(envelope.id, "req-1");
        assert_eq!(envelope.response, json!({"ok": true}));

        // Nothing else arrives, not even from the guard's Drop.
        tokio::task::yield_now().await;
        assert!(sub.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dropped_guard_sends_error_reply() {
        let bus = InMemoryBus::new();
        let (subject, mut sub) = inbox(&bus).await;
        let guard = ReplyGuard::new(
            ReplyDispatcher::new(Arc::new(bus.clone())),
            Some(subject),
            "req-2",
        );
        drop(guard);

        let msg = sub.recv().await.unwrap();
        let envelope: ResponseEnvelope = serde_json::from_slice(&msg.payload).unwrap();
        assert_eq!(envelope.id, "req-2");
        assert!(envelope.response.is_null());
        assert!(envelope.err["error"].is_string());
    }

    #[tokio::test]
    async fn test_reply_without_subject_is_a_no_op() {
        let bus = InMemoryBus::new();
        let dispatcher = ReplyDispatcher::new(Arc::new(bus));
        dispatcher.reply(None, "req-3", Ok(json!(1))).await;
    }
}
