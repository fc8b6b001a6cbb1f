//! # Pattern Router
//!
//! The router maps topic names to handlers and turns bus messages into
//! handler calls.
//!
//! ## Lifecycle
//!
//! 1. **Register**: bind each topic to one handler with [`PatternRouter::register`].
//!    Binding the same topic twice is a configuration error.
//! 2. **Serve**: [`PatternRouter::serve`] subscribes every topic and spawns one
//!    listener task per topic.
//! 3. **Dispatch**: every message becomes its own Tokio task, so one slow or
//!    failing handler never holds up another request, for the same topic or any
//!    other. Each topic has its own semaphore bounding how many of its requests
//!    are in flight, so a saturated topic never delays delivery on another.
//! 4. **Reply**: each task owns a [`ReplyGuard`], so exactly one response
//!    envelope is published whatever happens inside the handler.

use crate::bus::{Message, MessageBus, Subscription};
use crate::envelope::decode_request;
use crate::error::RouterError;
use crate::handler::{Route, TopicHandler, Typed};
use crate::reply::{ReplyDispatcher, ReplyGuard};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};

/// Default bound on concurrently handled requests per topic.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 256;

/// Binds topics to handlers and serves them over a [`MessageBus`].
pub struct PatternRouter {
    bus: Arc<dyn MessageBus>,
    routes: BTreeMap<String, Arc<dyn Route>>,
    max_in_flight: usize,
}

impl PatternRouter {
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self {
            bus,
            routes: BTreeMap::new(),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Caps the number of requests handled at the same time on one topic
    /// (minimum 1).
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Binds a typed handler to `topic`.
    pub fn register<H: TopicHandler>(
        &mut self,
        topic: impl Into<String>,
        handler: H,
    ) -> Result<(), RouterError> {
        self.register_route(topic, Arc::new(Typed(handler)))
    }

    /// Binds an already type-erased route to `topic`.
    pub fn register_route(
        &mut self,
        topic: impl Into<String>,
        route: Arc<dyn Route>,
    ) -> Result<(), RouterError> {
        let topic = topic.into();
        if self.routes.contains_key(&topic) {
            return Err(RouterError::DuplicateTopic(topic));
        }
        debug!(%topic, "Registered");
        self.routes.insert(topic, route);
        Ok(())
    }

    /// Registered topics, in sorted order.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Subscribes every registered topic and starts dispatching.
    ///
    /// All subscriptions are made before any listener starts, so a bus failure
    /// leaves nothing half-served.
    pub async fn serve(self) -> Result<RouterHandle, RouterError> {
        let mut subscriptions = Vec::with_capacity(self.routes.len());
        for (topic, route) in self.routes {
            let subscription = self.bus.subscribe(&topic).await?;
            subscriptions.push((topic, route, subscription));
        }

        let dispatcher = ReplyDispatcher::new(self.bus.clone());
        let mut topics = Vec::with_capacity(subscriptions.len());
        let mut listeners = Vec::with_capacity(subscriptions.len());
        for (topic, route, subscription) in subscriptions {
            info!(%topic, "Listening");
            topics.push(topic.clone());
            listeners.push(tokio::spawn(listen(
                Arc::from(topic),
                subscription,
                route,
                dispatcher.clone(),
                Arc::new(Semaphore::new(self.max_in_flight)),
            )));
        }

        Ok(RouterHandle { topics, listeners })
    }
}

/// Running router. Dropping it leaves the listeners running; call
/// [`RouterHandle::shutdown`] to stop them.
pub struct RouterHandle {
    topics: Vec<String>,
    listeners: Vec<JoinHandle<()>>,
}

impl RouterHandle {
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Stops every topic listener. Requests already dispatched run to completion.
    pub async fn shutdown(self) {
        for listener in &self.listeners {
            listener.abort();
        }
        for listener in self.listeners {
            // Cancellation is the expected outcome here.
            if let Err(e) = listener.await {
                if e.is_panic() {
                    warn!(error = %e, "Listener panicked");
                }
            }
        }
        info!(topics = self.topics.len(), "Router stopped");
    }
}

async fn listen(
    topic: Arc<str>,
    mut subscription: Subscription,
    route: Arc<dyn Route>,
    dispatcher: ReplyDispatcher,
    permits: Arc<Semaphore>,
) {
    while let Some(message) = subscription.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let route = route.clone();
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            handle_message(message, route, dispatcher).await;
            drop(permit);
        });
    }
    info!(%topic, "Subscription closed");
}

async fn handle_message(
    message: Message,
    route: Arc<dyn Route>,
    dispatcher: ReplyDispatcher,
) {
    let envelope = match decode_request(&message.payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            let id = e.correlation_id().unwrap_or_default().to_string();
            warn!(topic = %message.subject, %id, error = %e, "Undecodable request");
            let outcome = Err(json!({ "error": e.to_string() }));
            dispatcher.reply(message.reply.as_deref(), &id, outcome).await;
            return;
        }
    };

    let span = info_span!("request", topic = %message.subject, id = %envelope.id);
    async move {
        let guard = ReplyGuard::new(dispatcher, message.reply, envelope.id);
        let outcome = route.dispatch(envelope.data).await;
        if let Err(err) = &outcome {
            warn!(%err, "Request failed");
        }
        guard.complete(outcome).await;
    }
    .instrument(span)
    .await
}
