//! # Topic Handlers
//!
//! A [`TopicHandler`] is the business half of a topic: it receives a typed
//! request and returns a typed response. The router never sees those types.
//! It stores handlers as [`Route`] trait objects that take the raw `data`
//! value and produce an [`Outcome`].
//!
//! Handlers must assume concurrent invocation. The router may run any number
//! of calls of the same handler at once, so shared state belongs behind the
//! handler's own synchronization (usually a store capability).

use crate::envelope::{decode_payload, Outcome};
use crate::error::HandlerError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;
use tracing::debug;

/// Typed handler bound to one topic.
#[async_trait]
pub trait TopicHandler: Send + Sync + 'static {
    /// Shape of the envelope's `data` field.
    type Request: DeserializeOwned + Send + Debug;

    /// Value placed in the envelope's `response` field.
    type Response: Serialize + Send;

    async fn handle(&self, request: Self::Request) -> Result<Self::Response, HandlerError>;
}

/// Type-erased handler as stored by the router.
#[async_trait]
pub trait Route: Send + Sync + 'static {
    async fn dispatch(&self, data: Value) -> Outcome;
}

/// Adapter that erases a [`TopicHandler`] into a [`Route`].
pub struct Typed<H>(pub H);

#[async_trait]
impl<H: TopicHandler> Route for Typed<H> {
    async fn dispatch(&self, data: Value) -> Outcome {
        let request: H::Request = decode_payload(data)
            .map_err(|e| HandlerError::from(e).to_err_value())?;
        debug!(?request, "Decoded request");
        let response = self.0.handle(request).await.map_err(|e| e.to_err_value())?;
        serde_json::to_value(response).map_err(|e| HandlerError::failed(e).to_err_value())
    }
}

/// Handler built from an async closure. See [`handler_fn`].
pub struct FnHandler<F, Req, Res> {
    f: F,
    _types: PhantomData<fn(Req) -> Res>,
}

/// Builds a [`TopicHandler`] from an async closure.
///
/// ```rust
/// use rpc_bridge::handler::handler_fn;
/// use rpc_bridge::HandlerError;
///
/// let echo = handler_fn(|name: String| async move {
///     Ok::<_, HandlerError>(format!("hello {name}"))
/// });
/// # let _ = echo;
/// ```
pub fn handler_fn<F, Fut, Req, Res>(f: F) -> FnHandler<F, Req, Res>
where
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Res, HandlerError>> + Send,
    Req: DeserializeOwned + Send + Debug + 'static,
    Res: Serialize + Send + 'static,
{
    FnHandler {
        f,
        _types: PhantomData,
    }
}

#[async_trait]
impl<F, Fut, Req, Res> TopicHandler for FnHandler<F, Req, Res>
where
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Res, HandlerError>> + Send,
    Req: DeserializeOwned + Send + Debug + 'static,
    Res: Serialize + Send + 'static,
{
    type Request = Req;
    type Response = Res;

    async fn handle(&self, request: Req) -> Result<Res, HandlerError> {
        (self.f)(request).await
    }
}
