use async_trait::async_trait;
use rpc_bridge::{BusClient, ClientError};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Shared plumbing for per-domain bus clients.
///
/// Implementors only expose their [`BusClient`]; typed calls go through
/// [`call`](ServiceClient::call).
#[async_trait]
pub trait ServiceClient: Send + Sync {
    /// Access the inner generic BusClient.
    fn inner(&self) -> &BusClient;

    /// Sends `request` to `pattern` and decodes the `response` field.
    #[tracing::instrument(skip(self, request))]
    async fn call<Req, Res>(&self, pattern: &str, request: &Req) -> Result<Res, ClientError>
    where
        Req: Serialize + Sync + ?Sized,
        Res: DeserializeOwned + Send,
    {
        tracing::debug!("Sending request");
        self.inner().request(pattern, request).await
    }
}
