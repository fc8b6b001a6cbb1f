use crate::auth_service::{self, AuthError, CredentialHasher, CredentialService, TokenIssuer};
use crate::clients::{AuthClient, CustomerClient};
use crate::config::BridgeConfig;
use crate::customer_service::{self, CustomerService};
use crate::store::{CredentialStore, CustomerStore, MemoryCredentialStore, MemoryCustomerStore};
use rpc_bridge::{BusClient, InMemoryBus, MessageBus, PatternRouter, RouterError, RouterHandle};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Failures while bringing the system up.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Invalid hashing configuration: {0}")]
    Hashing(#[from] AuthError),

    #[error("Router failed to start: {0}")]
    Router(#[from] RouterError),
}

/// The running bridge.
///
/// `BridgeSystem` is responsible for:
/// - **Dependency Wiring**: building both services on top of their stores
/// - **Routing**: binding every `auth.*` and `customers.*` topic on one router
/// - **Lifecycle Management**: serving until [`shutdown`](Self::shutdown)
///
/// It also hands out typed clients that talk to the router over the same bus,
/// exactly as a remote caller would.
///
/// # Example
///
/// ```ignore
/// let system = BridgeSystem::in_memory(&config).await?;
/// let reply = system.auth_client.login("a@b.com", "pw").await?;
/// system.shutdown().await;
/// ```
pub struct BridgeSystem {
    /// Client for the `auth.*` topics
    pub auth_client: AuthClient,

    /// Client for the `customers.*` topics
    pub customer_client: CustomerClient,

    router: RouterHandle,
}

impl BridgeSystem {
    /// Wires services over the given bus and stores and starts serving.
    ///
    /// Every topic is subscribed before this returns, so requests sent right
    /// afterwards are not lost.
    pub async fn new(
        config: &BridgeConfig,
        bus: Arc<dyn MessageBus>,
        credentials: Arc<dyn CredentialStore>,
        customers: Arc<dyn CustomerStore>,
    ) -> Result<Self, SystemError> {
        let hasher = CredentialHasher::new(config.hash_cost)?;
        let tokens = TokenIssuer::new(config.secret_key.as_bytes(), config.token_validity);
        let auth = CredentialService::new(credentials, hasher, tokens, config.store_timeout);
        let customer = CustomerService::new(customers, config.store_timeout);

        let mut router =
            PatternRouter::new(bus.clone()).with_max_in_flight(config.request_concurrency);
        auth_service::topics::register(&mut router, auth)?;
        customer_service::topics::register(&mut router, customer)?;
        let router = router.serve().await?;
        info!(topics = router.topics().len(), "Bridge serving");

        let client = BusClient::new(bus);
        Ok(Self {
            auth_client: AuthClient::new(client.clone()),
            customer_client: CustomerClient::new(client),
            router,
        })
    }

    /// Starts the system on an in-process bus with empty in-memory stores.
    pub async fn in_memory(config: &BridgeConfig) -> Result<Self, SystemError> {
        Self::new(
            config,
            Arc::new(InMemoryBus::new()),
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MemoryCustomerStore::new()),
        )
        .await
    }

    pub fn topics(&self) -> &[String] {
        self.router.topics()
    }

    /// Stops every topic listener. Requests already dispatched still finish
    /// on their own tasks.
    pub async fn shutdown(self) {
        info!("Shutting down bridge...");
        drop(self.auth_client);
        drop(self.customer_client);
        self.router.shutdown().await;
        info!("Bridge shutdown complete");
    }
}
