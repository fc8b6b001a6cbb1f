use crate::auth_service::topics::{LOGIN_USER, REGISTER_USER};
use crate::clients::ServiceClient;
use crate::model::{AuthReply, LoginRequest, RegisterRequest};
use rpc_bridge::{BusClient, ClientError};

/// Client for the `auth.*` topics.
///
/// Credential failures are not errors here: they come back as an
/// [`AuthReply`] with `context == false`.
#[derive(Clone)]
pub struct AuthClient {
    inner: BusClient,
}

impl AuthClient {
    pub fn new(inner: BusClient) -> Self {
        Self { inner }
    }

    pub async fn login(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<AuthReply, ClientError> {
        self.call(LOGIN_USER, &LoginRequest::new(email, password))
            .await
    }

    pub async fn register(
        &self,
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<AuthReply, ClientError> {
        self.call(REGISTER_USER, &RegisterRequest::new(username, email, password))
            .await
    }
}

impl ServiceClient for AuthClient {
    fn inner(&self) -> &BusClient {
        &self.inner
    }
}
