//! Bus bindings for the credential service.
//!
//! Both topics answer in-band: every outcome, including failures, is an
//! [`AuthReply`] in the envelope's `response` field with `context` as the
//! success flag. Only undecodable payloads produce an `err` envelope.

use super::{AuthError, CredentialService};
use crate::model::{AuthReply, LoginRequest, RegisterRequest};
use async_trait::async_trait;
use rpc_bridge::{HandlerError, PatternRouter, RouterError, TopicHandler};
use tracing::warn;

pub const LOGIN_USER: &str = "auth.loginUser";
pub const REGISTER_USER: &str = "auth.registerUser";

/// Success message of `auth.registerUser`.
pub const CREATED_MESSAGE: &str = "Created the new user";

fn failure(err: AuthError) -> AuthReply {
    if matches!(err, AuthError::Storage(_) | AuthError::Hashing(_) | AuthError::Token(_)) {
        warn!(error = %err, "Credential request failed");
    }
    AuthReply::failure(err.to_string())
}

pub struct LoginUser(pub CredentialService);

#[async_trait]
impl TopicHandler for LoginUser {
    type Request = LoginRequest;
    type Response = AuthReply;

    async fn handle(&self, request: LoginRequest) -> Result<AuthReply, HandlerError> {
        Ok(match self.0.login(request).await {
            Ok(token) => AuthReply::success(token),
            Err(e) => failure(e),
        })
    }
}

pub struct RegisterUser(pub CredentialService);

#[async_trait]
impl TopicHandler for RegisterUser {
    type Request = RegisterRequest;
    type Response = AuthReply;

    async fn handle(&self, request: RegisterRequest) -> Result<AuthReply, HandlerError> {
        Ok(match self.0.register(request).await {
            Ok(()) => AuthReply::success(CREATED_MESSAGE),
            Err(e) => failure(e),
        })
    }
}

/// Binds both auth topics on `router`.
pub fn register(router: &mut PatternRouter, service: CredentialService) -> Result<(), RouterError> {
    router.register(LOGIN_USER, LoginUser(service.clone()))?;
    router.register(REGISTER_USER, RegisterUser(service))
}
