use super::{AuthError, CredentialHasher, TokenIssuer};
use crate::model::{Identity, LoginRequest, RegisterRequest};
use crate::store::{with_timeout, CredentialStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Login and registration over a [`CredentialStore`].
///
/// Cloning is cheap; every clone shares the same store.
#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
    hasher: CredentialHasher,
    tokens: TokenIssuer,
    timeout: Duration,
}

impl CredentialService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: CredentialHasher,
        tokens: TokenIssuer,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            timeout,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Verifies the credential pair and returns a signed token for the email.
    ///
    /// An unknown email and a wrong password fail identically.
    pub async fn login(&self, request: LoginRequest) -> Result<String, AuthError> {
        let LoginRequest { email, password } = request;
        let identity = with_timeout(self.timeout, self.store.find_by_email(&email)).await?;

        let Some(identity) = identity else {
            debug!(%email, "Login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !self.hasher.verify(password, identity.password_hash).await? {
            debug!(%email, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&email)?;
        info!(%email, "Issued token");
        Ok(token)
    }

    /// Stores a new identity with a freshly hashed password.
    ///
    /// The existence check only exits early. Two concurrent registrations can
    /// both pass it, and the store's uniqueness constraint decides the winner.
    pub async fn register(&self, request: RegisterRequest) -> Result<(), AuthError> {
        let RegisterRequest {
            username,
            email,
            password,
        } = request;
        for (field, value) in [("username", &username), ("email", &email), ("password", &password)] {
            if value.is_empty() {
                return Err(AuthError::InvalidRequest(format!("{field} must not be empty")));
            }
        }

        if with_timeout(self.timeout, self.store.find_by_email(&email))
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateAccount(email));
        }

        let password_hash = self.hasher.hash(password).await?;
        let identity = Identity {
            username,
            email: email.clone(),
            password_hash,
        };
        match with_timeout(self.timeout, self.store.insert(identity)).await {
            Ok(()) => {
                info!(%email, "Registered identity");
                Ok(())
            }
            Err(StoreError::Constraint(reason)) => {
                warn!(%email, %reason, "Lost registration race");
                Err(AuthError::DuplicateAccount(email))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth_service::HashCost;
    use crate::store::MemoryCredentialStore;

    fn service(store: Arc<MemoryCredentialStore>) -> CredentialService {
        let hasher = CredentialHasher::new(HashCost {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let tokens = TokenIssuer::new(
            b"0123456789abcdef".to_vec(),
            Duration::from_secs(30 * 24 * 60 * 60),
        );
        CredentialService::new(store, hasher, tokens, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let svc = service(Arc::new(MemoryCredentialStore::new()));
        svc.register(RegisterRequest::new("alice", "a@b.com", "pw"))
            .await
            .unwrap();

        let token = svc.login(LoginRequest::new("a@b.com", "pw")).await.unwrap();
        assert_eq!(svc.tokens().verify(&token).unwrap().sub, "a@b.com");
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_look_the_same() {
        let svc = service(Arc::new(MemoryCredentialStore::new()));
        svc.register(RegisterRequest::new("alice", "a@b.com", "pw"))
            .await
            .unwrap();

        let wrong_password = svc
            .login(LoginRequest::new("a@b.com", "wrong"))
            .await
            .unwrap_err();
        let unknown = svc
            .login(LoginRequest::new("nobody@b.com", "pw"))
            .await
            .unwrap_err();
        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(wrong_password.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_password_is_never_stored_in_plaintext() {
        let store = Arc::new(MemoryCredentialStore::new());
        let svc = service(store.clone());
        svc.register(RegisterRequest::new("alice", "a@b.com", "hunter2"))
            .await
            .unwrap();

        let stored = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "hunter2");
        assert!(stored.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_empty_fields_are_rejected() {
        let store = Arc::new(MemoryCredentialStore::new());
        let svc = service(store.clone());
        let err = svc
            .register(RegisterRequest::new("alice", "", "pw"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::InvalidRequest("email must not be empty".into())
        );
        assert!(store.is_empty());
    }
}
