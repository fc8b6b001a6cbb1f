//! # Storage Capabilities
//!
//! The services never talk to a database client directly. They depend on two
//! capabilities:
//!
//! - [`CredentialStore`] - identity documents keyed by email.
//! - [`CustomerStore`] - rows of the `customers` table.
//!
//! Implementations are shared by every concurrent request without outside
//! locking, so each must be safe to call concurrently. The store, not the
//! service, is the authority on uniqueness: a duplicate key on insert must
//! surface as [`StoreError::Constraint`].
//!
//! [`memory`] provides the in-process implementations.

pub mod memory;
pub mod query;

pub use memory::{MemoryCredentialStore, MemoryCustomerStore};
pub use query::{Assignment, UpdateBuilder, UpdateStatement};

use crate::model::{Customer, Identity};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Failures of a storage call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The call did not finish within the configured window. Safe to retry.
    #[error("Storage call timed out after {0:?}")]
    Timeout(Duration),

    /// A uniqueness or schema constraint rejected the write.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// The backend could not be reached or failed internally.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Identity documents, keyed by email.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Exact-match lookup by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;

    /// Inserts a new identity. A duplicate email is a [`StoreError::Constraint`].
    async fn insert(&self, identity: Identity) -> Result<(), StoreError>;
}

/// Rows of the `customers` table.
#[async_trait]
pub trait CustomerStore: Send + Sync + 'static {
    /// Full scan in stable (key) order.
    async fn find_all(&self) -> Result<Vec<Customer>, StoreError>;

    async fn find_one(&self, customer_id: &str) -> Result<Option<Customer>, StoreError>;

    /// Inserts a row with the caller's key. A duplicate key is a [`StoreError::Constraint`].
    async fn insert(&self, customer: Customer) -> Result<(), StoreError>;

    /// Executes an update statement and returns the number of rows it matched.
    async fn update(&self, statement: &UpdateStatement) -> Result<u64, StoreError>;

    /// Deletes by key and returns the number of rows removed.
    async fn delete(&self, customer_id: &str) -> Result<u64, StoreError>;
}

/// Bounds a storage call by `window`. Running over is a [`StoreError::Timeout`].
pub async fn with_timeout<T, F>(window: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(window, call)
        .await
        .map_err(|_| StoreError::Timeout(window))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_passes_result_through() {
        let got = with_timeout(Duration::from_secs(1), async { Ok::<_, StoreError>(3) }).await;
        assert_eq!(got, Ok(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_reports_elapsed_window() {
        let window = Duration::from_secs(30);
        let got: Result<(), _> = with_timeout(window, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;
        assert_eq!(got, Err(StoreError::Timeout(window)));
    }
}
