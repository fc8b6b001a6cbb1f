//! In-process implementations of the storage capabilities.
//!
//! Both stores keep their data behind a `RwLock` and enforce key uniqueness on
//! insert, which is what the services rely on when two registrations of the
//! same email race. An optional artificial latency exercises the timeout path.

use super::{CredentialStore, CustomerStore, StoreError, UpdateStatement};
use crate::model::{Customer, Identity};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::Duration;
use tracing::debug;

const CUSTOMERS_TABLE: &str = "customers";
const CUSTOMERS_KEY: &str = "customer_id";

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("store lock poisoned".to_string())
}

async fn simulate(latency: Option<Duration>) {
    if let Some(latency) = latency {
        tokio::time::sleep(latency).await;
    }
}

/// Identity documents in a hash map keyed by email.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<String, Identity>>,
    latency: Option<Duration>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn len(&self) -> usize {
        self.users.read().map(|u| u.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        simulate(self.latency).await;
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(email).cloned())
    }

    async fn insert(&self, identity: Identity) -> Result<(), StoreError> {
        simulate(self.latency).await;
        let mut users = self.users.write().map_err(poisoned)?;
        if users.contains_key(&identity.email) {
            return Err(StoreError::Constraint(format!(
                "duplicate key: email {}",
                identity.email
            )));
        }
        debug!(email = %identity.email, "Inserted identity");
        users.insert(identity.email.clone(), identity);
        Ok(())
    }
}

/// The `customers` table as an ordered map keyed by `customer_id`.
#[derive(Default)]
pub struct MemoryCustomerStore {
    rows: RwLock<BTreeMap<String, Customer>>,
    latency: Option<Duration>,
}

impl MemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

#[async_trait]
impl CustomerStore for MemoryCustomerStore {
    async fn find_all(&self) -> Result<Vec<Customer>, StoreError> {
        simulate(self.latency).await;
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.values().cloned().collect())
    }

    async fn find_one(&self, customer_id: &str) -> Result<Option<Customer>, StoreError> {
        simulate(self.latency).await;
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.get(customer_id).cloned())
    }

    async fn insert(&self, customer: Customer) -> Result<(), StoreError> {
        simulate(self.latency).await;
        let mut rows = self.rows.write().map_err(poisoned)?;
        if rows.contains_key(&customer.customer_id) {
            return Err(StoreError::Constraint(format!(
                "duplicate key: customer_id {}",
                customer.customer_id
            )));
        }
        rows.insert(customer.customer_id.clone(), customer);
        Ok(())
    }

    async fn update(&self, statement: &UpdateStatement) -> Result<u64, StoreError> {
        simulate(self.latency).await;
        if statement.table != CUSTOMERS_TABLE || statement.key_column != CUSTOMERS_KEY {
            return Err(StoreError::Constraint(format!(
                "unsupported update target {}.{}",
                statement.table, statement.key_column
            )));
        }
        let mut rows = self.rows.write().map_err(poisoned)?;
        let Some(row) = rows.get_mut(&statement.key_value) else {
            return Ok(0);
        };
        // Validate every column before touching the row so a bad statement
        // leaves it unchanged.
        let mut updated = row.clone();
        for assignment in &statement.assignments {
            if !updated.set_column(assignment.column, &assignment.value) {
                return Err(StoreError::Constraint(format!(
                    "unknown column {}",
                    assignment.column
                )));
            }
        }
        *row = updated;
        Ok(1)
    }

    async fn delete(&self, customer_id: &str) -> Result<u64, StoreError> {
        simulate(self.latency).await;
        let mut rows = self.rows.write().map_err(poisoned)?;
        Ok(u64::from(rows.remove(customer_id).is_some()))
    }
}
