use super::CustomerError;
use crate::model::{Customer, CustomerUpdate};
use crate::store::{with_timeout, CustomerStore, UpdateBuilder};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const TABLE: &str = "customers";
const KEY: &str = "customer_id";

/// CRUD over a [`CustomerStore`], every call bounded by one timeout window.
#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn CustomerStore>,
    timeout: Duration,
}

impl CustomerService {
    pub fn new(store: Arc<dyn CustomerStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// All rows in key order. No rows is an empty list.
    pub async fn list(&self) -> Result<Vec<Customer>, CustomerError> {
        Ok(with_timeout(self.timeout, self.store.find_all()).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Customer, CustomerError> {
        with_timeout(self.timeout, self.store.find_one(id))
            .await?
            .ok_or_else(|| CustomerError::NotFound(id.to_string()))
    }

    /// Inserts under the caller's id. A taken id is a storage constraint error.
    pub async fn create(&self, customer: Customer) -> Result<Customer, CustomerError> {
        if customer.customer_id.is_empty() {
            return Err(CustomerError::InvalidPayload(
                "customer_id must not be empty".into(),
            ));
        }
        with_timeout(self.timeout, self.store.insert(customer.clone())).await?;
        info!(customer_id = %customer.customer_id, "Created customer");
        Ok(customer)
    }

    /// Sets only the columns present in `partial` and returns `partial`
    /// laid over `id`.
    ///
    /// The result is not re-read from storage. An update with nothing to set
    /// never reaches the store, and an update that matches no row still
    /// succeeds.
    pub async fn update(&self, partial: CustomerUpdate, id: &str) -> Result<Customer, CustomerError> {
        let statement = UpdateBuilder::table(TABLE)
            .set_if_present("contact_name", partial.contact_name.as_deref())
            .set_if_present("city", partial.city.as_deref())
            .set_if_present("country", partial.country.as_deref())
            .filter_eq(KEY, id)
            .build();

        match statement {
            Some(statement) => {
                let matched = with_timeout(self.timeout, self.store.update(&statement)).await?;
                debug!(customer_id = %id, matched, "Updated customer");
            }
            None => debug!(customer_id = %id, "Empty update, nothing to set"),
        }
        Ok(partial.onto(id))
    }

    pub async fn delete(&self, id: &str) -> Result<(), CustomerError> {
        match with_timeout(self.timeout, self.store.delete(id)).await? {
            0 => Err(CustomerError::NotFound(id.to_string())),
            _ => {
                info!(customer_id = %id, "Deleted customer");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryCustomerStore, StoreError};

    fn service() -> CustomerService {
        CustomerService::new(Arc::new(MemoryCustomerStore::new()), Duration::from_secs(5))
    }

    fn alfk() -> Customer {
        Customer::new("ALFK")
            .with_contact_name("Maria Anders")
            .with_city("Berlin")
            .with_country("Germany")
    }

    #[tokio::test]
    async fn test_list_of_empty_table_is_empty() {
        assert!(service().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_update_changes_only_present_fields() {
        let svc = service();
        svc.create(alfk()).await.unwrap();

        let partial = CustomerUpdate {
            city: Some("X".into()),
            ..CustomerUpdate::default()
        };
        let returned = svc.update(partial, "ALFK").await.unwrap();
        assert_eq!(returned, Customer::new("ALFK").with_city("X"));

        let stored = svc.get("ALFK").await.unwrap();
        assert_eq!(stored, Customer { city: Some("X".into()), ..alfk() });
    }

    #[tokio::test]
    async fn test_update_sets_every_present_column_and_skips_the_rest() {
        let svc = service();
        svc.create(alfk()).await.unwrap();

        let partial = CustomerUpdate {
            contact_name: Some("Ana Trujillo".into()),
            country: Some("Mexico".into()),
            ..CustomerUpdate::default()
        };
        svc.update(partial, "ALFK").await.unwrap();

        assert_eq!(
            svc.get("ALFK").await.unwrap(),
            Customer::new("ALFK")
                .with_contact_name("Ana Trujillo")
                .with_city("Berlin")
                .with_country("Mexico")
        );
    }

    #[tokio::test]
    async fn test_empty_update_is_a_no_op() {
        let svc = service();
        svc.create(alfk()).await.unwrap();
        let returned = svc.update(CustomerUpdate::default(), "ALFK").await.unwrap();
        assert_eq!(returned, Customer::new("ALFK"));
        assert_eq!(svc.get("ALFK").await.unwrap(), alfk());
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let svc = service();
        assert_eq!(
            svc.delete("NONE").await,
            Err(CustomerError::NotFound("NONE".into()))
        );

        svc.create(alfk()).await.unwrap();
        svc.delete("ALFK").await.unwrap();
        assert_eq!(
            svc.get("ALFK").await,
            Err(CustomerError::NotFound("ALFK".into()))
        );
    }

    #[tokio::test]
    async fn test_create_rejects_empty_and_duplicate_ids() {
        let svc = service();
        assert!(matches!(
            svc.create(Customer::new("")).await,
            Err(CustomerError::InvalidPayload(_))
        ));
        svc.create(alfk()).await.unwrap();
        assert!(matches!(
            svc.create(Customer::new("ALFK")).await,
            Err(CustomerError::Storage(StoreError::Constraint(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_times_out() {
        let store = MemoryCustomerStore::new().with_latency(Duration::from_secs(60));
        let svc = CustomerService::new(Arc::new(store), Duration::from_secs(30));
        assert_eq!(
            svc.list().await,
            Err(CustomerError::Storage(StoreError::Timeout(Duration::from_secs(30))))
        );
    }
}
