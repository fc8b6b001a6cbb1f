use crate::clients::ServiceClient;
use crate::customer_service::topics::{
    CREATE_CUSTOMER, DELETE_CUSTOMER, FIND_CUSTOMER, FIND_CUSTOMERS, UPDATE_CUSTOMER,
};
use crate::model::{Customer, CustomerKey, CustomerUpdate, UpdateCustomerRequest};
use rpc_bridge::{BusClient, ClientError};
use serde_json::Value;

/// Client for the `customers.*` topics.
///
/// Service failures arrive as [`ClientError::Remote`]; use
/// [`ClientError::remote_message`] for the text.
#[derive(Clone)]
pub struct CustomerClient {
    inner: BusClient,
}

impl CustomerClient {
    pub fn new(inner: BusClient) -> Self {
        Self { inner }
    }

    pub async fn list(&self) -> Result<Vec<Customer>, ClientError> {
        self.call(FIND_CUSTOMERS, &Value::Null).await
    }

    pub async fn get(&self, id: &str) -> Result<Customer, ClientError> {
        self.call(FIND_CUSTOMER, id).await
    }

    pub async fn create(&self, customer: &Customer) -> Result<Customer, ClientError> {
        self.call(CREATE_CUSTOMER, customer).await
    }

    pub async fn update(&self, id: &str, partial: CustomerUpdate) -> Result<Customer, ClientError> {
        let request = UpdateCustomerRequest {
            customer: partial,
            id: id.to_string(),
        };
        self.call(UPDATE_CUSTOMER, &request).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let _: CustomerKey = self.call(DELETE_CUSTOMER, id).await?;
        Ok(())
    }
}

impl ServiceClient for CustomerClient {
    fn inner(&self) -> &BusClient {
        &self.inner
    }
}
