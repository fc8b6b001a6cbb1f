//! Bus bindings for the customer service.
//!
//! Successful calls reply with the customer record (or list). Every failure
//! replies with `err = {"error": <message>}`.

use super::{CustomerError, CustomerService};
use crate::model::{Customer, CustomerKey, UpdateCustomerRequest};
use async_trait::async_trait;
use rpc_bridge::{HandlerError, PatternRouter, RouterError, TopicHandler};
use serde_json::Value;
use tracing::warn;

pub const FIND_CUSTOMERS: &str = "customers.findCustomers";
pub const FIND_CUSTOMER: &str = "customers.findCustomer";
pub const CREATE_CUSTOMER: &str = "customers.createCustomer";
pub const UPDATE_CUSTOMER: &str = "customers.updateCustomer";
pub const DELETE_CUSTOMER: &str = "customers.deleteCustomer";

impl From<CustomerError> for HandlerError {
    fn from(err: CustomerError) -> Self {
        if let CustomerError::Storage(_) = err {
            warn!(error = %err, "Customer request failed");
        }
        HandlerError::failed(err)
    }
}

pub struct FindCustomers(pub CustomerService);

#[async_trait]
impl TopicHandler for FindCustomers {
    // Any payload is accepted and ignored.
    type Request = Value;
    type Response = Vec<Customer>;

    async fn handle(&self, _: Value) -> Result<Vec<Customer>, HandlerError> {
        Ok(self.0.list().await?)
    }
}

pub struct FindCustomer(pub CustomerService);

#[async_trait]
impl TopicHandler for FindCustomer {
    type Request = CustomerKey;
    type Response = Customer;

    async fn handle(&self, key: CustomerKey) -> Result<Customer, HandlerError> {
        Ok(self.0.get(&key.into_id()).await?)
    }
}

pub struct CreateCustomer(pub CustomerService);

#[async_trait]
impl TopicHandler for CreateCustomer {
    type Request = Customer;
    type Response = Customer;

    async fn handle(&self, customer: Customer) -> Result<Customer, HandlerError> {
        Ok(self.0.create(customer).await?)
    }
}

pub struct UpdateCustomer(pub CustomerService);

#[async_trait]
impl TopicHandler for UpdateCustomer {
    type Request = UpdateCustomerRequest;
    type Response = Customer;

    async fn handle(&self, request: UpdateCustomerRequest) -> Result<Customer, HandlerError> {
        Ok(self.0.update(request.customer, &request.id).await?)
    }
}

pub struct DeleteCustomer(pub CustomerService);

#[async_trait]
impl TopicHandler for DeleteCustomer {
    type Request = CustomerKey;
    type Response = CustomerKey;

    /// Echoes the deleted key as `{"customer_id": ...}`.
    async fn handle(&self, key: CustomerKey) -> Result<CustomerKey, HandlerError> {
        let customer_id = key.into_id();
        self.0.delete(&customer_id).await?;
        Ok(CustomerKey::Keyed { customer_id })
    }
}

/// Binds all five customer topics on `router`.
pub fn register(router: &mut PatternRouter, service: CustomerService) -> Result<(), RouterError> {
    router.register(FIND_CUSTOMERS, FindCustomers(service.clone()))?;
    router.register(FIND_CUSTOMER, FindCustomer(service.clone()))?;
    router.register(CREATE_CUSTOMER, CreateCustomer(service.clone()))?;
    router.register(UPDATE_CUSTOMER, UpdateCustomer(service.clone()))?;
    router.register(DELETE_CUSTOMER, DeleteCustomer(service))
}
