//! Error types for the customer service.

use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur during customer operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CustomerError {
    /// No row has the requested key.
    #[error("Customer not found: {0}")]
    NotFound(String),

    /// The payload is structurally valid but unusable.
    #[error("Invalid customer: {0}")]
    InvalidPayload(String),

    /// An underlying storage error occurred.
    #[error("{0}")]
    Storage(#[from] StoreError),
}
