//! Customer domain: CRUD with partial updates over the `customers` table.

pub mod error;
pub mod service;
pub mod topics;

pub use error::*;
pub use service::CustomerService;
