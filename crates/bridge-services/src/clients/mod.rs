//! Type-safe wrappers around [`BusClient`](rpc_bridge::BusClient).

pub mod auth_client;
pub mod customer_client;
pub mod service_client;

pub use auth_client::*;
pub use customer_client::*;
pub use service_client::*;
