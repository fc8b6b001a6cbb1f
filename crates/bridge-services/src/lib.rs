//! # Bridge Services
//!
//! Two domains served over the [`rpc_bridge`] router.
//!
//! ## 🚀 Core Components
//!
//! - **[auth_service]**: registration and login. Passwords are stored as
//!   salted Argon2id hashes and a successful login yields an HS256 token.
//! - **[customer_service]**: CRUD over the `customers` table. Updates touch only
//!   the fields the caller sent.
//! - **[store]**: the storage capabilities both services depend on, with
//!   in-memory implementations.
//! - **[model]**: the payloads carried in envelopes.
//! - **[clients]**: typed callers ([`AuthClient`](clients::AuthClient),
//!   [`CustomerClient`](clients::CustomerClient)) for the topics above.
//! - **[lifecycle]**: [`BridgeSystem`](lifecycle::BridgeSystem) wires it all
//!   together and starts serving.
//!
//! ## Topics
//!
//! | topic                      | data                          | reply                         |
//! |----------------------------|-------------------------------|-------------------------------|
//! | `auth.loginUser`           | `{email, password}`           | `{message: token, context}`   |
//! | `auth.registerUser`        | `{username, email, password}` | `{message, context}`          |
//! | `customers.findCustomers`  | anything                      | `[customer]`                  |
//! | `customers.findCustomer`   | `"id"` or `{customer_id}`     | `customer`                    |
//! | `customers.createCustomer` | `customer`                    | `customer`                    |
//! | `customers.updateCustomer` | `{customer: {partial}, id}`   | partial laid over `id`        |
//! | `customers.deleteCustomer` | `"id"` or `{customer_id}`     | `{customer_id}`               |
//!
//! Customer failures reply with `err = {"error": message}`. Auth failures
//! reply in-band with `context: false`.
//!
//! ## 🧪 Testing
//!
//! The in-memory stores accept an artificial latency, which is how the store
//! timeout is exercised. See the crate's `tests/` directory for end-to-end
//! scenarios over the bus.

pub mod auth_service;
pub mod clients;
pub mod config;
pub mod customer_service;
pub mod lifecycle;
pub mod model;
pub mod store;
