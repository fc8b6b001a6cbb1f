//! Pure data structures (DTOs) carried in request and response envelopes.

pub mod customer;
pub mod identity;

pub use customer::*;
pub use identity::*;
