//! Identity domain: registration, login and token issuance.

pub mod error;
pub mod password;
pub mod service;
pub mod token;
pub mod topics;

pub use error::*;
pub use password::{CredentialHasher, HashCost};
pub use service::CredentialService;
pub use token::{Claims, TokenIssuer};
