//! Error types for the credential service.
//!
//! The `Display` strings of [`AuthError`] are the `message` callers see in a
//! failed [`AuthReply`](crate::model::AuthReply), so they stay short and never
//! say which half of a credential pair was wrong.

use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur during login and registration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("Invalid user email or password")]
    InvalidCredentials,

    /// An identity with this email already exists.
    #[error("This user with the current email already exists!")]
    DuplicateAccount(String),

    /// The request is missing a required field.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The password could not be hashed or a stored hash could not be read.
    #[error("Couldn't hash the password")]
    Hashing(String),

    /// The token could not be signed.
    #[error("Failed to create token")]
    Token(String),

    /// An underlying storage error occurred.
    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

/// Errors raised while checking a presented token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired at {expired_at}, current time is {now}")]
    Expired { expired_at: u64, now: u64 },
}
