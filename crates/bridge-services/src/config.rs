//! Process configuration loaded from environment variables.
//!
//! | variable              | required | default                 |
//! |-----------------------|----------|-------------------------|
//! | `SECRET_KEY`          | yes      |                         |
//! | `MONGO_URI`           | yes      |                         |
//! | `DATABASE_URL`        | yes      |                         |
//! | `NATS_URL`            | no       | `nats://127.0.0.1:4222` |
//! | `TOKEN_VALIDITY_DAYS` | no       | `30`                    |
//! | `STORE_TIMEOUT_SECS`  | no       | `30`                    |
//! | `REQUEST_CONCURRENCY` | no       | `256`                   |
//!
//! A missing or invalid value is fatal: the process must not start serving.

use crate::auth_service::HashCost;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const MIN_SECRET_LEN: usize = 16;
const DAY_SECS: u64 = 24 * 60 * 60;

/// Configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration {key}: {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid value for {key} ({value}): {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Everything the bridge needs to start.
#[derive(Clone, PartialEq)]
pub struct BridgeConfig {
    /// Token-signing secret.
    pub secret_key: String,
    /// Identity document store connection string.
    pub mongo_uri: String,
    /// Customer relational store connection string.
    pub database_url: String,
    /// Message bus endpoint.
    pub nats_url: String,
    pub token_validity: Duration,
    /// Bound applied to every storage call.
    pub store_timeout: Duration,
    /// Max in-flight requests per topic.
    pub request_concurrency: usize,
    /// Password hashing work factor. Not read from the environment.
    pub hash_cost: HashCost,
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("secret_key", &"<redacted>")
            .field("mongo_uri", &"<redacted>")
            .field("database_url", &"<redacted>")
            .field("nats_url", &self.nats_url)
            .field("token_validity", &self.token_validity)
            .field("store_timeout", &self.store_timeout)
            .field("request_concurrency", &self.request_concurrency)
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

impl BridgeConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = required(&lookup, "SECRET_KEY", "token-signing secret")?;
        if secret_key.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue {
                key: "SECRET_KEY".to_string(),
                value: "<redacted>".to_string(),
                reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
            });
        }

        let token_days: u64 = parsed(&lookup, "TOKEN_VALIDITY_DAYS", 30)?;
        let store_timeout_secs: u64 = parsed(&lookup, "STORE_TIMEOUT_SECS", 30)?;
        let request_concurrency: usize = parsed(&lookup, "REQUEST_CONCURRENCY", 256)?;

        Ok(Self {
            secret_key,
            mongo_uri: required(&lookup, "MONGO_URI", "identity store connection string")?,
            database_url: required(&lookup, "DATABASE_URL", "customer store connection string")?,
            nats_url: lookup("NATS_URL").unwrap_or_else(Self::default_nats_url),
            token_validity: Duration::from_secs(token_days.saturating_mul(DAY_SECS)),
            store_timeout: Duration::from_secs(store_timeout_secs),
            request_concurrency,
            hash_cost: HashCost::default(),
        })
    }

    fn default_nats_url() -> String {
        "nats://127.0.0.1:4222".to_string()
    }
}

fn required<F>(lookup: &F, key: &str, what: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingRequired {
            key: key.to_string(),
            hint: format!("Set this environment variable to the {what}"),
        }),
    }
}

/// Parses a positive number, falling back to `default` when unset.
fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default,
    T::Err: fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let invalid = |reason: String| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.clone(),
        reason,
    };
    let value = raw
        .trim()
        .parse::<T>()
        .map_err(|e| invalid(format!("must be a positive integer: {e}")))?;
    if value <= T::default() {
        return Err(invalid("must be greater than zero".to_string()));
    }
    Ok(value)
}
