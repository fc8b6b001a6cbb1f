//! HS256 JSON Web Tokens.
//!
//! A token is `base64url(header).base64url(claims).base64url(signature)`
//! without padding, where the signature is HMAC-SHA256 over the first two
//! segments under the process-wide signing key.

use super::{AuthError, TokenError};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Claims carried by an issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The email the token was issued to.
    pub sub: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

/// Signs and checks tokens with one secret key and a fixed validity window.
#[derive(Clone)]
pub struct TokenIssuer {
    key: Vec<u8>,
    validity: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("key", &"<redacted>")
            .field("validity", &self.validity)
            .finish()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl TokenIssuer {
    pub fn new(key: impl Into<Vec<u8>>, validity: Duration) -> Self {
        Self {
            key: key.into(),
            validity,
        }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    fn mac(&self) -> Result<HmacSha256, String> {
        HmacSha256::new_from_slice(&self.key).map_err(|e| e.to_string())
    }

    /// Issues a token for `subject` expiring one validity window from now.
    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_at(subject, unix_now())
    }

    pub fn issue_at(&self, subject: &str, now: u64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: now.saturating_add(self.validity.as_secs()),
        };
        let claims = serde_json::to_vec(&claims).map_err(|e| AuthError::Token(e.to_string()))?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER),
            URL_SAFE_NO_PAD.encode(claims)
        );

        let mut mac = self.mac().map_err(AuthError::Token)?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{signing_input}.{signature}"))
    }

    /// Checks signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, unix_now())
    }

    pub fn verify_at(&self, token: &str, now: u64) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(claims), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed("expected three segments".into()));
        };
        let signing_input = &token[..header.len() + 1 + claims.len()];

        let header = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|e| TokenError::Malformed(format!("header: {e}")))?;
        if header != HEADER.as_bytes() {
            return Err(TokenError::Malformed("unsupported header".into()));
        }
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|e| TokenError::Malformed(format!("signature: {e}")))?;

        let mut mac = self.mac().map_err(TokenError::Malformed)?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims = URL_SAFE_NO_PAD
            .decode(claims)
            .map_err(|e| TokenError::Malformed(format!("claims: {e}")))?;
        let claims: Claims = serde_json::from_slice(&claims)
            .map_err(|e| TokenError::Malformed(format!("claims: {e}")))?;
        if claims.exp <= now {
            return Err(TokenError::Expired {
                expired_at: claims.exp,
                now,
            });
        }
        Ok(claims)
    }
}
