use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// What a session token asserts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Signs and verifies admin session tokens with a server-side secret.
#[derive(Clone)]
pub struct SessionSigner {
    secret: Vec<u8>,
}

impl SessionSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> AuthResult<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(AuthError::InvalidSecret("secret must not be empty".into()));
        }
        Ok(Self {
            secret: secret.to_vec(),
        })
    }

    fn mac(&self) -> AuthResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AuthError::InvalidSecret(e.to_string()))
    }

    /// A token valid for `ttl` from `now`.
    pub fn issue(&self, ttl: Duration, now: DateTime<Utc>) -> AuthResult<String> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = SessionClaims {
            exp: now.timestamp().saturating_add(ttl_secs),
        };
        let json = serde_json::to_vec(&claims).map_err(|_| AuthError::Malformed)?;
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{payload}.{signature}"))
    }

    /// Check signature (constant time) and expiry.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> AuthResult<SessionClaims> {
        let (payload, signature) = token.split_once('.').ok_or(AuthError::Malformed)?;
        if payload.is_empty() || signature.contains('.') {
            return Err(AuthError::Malformed);
        }
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::BadSignature)?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::BadSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::Malformed)?;
        let claims: SessionClaims =
            serde_json::from_slice(&json).map_err(|_| AuthError::Malformed)?;
        if now.timestamp() > claims.exp {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }
}

impl fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSigner")
            .field("secret", &"<redacted>")
            .finish()
    }
}
