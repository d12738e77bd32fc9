//! Token Service: issues and verifies HS256-signed session tokens.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use ridegate_core::ActorId;

use crate::claims::{TokenClaims, TokenValidationError, validate_claims};

/// Process-wide signing secret.
///
/// Construction fails on an empty secret; there is no fallback value.
#[derive(Clone)]
pub struct TokenSecret(Vec<u8>);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenSecretError {
    #[error("signing secret is not configured")]
    Missing,

    #[error("signing secret is empty")]
    Empty,
}

impl TokenSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, TokenSecretError> {
        let secret = secret.into();
        if secret.iter().all(u8::is_ascii_whitespace) {
            return Err(TokenSecretError::Empty);
        }
        Ok(Self(secret))
    }
}

impl core::fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("TokenSecret(<redacted>)")
    }
}

/// Why a presented token was not accepted.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not verify")]
    BadSignature,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

impl TokenRejection {
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenRejection::Claims(TokenValidationError::Expired))
    }
}

#[derive(Debug, Error)]
pub enum TokenIssueError {
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("token lifetime {0:?} is out of range")]
    TtlOutOfRange(Duration),
}

/// A freshly signed token together with its lifetime.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub ttl: Duration,
    pub expires_at: DateTime<Utc>,
}

impl core::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"<redacted>")
            .field("ttl", &self.ttl)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &TokenSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks are done by `validate_claims` so that `now` is injectable.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(&secret.0),
            decoding: DecodingKey::from_secret(&secret.0),
            validation,
        }
    }

    pub fn issue(&self, actor_id: ActorId, ttl: Duration) -> Result<IssuedToken, TokenIssueError> {
        self.issue_at(actor_id, ttl, Utc::now())
    }

    pub fn issue_at(
        &self,
        actor_id: ActorId,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenIssueError> {
        let expires_at = i64::try_from(ttl.as_secs())
            .ok()
            .filter(|secs| *secs > 0)
            .and_then(chrono::Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(TokenIssueError::TtlOutOfRange(ttl))?;
        let claims = TokenClaims::new(actor_id, now, expires_at);
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(IssuedToken {
            token,
            ttl,
            expires_at,
        })
    }

    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenRejection> {
        self.verify_at(token, Utc::now())
    }

    /// Check signature, then the claim time window against `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenRejection> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenRejection::BadSignature,
                _ => TokenRejection::Malformed,
            })?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}
