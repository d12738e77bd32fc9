//! Authentication failure taxonomy and its external mapping.

use std::borrow::Cow;

use thiserror::Error;

use crate::{FieldViolation, Role, RoleError, TokenRejection};

/// Every way an auth operation or the protected-resource gate can fail.
///
/// Each variant knows its HTTP status, stable machine code and client-facing
/// message; transports render these and nothing else.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("validation failed on {} field(s)", .0.len())]
    ValidationFailed(Vec<FieldViolation>),

    #[error("role header missing")]
    RoleMissing,

    #[error("role '{0}' is not recognised")]
    RoleInvalid(String),

    #[error("email address already exists")]
    EmailExists,

    /// Unknown email and wrong password both map here.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no token presented")]
    NoToken,

    #[error("token has been revoked")]
    Revoked,

    #[error("invalid token: {0}")]
    InvalidToken(TokenRejection),

    #[error("{0} not found")]
    ActorNotFound(Role),

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl AuthError {
    pub fn unexpected(err: impl core::fmt::Display) -> Self {
        Self::Unexpected(err.to_string())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::ValidationFailed(_) | AuthError::RoleMissing | AuthError::RoleInvalid(_) => 400,
            AuthError::EmailExists => 409,
            AuthError::InvalidCredentials
            | AuthError::NoToken
            | AuthError::Revoked
            | AuthError::InvalidToken(_) => 401,
            AuthError::ActorNotFound(_) => 404,
            AuthError::Unexpected(_) => 500,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::ValidationFailed(_) => "validation_failed",
            AuthError::RoleMissing => "role_missing",
            AuthError::RoleInvalid(_) => "role_invalid",
            AuthError::EmailExists => "email_exists",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::NoToken => "no_token",
            AuthError::Revoked => "revoked",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::ActorNotFound(_) => "actor_not_found",
            AuthError::Unexpected(_) => "unexpected",
        }
    }

    /// Client-facing message. Never includes internal detail.
    pub fn message(&self) -> Cow<'static, str> {
        match self {
            AuthError::ValidationFailed(_) => "Validation failed".into(),
            AuthError::RoleMissing => "Role is required in the headers".into(),
            AuthError::RoleInvalid(_) => "Role is invalid; it can only be a user or captain".into(),
            AuthError::EmailExists => "Email address already exists".into(),
            AuthError::InvalidCredentials => "Invalid credentials".into(),
            AuthError::NoToken | AuthError::Revoked | AuthError::InvalidToken(_) => "Unauthorized".into(),
            AuthError::ActorNotFound(role) => format!("{} not found", role.label()).into(),
            AuthError::Unexpected(_) => "An unexpected error occurred".into(),
        }
    }

    pub fn violations(&self) -> Option<&[FieldViolation]> {
        match self {
            AuthError::ValidationFailed(v) => Some(v),
            _ => None,
        }
    }
}

impl From<RoleError> for AuthError {
    fn from(value: RoleError) -> Self {
        match value {
            RoleError::Missing => AuthError::RoleMissing,
            RoleError::Invalid(raw) => AuthError::RoleInvalid(raw),
        }
    }
}

impl From<TokenRejection> for AuthError {
    fn from(value: TokenRejection) -> Self {
        AuthError::InvalidToken(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenValidationError;

    #[test]
    fn status_table_matches_messages() {
        let cases = [
            (AuthError::ValidationFailed(vec![]), 400, "Validation failed"),
            (AuthError::InvalidCredentials, 401, "Invalid credentials"),
            (AuthError::ActorNotFound(Role::User), 404, "User not found"),
            (AuthError::EmailExists, 409, "Email address already exists"),
            (AuthError::unexpected("boom"), 500, "An unexpected error occurred"),
        ];
        for (err, status, message) in cases {
            assert_eq!(err.status_code(), status, "{err:?}");
            assert_eq!(err.message(), message);
        }
    }

    #[test]
    fn role_errors_are_bad_requests() {
        let missing: AuthError = RoleError::Missing.into();
        let invalid: AuthError = RoleError::Invalid("admin".into()).into();
        assert_eq!(missing.status_code(), 400);
        assert_eq!(invalid.status_code(), 400);
        assert_eq!(missing.code(), "role_missing");
        assert_eq!(invalid.code(), "role_invalid");
    }

    #[test]
    fn token_failures_share_status_but_not_code() {
        let expired: AuthError = TokenRejection::Claims(TokenValidationError::Expired).into();
        assert_eq!(expired.status_code(), AuthError::Revoked.status_code());
        assert_ne!(expired.code(), AuthError::Revoked.code());
        assert_eq!(expired.message(), AuthError::NoToken.message());
    }

    #[test]
    fn captain_not_found_names_the_role() {
        assert_eq!(AuthError::ActorNotFound(Role::Captain).message(), "Captain not found");
    }

    #[test]
    fn unexpected_message_hides_detail() {
        let err = AuthError::unexpected("lock poisoned at store.rs:42");
        assert!(!err.message().contains("poisoned"));
    }
}
