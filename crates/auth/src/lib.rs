//! `ridegate-auth`: pure authentication boundary for users and captains.
//!
//! This crate is intentionally decoupled from HTTP and storage: it owns the
//! role union, the actor data model, validation rule sets, token issuance and
//! verification, and password hashing primitives.

pub mod actor;
pub mod claims;
pub mod error;
pub mod password;
pub mod roles;
pub mod token;
pub mod validation;

pub use actor::{
    ActorView, CaptainProfile, CaptainStatus, Email, FullName, Location, NewActor, Registration,
    RegistrationProfile, Vehicle, VehicleType,
};
pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use error::AuthError;
pub use password::{DEFAULT_COST, HashError, PASSWORD_MAX_BYTES, PasswordHash, hash_password, verify_password};
pub use roles::{AuthAction, Role, RoleError};
pub use token::{IssuedToken, TokenIssueError, TokenRejection, TokenSecret, TokenSecretError, TokenService};
pub use validation::{FieldViolation, LoginAttempt, RuleSet, parse_login, parse_registration, rules_for};
