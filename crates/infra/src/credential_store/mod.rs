//! Credential Store boundary.
//!
//! Holds actor records keyed by id and by (role, email). The store is the sole
//! authority for email uniqueness: `create_actor` either inserts the whole
//! record or fails, it never leaves a partial one behind.

pub mod in_memory;

use std::sync::Arc;

use thiserror::Error;

use ridegate_auth::{ActorView, Email, NewActor, PasswordHash, Role};
use ridegate_core::ActorId;

pub use in_memory::InMemoryCredentialStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Another actor of the same role already uses this email.
    #[error("duplicate email for role {role}")]
    Duplicate { role: Role },

    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Login lookup result: the safe projection plus the stored hash.
///
/// Only the login path asks for this; every other read returns [`ActorView`].
#[derive(Debug, Clone)]
pub struct ActorCredentials {
    pub actor: ActorView,
    pub password_hash: PasswordHash,
}

#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a new actor. Fails with [`StoreError::Duplicate`] when the email is taken.
    async fn create_actor(&self, actor: NewActor) -> Result<ActorView, StoreError>;

    async fn find_by_email(&self, role: Role, email: &Email) -> Result<Option<ActorView>, StoreError>;

    /// Same as `find_by_email` but includes the normally excluded password hash.
    async fn find_credentials_by_email(
        &self,
        role: Role,
        email: &Email,
    ) -> Result<Option<ActorCredentials>, StoreError>;

    async fn find_by_id(&self, role: Role, id: ActorId) -> Result<Option<ActorView>, StoreError>;
}

#[async_trait::async_trait]
impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    async fn create_actor(&self, actor: NewActor) -> Result<ActorView, StoreError> {
        (**self).create_actor(actor).await
    }

    async fn find_by_email(&self, role: Role, email: &Email) -> Result<Option<ActorView>, StoreError> {
        (**self).find_by_email(role, email).await
    }

    async fn find_credentials_by_email(
        &self,
        role: Role,
        email: &Email,
    ) -> Result<Option<ActorCredentials>, StoreError> {
        (**self).find_credentials_by_email(role, email).await
    }

    async fn find_by_id(&self, role: Role, id: ActorId) -> Result<Option<ActorView>, StoreError> {
        (**self).find_by_id(role, id).await
    }
}
