use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use ridegate_auth::{ActorView, Email, NewActor, PasswordHash, Role};
use ridegate_core::ActorId;

use super::{ActorCredentials, CredentialStore, StoreError};

#[derive(Debug, Clone)]
struct StoredActor {
    view: ActorView,
    password_hash: PasswordHash,
}

#[derive(Debug, Default)]
struct Collections {
    actors: HashMap<ActorId, StoredActor>,
    by_email: HashMap<(Role, Email), ActorId>,
}

/// In-memory credential store for tests/dev.
///
/// One write lock covers the uniqueness check and the insert, so two concurrent
/// registrations for the same email cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Collections>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|c| c.actors.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Collections>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("credential store lock poisoned".into()))
    }

    fn lookup(&self, role: Role, email: &Email) -> Result<Option<StoredActor>, StoreError> {
        let collections = self.read()?;
        Ok(collections
            .by_email
            .get(&(role, email.clone()))
            .and_then(|id| collections.actors.get(id))
            .cloned())
    }
}

#[async_trait::async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create_actor(&self, actor: NewActor) -> Result<ActorView, StoreError> {
        let mut collections = self
            .inner
            .write()
            .map_err(|_| StoreError::Unavailable("credential store lock poisoned".into()))?;

        let role = actor.role();
        let key = (role, actor.email.clone());
        if collections.by_email.contains_key(&key) {
            return Err(StoreError::Duplicate { role });
        }

        let id = ActorId::new();
        let view = ActorView::from_new(id, &actor, Utc::now());
        collections.by_email.insert(key, id);
        collections.actors.insert(
            id,
            StoredActor {
                view: view.clone(),
                password_hash: actor.password_hash,
            },
        );
        Ok(view)
    }

    async fn find_by_email(&self, role: Role, email: &Email) -> Result<Option<ActorView>, StoreError> {
        Ok(self.lookup(role, email)?.map(|stored| stored.view))
    }

    async fn find_credentials_by_email(
        &self,
        role: Role,
        email: &Email,
    ) -> Result<Option<ActorCredentials>, StoreError> {
        Ok(self.lookup(role, email)?.map(|stored| ActorCredentials {
            actor: stored.view,
            password_hash: stored.password_hash,
        }))
    }

    async fn find_by_id(&self, role: Role, id: ActorId) -> Result<Option<ActorView>, StoreError> {
        let collections = self.read()?;
        Ok(collections
            .actors
            .get(&id)
            .filter(|stored| stored.view.role() == role)
            .map(|stored| stored.view.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ridegate_auth::{FullName, RegistrationProfile, Vehicle, VehicleType};

    fn new_actor(email: &str, profile: RegistrationProfile) -> NewActor {
        NewActor {
            email: Email::parse(email).unwrap(),
            full_name: FullName {
                first_name: "Ann".into(),
                last_name: None,
            },
            profile,
            password_hash: PasswordHash::from_stored("$2b$10$stored-hash"),
        }
    }

    fn captain_profile() -> RegistrationProfile {
        RegistrationProfile::Captain {
            vehicle: Vehicle {
                color: "Red".into(),
                plate_code: "AB-123".into(),
                capacity: 4,
                vehicle_type: VehicleType::FourWheeler,
            },
        }
    }

    #[tokio::test]
    async fn created_actor_is_found_by_email_and_id() {
        let store = InMemoryCredentialStore::new();
        let view = store
            .create_actor(new_actor("a@x.com", RegistrationProfile::User))
            .await
            .unwrap();

        let email = Email::parse("a@x.com").unwrap();
        let by_email = store.find_by_email(Role::User, &email).await.unwrap();
        let by_id = store.find_by_id(Role::User, view.id()).await.unwrap();

        assert_eq!(by_email.as_ref(), Some(&view));
        assert_eq!(by_id.as_ref(), Some(&view));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_and_first_record_untouched() {
        let store = InMemoryCredentialStore::new();
        let first = store
            .create_actor(new_actor("a@x.com", RegistrationProfile::User))
            .await
            .unwrap();

        let err = store
            .create_actor(new_actor("A@X.com", RegistrationProfile::User))
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::Duplicate { role: Role::User });
        assert_eq!(store.len(), 1);
        let again = store.find_by_id(Role::User, first.id()).await.unwrap();
        assert_eq!(again, Some(first));
    }

    #[tokio::test]
    async fn uniqueness_is_scoped_per_role() {
        let store = InMemoryCredentialStore::new();
        store
            .create_actor(new_actor("a@x.com", RegistrationProfile::User))
            .await
            .unwrap();
        store
            .create_actor(new_actor("a@x.com", captain_profile()))
            .await
            .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn find_by_id_respects_role_collection() {
        let store = InMemoryCredentialStore::new();
        let user = store
            .create_actor(new_actor("a@x.com", RegistrationProfile::User))
            .await
            .unwrap();

        assert!(store.find_by_id(Role::Captain, user.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn credentials_lookup_returns_stored_hash() {
        let store = InMemoryCredentialStore::new();
        store
            .create_actor(new_actor("a@x.com", RegistrationProfile::User))
            .await
            .unwrap();

        let email = Email::parse("a@x.com").unwrap();
        let creds = store
            .find_credentials_by_email(Role::User, &email)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.password_hash.as_str(), "$2b$10$stored-hash");
    }

    #[tokio::test]
    async fn concurrent_registrations_for_one_email_yield_one_actor() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let mut tasks = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.create_actor(new_actor("race@x.com", RegistrationProfile::User)).await
            }));
        }

        let mut created = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.len(), 1);
    }
}
