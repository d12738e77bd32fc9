//! Auth Orchestrator: register, login, logout and the protected-resource gate.
//!
//! One implementation serves both roles; the role only selects the rule set
//! and the store collection.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use ridegate_auth::{
    ActorView, AuthError, HashError, IssuedToken, PasswordHash, Role, TokenService, hash_password,
    parse_login, parse_registration,
};
use ridegate_core::ActorId;
use ridegate_infra::{
    AppConfig, AppEnv, CredentialStore, HashingPool, InMemoryCredentialStore, InMemoryRevocationLedger,
    RevocationLedger, StoreError,
};

/// Plaintext compared against when a login email is unknown, so both
/// failure paths cost one bcrypt verification.
const DUMMY_PASSWORD: &str = "ridegate-dummy-password";

/// Successful register/login result.
#[derive(Debug, Clone)]
pub struct Session {
    pub actor: ActorView,
    pub token: IssuedToken,
}

pub struct AuthServices {
    store: Arc<dyn CredentialStore>,
    ledger: Arc<dyn RevocationLedger>,
    tokens: TokenService,
    hashing: HashingPool,
    token_ttl: Duration,
    env: AppEnv,
    dummy_hash: PasswordHash,
}

impl core::fmt::Debug for AuthServices {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthServices")
            .field("token_ttl", &self.token_ttl)
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

impl AuthServices {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn CredentialStore>,
        ledger: Arc<dyn RevocationLedger>,
    ) -> Result<Self, HashError> {
        Ok(Self {
            store,
            ledger,
            tokens: TokenService::new(&config.secret),
            hashing: HashingPool::new(config.hash_workers, config.bcrypt_cost),
            token_ttl: config.token_ttl,
            env: config.env,
            dummy_hash: hash_password(DUMMY_PASSWORD, config.bcrypt_cost)?,
        })
    }

    /// Wire the in-memory adapters. The ledger is returned too so the caller
    /// can hand it to the background sweeper.
    pub fn in_memory(config: &AppConfig) -> Result<(Self, Arc<InMemoryRevocationLedger>), HashError> {
        let store = Arc::new(InMemoryCredentialStore::new());
        let ledger = Arc::new(InMemoryRevocationLedger::new(config.revocation_retention));
        let services = Self::new(config, store, ledger.clone())?;
        Ok((services, ledger))
    }

    pub fn env(&self) -> AppEnv {
        self.env
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn register(&self, role: Role, payload: &Value) -> Result<Session, AuthError> {
        let registration = parse_registration(role, payload)?;

        // Cheap pre-check; the store still enforces uniqueness atomically on insert.
        if self
            .store
            .find_by_email(role, &registration.email)
            .await
            .map_err(store_failure)?
            .is_some()
        {
            debug!(role = %role, "registration rejected: email exists");
            return Err(AuthError::EmailExists);
        }

        let password_hash = self
            .hashing
            .hash(registration.password.clone())
            .await
            .map_err(AuthError::unexpected)?;

        let actor = self
            .store
            .create_actor(registration.into_new_actor(password_hash))
            .await
            .map_err(store_failure)?;

        let token = self.issue(actor.id())?;
        info!(role = %role, actor_id = %actor.id(), "actor registered");
        Ok(Session { actor, token })
    }

    pub async fn login(&self, role: Role, payload: &Value) -> Result<Session, AuthError> {
        let attempt = parse_login(role, payload)?;

        let credentials = self
            .store
            .find_credentials_by_email(role, &attempt.email)
            .await
            .map_err(store_failure)?;

        let (actor, hash) = match credentials {
            Some(c) => (Some(c.actor), c.password_hash),
            None => (None, self.dummy_hash.clone()),
        };

        let matches = self
            .hashing
            .verify(attempt.password, hash)
            .await
            .map_err(AuthError::unexpected)?;

        let actor = match actor {
            Some(actor) if matches => actor,
            _ => {
                debug!(role = %role, "login rejected: invalid credentials");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.issue(actor.id())?;
        info!(role = %role, actor_id = %actor.id(), "actor logged in");
        Ok(Session { actor, token })
    }

    /// Revoke `token` without re-verifying it; expired or malformed strings are revoked too.
    pub fn logout(&self, role: Role, token: Option<&str>) -> Result<(), AuthError> {
        let token = token.ok_or(AuthError::NoToken)?;
        self.ledger.revoke(token).map_err(store_failure)?;
        info!(role = %role, "token revoked");
        Ok(())
    }

    /// Protected-resource gate: token present, not revoked, verifies, actor exists.
    pub async fn authenticate(&self, role: Role, token: Option<&str>) -> Result<ActorView, AuthError> {
        let token = token.ok_or(AuthError::NoToken)?;

        if self.ledger.is_revoked(token).map_err(store_failure)? {
            debug!(role = %role, reason = "revoked", "gate rejected token");
            return Err(AuthError::Revoked);
        }

        let claims = self.tokens.verify(token).map_err(|rejection| {
            debug!(role = %role, reason = %rejection, "gate rejected token");
            AuthError::InvalidToken(rejection)
        })?;

        self.store
            .find_by_id(role, claims.id)
            .await
            .map_err(store_failure)?
            .ok_or(AuthError::ActorNotFound(role))
    }

    fn issue(&self, actor_id: ActorId) -> Result<IssuedToken, AuthError> {
        self.tokens
            .issue(actor_id, self.token_ttl)
            .map_err(AuthError::unexpected)
    }
}

fn store_failure(err: StoreError) -> AuthError {
    match err {
        StoreError::Duplicate { .. } => AuthError::EmailExists,
        StoreError::Unavailable(detail) => {
            warn!(error = %detail, "store unavailable");
            AuthError::Unexpected(detail)
        }
    }
}
