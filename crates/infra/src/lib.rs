//! Infrastructure layer: credential storage, revocation ledger, background
//! workers, password hashing pool and configuration.

pub mod config;
pub mod credential_store;
pub mod hashing;
pub mod revocation;
pub mod workers;

pub use config::{AppConfig, AppEnv, ConfigError};
pub use credential_store::{ActorCredentials, CredentialStore, InMemoryCredentialStore, StoreError};
pub use hashing::HashingPool;
pub use revocation::{InMemoryRevocationLedger, RevocationLedger};
pub use workers::{RevocationSweeper, WorkerHandle};
