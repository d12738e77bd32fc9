//! Revocation Ledger: a denylist of token strings invalidated before expiry.
//!
//! Entries are kept for a fixed retention window. Lookups ignore entries past
//! that window, so correctness does not depend on the background sweep; the
//! sweep only reclaims memory.

pub mod in_memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::StoreError;

pub use in_memory::InMemoryRevocationLedger;

pub trait RevocationLedger: Send + Sync {
    /// Record `token` as revoked at `now`. Revoking twice is not an error.
    fn revoke_at(&self, token: &str, now: DateTime<Utc>) -> Result<(), StoreError>;

    /// Whether `token` has an unexpired ledger entry at `now`.
    fn is_revoked_at(&self, token: &str, now: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Drop every entry older than the retention window. Returns how many were removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError>;

    fn revoke(&self, token: &str) -> Result<(), StoreError> {
        self.revoke_at(token, Utc::now())
    }

    fn is_revoked(&self, token: &str) -> Result<bool, StoreError> {
        self.is_revoked_at(token, Utc::now())
    }
}

impl<L> RevocationLedger for Arc<L>
where
    L: RevocationLedger + ?Sized,
{
    fn revoke_at(&self, token: &str, now: DateTime<Utc>) -> Result<(), StoreError> {
        (**self).revoke_at(token, now)
    }

    fn is_revoked_at(&self, token: &str, now: DateTime<Utc>) -> Result<bool, StoreError> {
        (**self).is_revoked_at(token, now)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        (**self).purge_expired(now)
    }
}
