use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::StoreError;

use super::RevocationLedger;

/// Default retention: one day, matching the canonical token lifetime.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// In-memory revocation ledger keyed by the exact token string.
#[derive(Debug)]
pub struct InMemoryRevocationLedger {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
    retention: chrono::Duration,
}

impl InMemoryRevocationLedger {
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            retention: chrono::Duration::from_std(retention).unwrap_or_else(|_| chrono::Duration::days(36_500)),
        }
    }

    /// Number of stored entries, including ones past retention that are not yet purged.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_live(&self, revoked_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(revoked_at) < self.retention
    }
}

impl Default for InMemoryRevocationLedger {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("revocation ledger lock poisoned".into())
}

impl RevocationLedger for InMemoryRevocationLedger {
    fn revoke_at(&self, token: &str, now: DateTime<Utc>) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        let revoked_at = entries.entry(token.to_string()).or_insert(now);
        // An entry past retention is stale; revoking again restarts its window.
        if !self.is_live(*revoked_at, now) {
            *revoked_at = now;
        }
        Ok(())
    }

    fn is_revoked_at(&self, token: &str, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries
            .get(token)
            .is_some_and(|revoked_at| self.is_live(*revoked_at, now)))
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        // Single write-lock section: readers see the ledger before or after, never midway.
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        let before = entries.len();
        entries.retain(|_, revoked_at| now.signed_duration_since(*revoked_at) < self.retention);
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn revoked_token_is_reported() {
        let ledger = InMemoryRevocationLedger::default();
        ledger.revoke("tok-a").unwrap();

        assert!(ledger.is_revoked("tok-a").unwrap());
        assert!(!ledger.is_revoked("tok-b").unwrap());
    }

    #[test]
    fn revoke_is_idempotent() {
        let ledger = InMemoryRevocationLedger::default();
        let now = Utc::now();
        ledger.revoke_at("tok", now).unwrap();
        ledger.revoke_at("tok", now + ChronoDuration::minutes(5)).unwrap();

        assert_eq!(ledger.len(), 1);
        // The first revocation time is kept.
        assert!(!ledger
            .is_revoked_at("tok", now + ChronoDuration::hours(24))
            .unwrap());
    }

    #[test]
    fn entries_lapse_after_retention_without_a_sweep() {
        let ledger = InMemoryRevocationLedger::new(Duration::from_secs(60));
        let now = Utc::now();
        ledger.revoke_at("tok", now).unwrap();

        assert!(ledger.is_revoked_at("tok", now + ChronoDuration::seconds(59)).unwrap());
        assert!(!ledger.is_revoked_at("tok", now + ChronoDuration::seconds(60)).unwrap());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn purge_removes_only_stale_entries() {
        let ledger = InMemoryRevocationLedger::new(Duration::from_secs(60));
        let now = Utc::now();
        ledger.revoke_at("old", now - ChronoDuration::seconds(120)).unwrap();
        ledger.revoke_at("fresh", now).unwrap();

        assert_eq!(ledger.purge_expired(now).unwrap(), 1);
        assert_eq!(ledger.len(), 1);
        assert!(ledger.is_revoked_at("fresh", now).unwrap());
    }

    #[test]
    fn stale_entry_is_refreshed_by_a_new_revocation() {
        let ledger = InMemoryRevocationLedger::new(Duration::from_secs(60));
        let now = Utc::now();
        ledger.revoke_at("tok", now - ChronoDuration::seconds(120)).unwrap();
        ledger.revoke_at("tok", now).unwrap();

        assert!(ledger.is_revoked_at("tok", now).unwrap());
    }
}
