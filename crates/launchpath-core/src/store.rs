//! Per-user persistence for subscription and completion records using redb.
//!
//! # Table design
//!
//! `SUBSCRIPTIONS` is keyed by the raw user id. `COMPLETIONS` uses a
//! composite key:
//! ```text
//! [ user_id bytes | 0x00 | phase_id bytes ]
//! ```
//!
//! Phase ids are validated slugs and user ids are rejected if they contain a
//! NUL byte, so the separator is unambiguous and a single range scan
//! `[user ++ 0x00, user ++ 0x01)` returns exactly one user's ledger.
//!
//! Writes that carry business rules (`mark_complete`, `activate_trial`) do
//! their check and their write inside one redb write transaction, which is
//! what serializes concurrent activations of the same user's trial.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition};

use crate::catalog::PlanCatalog;
use crate::error::{Error, Result};
use crate::ledger::{CompletionRecord, CompletionSet};
use crate::subscription::SubscriptionRecord;

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

/// Key: user id bytes. Value: JSON-encoded SubscriptionRecord.
const SUBSCRIPTIONS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("subscriptions");

/// Key: composite (user_id ++ 0x00 ++ phase_id). Value: JSON-encoded CompletionRecord.
const COMPLETIONS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("completions");

// ---------------------------------------------------------------------------
// Key helpers
// ---------------------------------------------------------------------------

fn check_user_id(user: &str) -> Result<()> {
    if user.is_empty() || user.as_bytes().contains(&0) {
        return Err(Error::Store(format!("invalid user id: {user:?}")));
    }
    Ok(())
}

fn completion_key(user: &str, phase_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(user.len() + 1 + phase_id.len());
    key.extend_from_slice(user.as_bytes());
    key.push(0);
    key.extend_from_slice(phase_id.as_bytes());
    key
}

/// Bounds for a range scan over one user's completions.
fn user_bounds(user: &str) -> (Vec<u8>, Vec<u8>) {
    let mut lower = user.as_bytes().to_vec();
    lower.push(0);
    let mut upper = user.as_bytes().to_vec();
    upper.push(1);
    (lower, upper)
}

// ---------------------------------------------------------------------------
// ProfileStore
// ---------------------------------------------------------------------------

/// Persistent store for per-user subscription and completion state.
pub struct ProfileStore {
    db: Database,
}

impl ProfileStore {
    /// Open or create the redb database at `path`, ensuring both tables
    /// exist before any reads.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path).map_err(|e| Error::Store(e.to_string()))?;
        let wt = db.begin_write().map_err(|e| Error::Store(e.to_string()))?;
        wt.open_table(SUBSCRIPTIONS)
            .map_err(|e| Error::Store(e.to_string()))?;
        wt.open_table(COMPLETIONS)
            .map_err(|e| Error::Store(e.to_string()))?;
        wt.commit().map_err(|e| Error::Store(e.to_string()))?;
        Ok(Self { db })
    }

    // ---------------------------------------------------------------------------
    // Subscriptions
    // ---------------------------------------------------------------------------

    /// The user's subscription record. A user with no stored row reads as the
    /// signup default (free, no trial) without writing anything.
    pub fn subscription(&self, user: &str) -> Result<SubscriptionRecord> {
        check_user_id(user)?;
        let rt = self
            .db
            .begin_read()
            .map_err(|e| Error::Store(e.to_string()))?;
        let table = rt
            .open_table(SUBSCRIPTIONS)
            .map_err(|e| Error::Store(e.to_string()))?;
        match table
            .get(user.as_bytes())
            .map_err(|e| Error::Store(e.to_string()))?
        {
            Some(v) => {
                serde_json::from_slice(v.value()).map_err(|e| Error::Store(e.to_string()))
            }
            None => Ok(SubscriptionRecord::new()),
        }
    }

    /// Overwrite the user's subscription record. This is the write path the
    /// external payment webhooks (and the CLI account commands) use.
    pub fn put_subscription(&self, user: &str, record: &SubscriptionRecord) -> Result<()> {
        check_user_id(user)?;
        let value = serde_json::to_vec(record).map_err(|e| Error::Store(e.to_string()))?;
        let wt = self
            .db
            .begin_write()
            .map_err(|e| Error::Store(e.to_string()))?;
        {
            let mut table = wt
                .open_table(SUBSCRIPTIONS)
                .map_err(|e| Error::Store(e.to_string()))?;
            table
                .insert(user.as_bytes(), value.as_slice())
                .map_err(|e| Error::Store(e.to_string()))?;
        }
        wt.commit().map_err(|e| Error::Store(e.to_string()))?;
        Ok(())
    }

    /// One-shot trial activation: the trial-history check and the write
    /// happen in a single write transaction. Returns the updated record.
    pub fn activate_trial(
        &self,
        user: &str,
        code: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<SubscriptionRecord> {
        check_user_id(user)?;
        let wt = self
            .db
            .begin_write()
            .map_err(|e| Error::Store(e.to_string()))?;
        let record = {
            let mut table = wt
                .open_table(SUBSCRIPTIONS)
                .map_err(|e| Error::Store(e.to_string()))?;
            let mut record = match table
                .get(user.as_bytes())
                .map_err(|e| Error::Store(e.to_string()))?
            {
                Some(v) => serde_json::from_slice(v.value())
                    .map_err(|e| Error::Store(e.to_string()))?,
                None => SubscriptionRecord::new(),
            };
            record.activate_trial(code, now)?;
            let value = serde_json::to_vec(&record).map_err(|e| Error::Store(e.to_string()))?;
            table
                .insert(user.as_bytes(), value.as_slice())
                .map_err(|e| Error::Store(e.to_string()))?;
            record
        };
        wt.commit().map_err(|e| Error::Store(e.to_string()))?;
        Ok(record)
    }

    // ---------------------------------------------------------------------------
    // Completions
    // ---------------------------------------------------------------------------

    /// Record a phase completion. Idempotent with a keep-first policy: a
    /// repeat call leaves the original `completed_at` untouched and returns
    /// `false`. Fails with `UnknownPhase` for ids outside the catalog.
    pub fn mark_complete(
        &self,
        catalog: &PlanCatalog,
        user: &str,
        phase_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        check_user_id(user)?;
        if !catalog.contains(phase_id) {
            return Err(Error::UnknownPhase(phase_id.to_string()));
        }

        let key = completion_key(user, phase_id);
        let wt = self
            .db
            .begin_write()
            .map_err(|e| Error::Store(e.to_string()))?;
        let inserted = {
            let mut table = wt
                .open_table(COMPLETIONS)
                .map_err(|e| Error::Store(e.to_string()))?;
            let exists = table
                .get(key.as_slice())
                .map_err(|e| Error::Store(e.to_string()))?
                .is_some();
            if exists {
                false
            } else {
                let record = CompletionRecord::new(phase_id, now);
                let value =
                    serde_json::to_vec(&record).map_err(|e| Error::Store(e.to_string()))?;
                table
                    .insert(key.as_slice(), value.as_slice())
                    .map_err(|e| Error::Store(e.to_string()))?;
                true
            }
        };
        wt.commit().map_err(|e| Error::Store(e.to_string()))?;
        Ok(inserted)
    }

    /// The user's completed phase ids — the `completions` input the
    /// entitlement engine consumes.
    pub fn completions_for(&self, user: &str) -> Result<CompletionSet> {
        Ok(self
            .completion_records(user)?
            .into_iter()
            .map(|r| r.phase_id)
            .collect())
    }

    /// Full completion records in phase-id order.
    pub fn completion_records(&self, user: &str) -> Result<Vec<CompletionRecord>> {
        check_user_id(user)?;
        let (lower, upper) = user_bounds(user);
        let rt = self
            .db
            .begin_read()
            .map_err(|e| Error::Store(e.to_string()))?;
        let table = rt
            .open_table(COMPLETIONS)
            .map_err(|e| Error::Store(e.to_string()))?;

        let mut records = Vec::new();
        for entry in table
            .range(lower.as_slice()..upper.as_slice())
            .map_err(|e| Error::Store(e.to_string()))?
        {
            let (_, v) = entry.map_err(|e| Error::Store(e.to_string()))?;
            let record: CompletionRecord =
                serde_json::from_slice(v.value()).map_err(|e| Error::Store(e.to_string()))?;
            records.push(record);
        }
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Plan;
    use chrono::Duration;
    use tempfile::TempDir;

    fn open_tmp() -> (TempDir, ProfileStore) {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::open(&dir.path().join("profiles.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_user_reads_as_signup_default() {
        let (_dir, store) = open_tmp();
        let sub = store.subscription("nobody").unwrap();
        assert_eq!(sub.plan, Plan::Free);
        assert!(!sub.is_trial);
    }

    #[test]
    fn subscription_roundtrip() {
        let (_dir, store) = open_tmp();
        let mut sub = SubscriptionRecord::new();
        sub.plan = Plan::Premium;
        store.put_subscription("alice", &sub).unwrap();

        let loaded = store.subscription("alice").unwrap();
        assert_eq!(loaded.plan, Plan::Premium);
    }

    #[test]
    fn mark_complete_inserts_once() {
        let (_dir, store) = open_tmp();
        let catalog = PlanCatalog::builtin();
        let now = Utc::now();

        assert!(store
            .mark_complete(&catalog, "alice", "buyer-persona", now)
            .unwrap());
        assert!(!store
            .mark_complete(&catalog, "alice", "buyer-persona", now + Duration::hours(1))
            .unwrap());

        let records = store.completion_records("alice").unwrap();
        assert_eq!(records.len(), 1);
        // Keep-first: the repeat call must not refresh the timestamp.
        assert_eq!(records[0].completed_at, now);
    }

    #[test]
    fn mark_complete_rejects_unknown_phase() {
        let (_dir, store) = open_tmp();
        let catalog = PlanCatalog::builtin();
        assert!(matches!(
            store.mark_complete(&catalog, "alice", "retired-tool", Utc::now()),
            Err(Error::UnknownPhase(_))
        ));
        assert!(store.completions_for("alice").unwrap().is_empty());
    }

    #[test]
    fn completions_are_per_user() {
        let (_dir, store) = open_tmp();
        let catalog = PlanCatalog::builtin();
        let now = Utc::now();

        store
            .mark_complete(&catalog, "alice", "buyer-persona", now)
            .unwrap();
        store
            .mark_complete(&catalog, "bob", "business-canvas", now)
            .unwrap();

        let alice = store.completions_for("alice").unwrap();
        assert_eq!(alice.len(), 1);
        assert!(alice.contains("buyer-persona"));

        let bob = store.completions_for("bob").unwrap();
        assert_eq!(bob.len(), 1);
        assert!(bob.contains("business-canvas"));
    }

    #[test]
    fn user_prefix_does_not_leak_into_scan() {
        let (_dir, store) = open_tmp();
        let catalog = PlanCatalog::builtin();
        let now = Utc::now();

        // "al" is a byte prefix of "alice"; the 0x00 separator must keep
        // their ledgers apart.
        store
            .mark_complete(&catalog, "al", "buyer-persona", now)
            .unwrap();
        store
            .mark_complete(&catalog, "alice", "business-canvas", now)
            .unwrap();

        let al = store.completions_for("al").unwrap();
        assert_eq!(al.len(), 1);
        assert!(al.contains("buyer-persona"));
    }

    #[test]
    fn trial_activation_persists() {
        let (_dir, store) = open_tmp();
        let now = Utc::now();
        let record = store.activate_trial("alice", Some("LAUNCH"), now).unwrap();
        assert!(record.is_trial);
        assert_eq!(record.trial_code.as_deref(), Some("LAUNCH"));

        let loaded = store.subscription("alice").unwrap();
        assert_eq!(loaded.expires_at, Some(now + Duration::days(7)));
    }

    #[test]
    fn trial_is_single_use() {
        let (_dir, store) = open_tmp();
        let now = Utc::now();
        store.activate_trial("alice", None, now).unwrap();
        assert!(matches!(
            store.activate_trial("alice", None, now),
            Err(Error::AlreadyTrialed)
        ));
    }

    #[test]
    fn trial_refused_across_reopen_even_after_expiry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.db");
        let long_ago = Utc::now() - Duration::days(60);
        {
            let store = ProfileStore::open(&path).unwrap();
            store.activate_trial("alice", Some("old"), long_ago).unwrap();
        }
        let store = ProfileStore::open(&path).unwrap();
        assert!(matches!(
            store.activate_trial("alice", None, Utc::now()),
            Err(Error::AlreadyTrialed)
        ));
    }

    #[test]
    fn failed_activation_leaves_record_unchanged() {
        let (_dir, store) = open_tmp();
        let now = Utc::now();
        let first = store.activate_trial("alice", Some("first"), now).unwrap();
        let _ = store.activate_trial("alice", Some("second"), now + Duration::days(1));

        let loaded = store.subscription("alice").unwrap();
        assert_eq!(loaded.trial_code.as_deref(), Some("first"));
        assert_eq!(loaded.expires_at, first.expires_at);
    }

    #[test]
    fn invalid_user_ids_rejected() {
        let (_dir, store) = open_tmp();
        assert!(store.subscription("").is_err());
        assert!(store.subscription("has\0nul").is_err());
    }
}
