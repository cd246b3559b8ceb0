use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// CompletionRecord
// ---------------------------------------------------------------------------

/// One explicitly-finished phase. Append-only from the engine's point of
/// view: completions are never revoked when entitlement rules change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub phase_id: String,
    pub completed_at: DateTime<Utc>,
}

impl CompletionRecord {
    pub fn new(phase_id: impl Into<String>, completed_at: DateTime<Utc>) -> Self {
        Self {
            phase_id: phase_id.into(),
            completed_at,
        }
    }
}

/// The completion-set shape the entitlement engine consumes. BTreeSet keeps
/// iteration deterministic for output surfaces.
pub type CompletionSet = BTreeSet<String>;

pub fn completion_set(records: &[CompletionRecord]) -> CompletionSet {
    records.iter().map(|r| r.phase_id.clone()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
