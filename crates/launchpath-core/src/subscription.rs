use crate::error::{Error, Result};
use crate::types::Plan;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TRIAL_LENGTH_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
// TrialState
// ---------------------------------------------------------------------------

/// Derived at read time from `is_trial` and `expires_at`. Expiry is never
/// written back; an expired trial simply stops elevating the effective plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialState {
    None,
    Active,
    Expired,
}

impl fmt::Display for TrialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrialState::None => "none",
            TrialState::Active => "active",
            TrialState::Expired => "expired",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// SubscriptionRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub plan: Plan,
    #[serde(default)]
    pub is_trial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionRecord {
    /// The signup default: free, no trial, no admin.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            plan: Plan::Free,
            is_trial: false,
            trial_code: None,
            expires_at: None,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn trial_state(&self, now: DateTime<Utc>) -> TrialState {
        if !self.is_trial {
            return TrialState::None;
        }
        match self.expires_at {
            Some(expires_at) if expires_at > now => TrialState::Active,
            // A trial flag without an expiry does not count as active.
            _ => TrialState::Expired,
        }
    }

    /// The plan entitlement checks run against: admins and active trials act
    /// as gold, everything else as the stored plan.
    pub fn effective_plan(&self, now: DateTime<Utc>) -> Plan {
        if self.is_admin {
            return Plan::Gold;
        }
        if self.trial_state(now) == TrialState::Active {
            return Plan::Gold;
        }
        self.plan
    }

    /// True if a trial was ever started, active or not. Guards the one-shot
    /// activation: both the flag and a recorded code count as history.
    pub fn has_trial_history(&self) -> bool {
        self.is_trial || self.trial_code.is_some()
    }

    /// One-shot transition to an active trial. Fails with `AlreadyTrialed` on
    /// any trial history, even an expired one.
    pub fn activate_trial(&mut self, code: Option<&str>, now: DateTime<Utc>) -> Result<()> {
        if self.has_trial_history() {
            return Err(Error::AlreadyTrialed);
        }
        self.is_trial = true;
        self.trial_code = code.map(|c| c.to_string());
        self.expires_at = Some(now + Duration::days(TRIAL_LENGTH_DAYS));
        self.updated_at = now;
        Ok(())
    }

    /// Whole days until the trial expires, rounded up, clamped to 0.
    pub fn remaining_trial_days(&self, now: DateTime<Utc>) -> i64 {
        match self.expires_at {
            Some(expires_at) => {
                let seconds = (expires_at - now).num_seconds();
                if seconds <= 0 {
                    0
                } else {
                    (seconds + 86_399) / 86_400
                }
            }
            None => 0,
        }
    }
}

impl Default for SubscriptionRecord {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
