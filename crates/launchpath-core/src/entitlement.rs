use crate::catalog::PlanCatalog;
use crate::error::Result;
use crate::ledger::CompletionSet;
use crate::subscription::SubscriptionRecord;
use crate::types::Plan;
use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// PhaseDecision
// ---------------------------------------------------------------------------

/// The answer the UI layer renders lock/unlock affordances from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseDecision {
    pub is_unlocked: bool,
    pub is_completed: bool,
    pub is_included_in_plan: bool,
    pub required_plan: Plan,
    pub has_required_plan: bool,
}

// ---------------------------------------------------------------------------
// EntitlementEngine
// ---------------------------------------------------------------------------

/// Pure query layer over externally-fetched snapshots. Reads the catalog and
/// the passed-in subscription/completion state; never performs I/O or writes.
pub struct EntitlementEngine<'a> {
    catalog: &'a PlanCatalog,
}

impl<'a> EntitlementEngine<'a> {
    pub fn new(catalog: &'a PlanCatalog) -> Self {
        Self { catalog }
    }

    /// Decide lock state for one phase.
    ///
    /// The plan gate dominates: a phase outside the effective plan stays
    /// locked no matter what has been completed. Within the plan, the
    /// prerequisite check is set membership — dependencies may have been
    /// completed in any order. Admins bypass the plan tier only; prerequisites
    /// still apply to them.
    pub fn decide(
        &self,
        phase_id: &str,
        subscription: &SubscriptionRecord,
        completions: &CompletionSet,
        now: DateTime<Utc>,
    ) -> Result<PhaseDecision> {
        let definition = self.catalog.definition(phase_id)?;

        let effective = subscription.effective_plan(now);
        let has_required_plan = effective.rank() >= definition.required_plan.rank();
        let is_included_in_plan = has_required_plan;

        let is_unlocked = is_included_in_plan
            && definition
                .depends_on
                .iter()
                .all(|dep| completions.contains(dep));

        Ok(PhaseDecision {
            is_unlocked,
            is_completed: completions.contains(phase_id),
            is_included_in_plan,
            required_plan: definition.required_plan,
            has_required_plan,
        })
    }

    /// Decisions for every phase, in catalog order.
    pub fn decide_all(
        &self,
        subscription: &SubscriptionRecord,
        completions: &CompletionSet,
        now: DateTime<Utc>,
    ) -> Result<Vec<(&'a str, PhaseDecision)>> {
        let mut decisions = Vec::with_capacity(self.catalog.len());
        for definition in self.catalog.definitions() {
            let decision = self.decide(&definition.id, subscription, completions, now)?;
            decisions.push((definition.id.as_str(), decision));
        }
        Ok(decisions)
    }

    /// Share of catalog phases completed, as a whole percentage rounded to
    /// nearest. Completions outside the catalog are ignored; an empty catalog
    /// reads as 0.
    pub fn completion_percentage(&self, completions: &CompletionSet) -> u8 {
        let total = self.catalog.len();
        if total == 0 {
            return 0;
        }
        let done = self
            .catalog
            .phase_ids()
            .filter(|id| completions.contains(*id))
            .count();
        ((done * 100 + total / 2) / total) as u8
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PhaseDefinition;
    use chrono::Duration;

    fn catalog() -> PlanCatalog {
        PlanCatalog::builtin()
    }

    fn free_subscription() -> SubscriptionRecord {
        SubscriptionRecord::new()
    }

    fn completed(ids: &[&str]) -> CompletionSet {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn entry_phase_unlocked_for_free_user() {
        let catalog = catalog();
        let engine = EntitlementEngine::new(&catalog);
        let decision = engine
            .decide("buyer-persona", &free_subscription(), &completed(&[]), Utc::now())
            .unwrap();
        assert!(decision.is_unlocked);
        assert!(!decision.is_completed);
        assert!(decision.has_required_plan);
    }

    #[test]
    fn plan_gate_dominates_completions() {
        let catalog = catalog();
        let engine = EntitlementEngine::new(&catalog);
        // Every prerequisite completed, but content-generator needs pro.
        let all: CompletionSet = catalog.phase_ids().map(|s| s.to_string()).collect();
        let decision = engine
            .decide("content-generator", &free_subscription(), &all, Utc::now())
            .unwrap();
        assert!(!decision.has_required_plan);
        assert!(!decision.is_included_in_plan);
        assert!(!decision.is_unlocked);
        assert_eq!(decision.required_plan, Plan::Pro);
    }

    #[test]
    fn dependency_set_is_order_independent() {
        let catalog = catalog();
        let engine = EntitlementEngine::new(&catalog);
        let mut sub = free_subscription();
        sub.plan = Plan::Pro;
        let now = Utc::now();

        // content-strategy depends on buyer-persona and business-canvas.
        for order in [
            &["buyer-persona", "business-canvas"][..],
            &["business-canvas", "buyer-persona"][..],
        ] {
            let decision = engine
                .decide("content-strategy", &sub, &completed(order), now)
                .unwrap();
            assert!(decision.is_unlocked);
        }

        let partial = engine
            .decide("content-strategy", &sub, &completed(&["buyer-persona"]), now)
            .unwrap();
        assert!(!partial.is_unlocked);
        assert!(partial.has_required_plan);
    }

    #[test]
    fn admin_bypasses_plan_but_not_dependencies() {
        let catalog = catalog();
        let engine = EntitlementEngine::new(&catalog);
        let mut sub = free_subscription();
        sub.is_admin = true;
        let now = Utc::now();

        // Gold-tier with unmet prerequisites: plan passes, lock holds.
        let agency = engine.decide("agency", &sub, &completed(&[]), now).unwrap();
        assert!(agency.has_required_plan);
        assert!(!agency.is_unlocked);

        // Gold-tier entry phase: fully unlocked.
        let affiliate = engine
            .decide("affiliate-program", &sub, &completed(&[]), now)
            .unwrap();
        assert!(affiliate.is_unlocked);
    }

    #[test]
    fn active_trial_unlocks_gold_tier() {
        let catalog = catalog();
        let engine = EntitlementEngine::new(&catalog);
        let now = Utc::now();
        let mut sub = free_subscription();
        sub.is_trial = true;
        sub.expires_at = Some(now + Duration::hours(1));

        let decision = engine
            .decide("affiliate-program", &sub, &completed(&[]), now)
            .unwrap();
        assert!(decision.has_required_plan);
        assert!(decision.is_unlocked);
    }

    #[test]
    fn expired_trial_reverts_to_free() {
        let catalog = catalog();
        let engine = EntitlementEngine::new(&catalog);
        let now = Utc::now();
        let mut sub = free_subscription();
        sub.is_trial = true;
        sub.expires_at = Some(now - Duration::hours(1));

        let decision = engine
            .decide("affiliate-program", &sub, &completed(&[]), now)
            .unwrap();
        assert!(!decision.has_required_plan);
        assert!(!decision.is_unlocked);
    }

    #[test]
    fn completed_phase_reported() {
        let catalog = catalog();
        let engine = EntitlementEngine::new(&catalog);
        let decision = engine
            .decide(
                "buyer-persona",
                &free_subscription(),
                &completed(&["buyer-persona"]),
                Utc::now(),
            )
            .unwrap();
        assert!(decision.is_completed);
    }

    #[test]
    fn historical_completion_survives_plan_downgrade() {
        let catalog = catalog();
        let engine = EntitlementEngine::new(&catalog);
        // User completed a pro phase, then dropped to free: still completed,
        // no longer included in plan.
        let decision = engine
            .decide(
                "content-strategy",
                &free_subscription(),
                &completed(&["buyer-persona", "business-canvas", "content-strategy"]),
                Utc::now(),
            )
            .unwrap();
        assert!(decision.is_completed);
        assert!(!decision.is_included_in_plan);
    }

    #[test]
    fn unknown_phase_is_an_error() {
        let catalog = catalog();
        let engine = EntitlementEngine::new(&catalog);
        assert!(engine
            .decide("nope", &free_subscription(), &completed(&[]), Utc::now())
            .is_err());
    }

    #[test]
    fn decide_all_covers_catalog_in_order() {
        let catalog = catalog();
        let engine = EntitlementEngine::new(&catalog);
        let decisions = engine
            .decide_all(&free_subscription(), &completed(&[]), Utc::now())
            .unwrap();
        assert_eq!(decisions.len(), catalog.len());
        assert_eq!(decisions[0].0, "buyer-persona");
    }

    #[test]
    fn completion_percentage_bounds() {
        let catalog = catalog();
        let engine = EntitlementEngine::new(&catalog);

        assert_eq!(engine.completion_percentage(&completed(&[])), 0);

        let half: CompletionSet = catalog.phase_ids().take(5).map(|s| s.to_string()).collect();
        assert_eq!(engine.completion_percentage(&half), 50);

        let all: CompletionSet = catalog.phase_ids().map(|s| s.to_string()).collect();
        assert_eq!(engine.completion_percentage(&all), 100);
    }

    #[test]
    fn completion_percentage_ignores_foreign_ids() {
        let catalog = catalog();
        let engine = EntitlementEngine::new(&catalog);
        let ghost = completed(&["retired-tool"]);
        assert_eq!(engine.completion_percentage(&ghost), 0);
    }

    #[test]
    fn completion_percentage_empty_catalog_is_zero() {
        let empty = PlanCatalog::from_definitions(Vec::<PhaseDefinition>::new()).unwrap();
        let engine = EntitlementEngine::new(&empty);
        assert_eq!(engine.completion_percentage(&completed(&["anything"])), 0);
    }

    #[test]
    fn completion_percentage_rounds_to_nearest() {
        let defs: Vec<PhaseDefinition> = (0..3)
            .map(|i| PhaseDefinition {
                id: format!("p{i}"),
                title: format!("p{i}"),
                required_plan: Plan::Free,
                depends_on: Vec::new(),
            })
            .collect();
        let catalog = PlanCatalog::from_definitions(defs).unwrap();
        let engine = EntitlementEngine::new(&catalog);
        // 1/3 = 33.33 → 33, 2/3 = 66.67 → 67
        assert_eq!(engine.completion_percentage(&completed(&["p0"])), 33);
        assert_eq!(engine.completion_percentage(&completed(&["p0", "p1"])), 67);
    }
}
