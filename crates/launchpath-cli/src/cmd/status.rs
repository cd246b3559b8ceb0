use crate::cmd::open_ctx;
use crate::output::{print_json, print_table};
use chrono::Utc;
use launchpath_core::entitlement::{EntitlementEngine, PhaseDecision};
use launchpath_core::subscription::TrialState;
use std::path::Path;

pub fn run(data_root: &Path, user: &str, json: bool) -> anyhow::Result<()> {
    let ctx = open_ctx(data_root)?;
    let now = Utc::now();

    let subscription = ctx.store.subscription(user)?;
    let completions = ctx.store.completions_for(user)?;
    let engine = EntitlementEngine::new(&ctx.catalog);
    let decisions = engine.decide_all(&subscription, &completions, now)?;
    let progress = engine.completion_percentage(&completions);
    let trial_state = subscription.trial_state(now);

    if json {
        #[derive(serde::Serialize)]
        struct PhaseEntry<'a> {
            id: &'a str,
            title: &'a str,
            #[serde(flatten)]
            decision: PhaseDecision,
        }

        #[derive(serde::Serialize)]
        struct StatusOutput<'a> {
            user: &'a str,
            plan: String,
            effective_plan: String,
            trial: String,
            trial_days_left: i64,
            is_admin: bool,
            progress_percent: u8,
            phases: Vec<PhaseEntry<'a>>,
        }

        // decide_all walks the catalog in order, so the two line up.
        let phases: Vec<PhaseEntry> = ctx
            .catalog
            .definitions()
            .iter()
            .zip(&decisions)
            .map(|(definition, (id, decision))| PhaseEntry {
                id: *id,
                title: &definition.title,
                decision: *decision,
            })
            .collect();

        let output = StatusOutput {
            user,
            plan: subscription.plan.to_string(),
            effective_plan: subscription.effective_plan(now).to_string(),
            trial: trial_state.to_string(),
            trial_days_left: subscription.remaining_trial_days(now),
            is_admin: subscription.is_admin,
            progress_percent: progress,
            phases,
        };
        return print_json(&output);
    }

    // -- Human-readable output ------------------------------------------------

    println!("Account: {user}");
    println!("Plan: {}", subscription.plan);
    if subscription.is_admin {
        println!("Admin: yes");
    }
    match trial_state {
        TrialState::None => {}
        TrialState::Active => println!(
            "Trial: active ({} day(s) left)",
            subscription.remaining_trial_days(now)
        ),
        TrialState::Expired => println!("Trial: expired"),
    }

    println!();
    let rows: Vec<Vec<String>> = decisions
        .iter()
        .map(|(id, d)| {
            let state = if d.is_completed {
                "completed"
            } else if d.is_unlocked {
                "unlocked"
            } else if !d.has_required_plan {
                "upgrade required"
            } else {
                "locked"
            };
            vec![id.to_string(), d.required_plan.to_string(), state.to_string()]
        })
        .collect();
    print_table(&["PHASE", "PLAN", "STATE"], rows);

    println!("\nProgress: {progress}%");
    Ok(())
}
