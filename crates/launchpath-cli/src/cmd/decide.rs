use crate::cmd::open_ctx;
use crate::output::print_json;
use chrono::Utc;
use launchpath_core::entitlement::EntitlementEngine;
use std::path::Path;

pub fn run(data_root: &Path, user: &str, phase: &str, json: bool) -> anyhow::Result<()> {
    let ctx = open_ctx(data_root)?;
    let now = Utc::now();

    let subscription = ctx.store.subscription(user)?;
    let completions = ctx.store.completions_for(user)?;
    let engine = EntitlementEngine::new(&ctx.catalog);
    let decision = engine.decide(phase, &subscription, &completions, now)?;

    if json {
        return print_json(&decision);
    }

    let definition = ctx.catalog.definition(phase)?;
    println!("{} — {}", definition.id, definition.title);
    println!("  required plan: {}", decision.required_plan);
    println!(
        "  included in plan: {}",
        if decision.has_required_plan { "yes" } else { "no" }
    );
    println!(
        "  unlocked: {}",
        if decision.is_unlocked { "yes" } else { "no" }
    );
    println!(
        "  completed: {}",
        if decision.is_completed { "yes" } else { "no" }
    );
    if !decision.is_unlocked && decision.has_required_plan {
        let missing: Vec<&str> = definition
            .depends_on
            .iter()
            .filter(|dep| !completions.contains(*dep))
            .map(|s| s.as_str())
            .collect();
        if !missing.is_empty() {
            println!("  waiting on: {}", missing.join(", "));
        }
    }
    Ok(())
}
