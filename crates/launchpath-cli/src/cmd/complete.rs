use crate::cmd::open_ctx;
use crate::output::print_json;
use chrono::Utc;
use launchpath_core::entitlement::EntitlementEngine;
use std::path::Path;

pub fn run(data_root: &Path, user: &str, phase: &str, json: bool) -> anyhow::Result<()> {
    let ctx = open_ctx(data_root)?;
    let now = Utc::now();

    let inserted = ctx.store.mark_complete(&ctx.catalog, user, phase, now)?;
    let completions = ctx.store.completions_for(user)?;
    let engine = EntitlementEngine::new(&ctx.catalog);
    let progress = engine.completion_percentage(&completions);

    if json {
        #[derive(serde::Serialize)]
        struct CompleteOutput<'a> {
            phase: &'a str,
            newly_completed: bool,
            progress_percent: u8,
        }
        return print_json(&CompleteOutput {
            phase,
            newly_completed: inserted,
            progress_percent: progress,
        });
    }

    if inserted {
        println!("Marked '{phase}' complete.");
    } else {
        println!("'{phase}' was already complete.");
    }
    println!("Progress: {progress}%");
    Ok(())
}
