use crate::cmd::open_ctx;
use crate::output::print_json;
use chrono::Utc;
use clap::Subcommand;
use launchpath_core::subscription::TrialState;
use std::path::Path;

#[derive(Subcommand)]
pub enum TrialSubcommand {
    /// Start the 7-day trial (one-shot per account)
    Activate {
        /// Optional promo code to record with the activation
        #[arg(long)]
        code: Option<String>,
    },

    /// Show trial state and remaining days
    Status,
}

pub fn run(
    data_root: &Path,
    user: &str,
    subcommand: TrialSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let ctx = open_ctx(data_root)?;
    let now = Utc::now();

    match subcommand {
        TrialSubcommand::Activate { code } => {
            let record = ctx.store.activate_trial(user, code.as_deref(), now)?;
            if json {
                return print_json(&record);
            }
            println!(
                "Trial activated: {} day(s), expires {}",
                record.remaining_trial_days(now),
                record
                    .expires_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default()
            );
        }
        TrialSubcommand::Status => {
            let record = ctx.store.subscription(user)?;
            let state = record.trial_state(now);
            if json {
                #[derive(serde::Serialize)]
                struct TrialOutput<'a> {
                    state: String,
                    days_left: i64,
                    code: Option<&'a str>,
                }
                return print_json(&TrialOutput {
                    state: state.to_string(),
                    days_left: record.remaining_trial_days(now),
                    code: record.trial_code.as_deref(),
                });
            }
            match state {
                TrialState::None => println!("No trial on this account."),
                TrialState::Active => println!(
                    "Trial active: {} day(s) left",
                    record.remaining_trial_days(now)
                ),
                TrialState::Expired => println!("Trial expired."),
            }
        }
    }
    Ok(())
}
