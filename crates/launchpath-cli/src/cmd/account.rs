use crate::cmd::open_ctx;
use crate::output::print_json;
use chrono::Utc;
use clap::Subcommand;
use launchpath_core::types::Plan;
use std::path::Path;
use std::str::FromStr;

#[derive(Subcommand)]
pub enum AccountSubcommand {
    /// Show the stored subscription record
    Show,

    /// Set the stored plan (stand-in for the payment webhook)
    SetPlan { plan: String },

    /// Grant the admin override
    GrantAdmin,

    /// Revoke the admin override
    RevokeAdmin,
}

pub fn run(
    data_root: &Path,
    user: &str,
    subcommand: AccountSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let ctx = open_ctx(data_root)?;
    let now = Utc::now();

    match subcommand {
        AccountSubcommand::Show => {
            let record = ctx.store.subscription(user)?;
            if json {
                return print_json(&record);
            }
            println!("Account: {user}");
            println!("Plan: {}", record.plan);
            println!("Effective plan: {}", record.effective_plan(now));
            println!("Trial: {}", record.trial_state(now));
            println!("Admin: {}", if record.is_admin { "yes" } else { "no" });
        }
        AccountSubcommand::SetPlan { plan } => {
            let plan = Plan::from_str(&plan)?;
            let mut record = ctx.store.subscription(user)?;
            record.plan = plan;
            record.updated_at = now;
            ctx.store.put_subscription(user, &record)?;
            println!("Plan set to {plan} for {user}.");
        }
        AccountSubcommand::GrantAdmin => {
            let mut record = ctx.store.subscription(user)?;
            record.is_admin = true;
            record.updated_at = now;
            ctx.store.put_subscription(user, &record)?;
            println!("Admin granted to {user}.");
        }
        AccountSubcommand::RevokeAdmin => {
            let mut record = ctx.store.subscription(user)?;
            record.is_admin = false;
            record.updated_at = now;
            ctx.store.put_subscription(user, &record)?;
            println!("Admin revoked from {user}.");
        }
    }
    Ok(())
}
