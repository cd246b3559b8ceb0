mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{account::AccountSubcommand, catalog::CatalogSubcommand, trial::TrialSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "launchpath",
    about = "Plan/phase progression engine — decide unlocks, record completions, manage trials",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data root (default: auto-detect from .launchpath/ or .git/)
    #[arg(long, global = true, env = "LAUNCHPATH_ROOT")]
    root: Option<PathBuf>,

    /// Account the command operates on
    #[arg(long, global = true, env = "LAUNCHPATH_USER", default_value = "default")]
    user: String,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and write the default catalog
    Init,

    /// Show the account's per-phase decisions and overall progress
    Status,

    /// Decide lock state for a single phase
    Decide { phase: String },

    /// Mark a phase complete
    Complete { phase: String },

    /// Manage the free trial
    Trial {
        #[command(subcommand)]
        subcommand: TrialSubcommand,
    },

    /// Inspect or change the subscription record
    Account {
        #[command(subcommand)]
        subcommand: AccountSubcommand,
    },

    /// Inspect the phase catalog
    Catalog {
        #[command(subcommand)]
        subcommand: CatalogSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Status => cmd::status::run(&root, &cli.user, cli.json),
        Commands::Decide { phase } => cmd::decide::run(&root, &cli.user, &phase, cli.json),
        Commands::Complete { phase } => cmd::complete::run(&root, &cli.user, &phase, cli.json),
        Commands::Trial { subcommand } => cmd::trial::run(&root, &cli.user, subcommand, cli.json),
        Commands::Account { subcommand } => {
            cmd::account::run(&root, &cli.user, subcommand, cli.json)
        }
        Commands::Catalog { subcommand } => cmd::catalog::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
