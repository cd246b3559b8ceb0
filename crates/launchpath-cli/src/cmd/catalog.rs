use crate::cmd::open_ctx;
use crate::output::{print_json, print_table};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum CatalogSubcommand {
    /// List every phase with its tier and prerequisites
    List,

    /// Show one phase definition
    Show { phase: String },
}

pub fn run(data_root: &Path, subcommand: CatalogSubcommand, json: bool) -> anyhow::Result<()> {
    let ctx = open_ctx(data_root)?;

    match subcommand {
        CatalogSubcommand::List => {
            if json {
                return print_json(&ctx.catalog.definitions());
            }
            let rows: Vec<Vec<String>> = ctx
                .catalog
                .definitions()
                .iter()
                .map(|d| {
                    vec![
                        d.id.clone(),
                        d.title.clone(),
                        d.required_plan.to_string(),
                        d.depends_on.join(", "),
                    ]
                })
                .collect();
            print_table(&["PHASE", "TITLE", "PLAN", "DEPENDS ON"], rows);
        }
        CatalogSubcommand::Show { phase } => {
            let definition = ctx.catalog.definition(&phase)?;
            if json {
                return print_json(definition);
            }
            println!("{} — {}", definition.id, definition.title);
            println!("  required plan: {}", definition.required_plan);
            if definition.depends_on.is_empty() {
                println!("  depends on: (entry phase)");
            } else {
                println!("  depends on: {}", definition.depends_on.join(", "));
            }
        }
    }
    Ok(())
}
