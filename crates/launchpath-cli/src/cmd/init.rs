use anyhow::Context;
use launchpath_core::catalog::PlanCatalog;
use launchpath_core::store::ProfileStore;
use std::path::Path;

use crate::root;

pub fn run(data_root: &Path) -> anyhow::Result<()> {
    let dir = root::data_dir(data_root);
    std::fs::create_dir_all(&dir).context("failed to create data directory")?;

    let catalog_path = root::catalog_path(data_root);
    if !catalog_path.exists() {
        let catalog = PlanCatalog::builtin();
        std::fs::write(&catalog_path, catalog.to_yaml()?)
            .context("failed to write default catalog")?;
        println!("Wrote {}", catalog_path.display());
    }

    // Opening creates the database and its tables.
    ProfileStore::open(&root::db_path(data_root)).context("failed to create profile store")?;

    println!("Initialized launchpath in {}", dir.display());
    Ok(())
}
