pub mod account;
pub mod catalog;
pub mod complete;
pub mod decide;
pub mod init;
pub mod status;
pub mod trial;

use anyhow::{bail, Context};
use launchpath_core::catalog::PlanCatalog;
use launchpath_core::store::ProfileStore;
use std::path::Path;

use crate::root;

/// Everything a command needs: the (possibly operator-overridden) catalog and
/// the per-user profile store.
pub struct Ctx {
    pub catalog: PlanCatalog,
    pub store: ProfileStore,
}

pub fn open_ctx(data_root: &Path) -> anyhow::Result<Ctx> {
    if !root::data_dir(data_root).is_dir() {
        bail!("not initialized: run 'launchpath init'");
    }
    let catalog = PlanCatalog::load_or_builtin(&root::catalog_path(data_root))
        .context("failed to load catalog")?;
    let store =
        ProfileStore::open(&root::db_path(data_root)).context("failed to open profile store")?;
    Ok(Ctx { catalog, store })
}
