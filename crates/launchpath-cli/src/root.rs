use std::path::{Path, PathBuf};

pub const DATA_DIR: &str = ".launchpath";
pub const CATALOG_FILE: &str = ".launchpath/catalog.yaml";
pub const DB_FILE: &str = ".launchpath/profiles.db";

pub fn data_dir(root: &Path) -> PathBuf {
    root.join(DATA_DIR)
}

pub fn catalog_path(root: &Path) -> PathBuf {
    root.join(CATALOG_FILE)
}

pub fn db_path(root: &Path) -> PathBuf {
    root.join(DB_FILE)
}

/// Resolve the launchpath data root.
///
/// Priority:
/// 1. `--root` flag / `LAUNCHPATH_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.launchpath/`
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut dir = cwd.clone();
    loop {
        if dir.join(DATA_DIR).is_dir() {
            return dir;
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => break,
        }
    }

    let mut dir = cwd.clone();
    loop {
        if dir.join(".git").is_dir() {
            return dir;
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => break,
        }
    }

    cwd
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            catalog_path(root),
            PathBuf::from("/tmp/proj/.launchpath/catalog.yaml")
        );
        assert_eq!(
            db_path(root),
            PathBuf::from("/tmp/proj/.launchpath/profiles.db")
        );
    }
}
