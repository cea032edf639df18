//! Workspace discovery under the host's storage root.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::chat::core::config::ReaderConfig;
use crate::chat::core::errors::{ReaderError, ReaderResult};

/// Finds workspace store files, most recently modified first.
#[derive(Clone, Debug)]
pub struct WorkspaceLocator {
    root: PathBuf,
    store_file_name: String,
    store_file: Option<PathBuf>,
}

impl WorkspaceLocator {
    /// Locator for the root and store settings of `config`.
    #[must_use]
    pub fn new(config: &ReaderConfig) -> Self {
        Self {
            root: config.workspace_root.clone(),
            store_file_name: config.store_file_name.clone(),
            store_file: config.store_file.clone(),
        }
    }

    /// Storage root being scanned.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store files ordered by modification time, newest first (path breaks ties).
    ///
    /// With an explicit store file only that file is returned.
    ///
    /// # Errors
    /// Returns [`ReaderError::NotFound`] if the root cannot be listed or the
    /// explicit store file does not exist.
    pub fn find_workspaces(&self) -> ReaderResult<Vec<PathBuf>> {
        if let Some(file) = &self.store_file {
            if file.is_file() {
                return Ok(vec![file.clone()]);
            }
            return Err(ReaderError::NotFound(format!(
                "store file {} does not exist",
                file.display()
            )));
        }

        let entries = fs::read_dir(&self.root).map_err(|err| {
            ReaderError::NotFound(format!(
                "workspace root {} is not readable: {err}",
                self.root.display()
            ))
        })?;

        let mut found: Vec<(SystemTime, PathBuf)> = Vec::new();
        for entry in entries.flatten() {
            let candidate = entry.path().join(&self.store_file_name);
            let Ok(meta) = fs::metadata(&candidate) else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let modified = meta.modified().unwrap_or(UNIX_EPOCH);
            found.push((modified, candidate));
        }

        found.sort_by(|(a_time, a_path), (b_time, b_path)| {
            b_time.cmp(a_time).then_with(|| a_path.cmp(b_path))
        });
        debug!(root = %self.root.display(), count = found.len(), "Located workspaces");

        Ok(found.into_iter().map(|(_, path)| path).collect())
    }

    /// Most recently modified store file.
    ///
    /// # Errors
    /// Returns [`ReaderError::NotFound`] when no workspace exists.
    pub fn latest_workspace(&self) -> ReaderResult<PathBuf> {
        self.find_workspaces()?.into_iter().next().ok_or_else(|| {
            ReaderError::NotFound(format!("no workspaces under {}", self.root.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::testing::{set_mtime, write_workspace};

    fn locator(root: &Path) -> WorkspaceLocator {
        WorkspaceLocator::new(&ReaderConfig::new().with_root(root))
    }

    #[test]
    fn orders_newest_first_with_path_tiebreak() {
        let tmp = tempfile::tempdir().unwrap();
        let old = write_workspace(tmp.path(), "old", &[]);
        let new = write_workspace(tmp.path(), "new", &[]);
        let tie_b = write_workspace(tmp.path(), "tie-b", &[]);
        let tie_a = write_workspace(tmp.path(), "tie-a", &[]);
        set_mtime(&old, 1_000);
        set_mtime(&new, 3_000);
        set_mtime(&tie_b, 2_000);
        set_mtime(&tie_a, 2_000);
        fs::create_dir_all(tmp.path().join("no-store")).unwrap();

        let found = locator(tmp.path()).find_workspaces().unwrap();
        assert_eq!(found, [new.clone(), tie_a, tie_b, old]);
        assert_eq!(locator(tmp.path()).latest_workspace().unwrap(), new);
    }

    #[test]
    fn missing_root_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let absent = locator(&tmp.path().join("absent"));
        assert_eq!(absent.root(), tmp.path().join("absent"));
        let err = absent.find_workspaces().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn empty_root_has_no_latest() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(locator(tmp.path()).find_workspaces().unwrap().is_empty());
        assert!(locator(tmp.path()).latest_workspace().unwrap_err().is_not_found());
    }

    #[test]
    fn explicit_store_file_short_circuits_discovery() {
        let tmp = tempfile::tempdir().unwrap();
        let pinned = write_workspace(tmp.path(), "pinned", &[]);
        write_workspace(tmp.path(), "other", &[]);

        let config = ReaderConfig::new()
            .with_root(tmp.path())
            .with_store_file(&pinned);
        let found = WorkspaceLocator::new(&config).find_workspaces().unwrap();
        assert_eq!(found, [pinned]);

        let config = ReaderConfig::new().with_store_file(tmp.path().join("nope.vscdb"));
        let err = WorkspaceLocator::new(&config).find_workspaces().unwrap_err();
        assert!(err.is_not_found());
    }
}
