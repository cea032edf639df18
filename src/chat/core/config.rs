//! Configuration for the chat reader.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chat::core::errors::{ReaderError, ReaderResult};

/// Environment variable overriding the workspace storage root.
pub const ROOT_ENV_VAR: &str = "CURSOR_WORKSPACE_STORAGE";
/// Environment variable pinning a single workspace store file.
pub const STORE_FILE_ENV_VAR: &str = "CURSOR_WORKSPACE_DB";

/// Top-level configuration for the reader.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Directory holding one subdirectory per workspace.
    pub workspace_root: PathBuf,
    /// Explicit store file; when set, discovery yields only this file.
    pub store_file: Option<PathBuf>,
    /// Fixed store file name inside each workspace directory.
    pub store_file_name: String,
    /// Key/value table inside the store.
    pub table: String,
    /// Role and title heuristics.
    pub heuristics: HeuristicsConfig,
    /// Maximum workspaces read at once by the concurrent listing.
    pub max_concurrent_reads: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            workspace_root: default_workspace_root(),
            store_file: None,
            store_file_name: "state.vscdb".to_string(),
            table: "ItemTable".to_string(),
            heuristics: HeuristicsConfig::default(),
            max_concurrent_reads: 4,
        }
    }
}

impl ReaderConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with the root and store file taken from the environment when set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(root) = std::env::var_os(ROOT_ENV_VAR).filter(|v| !v.is_empty()) {
            config.workspace_root = PathBuf::from(root);
        }
        if let Some(file) = std::env::var_os(STORE_FILE_ENV_VAR).filter(|v| !v.is_empty()) {
            config.store_file = Some(PathBuf::from(file));
        }
        config
    }

    /// Use `root` as the workspace storage directory.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    /// Read only the given store file.
    #[must_use]
    pub fn with_store_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.store_file = Some(file.into());
        self
    }

    /// Set the concurrent read limit.
    #[must_use]
    pub const fn with_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrent_reads = limit;
        self
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ReaderResult<()> {
        if self.store_file_name.trim().is_empty() {
            return Err(ReaderError::InvalidConfig(
                "store_file_name must not be empty".to_string(),
            ));
        }

        // The table name is interpolated into SQL.
        let plain_identifier = !self.table.is_empty()
            && self
                .table
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        if !plain_identifier {
            return Err(ReaderError::InvalidConfig(format!(
                "table must be a plain identifier, got {:?}",
                self.table
            )));
        }

        if self.max_concurrent_reads == 0 {
            return Err(ReaderError::InvalidConfig(
                "max_concurrent_reads must be > 0".to_string(),
            ));
        }

        if self.heuristics.title_max_chars < 4 {
            return Err(ReaderError::InvalidConfig(
                "heuristics.title_max_chars must be >= 4".to_string(),
            ));
        }

        Ok(())
    }
}

/// Thresholds used by the role classifier and title resolver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HeuristicsConfig {
    /// Content longer than this (in chars) falls back to `assistant`.
    pub long_message_chars: usize,
    /// Maximum derived title length, ellipsis included.
    pub title_max_chars: usize,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            long_message_chars: 200,
            title_max_chars: 60,
        }
    }
}

/// Cursor's per-OS workspace storage directory.
#[must_use]
pub fn default_workspace_root() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    if cfg!(target_os = "macos") {
        cursor_user_dir(&home.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        let app_data = std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .or_else(dirs::config_dir)
            .unwrap_or(home);
        cursor_user_dir(&app_data)
    } else if cfg!(target_os = "linux") {
        cursor_user_dir(&home.join(".config"))
    } else {
        home.join(".cursor").join("workspaceStorage")
    }
}

fn cursor_user_dir(base: &Path) -> PathBuf {
    base.join("Cursor").join("User").join("workspaceStorage")
}
