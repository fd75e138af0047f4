//! Storage for the installation record.

use std::path::{Path, PathBuf};

use livebot_models::InstallationRecord;
use tracing::debug;

use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::Result;

/// File name of the installation record inside the state directory.
pub const INSTALLATION_FILE: &str = "installation.json";

/// Persists the single [`InstallationRecord`] of this deployment.
///
/// ```text
/// state_dir/
/// └── installation.json   # {"refresh_token": ..., "bot_id": ...}
/// ```
#[derive(Debug, Clone)]
pub struct InstallationStore {
    path: PathBuf,
}

impl InstallationStore {
    /// Creates a store keeping its record under `state_dir`.
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(INSTALLATION_FILE),
        }
    }

    /// Creates a store backed by an explicit file path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the record. A missing file means "not installed yet".
    pub fn load(&self) -> Result<Option<InstallationRecord>> {
        let record: Option<InstallationRecord> = read_json_optional(&self.path)?;
        debug!(path = %self.path.display(), found = record.is_some(), "Loaded installation record");
        Ok(record)
    }

    /// Saves the record, replacing any previous one.
    pub fn save(&self, record: &InstallationRecord) -> Result<()> {
        atomic_write_json(&self.path, record)?;
        debug!(path = %self.path.display(), bot_id = %record.bot_id, "Saved installation record");
        Ok(())
    }
}
