//! JSON file progress store

use std::fs;
use std::path::{Path, PathBuf};

use super::{PersistedProgress, ProgressStore, Result};

/// Stores progress as a single JSON document, written via temp file + rename.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for JsonFileStore {
    fn load(&self) -> Result<Option<PersistedProgress>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        let progress = serde_json::from_str(&json)?;
        log::debug!("Loaded progress from {}", self.path.display());
        Ok(Some(progress))
    }

    fn save(&mut self, progress: &PersistedProgress) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(progress)?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;

        log::debug!("Saved progress to {}", self.path.display());
        Ok(())
    }
}
