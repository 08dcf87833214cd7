//! Cross-run progress persistence
//!
//! Gold, the current level and the item collection outlive a single run.
//! Sessions read them from a [`ProgressStore`] handed in at construction and
//! write them back when the run ends; there is no process-wide state.

pub mod file;
pub mod sync;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use file::JsonFileStore;
pub use sync::{LootPayload, UserStatePayload};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// State that persists between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedProgress {
    pub gold: i64,
    pub current_level: i32,
    /// Owned item ids, in acquisition order
    pub owned_items: Vec<String>,
    /// Equipped item ids (a subset of `owned_items`)
    pub equipped_items: Vec<String>,
}

impl Default for PersistedProgress {
    fn default() -> Self {
        Self {
            gold: 0,
            current_level: 1,
            owned_items: Vec::new(),
            equipped_items: Vec::new(),
        }
    }
}

impl PersistedProgress {
    /// Add an owned item; duplicates are ignored
    pub fn grant(&mut self, id: &str) -> bool {
        if self.owns(id) {
            return false;
        }
        self.owned_items.push(id.to_string());
        true
    }

    pub fn owns(&self, id: &str) -> bool {
        self.owned_items.iter().any(|owned| owned == id)
    }

    /// Equip an owned item. Returns false if the item is not owned.
    pub fn equip(&mut self, id: &str) -> bool {
        if !self.owns(id) {
            return false;
        }
        if !self.equipped_items.iter().any(|e| e == id) {
            self.equipped_items.push(id.to_string());
        }
        true
    }

    pub fn unequip(&mut self, id: &str) {
        self.equipped_items.retain(|e| e != id);
    }

    /// Drop equipped ids that are no longer owned and clamp nonsensical values
    pub fn normalize(&mut self) {
        let owned = self.owned_items.clone();
        self.equipped_items.retain(|e| owned.contains(e));
        self.current_level = self.current_level.max(1);
        self.gold = self.gold.max(0);
    }
}

/// Storage for [`PersistedProgress`]
pub trait ProgressStore {
    /// Load saved progress, `None` if nothing was saved yet
    fn load(&self) -> Result<Option<PersistedProgress>>;

    fn save(&mut self, progress: &PersistedProgress) -> Result<()>;

    /// Load saved progress, falling back to defaults on absence or error
    fn load_or_default(&self) -> PersistedProgress {
        match self.load() {
            Ok(Some(mut progress)) => {
                progress.normalize();
                progress
            }
            Ok(None) => {
                log::info!("No saved progress, starting fresh");
                PersistedProgress::default()
            }
            Err(e) => {
                log::warn!("Failed to load progress, starting fresh: {}", e);
                PersistedProgress::default()
            }
        }
    }
}

/// In-memory store for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    progress: Option<PersistedProgress>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(progress: PersistedProgress) -> Self {
        Self {
            progress: Some(progress),
        }
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Result<Option<PersistedProgress>> {
        Ok(self.progress.clone())
    }

    fn save(&mut self, progress: &PersistedProgress) -> Result<()> {
        self.progress = Some(progress.clone());
        Ok(())
    }
}
