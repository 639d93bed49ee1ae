//! Local draft persistence: a small key-value store plus the debounce that
//! decides when an edited step gets written.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use serde::{de::DeserializeOwned, Serialize};

pub const DRAFT_PREFIX: &str = "course-wizard";
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

pub fn draft_key(suffix: impl std::fmt::Display) -> String {
    format!("{DRAFT_PREFIX}:{suffix}")
}

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("draft storage failed: {0}")]
    Io(#[from] io::Error),
    #[error("draft is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// String values by key. Last writer wins.
pub trait DraftStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, DraftError>;
    fn set(&self, key: &str, value: &str) -> Result<(), DraftError>;
    fn remove(&self, key: &str) -> Result<(), DraftError>;
}

/// In-memory drafts. Clones share the same map, so a clone handed to a fresh
/// wizard behaves like the same browser storage after a reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl DraftStore for MemoryDraftStore {
    fn get(&self, key: &str) -> Result<Option<String>, DraftError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DraftError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DraftError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// One JSON file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, DraftError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileDraftStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl DraftStore for FileDraftStore {
    fn get(&self, key: &str) -> Result<Option<String>, DraftError> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DraftError> {
        fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DraftError> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Reads and decodes a draft. A draft that no longer decodes is dropped.
pub fn load<T: DeserializeOwned>(store: &dyn DraftStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(key, error = %e, "could not read draft");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding corrupt draft");
            if let Err(e) = store.remove(key) {
                tracing::warn!(key, error = %e, "could not remove corrupt draft");
            }
            None
        }
    }
}

pub fn save<T: Serialize>(store: &dyn DraftStore, key: &str, value: &T) -> Result<(), DraftError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Trailing-edge debounce driven by caller-supplied instants.
#[derive(Debug, Clone, Copy)]
pub struct Debounce {
    window: Duration,
    due: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Debounce { window, due: None }
    }

    /// Restarts the window from `now`.
    pub fn touch(&mut self, now: Instant) {
        self.due = Some(now + self.window);
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// True once per window, when `now` has reached the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }
}

impl Default for Debounce {
    fn default() -> Self {
        Debounce::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debounce_waits_for_quiet_window() {
        let start = Instant::now();
        let mut debounce = Debounce::default();
        assert!(!debounce.fire(start));

        debounce.touch(start);
        debounce.touch(start + Duration::from_millis(300));
        assert!(!debounce.fire(start + Duration::from_millis(600)));
        assert!(debounce.fire(start + Duration::from_millis(800)));
        assert!(!debounce.is_pending());
        assert!(!debounce.fire(start + Duration::from_millis(900)));
    }

    #[test]
    fn corrupt_draft_is_discarded() {
        let store = MemoryDraftStore::new();
        store.set("course-wizard:1", "{not json").unwrap();

        let loaded: Option<Vec<String>> = load(&store, "course-wizard:1");
        assert!(loaded.is_none());
        assert!(store.get("course-wizard:1").unwrap().is_none());
    }

    #[test]
    fn file_store_round_trips_and_removes() {
        let dir = std::env::temp_dir().join(format!("course-drafts-{}", uuid::Uuid::new_v4()));
        let store = FileDraftStore::open(&dir).unwrap();
        let key = draft_key(2);

        save(&store, &key, &vec!["Intro".to_string()]).unwrap();
        let loaded: Option<Vec<String>> = load(&store, &key);
        assert_eq!(loaded, Some(vec!["Intro".to_string()]));

        store.remove(&key).unwrap();
        store.remove(&key).unwrap();
        assert!(store.get(&key).unwrap().is_none());

        fs::remove_dir_all(dir).unwrap();
    }
}
