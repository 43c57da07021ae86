//! Storage backends for the layout store.
//!
//! The store is written against the [`Storage`] trait so the persistence
//! layer can be swapped for an in-memory fake in tests. Production uses
//! [`FileStorage`], one JSON file per key under a state directory.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures a backend can report. The store itself never surfaces these;
/// reads degrade to an empty state and writes are logged and dropped.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Keyed string storage. `read` returns `Ok(None)` for an absent key.
pub trait Storage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// =============================================================================
// File backend
// =============================================================================

/// File-per-key backend: `<dir>/<key>.json`.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default state directory: `$FRAGMENT_DESK_STATE_DIR`, else
    /// `$XDG_STATE_HOME/fragment-desk`, else `$HOME/.local/state/fragment-desk`,
    /// falling back to the working directory when none resolve.
    pub fn default_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("FRAGMENT_DESK_STATE_DIR") {
            return PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("XDG_STATE_HOME") {
            return Path::new(&dir).join("fragment-desk");
        }
        if let Ok(home) = std::env::var("HOME") {
            return Path::new(&home).join(".local/state/fragment-desk");
        }
        PathBuf::from(".")
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }
}

// =============================================================================
// In-memory backend (tests, headless runs)
// =============================================================================

/// In-memory backend. Nothing persists beyond the process.
#[derive(Default)]
pub struct MemStorage {
    cells: RefCell<HashMap<String, String>>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.cells.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.cells.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
