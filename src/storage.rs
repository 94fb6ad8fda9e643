//! Storage
//!
//! The durable local key/value collaborator carts persist into. The store
//! treats every call here as best-effort; implementations report failures and
//! never have to guarantee durability.

use std::{fs, io, path::PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::records::CartRecord;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to read or write the backing store.
    #[error("failed to read or write cart storage: {0}")]
    Io(#[from] io::Error),

    /// Failed to serialize or parse a cart record.
    #[error("failed to serialize or parse cart record: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// A keyed get/set store for cart records.
pub trait CartStorage {
    /// Load the record stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store is unreadable or the stored
    /// blob does not parse.
    fn load(&self, key: &str) -> Result<Option<CartRecord>, StorageError>;

    /// Store `record` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the record cannot be serialized or
    /// written.
    fn save(&mut self, key: &str, record: &CartRecord) -> Result<(), StorageError>;
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: FxHashMap<String, CartRecord>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<CartRecord>, StorageError> {
        Ok(self.records.get(key).cloned())
    }

    fn save(&mut self, key: &str, record: &CartRecord) -> Result<(), StorageError> {
        self.records.insert(key.to_string(), record.clone());
        Ok(())
    }
}

/// File-backed storage keeping one `<key>.yml` per cart under a base
/// directory.
#[derive(Debug, Clone)]
pub struct YamlFileStorage {
    base_path: PathBuf,
}

impl YamlFileStorage {
    /// Create a store rooted at `base_path`. The directory is created lazily
    /// on first save.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.yml"))
    }
}

impl CartStorage for YamlFileStorage {
    fn load(&self, key: &str) -> Result<Option<CartRecord>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(serde_norway::from_str(&contents)?)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn save(&mut self, key: &str, record: &CartRecord) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path)?;

        let contents = serde_norway::to_string(record)?;
        fs::write(self.path_for(key), contents)?;

        Ok(())
    }
}
