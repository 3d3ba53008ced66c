//! Key/value blob store abstraction used by the ledger and settings.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to create database directory")]
    DirectoryCreation,
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A dumb string blob store. Single-key reads and writes are atomic; there
/// are no multi-key transactions.
pub trait BlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, blob: &str) -> Result<(), StoreError>;
}

/// In-process store, mostly for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, blob: &str) -> Result<(), StoreError> {
        self.blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}
