//! SQLite-backed blob store for sessions and settings.

use crate::store::{BlobStore, StoreError};
use directories::ProjectDirs;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::debug;

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens the store in the platform data directory, initializing tables if needed.
    pub fn new() -> Result<Self, StoreError> {
        Self::open(Self::default_path())
    }

    /// Opens (or creates) a store at an explicit path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|_| StoreError::DirectoryCreation)?;
            }
        }

        debug!(path = %path.display(), "opening sqlite store");
        let conn = Connection::open(path)?;
        Self::initialize_tables(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory store (for testing).
    pub fn new_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_tables(&conn)?;
        Ok(Self { conn })
    }

    fn initialize_tables(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        ProjectDirs::from("com", "focusflow", "FocusFlow")
            .map(|dirs| dirs.data_dir().join("focusflow.db"))
            .unwrap_or_else(|| PathBuf::from("focusflow.db"))
    }
}

impl BlobStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, blob: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)",
            [key, blob],
        )?;
        Ok(())
    }
}
