//! SQLite storage
//!
//! Local persistence for:
//! - reference gestures (landmark sequences stored as JSON)
//! - per (user, gesture) practice progress

// ============================================================
// Submodules
// ============================================================

pub mod migrations;
pub mod progress;
pub mod reference;

// ============================================================
// Re-exports
// ============================================================

pub use migrations::run_migrations;
pub use progress::ProgressRepository;
pub use reference::{Difficulty, GestureReference, ReferenceRepository};

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

// ============================================================
// Errors
// ============================================================

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("stored landmarks are invalid: {0}")]
    InvalidLandmarks(#[from] gesture_algo::GestureError),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("lock poisoned: {0}")]
    LockError(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

// ============================================================
// DatabaseManager
// ============================================================

/// Default database location under the platform data directory
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gesture-coach")
        .join("gesture-coach.db")
}

pub(crate) fn lock_connection(conn: &Mutex<Connection>) -> StorageResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| StorageError::LockError(e.to_string()))
}

/// Connection owner; repositories share its connection.
pub struct DatabaseManager {
    connection: Arc<Mutex<Connection>>,
    db_path: String,
}

impl DatabaseManager {
    /// Open (or create) a database file with WAL enabled and run migrations.
    pub fn new<P: AsRef<Path>>(db_path: P) -> StorageResult<Self> {
        let path = db_path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let connection = Connection::open(path)?;
        connection.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )?;

        let manager = Self {
            connection: Arc::new(Mutex::new(connection)),
            db_path: path.to_string_lossy().to_string(),
        };
        manager.initialize()?;

        Ok(manager)
    }

    /// In-memory database (tests)
    pub fn in_memory() -> StorageResult<Self> {
        let connection = Connection::open_in_memory()?;
        connection.execute_batch("PRAGMA foreign_keys=ON;")?;

        let manager = Self {
            connection: Arc::new(Mutex::new(connection)),
            db_path: ":memory:".to_string(),
        };
        manager.initialize()?;

        Ok(manager)
    }

    pub fn initialize(&self) -> StorageResult<()> {
        let conn = lock_connection(&self.connection)?;
        migrations::run_migrations(&conn)
    }

    pub fn shared_connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.connection)
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    pub fn references(&self) -> ReferenceRepository {
        ReferenceRepository::new(self.shared_connection())
    }

    pub fn progress(&self) -> ProgressRepository {
        ProgressRepository::new(self.shared_connection())
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_disk_database_is_created_with_parents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("coach.db");

        let db = DatabaseManager::new(&path).expect("Failed to open database");
        assert!(path.exists());
        assert_eq!(db.db_path(), path.to_string_lossy());
    }

    #[test]
    fn test_reopen_keeps_schema() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("coach.db");

        drop(DatabaseManager::new(&path).unwrap());
        let db = DatabaseManager::new(&path).unwrap();
        let conn = db.shared_connection();
        let conn = lock_connection(&conn).unwrap();
        assert_eq!(
            migrations::get_current_version(&conn).unwrap(),
            migrations::CURRENT_SCHEMA_VERSION
        );
    }
}
