//! Database module for Focusd
//!
//! Provides SQLite storage for working sessions.

pub mod schema;
pub mod store;

use crate::error::Result;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Mutex;

/// Owns the SQLite connection. rusqlite connections are not Sync, so access
/// goes through a mutex; store calls are short-lived.
pub struct Database {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl Database {
    /// Open (creating if needed) the database at `db_path`
    pub fn new(db_path: PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;

        conn.execute("PRAGMA foreign_keys = ON", [])?;

        // Initialize schema
        schema::init_db(&conn)?;

        Ok(Database {
            conn: Mutex::new(conn),
            path: db_path,
        })
    }

    /// Open an in-memory database (used by tests and embedding)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init_db(&conn)?;
        Ok(Database {
            conn: Mutex::new(conn),
            path: PathBuf::from(":memory:"),
        })
    }

    /// Get exclusive access to the connection
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    /// Get the database file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

// Re-export schema for convenience
pub use schema::init_db;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_creation() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test_focusd.db");

        let db = Database::new(db_path.clone());
        assert!(db.is_ok());
        assert!(db_path.exists());
    }

    #[test]
    fn test_database_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("focusd.db");

        assert!(Database::new(db_path.clone()).is_ok());
        assert!(db_path.exists());
    }
}
