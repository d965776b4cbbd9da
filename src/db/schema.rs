//! SQLite schema for Focusd
//!
//! A single table of working sessions. Identity lives outside the service,
//! so owners are opaque ids, not rows.

use rusqlite::{Connection, Result};

/// Initialize the database with required tables
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    // Working sessions: one row per focus/break interval. `end_time` and
    // `duration_seconds` stay NULL while the session is open.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS working_sessions (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT,
            duration_seconds INTEGER,
            is_break BOOLEAN NOT NULL DEFAULT 0
        )",
        [],
    )?;

    create_indexes(conn)?;

    Ok(())
}

/// Create database indexes for query performance
fn create_indexes(conn: &Connection) -> Result<()> {
    // Range scans for stats
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sessions_owner_start
         ON working_sessions(owner_id, start_time)",
        [],
    )?;

    // Open-session lookups only ever touch rows with end_time IS NULL
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sessions_owner_open
         ON working_sessions(owner_id) WHERE end_time IS NULL",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_db() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(init_db(&conn).is_ok());

        // Verify the sessions table exists
        let table_count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='working_sessions'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(table_count, 1);
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        assert!(init_db(&conn).is_ok());
    }
}
