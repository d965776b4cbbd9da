//! SQLite-backed session store.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::Database;
use crate::error::Result;
use crate::session::{SessionRecord, SessionStore};

const SELECT_COLUMNS: &str = "id, owner_id, start_time, end_time, duration_seconds, is_break";

/// Production `SessionStore` over the shared SQLite connection.
pub struct SqliteStore {
    db: Arc<Database>,
}

impl SqliteStore {
    pub fn new(db: Arc<Database>) -> Self {
        SqliteStore { db }
    }
}

/// Fixed-width RFC 3339 UTC, so stored timestamps compare correctly as text.
fn format_ts(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_ts(column: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    let start: String = row.get(2)?;
    let end: Option<String> = row.get(3)?;
    Ok(SessionRecord {
        id: Some(row.get(0)?),
        owner_id: row.get(1)?,
        start_time: parse_ts(2, &start)?,
        end_time: end.as_deref().map(|s| parse_ts(3, s)).transpose()?,
        duration_seconds: row.get(4)?,
        is_break: row.get(5)?,
    })
}

impl SessionStore for SqliteStore {
    fn find_open_by_owner(&self, owner_id: &str) -> Result<Vec<SessionRecord>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM working_sessions
             WHERE owner_id = ? AND end_time IS NULL
             ORDER BY start_time"
        ))?;
        let records = stmt
            .query_map([owner_id], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn find_by_owner_and_range(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SessionRecord>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM working_sessions
             WHERE owner_id = ? AND start_time >= ? AND start_time <= ?
             ORDER BY start_time"
        ))?;
        let records = stmt
            .query_map(
                params![owner_id, format_ts(start), format_ts(end)],
                row_to_record,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn find_by_owner(&self, owner_id: &str) -> Result<Vec<SessionRecord>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM working_sessions
             WHERE owner_id = ?
             ORDER BY start_time DESC"
        ))?;
        let records = stmt
            .query_map([owner_id], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<SessionRecord>> {
        let conn = self.db.conn();
        let record = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM working_sessions WHERE id = ?"),
                [id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn save(&self, mut record: SessionRecord) -> Result<SessionRecord> {
        let conn = self.db.conn();
        if let Some(id) = record.id.as_deref() {
            // Only the close-mutable columns; owner, start and kind are
            // immutable after creation.
            conn.execute(
                "UPDATE working_sessions SET end_time = ?, duration_seconds = ? WHERE id = ?",
                params![record.end_time.map(format_ts), record.duration_seconds, id],
            )?;
        } else {
            let id = uuid::Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO working_sessions
                 (id, owner_id, start_time, end_time, duration_seconds, is_break)
                 VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    id,
                    record.owner_id,
                    format_ts(record.start_time),
                    record.end_time.map(format_ts),
                    record.duration_seconds,
                    record.is_break
                ],
            )?;
            record.id = Some(id);
        }
        Ok(record)
    }
}
