//! Working-session domain: records, views, the store seam, lifecycle and stats.

pub mod lifecycle;
pub mod stats;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

/// A focus or break interval belonging to one owner.
///
/// A session is open while `end_time` is absent. Closing sets `end_time` and
/// `duration_seconds` exactly once; records never reopen. Owner, start time
/// and kind are immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    /// Store-assigned id; `None` until the first save.
    pub id: Option<String>,
    pub owner_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub is_break: bool,
}

impl SessionRecord {
    /// A session is open iff it has no end time.
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Wire view of a session (camelCase, the shape clients already consume).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub is_break: bool,
}

impl From<SessionRecord> for SessionView {
    fn from(record: SessionRecord) -> Self {
        SessionView {
            // Saved records always carry an id
            id: record.id.unwrap_or_default(),
            start_time: record.start_time,
            end_time: record.end_time,
            duration_seconds: record.duration_seconds,
            is_break: record.is_break,
        }
    }
}

/// Storage seam for session records.
///
/// The lifecycle manager and stats aggregator only see this interface; the
/// production implementation is `db::store::SqliteStore`.
pub trait SessionStore: Send + Sync {
    /// All sessions for the owner with no end time recorded.
    fn find_open_by_owner(&self, owner_id: &str) -> Result<Vec<SessionRecord>>;

    /// Sessions with `start_time` in `[start, end]`, oldest first.
    fn find_by_owner_and_range(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SessionRecord>>;

    /// All sessions for the owner, newest first.
    fn find_by_owner(&self, owner_id: &str) -> Result<Vec<SessionRecord>>;

    fn find_by_id(&self, id: &str) -> Result<Option<SessionRecord>>;

    /// Insert (assigning an id) or update by id. Returns the stored record.
    fn save(&self, record: SessionRecord) -> Result<SessionRecord>;
}
