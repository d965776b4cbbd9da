//! Session lifecycle manager.
//!
//! Enforces the single-open-session invariant: starting a session first
//! closes anything the owner still has open (self-heal after a client that
//! crashed without calling end), then opens the new one.

use std::sync::{Arc, Mutex};

use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::session::{SessionRecord, SessionStore, SessionView};

pub struct SessionService {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    /// Serializes the read-then-write sequences in `start` and `end` so two
    /// concurrent starts for one owner cannot both observe zero open sessions.
    write_lock: Mutex<()>,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        SessionService {
            store,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Start a new session, closing any the owner still has open.
    pub fn start(&self, owner_id: &str, is_break: bool) -> Result<SessionView> {
        let _guard = self.write_lock.lock().unwrap();

        for open in self.store.find_open_by_owner(owner_id)? {
            let healed = self.close(open)?;
            tracing::debug!(
                owner = owner_id,
                id = ?healed.id,
                duration = ?healed.duration_seconds,
                "closed abandoned session"
            );
        }

        let session = SessionRecord {
            id: None,
            owner_id: owner_id.to_string(),
            start_time: self.clock.now(),
            end_time: None,
            duration_seconds: None,
            is_break,
        };
        let saved = self.store.save(session)?;
        tracing::debug!(owner = owner_id, id = ?saved.id, is_break, "started session");

        Ok(saved.into())
    }

    /// End an open session owned by the caller.
    ///
    /// Ending is not idempotent: a second end on the same session is an
    /// `InvalidState` error, not a no-op.
    pub fn end(&self, session_id: &str, owner_id: &str) -> Result<SessionView> {
        let _guard = self.write_lock.lock().unwrap();

        let session = self
            .store
            .find_by_id(session_id)?
            .ok_or_else(|| CoreError::NotFound("Session", session_id.to_string()))?;

        // Ownership check comes before any state inspection or mutation
        if session.owner_id != owner_id {
            return Err(CoreError::Forbidden(
                "Session does not belong to caller".to_string(),
            ));
        }

        if session.end_time.is_some() {
            return Err(CoreError::InvalidState("Session already ended".to_string()));
        }

        let saved = self.close(session)?;
        Ok(saved.into())
    }

    /// All of the caller's sessions, newest first.
    pub fn list(&self, owner_id: &str) -> Result<Vec<SessionView>> {
        let sessions = self.store.find_by_owner(owner_id)?;
        Ok(sessions.into_iter().map(SessionView::from).collect())
    }

    /// The one definition of closing: stamp `end_time`, derive the duration
    /// in whole seconds, persist. Both explicit end and the self-heal path
    /// go through here.
    fn close(&self, mut session: SessionRecord) -> Result<SessionRecord> {
        let end = self.clock.now();
        let seconds = (end - session.start_time).num_seconds().max(0);
        session.end_time = Some(end);
        session.duration_seconds = Some(seconds);
        self.store.save(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::FixedClock;
    use crate::db::store::SqliteStore;
    use crate::db::Database;
    use chrono::{TimeZone, Utc};

    fn service() -> (SessionService, Arc<FixedClock>, Arc<dyn SessionStore>) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let store: Arc<dyn SessionStore> = Arc::new(SqliteStore::new(db));
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap(),
        ));
        let service = SessionService::new(store.clone(), clock.clone());
        (service, clock, store)
    }

    #[test]
    fn start_opens_a_session() {
        let (service, clock, store) = service();

        let view = service.start("alice", false).unwrap();

        assert_eq!(view.start_time, clock.now());
        assert!(view.end_time.is_none());
        assert!(view.duration_seconds.is_none());
        assert!(!view.is_break);

        let open = store.find_open_by_owner("alice").unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id.as_deref(), Some(view.id.as_str()));
    }

    #[test]
    fn start_closes_abandoned_session_first() {
        let (service, clock, store) = service();

        let first = service.start("alice", false).unwrap();
        clock.advance_secs(300);
        let second = service.start("alice", false).unwrap();
        assert_ne!(first.id, second.id);

        let healed = store.find_by_id(&first.id).unwrap().unwrap();
        assert_eq!(healed.end_time, Some(clock.now()));
        assert_eq!(healed.duration_seconds, Some(300));

        let open = store.find_open_by_owner("alice").unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id.as_deref(), Some(second.id.as_str()));
    }

    #[test]
    fn start_twice_in_a_row_leaves_one_open_session() {
        let (service, _clock, store) = service();

        let first = service.start("alice", false).unwrap();
        let second = service.start("alice", false).unwrap();

        // Clock never advanced, so the healed session closed immediately
        let healed = store.find_by_id(&first.id).unwrap().unwrap();
        assert_eq!(healed.duration_seconds, Some(0));

        let open = store.find_open_by_owner("alice").unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id.as_deref(), Some(second.id.as_str()));
    }

    #[test]
    fn self_heal_only_touches_the_callers_sessions() {
        let (service, _clock, store) = service();

        service.start("alice", false).unwrap();
        service.start("bob", false).unwrap();

        assert_eq!(store.find_open_by_owner("alice").unwrap().len(), 1);
        assert_eq!(store.find_open_by_owner("bob").unwrap().len(), 1);
    }

    #[test]
    fn end_computes_elapsed_seconds() {
        let (service, clock, _store) = service();

        let started = service.start("alice", false).unwrap();
        clock.advance_secs(7200);
        let ended = service.end(&started.id, "alice").unwrap();

        assert_eq!(ended.end_time, Some(clock.now()));
        assert_eq!(ended.duration_seconds, Some(7200));
    }

    #[test]
    fn end_unknown_session_is_not_found() {
        let (service, _clock, _store) = service();

        let err = service.end("missing", "alice").unwrap_err();
        assert!(matches!(err, CoreError::NotFound(..)));
    }

    #[test]
    fn end_checks_ownership_before_mutating() {
        let (service, clock, store) = service();

        let started = service.start("alice", false).unwrap();
        clock.advance_secs(60);

        let err = service.end(&started.id, "mallory").unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));

        // The record is untouched and still open
        let record = store.find_by_id(&started.id).unwrap().unwrap();
        assert!(record.is_open());
        assert!(record.duration_seconds.is_none());
    }

    #[test]
    fn end_is_one_shot() {
        let (service, clock, store) = service();

        let started = service.start("alice", false).unwrap();
        clock.advance_secs(100);
        let ended = service.end(&started.id, "alice").unwrap();

        clock.advance_secs(100);
        let err = service.end(&started.id, "alice").unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));

        // The second attempt did not move the recorded end
        let record = store.find_by_id(&started.id).unwrap().unwrap();
        assert_eq!(record.end_time, ended.end_time);
        assert_eq!(record.duration_seconds, Some(100));
    }

    #[test]
    fn break_flag_is_persisted() {
        let (service, _clock, store) = service();

        let view = service.start("alice", true).unwrap();
        assert!(view.is_break);

        let record = store.find_by_id(&view.id).unwrap().unwrap();
        assert!(record.is_break);
    }

    #[test]
    fn list_returns_newest_first() {
        let (service, clock, _store) = service();

        let first = service.start("alice", false).unwrap();
        clock.advance_secs(60);
        service.end(&first.id, "alice").unwrap();
        clock.advance_secs(60);
        let second = service.start("alice", true).unwrap();

        let listed = service.list("alice").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }
}
