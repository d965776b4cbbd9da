//! Time-bucketed usage statistics.
//!
//! Weekly view: the last 7 calendar days keyed by ISO date. Hourly view: the
//! last 24 hours keyed by hour of day. Buckets are zero-filled; break
//! sessions and still-open sessions contribute nothing.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, NaiveTime};

use crate::clock::Clock;
use crate::config::StatsTimezone;
use crate::error::Result;
use crate::session::SessionStore;

pub struct StatsService {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    timezone: StatsTimezone,
}

impl StatsService {
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>, timezone: StatsTimezone) -> Self {
        StatsService {
            store,
            clock,
            timezone,
        }
    }

    /// Total focus seconds per calendar day over the 7 days ending now.
    ///
    /// Always exactly 7 entries. ISO date keys sort chronologically, so map
    /// iteration order is the display order.
    pub fn weekly(&self, owner_id: &str) -> Result<BTreeMap<String, i64>> {
        let now = self.clock.now();
        let start_day = (self.timezone.to_naive(now) - Duration::days(7)).date();
        let window_start = self.timezone.from_naive(start_day.and_time(NaiveTime::MIN));

        let mut daily: BTreeMap<String, i64> = BTreeMap::new();
        for i in 0..7 {
            daily.insert((start_day + Duration::days(i)).to_string(), 0);
        }

        for session in self
            .store
            .find_by_owner_and_range(owner_id, window_start, now)?
        {
            let Some(seconds) = session.duration_seconds else {
                continue;
            };
            if session.is_break {
                continue;
            }
            // Bucketed by the session's own start date. A date outside the 7
            // pre-built buckets is dropped, never added as an extra bucket.
            let day = self.timezone.to_naive(session.start_time).date().to_string();
            if let Some(total) = daily.get_mut(&day) {
                *total += seconds;
            }
        }

        Ok(daily)
    }

    /// Total focus seconds per hour of day over the last 24 hours.
    ///
    /// Always exactly 24 entries keyed 0..=23. Buckets are keyed by clock
    /// hour, not by offset from now: two sessions a day apart at the same
    /// clock hour share a bucket. Intentional simplification; keep it.
    pub fn hourly(&self, owner_id: &str) -> Result<BTreeMap<u32, i64>> {
        use chrono::Timelike;

        let now = self.clock.now();
        let window_start = now - Duration::hours(24);

        let mut hourly: BTreeMap<u32, i64> = (0..24).map(|h| (h, 0)).collect();

        for session in self
            .store
            .find_by_owner_and_range(owner_id, window_start, now)?
        {
            let Some(seconds) = session.duration_seconds else {
                continue;
            };
            if session.is_break {
                continue;
            }
            let hour = self.timezone.to_naive(session.start_time).hour();
            if let Some(total) = hourly.get_mut(&hour) {
                *total += seconds;
            }
        }

        Ok(hourly)
    }
}
