//! Per-day buckets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::range::DateRange;
use crate::session::Session;

/// Aggregated completed sessions for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub total_sessions: u32,
    pub total_minutes: u32,
    /// Sessions carrying a task id; the same task counts once per session.
    pub completed_tasks: u32,
}

impl DailyStat {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_sessions: 0,
            total_minutes: 0,
            completed_tasks: 0,
        }
    }

    pub fn has_activity(&self) -> bool {
        self.total_sessions > 0
    }
}

/// One zeroed bucket per day in `range`, ascending, filled from the
/// completed sessions whose `start_time` falls on that day.
///
/// Sessions dated outside the range are ignored here.
pub fn bucket_by_day<'a>(
    sessions: impl IntoIterator<Item = &'a Session>,
    range: &DateRange,
) -> Vec<DailyStat> {
    let mut buckets: Vec<DailyStat> = range.days().map(DailyStat::empty).collect();

    for session in sessions.into_iter().filter(|s| s.completed) {
        let day = session.start_time.date_naive();
        if !range.contains(day) {
            continue;
        }
        // Buckets are dense and ascending, so the offset is the index.
        let index = (day - range.start).num_days() as usize;
        if let Some(bucket) = buckets.get_mut(index) {
            bucket.total_sessions = bucket.total_sessions.saturating_add(1);
            bucket.total_minutes = bucket.total_minutes.saturating_add(session.duration);
            if session.task_id.is_some() {
                bucket.completed_tasks = bucket.completed_tasks.saturating_add(1);
            }
        }
    }

    buckets
}
