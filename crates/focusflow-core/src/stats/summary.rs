//! Aggregate statistics over a list of sessions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::daily::{bucket_by_day, DailyStat};
use super::range::DateRange;
use super::streak::current_streak;
use crate::session::Session;

/// Busiest day in the range, or `NoData` when every bucket is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MostProductiveDay {
    Day { date: NaiveDate, total_minutes: u32 },
    NoData,
}

impl MostProductiveDay {
    /// First bucket with the highest minute total.
    pub fn pick(buckets: &[DailyStat]) -> Self {
        let mut best: Option<&DailyStat> = None;
        for bucket in buckets {
            if bucket.total_minutes > best.map_or(0, |b| b.total_minutes) {
                best = Some(bucket);
            }
        }
        match best {
            Some(b) => MostProductiveDay::Day {
                date: b.date,
                total_minutes: b.total_minutes,
            },
            None => MostProductiveDay::NoData,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            MostProductiveDay::Day { date, .. } => Some(*date),
            MostProductiveDay::NoData => None,
        }
    }
}

impl fmt::Display for MostProductiveDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MostProductiveDay::Day { date, .. } => write!(f, "{}", date.format("%a, %b %-d, %Y")),
            MostProductiveDay::NoData => f.write_str("No data available"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_sessions_completed: u32,
    /// Minutes.
    pub total_focus_time: u32,
    pub daily_stats: Vec<DailyStat>,
    pub most_productive_day: MostProductiveDay,
    pub streak: u32,
}

impl Statistics {
    pub fn empty() -> Self {
        Self {
            total_sessions_completed: 0,
            total_focus_time: 0,
            daily_stats: Vec::new(),
            most_productive_day: MostProductiveDay::NoData,
            streak: 0,
        }
    }
}

/// Aggregate `sessions` over the inclusive days `start..=end`, as seen on
/// `today`.
///
/// A reversed range yields [`Statistics::empty`]. Totals count every
/// completed session passed in; buckets only those dated inside the range.
pub fn compute_statistics(
    sessions: &[Session],
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Statistics {
    let range = DateRange::new(start, end);
    if range.is_empty() {
        return Statistics::empty();
    }

    let completed = sessions.iter().filter(|s| s.completed);
    let (total_sessions_completed, total_focus_time) =
        completed.fold((0u32, 0u32), |(n, mins), s| {
            (n.saturating_add(1), mins.saturating_add(s.duration))
        });

    let daily_stats = bucket_by_day(sessions, &range);
    let most_productive_day = MostProductiveDay::pick(&daily_stats);
    let streak = current_streak(&daily_stats, today);

    Statistics {
        total_sessions_completed,
        total_focus_time,
        daily_stats,
        most_productive_day,
        streak,
    }
}

/// Analytics view: statistics plus the number of finished tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub range: DateRange,
    #[serde(flatten)]
    pub statistics: Statistics,
    pub tasks_completed: u32,
}

/// `"{h}h {m}m"`.
pub fn format_minutes(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}
