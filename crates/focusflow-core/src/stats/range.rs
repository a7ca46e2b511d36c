//! Date ranges for the analytics views.

use chrono::{DateTime, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionQuery;

/// Named look-back windows ending today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangePreset {
    #[default]
    Week,
    Month,
    Year,
}

impl std::str::FromStr for RangePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "week" => Ok(RangePreset::Week),
            "month" => Ok(RangePreset::Month),
            "year" => Ok(RangePreset::Year),
            other => Err(format!("unknown range '{other}' (expected week, month or year)")),
        }
    }
}

/// Inclusive range of UTC calendar days.
///
/// `end < start` is allowed and simply contains no days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Window ending at `today`: seven days back for a week, one calendar
    /// month or year back otherwise.
    pub fn preset(preset: RangePreset, today: NaiveDate) -> Self {
        let start = match preset {
            RangePreset::Week => today - chrono::Duration::days(7),
            RangePreset::Month => today.checked_sub_months(Months::new(1)).unwrap_or(today),
            RangePreset::Year => today.checked_sub_months(Months::new(12)).unwrap_or(today),
        };
        Self { start, end: today }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Every day from start to end, inclusive.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// First and last instant of the range in UTC.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start.and_time(NaiveTime::MIN).and_utc();
        let end = self
            .end
            .and_hms_milli_opt(23, 59, 59, 999)
            .map(|dt| dt.and_utc())
            .unwrap_or(start);
        (start, end)
    }

    /// Session query covering the whole range.
    pub fn query(&self) -> SessionQuery {
        let (start, end) = self.bounds();
        SessionQuery::between(start, end)
    }
}
