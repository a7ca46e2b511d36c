//! Recorded focus sessions.
//!
//! Sessions are written once, when a focus interval finishes, and never
//! updated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::settings::POMODORO_LENGTH_MAX;

pub const NOTES_MAX: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub task_id: Option<String>,
    /// Length in minutes.
    pub duration: u32,
    pub completed: bool,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A session that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDraft {
    #[serde(default)]
    pub task_id: Option<String>,
    pub duration: u32,
    pub completed: bool,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SessionDraft {
    /// A completed focus interval of `duration` minutes ending at `end`.
    pub fn completed_focus(duration: u32, end: DateTime<Utc>, task_id: Option<String>) -> Self {
        Self {
            task_id,
            duration,
            completed: true,
            start_time: end - chrono::Duration::minutes(i64::from(duration)),
            end_time: Some(end),
            notes: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=POMODORO_LENGTH_MAX).contains(&self.duration) {
            return Err(ValidationError::invalid(
                "duration",
                format!(
                    "must be between 1 and {POMODORO_LENGTH_MAX} minutes, got {}",
                    self.duration
                ),
            ));
        }
        if let Some(end) = self.end_time {
            if end < self.start_time {
                return Err(ValidationError::InvalidTimeRange {
                    start: self.start_time,
                    end,
                });
            }
        }
        if let Some(notes) = &self.notes {
            if notes.chars().count() > NOTES_MAX {
                return Err(ValidationError::TooLong {
                    field: "notes".into(),
                    max: NOTES_MAX,
                });
            }
        }
        Ok(())
    }
}

/// Inclusive bounds on `start_time`, plus an optional task filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub task_id: Option<String>,
}

impl SessionQuery {
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            task_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn completed_focus_spans_duration() {
        let end = Utc.with_ymd_and_hms(2024, 5, 1, 10, 25, 0).unwrap();
        let draft = SessionDraft::completed_focus(25, end, Some("t".into()));
        assert_eq!(
            draft.start_time,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(draft.end_time, Some(end));
        assert!(draft.completed);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut draft = SessionDraft::completed_focus(25, Utc::now(), None);
        draft.duration = 0;
        assert!(draft.validate().is_err());
    }

    #[test]
    fn duration_above_longest_focus_is_rejected() {
        let mut draft = SessionDraft::completed_focus(POMODORO_LENGTH_MAX, Utc::now(), None);
        assert!(draft.validate().is_ok());
        draft.duration = POMODORO_LENGTH_MAX + 1;
        assert!(draft.validate().is_err());
        draft.duration = u32::MAX;
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::InvalidValue { ref field, .. }) if field == "duration"
        ));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut draft = SessionDraft::completed_focus(25, Utc::now(), None);
        draft.end_time = Some(draft.start_time - chrono::Duration::seconds(1));
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn long_notes_are_rejected() {
        let mut draft = SessionDraft::completed_focus(25, Utc::now(), None);
        draft.notes = Some("n".repeat(NOTES_MAX + 1));
        assert!(draft.validate().is_err());
    }
}
