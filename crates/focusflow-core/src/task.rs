//! Task records and their partial updates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const TITLE_MAX: usize = 255;
pub const DESCRIPTION_MAX: usize = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(ValidationError::invalid(
                "priority",
                format!("expected low, medium or high, got '{other}'"),
            )),
        }
    }
}

/// A unit of work credited by completed focus intervals.
///
/// `completed` is true exactly when `completed_pomodoros >= estimated_pomodoros`
/// as long as progress only moves through [`Task::progress_after_focus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub estimated_pomodoros: u32,
    #[serde(default)]
    pub completed_pomodoros: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// The update credited by one more completed focus interval.
    ///
    /// Returns the update and whether it finishes the task.
    pub fn progress_after_focus(&self) -> (TaskUpdate, bool) {
        let count = self.completed_pomodoros.saturating_add(1);
        let finished = count >= self.estimated_pomodoros;
        let update = TaskUpdate {
            completed_pomodoros: Some(count),
            completed: Some(finished),
            ..TaskUpdate::default()
        };
        (update, finished)
    }

    /// Apply a validated update in place.
    pub fn apply(&mut self, update: &TaskUpdate) {
        if let Some(title) = &update.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &update.description {
            self.description = if description.is_empty() {
                None
            } else {
                Some(description.clone())
            };
        }
        if let Some(v) = update.estimated_pomodoros {
            self.estimated_pomodoros = v;
        }
        if let Some(v) = update.completed_pomodoros {
            self.completed_pomodoros = v;
        }
        if let Some(v) = update.completed {
            self.completed = v;
        }
        if let Some(v) = update.priority {
            self.priority = v;
        }
        if let Some(v) = update.due_date {
            self.due_date = Some(v);
        }
        if let Some(tags) = &update.tags {
            self.tags = tags.clone();
        }
    }

    pub fn matches(&self, filter: &TaskFilter) -> bool {
        if let Some(completed) = filter.completed {
            if self.completed != completed {
                return false;
            }
        }
        if let Some(priority) = filter.priority {
            if self.priority != priority {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            let in_title = self.title.to_lowercase().contains(&needle);
            let in_description = self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required("title".into()));
    }
    if trimmed.chars().count() > TITLE_MAX {
        return Err(ValidationError::TooLong {
            field: "title".into(),
            max: TITLE_MAX,
        });
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.chars().count() > DESCRIPTION_MAX {
        return Err(ValidationError::TooLong {
            field: "description".into(),
            max: DESCRIPTION_MAX,
        });
    }
    Ok(())
}

fn validate_estimate(estimate: u32) -> Result<(), ValidationError> {
    if estimate < 1 {
        return Err(ValidationError::invalid(
            "estimated_pomodoros",
            "must be at least 1",
        ));
    }
    Ok(())
}

/// Fields for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_estimate")]
    pub estimated_pomodoros: u32,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_estimate() -> u32 {
    1
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            estimated_pomodoros: default_estimate(),
            priority: Priority::default(),
            due_date: None,
            tags: Vec::new(),
        }
    }

    pub fn with_estimate(mut self, estimated_pomodoros: u32) -> Self {
        self.estimated_pomodoros = estimated_pomodoros;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        validate_estimate(self.estimated_pomodoros)
    }
}

/// Partial task update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// An empty string clears the description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_pomodoros: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_pomodoros: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TaskUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if let Some(estimate) = self.estimated_pomodoros {
            validate_estimate(estimate)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self == &TaskUpdate::default()
    }
}

/// Criteria for listing tasks. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn open() -> Self {
        Self {
            completed: Some(false),
            ..Self::default()
        }
    }

    pub fn done() -> Self {
        Self {
            completed: Some(true),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(estimated: u32, completed: u32) -> Task {
        Task {
            id: "t1".into(),
            title: "Write report".into(),
            description: Some("quarterly numbers".into()),
            estimated_pomodoros: estimated,
            completed_pomodoros: completed,
            completed: completed >= estimated,
            priority: Priority::High,
            due_date: None,
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn progress_completes_task_at_estimate() {
        let (update, finished) = task(2, 1).progress_after_focus();
        assert!(finished);
        assert_eq!(update.completed_pomodoros, Some(2));
        assert_eq!(update.completed, Some(true));
    }

    #[test]
    fn progress_below_estimate_keeps_task_open() {
        let (update, finished) = task(3, 0).progress_after_focus();
        assert!(!finished);
        assert_eq!(update.completed_pomodoros, Some(1));
        assert_eq!(update.completed, Some(false));
    }

    #[test]
    fn blank_title_is_required() {
        assert_eq!(
            NewTask::new("   ").validate(),
            Err(ValidationError::Required("title".into()))
        );
    }

    #[test]
    fn long_title_is_rejected() {
        let err = NewTask::new("x".repeat(TITLE_MAX + 1)).validate().unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { .. }));
    }

    #[test]
    fn zero_estimate_is_rejected() {
        assert!(NewTask::new("a").with_estimate(0).validate().is_err());
        let update = TaskUpdate {
            estimated_pomodoros: Some(0),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn filter_matches_search_in_description() {
        let t = task(2, 0);
        let filter = TaskFilter {
            search: Some("QUARTERLY".into()),
            ..Default::default()
        };
        assert!(t.matches(&filter));
        assert!(!t.matches(&TaskFilter::done()));
        assert!(t.matches(&TaskFilter::open()));
        let filter = TaskFilter {
            priority: Some(Priority::Low),
            ..Default::default()
        };
        assert!(!t.matches(&filter));
    }

    #[test]
    fn apply_clears_description_with_empty_string() {
        let mut t = task(2, 0);
        t.apply(&TaskUpdate {
            description: Some(String::new()),
            title: Some("  Renamed ".into()),
            ..Default::default()
        });
        assert_eq!(t.description, None);
        assert_eq!(t.title, "Renamed");
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }
}
