mod config;
pub mod database;
pub mod migrations;

pub use config::{AnalyticsConfig, Config, LoggingConfig, ProfileConfig, StorageConfig, TimerConfig};
pub use database::SqliteStore;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::session::{Session, SessionDraft, SessionQuery};
use crate::settings::{Settings, SettingsUpdate};
use crate::task::{NewTask, Task, TaskFilter, TaskUpdate};

/// Data access used by the timer and the analytics views.
///
/// Every call is scoped to a single user. Implementations validate their
/// inputs and return [`crate::CoreError::NotFound`] for ids the user does not own.
pub trait DataStore {
    fn user_id(&self) -> &str;

    /// Current settings, creating the defaults on first access.
    fn get_settings(&self) -> Result<Settings>;
    fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings>;
    fn reset_settings(&self) -> Result<Settings>;

    fn create_session(&self, draft: &SessionDraft) -> Result<Session>;
    /// Sessions matching `query`, newest `start_time` first.
    fn list_sessions(&self, query: &SessionQuery) -> Result<Vec<Session>>;

    fn create_task(&self, task: &NewTask) -> Result<Task>;
    fn get_task(&self, id: &str) -> Result<Option<Task>>;
    fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task>;
    fn delete_task(&self, id: &str) -> Result<()>;
    /// Tasks matching `filter`, newest first.
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;
}

/// Returns the focusflow data directory, creating it if needed.
///
/// `FOCUSFLOW_HOME` overrides the location outright. Otherwise this is
/// `~/.config/focusflow`, or `~/.config/focusflow-dev` with `FOCUSFLOW_ENV=dev`.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FOCUSFLOW_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSFLOW_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focusflow-dev")
            } else {
                base_dir.join("focusflow")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
