//! SQLite-backed data store.
//!
//! Provides persistent, per-user storage for:
//! - Timer settings
//! - Tasks
//! - Recorded focus sessions

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::migrations;
use super::{data_dir, Config, DataStore};
use crate::error::{CoreError, DatabaseError, Result};
use crate::session::{Session, SessionDraft, SessionQuery};
use crate::settings::{Settings, SettingsUpdate};
use crate::task::{NewTask, Priority, Task, TaskFilter, TaskUpdate};

// === Helper Functions ===

/// Fixed-width RFC 3339 so stored timestamps compare correctly as text.
fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_ts(column: &'static str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupt(column, value))
}

fn parse_date(column: &'static str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| corrupt(column, value))
}

fn parse_priority(value: &str) -> Result<Priority> {
    value.parse().map_err(|_| corrupt("priority", value))
}

fn corrupt(column: &'static str, value: &str) -> CoreError {
    DatabaseError::CorruptValue {
        column,
        value: value.to_string(),
    }
    .into()
}

const TASK_COLUMNS: &str = "id, title, description, estimated_pomodoros, completed_pomodoros,
     completed, priority, due_date, tags, created_at, updated_at";

const SESSION_COLUMNS: &str =
    "id, user_id, task_id, duration, completed, start_time, end_time, notes";

/// Raw task columns, decoded outside the rusqlite row callback.
struct TaskRow {
    id: String,
    title: String,
    description: Option<String>,
    estimated_pomodoros: u32,
    completed_pomodoros: u32,
    completed: bool,
    priority: String,
    due_date: Option<String>,
    tags: String,
    created_at: String,
    updated_at: String,
}

impl TaskRow {
    fn read(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            estimated_pomodoros: row.get(3)?,
            completed_pomodoros: row.get(4)?,
            completed: row.get(5)?,
            priority: row.get(6)?,
            due_date: row.get(7)?,
            tags: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn into_task(self) -> Result<Task> {
        Ok(Task {
            priority: parse_priority(&self.priority)?,
            due_date: self
                .due_date
                .as_deref()
                .map(|d| parse_date("due_date", d))
                .transpose()?,
            tags: serde_json::from_str(&self.tags).map_err(|_| corrupt("tags", &self.tags))?,
            created_at: parse_ts("created_at", &self.created_at)?,
            updated_at: parse_ts("updated_at", &self.updated_at)?,
            id: self.id,
            title: self.title,
            description: self.description,
            estimated_pomodoros: self.estimated_pomodoros,
            completed_pomodoros: self.completed_pomodoros,
            completed: self.completed,
        })
    }
}

struct SessionRow {
    id: String,
    user_id: String,
    task_id: Option<String>,
    duration: u32,
    completed: bool,
    start_time: String,
    end_time: Option<String>,
    notes: Option<String>,
}

impl SessionRow {
    fn read(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            task_id: row.get(2)?,
            duration: row.get(3)?,
            completed: row.get(4)?,
            start_time: row.get(5)?,
            end_time: row.get(6)?,
            notes: row.get(7)?,
        })
    }

    fn into_session(self) -> Result<Session> {
        Ok(Session {
            start_time: parse_ts("start_time", &self.start_time)?,
            end_time: self
                .end_time
                .as_deref()
                .map(|t| parse_ts("end_time", t))
                .transpose()?,
            id: self.id,
            user_id: self.user_id,
            task_id: self.task_id,
            duration: self.duration,
            completed: self.completed,
            notes: self.notes,
        })
    }
}

/// SQLite store scoped to one user.
pub struct SqliteStore {
    conn: Connection,
    user_id: String,
}

impl SqliteStore {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path, user_id: impl Into<String>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn, user_id.into())
    }

    /// Open the database configured in `config`, defaulting to
    /// `<data dir>/focusflow.db`.
    pub fn open_default(config: &Config) -> Result<Self> {
        let path = match &config.storage.database {
            Some(path) => path.clone(),
            None => data_dir()?.join("focusflow.db"),
        };
        Self::open(&path, config.profile.user_id.clone())
    }

    /// Open an in-memory database.
    pub fn open_memory(user_id: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, user_id.into())
    }

    fn from_connection(conn: Connection, user_id: String) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        tracing::debug!(%user_id, "database ready");
        Ok(Self { conn, user_id })
    }

    fn write_settings(&self, settings: &Settings) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (
                user_id, pomodoro_length, short_break_length, long_break_length,
                long_break_interval, auto_start_breaks, auto_start_pomodoros,
                sound_enabled, sound_volume, dark_mode, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                self.user_id,
                settings.pomodoro_length,
                settings.short_break_length,
                settings.long_break_length,
                settings.long_break_interval,
                settings.auto_start_breaks,
                settings.auto_start_pomodoros,
                settings.sound_enabled,
                settings.sound_volume,
                settings.dark_mode,
                format_ts(Utc::now()),
            ],
        )?;
        Ok(())
    }

    fn read_settings(&self) -> Result<Option<Settings>> {
        let settings = self
            .conn
            .query_row(
                "SELECT pomodoro_length, short_break_length, long_break_length,
                        long_break_interval, auto_start_breaks, auto_start_pomodoros,
                        sound_enabled, sound_volume, dark_mode
                 FROM settings WHERE user_id = ?1",
                params![self.user_id],
                |row| {
                    Ok(Settings {
                        pomodoro_length: row.get(0)?,
                        short_break_length: row.get(1)?,
                        long_break_length: row.get(2)?,
                        long_break_interval: row.get(3)?,
                        auto_start_breaks: row.get(4)?,
                        auto_start_pomodoros: row.get(5)?,
                        sound_enabled: row.get(6)?,
                        sound_volume: row.get(7)?,
                        dark_mode: row.get(8)?,
                    })
                },
            )
            .optional()?;
        Ok(settings)
    }

    fn write_task(&self, task: &Task) -> Result<()> {
        let tags = serde_json::to_string(&task.tags)?;
        self.conn.execute(
            "INSERT INTO tasks (
                id, user_id, title, description, estimated_pomodoros, completed_pomodoros,
                completed, priority, due_date, tags, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                estimated_pomodoros = excluded.estimated_pomodoros,
                completed_pomodoros = excluded.completed_pomodoros,
                completed = excluded.completed,
                priority = excluded.priority,
                due_date = excluded.due_date,
                tags = excluded.tags,
                updated_at = excluded.updated_at",
            params![
                task.id,
                self.user_id,
                task.title,
                task.description,
                task.estimated_pomodoros,
                task.completed_pomodoros,
                task.completed,
                task.priority.as_str(),
                task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
                tags,
                format_ts(task.created_at),
                format_ts(task.updated_at),
            ],
        )?;
        Ok(())
    }
}

impl DataStore for SqliteStore {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn get_settings(&self) -> Result<Settings> {
        if let Some(settings) = self.read_settings()? {
            return Ok(settings);
        }
        let settings = Settings::default();
        self.write_settings(&settings)?;
        Ok(settings)
    }

    fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings> {
        let next = self.get_settings()?.apply(update)?;
        self.write_settings(&next)?;
        Ok(next)
    }

    fn reset_settings(&self) -> Result<Settings> {
        let settings = Settings::default();
        self.write_settings(&settings)?;
        Ok(settings)
    }

    fn create_session(&self, draft: &SessionDraft) -> Result<Session> {
        draft.validate()?;
        if let Some(task_id) = &draft.task_id {
            if self.get_task(task_id)?.is_none() {
                return Err(CoreError::not_found("task", task_id.clone()));
            }
        }

        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: self.user_id.clone(),
            task_id: draft.task_id.clone(),
            duration: draft.duration,
            completed: draft.completed,
            start_time: draft.start_time.trunc_subsecs(3),
            end_time: draft.end_time.map(|t| t.trunc_subsecs(3)),
            notes: draft.notes.clone(),
        };
        self.conn.execute(
            "INSERT INTO sessions (id, user_id, task_id, duration, completed, start_time, end_time, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                session.id,
                session.user_id,
                session.task_id,
                session.duration,
                session.completed,
                format_ts(session.start_time),
                session.end_time.map(format_ts),
                session.notes,
            ],
        )?;
        Ok(session)
    }

    fn list_sessions(&self, query: &SessionQuery) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE user_id = ?1
               AND (?2 IS NULL OR start_time >= ?2)
               AND (?3 IS NULL OR start_time <= ?3)
               AND (?4 IS NULL OR task_id = ?4)
             ORDER BY start_time DESC"
        ))?;
        let rows = stmt.query_map(
            params![
                self.user_id,
                query.start.map(format_ts),
                query.end.map(format_ts),
                query.task_id,
            ],
            SessionRow::read,
        )?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?.into_session()?);
        }
        Ok(sessions)
    }

    fn create_task(&self, new: &NewTask) -> Result<Task> {
        new.validate()?;
        // Stored with millisecond precision.
        let now = Utc::now().trunc_subsecs(3);
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: new.title.trim().to_string(),
            description: new.description.clone().filter(|d| !d.is_empty()),
            estimated_pomodoros: new.estimated_pomodoros,
            completed_pomodoros: 0,
            completed: false,
            priority: new.priority,
            due_date: new.due_date,
            tags: new.tags.clone(),
            created_at: now,
            updated_at: now,
        };
        self.write_task(&task)?;
        Ok(task)
    }

    fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2"),
                params![id, self.user_id],
                TaskRow::read,
            )
            .optional()?;
        row.map(TaskRow::into_task).transpose()
    }

    fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task> {
        update.validate()?;
        let mut task = self
            .get_task(id)?
            .ok_or_else(|| CoreError::not_found("task", id))?;
        task.apply(update);
        task.updated_at = Utc::now().trunc_subsecs(3);
        self.write_task(&task)?;
        Ok(task)
    }

    fn delete_task(&self, id: &str) -> Result<()> {
        let removed = self.conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
            params![id, self.user_id],
        )?;
        if removed == 0 {
            return Err(CoreError::not_found("task", id));
        }
        Ok(())
    }

    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = ?1
               AND (?2 IS NULL OR completed = ?2)
               AND (?3 IS NULL OR priority = ?3)
             ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map(
            params![
                self.user_id,
                filter.completed,
                filter.priority.map(|p| p.as_str()),
            ],
            TaskRow::read,
        )?;

        let mut tasks = Vec::new();
        for row in rows {
            let task = row?.into_task()?;
            if task.matches(filter) {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }
}
