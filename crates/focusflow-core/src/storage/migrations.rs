//! Database schema migrations for focusflow.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> SqliteResult<i32> {
    match conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, Option<i32>>(0)
    }) {
        Ok(v) => Ok(v.unwrap_or(0)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: settings, tasks and sessions.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS settings (
            user_id              TEXT PRIMARY KEY,
            pomodoro_length      INTEGER NOT NULL,
            short_break_length   INTEGER NOT NULL,
            long_break_length    INTEGER NOT NULL,
            long_break_interval  INTEGER NOT NULL,
            auto_start_breaks    INTEGER NOT NULL,
            auto_start_pomodoros INTEGER NOT NULL,
            sound_enabled        INTEGER NOT NULL,
            sound_volume         INTEGER NOT NULL,
            dark_mode            INTEGER NOT NULL,
            updated_at           TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id                  TEXT PRIMARY KEY,
            user_id             TEXT NOT NULL,
            title               TEXT NOT NULL,
            description         TEXT,
            estimated_pomodoros INTEGER NOT NULL DEFAULT 1,
            completed_pomodoros INTEGER NOT NULL DEFAULT 0,
            completed           INTEGER NOT NULL DEFAULT 0,
            priority            TEXT NOT NULL DEFAULT 'medium',
            due_date            TEXT,
            tags                TEXT NOT NULL DEFAULT '[]',
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL,
            task_id     TEXT,
            duration    INTEGER NOT NULL,
            completed   INTEGER NOT NULL DEFAULT 0,
            start_time  TEXT NOT NULL,
            end_time    TEXT,
            notes       TEXT
        );",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: indexes for the per-user list queries.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_sessions_user_start ON sessions(user_id, start_time);
         CREATE INDEX IF NOT EXISTS idx_sessions_task_start ON sessions(task_id, start_time);
         CREATE INDEX IF NOT EXISTS idx_tasks_user_completed ON tasks(user_id, completed);
         CREATE INDEX IF NOT EXISTS idx_tasks_user_priority ON tasks(user_id, priority);",
    )?;
    set_schema_version(&tx, 2)?;
    tx.commit()
}
