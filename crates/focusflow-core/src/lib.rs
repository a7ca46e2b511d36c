//! # FocusFlow Core Library
//!
//! Business logic for the FocusFlow Pomodoro timer: the state machine, the
//! analytics and the local store behind the `focusflow` CLI.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a countdown state machine advanced by the caller's
//!   once-per-second `tick()`. Transitions return side effects as data.
//! - **Effect Executor**: runs those effects against a [`DataStore`] on a
//!   best-effort basis; failures are logged and reported, never rolled back.
//! - **Storage**: SQLite for settings, tasks and sessions; TOML for local
//!   configuration.
//! - **Stats**: pure aggregation of sessions into daily buckets, a streak
//!   and the most productive day.
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: core timer state machine
//! - [`EffectExecutor`]: applies timer effects to a store
//! - [`SqliteStore`]: the bundled [`DataStore`] implementation
//! - [`compute_statistics`]: analytics aggregator
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod session;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use session::{Session, SessionDraft, SessionQuery};
pub use settings::{Settings, SettingsUpdate};
pub use stats::{
    compute_statistics, format_minutes, DailyStat, DateRange,
    MostProductiveDay, RangePreset, Report, Statistics,
};
pub use storage::{Config, DataStore, SqliteStore};
pub use task::{NewTask, Priority, Task, TaskFilter, TaskUpdate};
pub use timer::{
    Chime, Effect, EffectExecutor, EffectLog, EffectWorker, ExecutionStatus, SilentChime, Tick,
    TimerEngine, TimerMode, TimerState,
};
