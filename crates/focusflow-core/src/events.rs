use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerMode, TimerState};

/// Every observable timer state change produces an Event.
/// Front ends render them; they carry no persistence side effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// Manual switch; in-flight progress was discarded.
    ModeChanged {
        from: TimerMode,
        to: TimerMode,
        at: DateTime<Utc>,
    },
    /// A focus interval reached zero.
    FocusCompleted {
        completed_pomodoros: u32,
        task_id: Option<String>,
        next: TimerMode,
        auto_started: bool,
        at: DateTime<Utc>,
    },
    /// A break reached zero.
    BreakCompleted {
        mode: TimerMode,
        auto_started: bool,
        at: DateTime<Utc>,
    },
    TaskSelected {
        task_id: Option<String>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        clock: String,
        progress: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerReset { at, .. }
            | Event::ModeChanged { at, .. }
            | Event::FocusCompleted { at, .. }
            | Event::BreakCompleted { at, .. }
            | Event::TaskSelected { at, .. }
            | Event::StateSnapshot { at, .. } => *at,
        }
    }
}
