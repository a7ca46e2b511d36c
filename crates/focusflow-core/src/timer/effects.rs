//! Side effects requested by the timer.
//!
//! The engine never talks to storage itself; completing a focus interval
//! yields a list of [`Effect`]s that an executor carries out later.

use serde::{Deserialize, Serialize};

use crate::session::SessionDraft;
use crate::task::TaskUpdate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    /// Record the focus interval that just finished.
    ///
    /// `duration` is the length of the interval actually timed, in minutes.
    /// It equals `pomodoro_length` unless settings changed while the interval
    /// was running.
    CreateSession(SessionDraft),
    /// Credit the selected task with one more pomodoro.
    UpdateTask { task_id: String, update: TaskUpdate },
    /// Audible notification at 0..=100 volume.
    PlayChime { volume: u8 },
}

impl Effect {
    pub fn kind(&self) -> &'static str {
        match self {
            Effect::CreateSession(_) => "create_session",
            Effect::UpdateTask { .. } => "update_task",
            Effect::PlayChime { .. } => "play_chime",
        }
    }
}
