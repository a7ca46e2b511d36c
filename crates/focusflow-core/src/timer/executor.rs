//! Effect execution.
//!
//! Carries out the effects produced by [`super::TimerEngine`] against a
//! [`DataStore`] and logs results. Failures are recorded, never propagated:
//! the timer has already moved on by the time an effect runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::effects::Effect;
use crate::error::Result;
use crate::storage::DataStore;

/// Something that can make a noise when a focus interval ends.
pub trait Chime: Send {
    fn play(&self, volume: u8) -> Result<()>;
}

/// Chime that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentChime;

impl Chime for SilentChime {
    fn play(&self, _volume: u8) -> Result<()> {
        Ok(())
    }
}

/// Result of executing a single effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectResult {
    pub kind: String,
    pub status: ExecutionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Success,
    /// The effect failed; nothing was rolled back or retried.
    Failed { reason: String },
    Skipped { reason: String },
}

/// Log of one executed batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectLog {
    pub executed_at: DateTime<Utc>,
    pub results: Vec<EffectResult>,
}

impl EffectLog {
    pub fn new(results: Vec<EffectResult>) -> Self {
        Self {
            executed_at: Utc::now(),
            results,
        }
    }

    pub fn success_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.status, ExecutionStatus::Success))
            .count()
    }

    pub fn failure_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.status, ExecutionStatus::Failed { .. }))
            .count()
    }

    /// Human-readable warnings for every failed effect.
    pub fn warnings(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|r| match &r.status {
                ExecutionStatus::Failed { reason } => Some(format!("{} failed: {reason}", r.kind)),
                _ => None,
            })
            .collect()
    }
}

/// Executes effects and logs results
pub struct EffectExecutor<S> {
    store: S,
    chime: Box<dyn Chime>,
    dry_run: bool,
}

impl<S: DataStore> EffectExecutor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            chime: Box::new(SilentChime),
            dry_run: false,
        }
    }

    /// Executor that logs effects as skipped without touching the store.
    pub fn dry_run(store: S) -> Self {
        Self {
            dry_run: true,
            ..Self::new(store)
        }
    }

    pub fn with_chime(mut self, chime: impl Chime + 'static) -> Self {
        self.chime = Box::new(chime);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Execute a batch in order. Later effects still run when earlier ones fail.
    pub fn execute_batch(&self, effects: Vec<Effect>) -> EffectLog {
        let results = effects.iter().map(|e| self.execute(e)).collect();
        EffectLog::new(results)
    }

    fn execute(&self, effect: &Effect) -> EffectResult {
        let kind = effect.kind().to_string();

        if self.dry_run {
            return EffectResult {
                kind,
                status: ExecutionStatus::Skipped {
                    reason: "dry-run mode".to_string(),
                },
            };
        }

        let outcome = match effect {
            Effect::CreateSession(draft) => self.store.create_session(draft).map(|session| {
                tracing::debug!(session_id = %session.id, "session recorded");
            }),
            Effect::UpdateTask { task_id, update } => {
                self.store.update_task(task_id, update).map(|task| {
                    tracing::debug!(
                        task_id = %task.id,
                        completed_pomodoros = task.completed_pomodoros,
                        completed = task.completed,
                        "task progress recorded"
                    );
                })
            }
            Effect::PlayChime { volume } => self.chime.play(*volume),
        };

        let status = match outcome {
            Ok(()) => ExecutionStatus::Success,
            Err(e) => {
                tracing::warn!(effect = %kind, error = %e, "effect failed; timer state kept");
                ExecutionStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };
        EffectResult { kind, status }
    }
}
