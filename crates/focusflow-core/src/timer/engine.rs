//! Timer engine implementation.
//!
//! The engine is a second-granularity countdown state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` once per
//! elapsed second (a real clock, a test loop, or simulated time).
//!
//! ## State Transitions
//!
//! ```text
//! Focus --zero--> ShortBreak | LongBreak --zero--> Focus
//! any   --set_mode / reset--> chosen mode, paused, full duration
//! ```
//!
//! Reaching zero in Focus produces [`Effect`]s (record session, credit task,
//! chime). The engine never performs them; see [`super::EffectExecutor`].
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(settings)?;
//! engine.start();
//! // once per second:
//! let tick = engine.tick();
//! executor.execute_batch(tick.effects);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::effects::Effect;
use super::mode::TimerMode;
use crate::error::ValidationError;
use crate::events::Event;
use crate::session::SessionDraft;
use crate::settings::Settings;
use crate::task::Task;

/// In-memory timer state. Not persisted; discarded with the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: TimerMode,
    pub time_left_secs: u32,
    /// Full length of the current interval, fixed when the interval was reset.
    pub duration_secs: u32,
    pub is_active: bool,
    /// Focus intervals completed since the engine was created.
    pub completed_pomodoros: u32,
    pub current_task_id: Option<String>,
}

impl TimerState {
    /// Remaining time as `MM:SS`.
    pub fn clock(&self) -> String {
        format_clock(self.time_left_secs)
    }

    /// 0.0 .. 1.0 of the current interval already elapsed.
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        1.0 - (f64::from(self.time_left_secs) / f64::from(self.duration_secs))
    }
}

/// Format seconds as `MM:SS`; minutes are not wrapped at 60.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Outcome of a single `tick()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tick {
    /// Set when an interval reached zero on this tick.
    pub event: Option<Event>,
    /// Side effects to perform; empty unless a focus interval completed.
    pub effects: Vec<Effect>,
}

impl Tick {
    pub fn is_transition(&self) -> bool {
        self.event.is_some()
    }
}

/// Core timer engine.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    settings: Settings,
    state: TimerState,
    /// Local copy of the selected task's progress, used to decide auto-completion.
    selected_task: Option<Task>,
}

impl TimerEngine {
    /// Create a paused engine in Focus mode with a full interval.
    ///
    /// Settings outside their allowed ranges are rejected, so a zero-length
    /// focus interval can never be loaded.
    pub fn new(settings: Settings) -> Result<Self, ValidationError> {
        settings.validate()?;
        let duration = settings.duration_secs(TimerMode::Focus);
        Ok(Self {
            settings,
            state: TimerState {
                mode: TimerMode::Focus,
                time_left_secs: duration,
                duration_secs: duration,
                is_active: false,
                completed_pomodoros: 0,
                current_task_id: None,
            },
            selected_task: None,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected_task.as_ref()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state.clone(),
            clock: self.state.clock(),
            progress: self.state.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Resume counting down. Never resets the remaining time.
    pub fn start(&mut self) -> Option<Event> {
        if self.state.is_active {
            return None;
        }
        self.state.is_active = true;
        tracing::debug!(mode = ?self.state.mode, remaining = self.state.time_left_secs, "timer started");
        Some(Event::TimerStarted {
            mode: self.state.mode,
            remaining_secs: self.state.time_left_secs,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.is_active {
            return None;
        }
        self.state.is_active = false;
        tracing::debug!(mode = ?self.state.mode, remaining = self.state.time_left_secs, "timer paused");
        Some(Event::TimerPaused {
            mode: self.state.mode,
            remaining_secs: self.state.time_left_secs,
            at: Utc::now(),
        })
    }

    pub fn toggle(&mut self) -> Option<Event> {
        if self.state.is_active {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Stop and refill `mode` to its configured length.
    ///
    /// The completed-pomodoro count is kept; in-flight progress is dropped
    /// without recording a session.
    pub fn reset(&mut self, mode: TimerMode) -> Option<Event> {
        self.load_mode(mode, false);
        Some(Event::TimerReset {
            mode,
            remaining_secs: self.state.time_left_secs,
            at: Utc::now(),
        })
    }

    /// Manual mode switch. Always stops the countdown and discards progress.
    pub fn set_mode(&mut self, mode: TimerMode) -> Option<Event> {
        let from = self.state.mode;
        self.load_mode(mode, false);
        tracing::debug!(?from, to = ?mode, "mode switched manually");
        Some(Event::ModeChanged {
            from,
            to: mode,
            at: Utc::now(),
        })
    }

    /// Choose the task credited by the next completed focus interval.
    ///
    /// Does not touch the running countdown.
    pub fn select_task(&mut self, task: Option<&Task>) -> Option<Event> {
        let task_id = task.map(|t| t.id.clone());
        if task_id == self.state.current_task_id {
            return None;
        }
        self.selected_task = task.cloned();
        self.state.current_task_id = task_id.clone();
        Some(Event::TaskSelected {
            task_id,
            at: Utc::now(),
        })
    }

    /// Replace the settings snapshot.
    ///
    /// The interval already loaded keeps its remaining time; new durations
    /// apply from the next reset or transition. Invalid settings leave the
    /// current snapshot in place.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<(), ValidationError> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Advance one second using the current wall clock.
    pub fn tick(&mut self) -> Tick {
        self.tick_at(Utc::now())
    }

    /// Advance one second; `now` stamps any session recorded by this tick.
    ///
    /// While active, a tick above zero decrements. A tick at zero performs the
    /// mode transition exactly once and leaves the timer stopped unless the
    /// matching auto-start flag is set.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Tick {
        if !self.state.is_active {
            return Tick::default();
        }
        if self.state.time_left_secs > 0 {
            self.state.time_left_secs -= 1;
            return Tick::default();
        }
        match self.state.mode {
            TimerMode::Focus => self.complete_focus(now),
            mode => self.complete_break(mode, now),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// The recorded session lasts as long as the interval actually timed.
    /// That is `pomodoro_length` unless settings changed mid-interval, in
    /// which case the interval loaded at the last reset wins.
    fn complete_focus(&mut self, now: DateTime<Utc>) -> Tick {
        let mut effects = Vec::new();
        let task_id = self.state.current_task_id.clone();

        effects.push(Effect::CreateSession(SessionDraft::completed_focus(
            interval_minutes(self.state.duration_secs),
            now,
            task_id.clone(),
        )));

        self.state.completed_pomodoros = self.state.completed_pomodoros.saturating_add(1);

        if let Some(task) = self.selected_task.as_mut() {
            let (update, finished) = task.progress_after_focus();
            task.apply(&update);
            effects.push(Effect::UpdateTask {
                task_id: task.id.clone(),
                update,
            });
            if finished {
                tracing::info!(task_id = %task.id, "task reached its estimate; deselecting");
                self.selected_task = None;
                self.state.current_task_id = None;
            }
        }

        if self.settings.sound_enabled {
            effects.push(Effect::PlayChime {
                volume: self.settings.sound_volume,
            });
        }

        let next = TimerMode::break_after(
            self.state.completed_pomodoros,
            self.settings.long_break_interval,
        );
        let auto = self.settings.auto_start_breaks;
        self.load_mode(next, auto);

        tracing::info!(
            completed = self.state.completed_pomodoros,
            ?next,
            auto_started = auto,
            "focus interval completed"
        );

        Tick {
            event: Some(Event::FocusCompleted {
                completed_pomodoros: self.state.completed_pomodoros,
                task_id,
                next,
                auto_started: auto,
                at: now,
            }),
            effects,
        }
    }

    fn complete_break(&mut self, mode: TimerMode, now: DateTime<Utc>) -> Tick {
        let auto = self.settings.auto_start_pomodoros;
        self.load_mode(TimerMode::Focus, auto);
        tracing::info!(?mode, auto_started = auto, "break completed");
        Tick {
            event: Some(Event::BreakCompleted {
                mode,
                auto_started: auto,
                at: now,
            }),
            effects: Vec::new(),
        }
    }

    fn load_mode(&mut self, mode: TimerMode, active: bool) {
        let duration = self.settings.duration_secs(mode);
        self.state.mode = mode;
        self.state.time_left_secs = duration;
        self.state.duration_secs = duration;
        self.state.is_active = active;
    }
}

/// Whole minutes of an interval, rounded up and never zero.
///
/// Focus intervals are loaded from whole-minute settings, so this is exact
/// for them.
fn interval_minutes(secs: u32) -> u32 {
    secs.div_ceil(60).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    fn quick_settings() -> Settings {
        Settings {
            pomodoro_length: 1,
            short_break_length: 1,
            long_break_length: 2,
            long_break_interval: 4,
            ..Settings::default()
        }
    }

    fn run_to_transition(engine: &mut TimerEngine) -> Tick {
        for _ in 0..10_000 {
            let tick = engine.tick();
            if tick.is_transition() {
                return tick;
            }
        }
        panic!("timer never reached zero");
    }

    fn task(estimated: u32, completed: u32) -> Task {
        Task {
            id: "task-1".into(),
            title: "Draft".into(),
            description: None,
            estimated_pomodoros: estimated,
            completed_pomodoros: completed,
            completed: false,
            priority: Priority::Medium,
            due_date: None,
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn new_engine_is_paused_focus() {
        let engine = TimerEngine::new(Settings::default()).unwrap();
        let s = engine.state();
        assert_eq!(s.mode, TimerMode::Focus);
        assert_eq!(s.time_left_secs, 25 * 60);
        assert!(!s.is_active);
        assert_eq!(s.clock(), "25:00");
    }

    #[test]
    fn start_is_idempotent_and_keeps_time() {
        let mut engine = TimerEngine::new(Settings::default()).unwrap();
        assert!(engine.start().is_some());
        engine.tick();
        let left = engine.state().time_left_secs;
        assert!(engine.start().is_none());
        assert_eq!(engine.state().time_left_secs, left);
    }

    #[test]
    fn pause_twice_is_noop() {
        let mut engine = TimerEngine::new(Settings::default()).unwrap();
        engine.start();
        engine.tick();
        assert!(engine.pause().is_some());
        let after_first = engine.state().clone();
        assert!(engine.pause().is_none());
        assert_eq!(engine.state(), &after_first);
    }

    #[test]
    fn paused_tick_does_nothing() {
        let mut engine = TimerEngine::new(Settings::default()).unwrap();
        let tick = engine.tick();
        assert_eq!(tick, Tick::default());
        assert_eq!(engine.state().time_left_secs, 25 * 60);
    }

    #[test]
    fn transition_needs_tick_at_zero() {
        let mut engine = TimerEngine::new(quick_settings()).unwrap();
        engine.start();
        for _ in 0..60 {
            assert!(!engine.tick().is_transition());
        }
        assert_eq!(engine.state().time_left_secs, 0);
        let tick = engine.tick();
        assert!(tick.is_transition());
        assert_eq!(engine.state().mode, TimerMode::ShortBreak);
        assert!(!engine.state().is_active);
        assert_eq!(engine.state().time_left_secs, 60);
    }

    #[test]
    fn focus_completion_emits_session_and_chime() {
        let mut engine = TimerEngine::new(quick_settings()).unwrap();
        engine.start();
        let tick = run_to_transition(&mut engine);
        assert_eq!(tick.effects.len(), 2);
        match &tick.effects[0] {
            Effect::CreateSession(draft) => {
                assert_eq!(draft.duration, 1);
                assert!(draft.completed);
                assert_eq!(draft.task_id, None);
            }
            other => panic!("expected CreateSession, got {other:?}"),
        }
        assert_eq!(tick.effects[1], Effect::PlayChime { volume: 50 });
        assert_eq!(engine.state().completed_pomodoros, 1);
    }

    #[test]
    fn chime_skipped_when_sound_disabled() {
        let mut engine = TimerEngine::new(Settings {
            sound_enabled: false,
            ..quick_settings()
        })
        .unwrap();
        engine.start();
        let tick = run_to_transition(&mut engine);
        assert!(tick
            .effects
            .iter()
            .all(|e| !matches!(e, Effect::PlayChime { .. })));
    }

    #[test]
    fn break_completion_has_no_effects() {
        let mut engine = TimerEngine::new(quick_settings()).unwrap();
        engine.set_mode(TimerMode::ShortBreak);
        engine.start();
        let tick = run_to_transition(&mut engine);
        assert!(tick.effects.is_empty());
        assert!(matches!(tick.event, Some(Event::BreakCompleted { .. })));
        assert_eq!(engine.state().mode, TimerMode::Focus);
        assert_eq!(engine.state().completed_pomodoros, 0);
    }

    #[test]
    fn auto_start_breaks_keeps_ticking() {
        let mut engine = TimerEngine::new(Settings {
            auto_start_breaks: true,
            ..quick_settings()
        })
        .unwrap();
        engine.start();
        run_to_transition(&mut engine);
        assert!(engine.state().is_active);
        assert_eq!(engine.state().mode, TimerMode::ShortBreak);
        assert_eq!(engine.state().time_left_secs, 60);
        let tick = run_to_transition(&mut engine);
        // autoStartPomodoros is off, so the focus interval waits.
        assert!(matches!(tick.event, Some(Event::BreakCompleted { auto_started: false, .. })));
        assert!(!engine.state().is_active);
    }

    #[test]
    fn set_mode_discards_progress_without_effects() {
        let mut engine = TimerEngine::new(quick_settings()).unwrap();
        engine.start();
        for _ in 0..30 {
            engine.tick();
        }
        let event = engine.set_mode(TimerMode::LongBreak);
        assert!(matches!(event, Some(Event::ModeChanged { .. })));
        let s = engine.state();
        assert_eq!(s.mode, TimerMode::LongBreak);
        assert_eq!(s.time_left_secs, 120);
        assert!(!s.is_active);
        assert_eq!(s.completed_pomodoros, 0);
    }

    #[test]
    fn reset_keeps_completed_count() {
        let mut engine = TimerEngine::new(quick_settings()).unwrap();
        engine.start();
        run_to_transition(&mut engine);
        engine.start();
        engine.tick();
        engine.reset(TimerMode::ShortBreak);
        assert_eq!(engine.state().completed_pomodoros, 1);
        assert_eq!(engine.state().time_left_secs, 60);
        assert!(!engine.state().is_active);
    }

    #[test]
    fn finishing_task_deselects_it() {
        let mut engine = TimerEngine::new(quick_settings()).unwrap();
        engine.select_task(Some(&task(2, 1)));
        engine.start();
        let tick = run_to_transition(&mut engine);
        let update = tick
            .effects
            .iter()
            .find_map(|e| match e {
                Effect::UpdateTask { task_id, update } => Some((task_id.clone(), update.clone())),
                _ => None,
            })
            .expect("task update effect");
        assert_eq!(update.0, "task-1");
        assert_eq!(update.1.completed_pomodoros, Some(2));
        assert_eq!(update.1.completed, Some(true));
        assert_eq!(engine.state().current_task_id, None);
        assert!(engine.selected_task().is_none());
    }

    #[test]
    fn unfinished_task_stays_selected_and_tracks_progress() {
        let mut engine = TimerEngine::new(quick_settings()).unwrap();
        engine.select_task(Some(&task(3, 0)));
        engine.start();
        run_to_transition(&mut engine);
        assert_eq!(engine.state().current_task_id.as_deref(), Some("task-1"));
        assert_eq!(engine.selected_task().unwrap().completed_pomodoros, 1);
    }

    #[test]
    fn settings_change_does_not_touch_running_interval() {
        let mut engine = TimerEngine::new(quick_settings()).unwrap();
        engine.start();
        engine.tick();
        engine
            .apply_settings(Settings {
                pomodoro_length: 50,
                ..quick_settings()
            })
            .unwrap();
        assert_eq!(engine.state().time_left_secs, 59);
        engine.reset(TimerMode::Focus);
        assert_eq!(engine.state().time_left_secs, 50 * 60);
    }

    #[test]
    fn zero_length_focus_is_rejected() {
        let result = TimerEngine::new(Settings {
            pomodoro_length: 0,
            ..Settings::default()
        });
        assert!(matches!(
            result,
            Err(ValidationError::InvalidValue { ref field, .. }) if field == "pomodoro_length"
        ));
        assert!(TimerEngine::new(Settings {
            long_break_interval: 0,
            ..Settings::default()
        })
        .is_err());
    }

    #[test]
    fn invalid_settings_change_keeps_previous_snapshot() {
        let mut engine = TimerEngine::new(quick_settings()).unwrap();
        let result = engine.apply_settings(Settings {
            pomodoro_length: 0,
            ..quick_settings()
        });
        assert!(result.is_err());
        assert_eq!(engine.settings(), &quick_settings());
        engine.reset(TimerMode::Focus);
        assert_eq!(engine.state().time_left_secs, 60);
    }

    #[test]
    fn session_records_interval_timed_after_mid_interval_change() {
        let mut engine = TimerEngine::new(quick_settings()).unwrap();
        engine.start();
        engine.tick();
        engine
            .apply_settings(Settings {
                pomodoro_length: 50,
                ..quick_settings()
            })
            .unwrap();
        let tick = run_to_transition(&mut engine);
        match &tick.effects[0] {
            Effect::CreateSession(draft) => assert_eq!(draft.duration, 1),
            other => panic!("expected CreateSession, got {other:?}"),
        }
    }

    #[test]
    fn clock_and_progress() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(120 * 60), "120:00");
        let mut engine = TimerEngine::new(quick_settings()).unwrap();
        engine.start();
        for _ in 0..30 {
            engine.tick();
        }
        assert!((engine.state().progress() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = TimerEngine::new(Settings::default()).unwrap();
        match engine.snapshot() {
            Event::StateSnapshot { state, clock, progress, .. } => {
                assert_eq!(state.mode, TimerMode::Focus);
                assert_eq!(clock, "25:00");
                assert_eq!(progress, 0.0);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}
