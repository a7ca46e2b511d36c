//! Per-user timer settings.
//!
//! Settings live in the data store next to tasks and sessions. The timer only
//! ever holds a snapshot; changing settings never rewrites the interval that is
//! already counting down.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timer::TimerMode;

/// Longest focus interval, in minutes.
pub const POMODORO_LENGTH_MAX: u32 = 120;

/// Timer durations, cadence and notification preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Focus interval length in minutes.
    #[serde(default = "default_pomodoro_length")]
    pub pomodoro_length: u32,
    #[serde(default = "default_short_break_length")]
    pub short_break_length: u32,
    #[serde(default = "default_long_break_length")]
    pub long_break_length: u32,
    /// Every Nth completed focus interval is followed by a long break.
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    #[serde(default)]
    pub auto_start_breaks: bool,
    #[serde(default)]
    pub auto_start_pomodoros: bool,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    /// 0..=100
    #[serde(default = "default_volume")]
    pub sound_volume: u8,
    #[serde(default = "default_true")]
    pub dark_mode: bool,
}

fn default_pomodoro_length() -> u32 {
    25
}
fn default_short_break_length() -> u32 {
    5
}
fn default_long_break_length() -> u32 {
    15
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_volume() -> u8 {
    50
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pomodoro_length: default_pomodoro_length(),
            short_break_length: default_short_break_length(),
            long_break_length: default_long_break_length(),
            long_break_interval: default_long_break_interval(),
            auto_start_breaks: false,
            auto_start_pomodoros: false,
            sound_enabled: true,
            sound_volume: default_volume(),
            dark_mode: true,
        }
    }
}

fn check_range(field: &str, value: u32, min: u32, max: u32) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::invalid(
            field,
            format!("must be between {min} and {max}, got {value}"),
        ));
    }
    Ok(())
}

impl Settings {
    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("pomodoro_length", self.pomodoro_length, 1, POMODORO_LENGTH_MAX)?;
        check_range("short_break_length", self.short_break_length, 1, 30)?;
        check_range("long_break_length", self.long_break_length, 1, 60)?;
        check_range("long_break_interval", self.long_break_interval, 1, 10)?;
        check_range("sound_volume", u32::from(self.sound_volume), 0, 100)?;
        Ok(())
    }

    /// Configured length of `mode` in minutes.
    pub fn duration_min(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.pomodoro_length,
            TimerMode::ShortBreak => self.short_break_length,
            TimerMode::LongBreak => self.long_break_length,
        }
    }

    /// Configured length of `mode` in seconds.
    pub fn duration_secs(&self, mode: TimerMode) -> u32 {
        self.duration_min(mode).saturating_mul(60)
    }

    /// Merge a partial update, returning the validated result.
    ///
    /// `self` is left untouched when the merged settings are invalid.
    pub fn apply(&self, update: &SettingsUpdate) -> Result<Settings, ValidationError> {
        let mut next = self.clone();
        if let Some(v) = update.pomodoro_length {
            next.pomodoro_length = v;
        }
        if let Some(v) = update.short_break_length {
            next.short_break_length = v;
        }
        if let Some(v) = update.long_break_length {
            next.long_break_length = v;
        }
        if let Some(v) = update.long_break_interval {
            next.long_break_interval = v;
        }
        if let Some(v) = update.auto_start_breaks {
            next.auto_start_breaks = v;
        }
        if let Some(v) = update.auto_start_pomodoros {
            next.auto_start_pomodoros = v;
        }
        if let Some(v) = update.sound_enabled {
            next.sound_enabled = v;
        }
        if let Some(v) = update.sound_volume {
            next.sound_volume = v;
        }
        if let Some(v) = update.dark_mode {
            next.dark_mode = v;
        }
        next.validate()?;
        Ok(next)
    }
}

/// Partial settings update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pomodoro_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_break_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_start_breaks: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_start_pomodoros: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_volume: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
}

impl SettingsUpdate {
    /// Build a single-field update from a `key` / textual `value` pair.
    pub fn from_pair(key: &str, value: &str) -> Result<Self, ValidationError> {
        fn num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ValidationError> {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ValidationError::invalid(key, format!("'{value}' is not a number")))
        }
        fn flag(key: &str, value: &str) -> Result<bool, ValidationError> {
            value
                .trim()
                .parse::<bool>()
                .map_err(|_| ValidationError::invalid(key, format!("'{value}' is not true/false")))
        }

        let mut update = SettingsUpdate::default();
        match key {
            "pomodoro_length" => update.pomodoro_length = Some(num(key, value)?),
            "short_break_length" => update.short_break_length = Some(num(key, value)?),
            "long_break_length" => update.long_break_length = Some(num(key, value)?),
            "long_break_interval" => update.long_break_interval = Some(num(key, value)?),
            "auto_start_breaks" => update.auto_start_breaks = Some(flag(key, value)?),
            "auto_start_pomodoros" => update.auto_start_pomodoros = Some(flag(key, value)?),
            "sound_enabled" => update.sound_enabled = Some(flag(key, value)?),
            "sound_volume" => update.sound_volume = Some(num(key, value)?),
            "dark_mode" => update.dark_mode = Some(flag(key, value)?),
            other => return Err(ValidationError::invalid(other, "unknown setting")),
        }
        Ok(update)
    }
}
