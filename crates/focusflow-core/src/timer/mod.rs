mod effects;
mod engine;
mod executor;
mod mode;
mod worker;

pub use effects::Effect;
pub use engine::{format_clock, Tick, TimerEngine, TimerState};
pub use executor::{Chime, EffectExecutor, EffectLog, EffectResult, ExecutionStatus, SilentChime};
pub use mode::TimerMode;
pub use worker::EffectWorker;
