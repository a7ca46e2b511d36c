//! Analytics over recorded sessions.
//!
//! Everything here is pure: callers fetch the sessions (usually with
//! [`DateRange::query`]) and pass them in together with the range and the
//! current date.

mod daily;
mod range;
mod streak;
mod summary;

pub use daily::{bucket_by_day, DailyStat};
pub use range::{DateRange, RangePreset};
pub use streak::current_streak;
pub use summary::{
    compute_statistics, format_minutes, MostProductiveDay, Report,
    Statistics,
};
