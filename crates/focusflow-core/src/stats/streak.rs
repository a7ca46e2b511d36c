use chrono::NaiveDate;

use super::daily::DailyStat;

/// Consecutive active days ending at or before `today`.
///
/// Scans backward from the latest bucket not after `today`. Buckets after
/// `today` are ignored, an inactive `today` is skipped (the day is not over),
/// and the first inactive day before `today` ends the streak.
///
/// `buckets` must be dense and ascending, as produced by [`super::bucket_by_day`].
pub fn current_streak(buckets: &[DailyStat], today: NaiveDate) -> u32 {
    let mut streak = 0;
    for day in buckets.iter().rev().filter(|b| b.date <= today) {
        if day.has_activity() {
            streak += 1;
        } else if day.date < today {
            break;
        }
    }
    streak
}
