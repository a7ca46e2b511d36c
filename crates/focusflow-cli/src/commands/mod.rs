pub mod config;
pub mod session;
pub mod settings;
pub mod stats;
pub mod task;
pub mod timer;

use chrono::NaiveDate;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Parse `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date '{s}': {e}"))
}

/// Comma-separated list, trimmed, empty items dropped.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
