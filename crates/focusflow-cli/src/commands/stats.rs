use chrono::{NaiveDate, Utc};
use clap::Args;
use focusflow_core::{
    compute_statistics, format_minutes, Config, DataStore, DateRange, RangePreset, Report,
    SqliteStore, TaskFilter,
};

use super::{parse_date, CliResult};

#[derive(Args)]
pub struct StatsArgs {
    /// week, month or year (default: analytics.default_range)
    #[arg(long, conflicts_with_all = ["start", "end"])]
    range: Option<RangePreset>,
    /// First day (YYYY-MM-DD); requires --end
    #[arg(long, value_parser = parse_date, requires = "end")]
    start: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD); requires --start
    #[arg(long, value_parser = parse_date, requires = "start")]
    end: Option<NaiveDate>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: StatsArgs, config: &Config) -> CliResult {
    let store = SqliteStore::open_default(config)?;
    let today = Utc::now().date_naive();

    let range = match (args.start, args.end) {
        (Some(start), Some(end)) => DateRange::new(start, end),
        _ => DateRange::preset(
            args.range.unwrap_or(config.analytics.default_range),
            today,
        ),
    };

    let sessions = if range.is_empty() {
        Vec::new()
    } else {
        store.list_sessions(&range.query())?
    };
    let statistics = compute_statistics(&sessions, range.start, range.end, today);
    let tasks_completed = store.list_tasks(&TaskFilter::done())?.len() as u32;
    let report = Report {
        range,
        statistics,
        tasks_completed,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let stats = &report.statistics;
    println!("{} .. {}", report.range.start, report.range.end);
    println!("Focus time:          {}", format_minutes(stats.total_focus_time));
    println!("Sessions completed:  {}", stats.total_sessions_completed);
    println!("Tasks completed:     {}", report.tasks_completed);
    println!("Current streak:      {} day(s)", stats.streak);
    println!("Most productive day: {}", stats.most_productive_day);
    println!();
    let best = stats.most_productive_day.date();
    for day in &stats.daily_stats {
        println!(
            "{}  {:>3} session(s)  {:>8}{}",
            day.date.format("%a %Y-%m-%d"),
            day.total_sessions,
            format_minutes(day.total_minutes),
            if best == Some(day.date) { "  *" } else { "" },
        );
    }
    Ok(())
}
