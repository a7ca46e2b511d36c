use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use focusflow_core::{Config, DataStore, DateRange, SessionDraft, SessionQuery, SqliteStore};

use super::{parse_date, CliResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// List recorded sessions, newest first
    List {
        /// First day (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,
        /// Only sessions credited to this task
        #[arg(long)]
        task: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a completed focus session ending now
    Log {
        /// Length in minutes
        #[arg(long)]
        duration: u32,
        #[arg(long)]
        task: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
}

pub fn run(action: SessionAction, config: &Config) -> CliResult {
    let store = SqliteStore::open_default(config)?;

    match action {
        SessionAction::List {
            start,
            end,
            task,
            json,
        } => {
            let mut query = SessionQuery {
                task_id: task,
                ..SessionQuery::default()
            };
            if let Some(start) = start {
                query.start = Some(DateRange::new(start, start).bounds().0);
            }
            if let Some(end) = end {
                query.end = Some(DateRange::new(end, end).bounds().1);
            }

            let sessions = store.list_sessions(&query)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else if sessions.is_empty() {
                println!("No sessions.");
            } else {
                for s in &sessions {
                    println!(
                        "{}  {:>3} min  {}{}",
                        s.start_time.format("%Y-%m-%d %H:%M"),
                        s.duration,
                        if s.completed { "completed" } else { "incomplete" },
                        s.task_id
                            .as_deref()
                            .map(|t| format!("  task {t}"))
                            .unwrap_or_default(),
                    );
                }
            }
        }
        SessionAction::Log {
            duration,
            task,
            notes,
        } => {
            let mut draft = SessionDraft::completed_focus(duration, Utc::now(), task);
            draft.notes = notes;
            let session = store.create_session(&draft)?;
            println!("Session recorded: {}", session.id);
        }
    }
    Ok(())
}
