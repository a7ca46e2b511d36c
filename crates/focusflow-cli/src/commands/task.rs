//! Task management commands for CLI.

use chrono::NaiveDate;
use clap::Subcommand;
use focusflow_core::error::CoreError;
use focusflow_core::{Config, DataStore, NewTask, Priority, SqliteStore, Task, TaskFilter, TaskUpdate};

use super::{parse_date, split_tags, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create {
        /// Task title
        title: String,
        /// Task description
        #[arg(long)]
        description: Option<String>,
        /// Estimated pomodoros (default: 1)
        #[arg(long, default_value = "1")]
        estimate: u32,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// List tasks (open ones unless --all or --done)
    List {
        /// Include completed tasks
        #[arg(long, conflicts_with = "done")]
        all: bool,
        /// Only completed tasks
        #[arg(long)]
        done: bool,
        #[arg(long)]
        priority: Option<Priority>,
        /// Case-insensitive text search in title and description
        #[arg(long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Update a task
    Update {
        /// Task ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// New description; an empty string clears it
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        estimate: Option<u32>,
        #[arg(long)]
        completed_pomodoros: Option<u32>,
        #[arg(long)]
        completed: Option<bool>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,
        /// Comma-separated tags; replaces the current ones
        #[arg(long)]
        tags: Option<String>,
    },
    /// Mark a task as completed
    Done {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction, config: &Config) -> CliResult {
    let store = SqliteStore::open_default(config)?;

    match action {
        TaskAction::Create {
            title,
            description,
            estimate,
            priority,
            due,
            tags,
        } => {
            let new_task = NewTask {
                title,
                description,
                estimated_pomodoros: estimate,
                priority,
                due_date: due,
                tags: tags.as_deref().map(split_tags).unwrap_or_default(),
            };
            let task = store.create_task(&new_task)?;
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List {
            all,
            done,
            priority,
            search,
            json,
        } => {
            let mut filter = if done {
                TaskFilter::done()
            } else if all {
                TaskFilter::default()
            } else {
                TaskFilter::open()
            };
            filter.priority = priority;
            filter.search = search;

            let tasks = store.list_tasks(&filter)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks.");
            } else {
                for task in &tasks {
                    println!("{}", summary_line(task));
                }
            }
        }
        TaskAction::Get { id } => {
            let task = store
                .get_task(&id)?
                .ok_or_else(|| CoreError::not_found("task", id))?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Update {
            id,
            title,
            description,
            estimate,
            completed_pomodoros,
            completed,
            priority,
            due,
            tags,
        } => {
            let update = TaskUpdate {
                title,
                description,
                estimated_pomodoros: estimate,
                completed_pomodoros,
                completed,
                priority,
                due_date: due,
                tags: tags.as_deref().map(split_tags),
            };
            if update.is_empty() {
                return Err("nothing to update".into());
            }
            let task = store.update_task(&id, &update)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Done { id } => {
            let task = store.update_task(
                &id,
                &TaskUpdate {
                    completed: Some(true),
                    ..Default::default()
                },
            )?;
            println!("Task completed: {}", task.title);
        }
        TaskAction::Delete { id } => {
            store.delete_task(&id)?;
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}

fn summary_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    let due = task
        .due_date
        .map(|d| format!(" due {d}"))
        .unwrap_or_default();
    format!(
        "[{mark}] {}  {}  {}/{} ({}){due}",
        task.id,
        task.title,
        task.completed_pomodoros,
        task.estimated_pomodoros,
        task.priority.as_str(),
    )
}
