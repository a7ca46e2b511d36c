//! `focusflow timer`: drive the timer engine in the foreground.

use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use focusflow_core::error::{CoreError, Result as CoreResult};
use focusflow_core::{
    Chime, Config, DataStore, EffectExecutor, EffectLog, EffectWorker, Event, SqliteStore,
    TimerEngine, TimerMode, ValidationError,
};
use serde::Serialize;

use super::CliResult;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the timer until it stops on its own, N focus intervals finish, or Ctrl-C
    Run {
        /// Task credited by completed focus intervals
        #[arg(long)]
        task: Option<String>,
        /// Interval to start with
        #[arg(long, default_value = "focus")]
        mode: TimerMode,
        /// Stop after this many completed focus intervals
        #[arg(long)]
        pomodoros: Option<u32>,
        /// Milliseconds per timer second (overrides timer.tick_ms)
        #[arg(long)]
        tick_ms: Option<u64>,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Print the state a new timer would start from
    Status,
}

/// Rings the terminal bell.
struct TerminalBell;

impl Chime for TerminalBell {
    fn play(&self, volume: u8) -> CoreResult<()> {
        if volume == 0 {
            return Ok(());
        }
        let mut err = std::io::stderr();
        err.write_all(b"\x07")?;
        err.flush()?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct RunSummary {
    completed_pomodoros: u32,
    interrupted: bool,
    effect_failures: usize,
}

struct RunOptions {
    mode: TimerMode,
    pomodoros: Option<u32>,
    tick: Duration,
    json: bool,
}

pub fn run(action: TimerAction, config: &Config) -> CliResult {
    let store = SqliteStore::open_default(config)?;

    match action {
        TimerAction::Run {
            task,
            mode,
            pomodoros,
            tick_ms,
            json,
        } => {
            let mut engine = TimerEngine::new(store.get_settings()?)?;
            if let Some(id) = task {
                let task = store
                    .get_task(&id)?
                    .ok_or_else(|| CoreError::not_found("task", id.clone()))?;
                if task.completed {
                    return Err(ValidationError::invalid("task", "task is already completed").into());
                }
                engine.select_task(Some(&task));
            }

            let options = RunOptions {
                mode,
                pomodoros,
                tick: Duration::from_millis(tick_ms.unwrap_or(config.timer.tick_ms).max(1)),
                json,
            };
            let executor = EffectExecutor::new(store).with_chime(TerminalBell);

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let summary = runtime.block_on(run_loop(engine, executor, options))?;

            if json {
                println!("{}", serde_json::to_string(&summary)?);
            } else {
                println!(
                    "{} focus interval(s) completed{}",
                    summary.completed_pomodoros,
                    if summary.interrupted { " (interrupted)" } else { "" }
                );
            }
        }
        TimerAction::Status => {
            let engine = TimerEngine::new(store.get_settings()?)?;
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
    }
    Ok(())
}

async fn run_loop(
    mut engine: TimerEngine,
    executor: EffectExecutor<SqliteStore>,
    options: RunOptions,
) -> CoreResult<RunSummary> {
    if options.mode != TimerMode::Focus {
        engine.set_mode(options.mode);
    }
    let mut worker = EffectWorker::spawn(executor);
    let mut completed = 0u32;
    let mut failures = 0usize;
    let mut interrupted = false;

    if let Some(event) = engine.start() {
        print_event(&event, &engine, options.json)?;
    }

    let mut interval = tokio::time::interval(options.tick);
    // The first tick of a tokio interval fires immediately.
    interval.tick().await;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!(remaining = engine.state().time_left_secs, "interrupted; current interval not recorded");
                interrupted = true;
                break;
            }
            _ = interval.tick() => {
                let tick = engine.tick();
                worker.submit(tick.effects);
                failures += report(worker.drain_reports());

                let Some(event) = tick.event else {
                    if !options.json && engine.state().time_left_secs % 60 == 0 {
                        println!("{} {}", engine.state().mode, engine.state().clock());
                    }
                    continue;
                };

                if matches!(event, Event::FocusCompleted { .. }) {
                    completed += 1;
                }
                print_event(&event, &engine, options.json)?;

                if options.pomodoros.is_some_and(|n| completed >= n) {
                    break;
                }
                if !engine.state().is_active {
                    tracing::debug!(mode = ?engine.state().mode, "timer stopped; auto-start is off");
                    break;
                }
            }
        }
    }

    let (_, logs) = worker.shutdown().await?;
    failures += report(logs);

    Ok(RunSummary {
        completed_pomodoros: completed,
        interrupted,
        effect_failures: failures,
    })
}

/// Print effect warnings; returns the number of failures.
fn report(logs: Vec<EffectLog>) -> usize {
    let mut failures = 0;
    for log in logs {
        failures += log.failure_count();
        for warning in log.warnings() {
            eprintln!("warning: {warning}");
        }
    }
    failures
}

fn print_event(event: &Event, engine: &TimerEngine, json: bool) -> CoreResult<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    match event {
        Event::TimerStarted { mode, .. } => {
            println!("{mode} started: {}", engine.state().clock());
        }
        Event::FocusCompleted {
            completed_pomodoros,
            next,
            auto_started,
            ..
        } => {
            println!(
                "Focus complete ({completed_pomodoros} this run). Next: {next}{}",
                if *auto_started { "" } else { " (paused)" }
            );
        }
        Event::BreakCompleted { mode, auto_started, .. } => {
            println!(
                "{mode} over. Next: Focus{}",
                if *auto_started { "" } else { " (paused)" }
            );
        }
        _ => {}
    }
    Ok(())
}
