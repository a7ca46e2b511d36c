//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a throwaway `FOCUSFLOW_HOME` and verify
//! outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_focusflow"))
        .env("FOCUSFLOW_HOME", home)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_ok(home: &Path, args: &[&str]) -> String {
    let (code, stdout, stderr) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("Failed to parse JSON output")
}

fn create_task(home: &Path, title: &str, estimate: &str) -> String {
    let out = run_ok(home, &["task", "create", title, "--estimate", estimate]);
    let first = out.lines().next().unwrap();
    first.trim_start_matches("Task created: ").to_string()
}

#[test]
fn test_first_run_writes_config() {
    let home = tempfile::tempdir().unwrap();
    let out = run_ok(home.path(), &["config", "get", "timer.tick_ms"]);
    assert_eq!(out.trim(), "1000");
    assert!(home.path().join("config.toml").exists());
}

#[test]
fn test_config_set_persists() {
    let home = tempfile::tempdir().unwrap();
    run_ok(home.path(), &["config", "set", "analytics.default_range", "month"]);
    let out = run_ok(home.path(), &["config", "get", "analytics.default_range"]);
    assert_eq!(out.trim(), "month");

    let (code, _, stderr) = run_cli(home.path(), &["config", "get", "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_config_set_rejects_unusable_values() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["config", "set", "timer.tick_ms", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("timer.tick_ms"));

    let (code, _, _) = run_cli(home.path(), &["config", "set", "analytics.default_range", "decade"]);
    assert_eq!(code, 1);

    let out = run_ok(home.path(), &["config", "get", "timer.tick_ms"]);
    assert_eq!(out.trim(), "1000");
}

#[test]
fn test_config_list_and_reset() {
    let home = tempfile::tempdir().unwrap();
    let out = run_ok(home.path(), &["config", "set", "timer.tick_ms", "250"]);
    assert_eq!(out.trim(), "timer.tick_ms = 250");

    let listed = run_ok(home.path(), &["config", "list"]);
    assert!(listed.starts_with("# "));
    assert!(listed.contains("config.toml"));
    assert!(listed.contains("tick_ms = 250"));

    let as_json = json(&run_ok(home.path(), &["config", "list", "--json"]));
    assert_eq!(as_json["timer"]["tick_ms"], 250);

    let reset = run_ok(home.path(), &["config", "reset"]);
    assert!(reset.contains("config.toml"));
    let out = run_ok(home.path(), &["config", "get", "timer.tick_ms"]);
    assert_eq!(out.trim(), "1000");
}

#[test]
fn test_task_lifecycle() {
    let home = tempfile::tempdir().unwrap();
    let id = create_task(home.path(), "Write tests", "3");

    let list = json(&run_ok(home.path(), &["task", "list", "--json"]));
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["estimated_pomodoros"], 3);

    let updated = json(&run_ok(
        home.path(),
        &["task", "update", &id, "--title", "Write more tests", "--priority", "high"],
    ));
    assert_eq!(updated["title"], "Write more tests");
    assert_eq!(updated["priority"], "high");

    run_ok(home.path(), &["task", "done", &id]);
    let open = json(&run_ok(home.path(), &["task", "list", "--json"]));
    assert!(open.as_array().unwrap().is_empty());
    let done = json(&run_ok(home.path(), &["task", "list", "--done", "--json"]));
    assert_eq!(done.as_array().unwrap().len(), 1);

    run_ok(home.path(), &["task", "delete", &id]);
    let (code, _, stderr) = run_cli(home.path(), &["task", "get", &id]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_task_validation_errors() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["task", "create", "   "]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));

    let (code, _, _) = run_cli(home.path(), &["task", "create", "Too big", "--estimate", "0"]);
    assert_eq!(code, 1);
}

#[test]
fn test_settings_set_and_reset() {
    let home = tempfile::tempdir().unwrap();
    let shown = json(&run_ok(home.path(), &["settings", "show"]));
    assert_eq!(shown["pomodoro_length"], 25);

    let updated = json(&run_ok(home.path(), &["settings", "set", "pomodoro_length", "50"]));
    assert_eq!(updated["pomodoro_length"], 50);

    let (code, _, _) = run_cli(home.path(), &["settings", "set", "pomodoro_length", "500"]);
    assert_eq!(code, 1);

    let reset = json(&run_ok(home.path(), &["settings", "reset"]));
    assert_eq!(reset["pomodoro_length"], 25);
}

#[test]
fn test_stats_empty() {
    let home = tempfile::tempdir().unwrap();
    let report = json(&run_ok(home.path(), &["stats", "--json"]));
    assert_eq!(report["total_sessions_completed"], 0);
    assert_eq!(report["streak"], 0);
    assert_eq!(report["daily_stats"].as_array().unwrap().len(), 8);
    assert_eq!(report["most_productive_day"]["status"], "no_data");

    let text = run_ok(home.path(), &["stats"]);
    assert!(text.contains("No data available"));
    assert!(text.contains("0h 0m"));
}

#[test]
fn test_stats_reversed_range_is_empty() {
    let home = tempfile::tempdir().unwrap();
    let report = json(&run_ok(
        home.path(),
        &["stats", "--start", "2024-05-10", "--end", "2024-05-01", "--json"],
    ));
    assert_eq!(report["total_focus_time"], 0);
    assert!(report["daily_stats"].as_array().unwrap().is_empty());
}

#[test]
fn test_session_log_feeds_stats() {
    let home = tempfile::tempdir().unwrap();
    let id = create_task(home.path(), "Read paper", "2");
    run_ok(home.path(), &["session", "log", "--duration", "30", "--task", &id]);
    run_ok(home.path(), &["session", "log", "--duration", "20"]);

    let sessions = json(&run_ok(home.path(), &["session", "list", "--json"]));
    assert_eq!(sessions.as_array().unwrap().len(), 2);

    let report = json(&run_ok(home.path(), &["stats", "--range", "week", "--json"]));
    assert_eq!(report["total_sessions_completed"], 2);
    assert_eq!(report["total_focus_time"], 50);
    // Both sessions may straddle UTC midnight.
    assert!(report["streak"].as_u64().unwrap() >= 1);

    let (code, _, _) = run_cli(home.path(), &["session", "log", "--duration", "25", "--task", "missing"]);
    assert_eq!(code, 1);
}

#[test]
fn test_session_log_rejects_oversized_duration() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["session", "log", "--duration", "4000000000"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("duration"));

    let sessions = json(&run_ok(home.path(), &["session", "list", "--json"]));
    assert!(sessions.as_array().unwrap().is_empty());
    let report = json(&run_ok(home.path(), &["stats", "--json"]));
    assert_eq!(report["total_focus_time"], 0);
}

#[test]
fn test_timer_run_records_focus_and_completes_task() {
    let home = tempfile::tempdir().unwrap();
    run_ok(home.path(), &["settings", "set", "pomodoro_length", "1"]);
    run_ok(home.path(), &["settings", "set", "sound_enabled", "false"]);
    let id = create_task(home.path(), "Quick one", "1");

    let out = run_ok(
        home.path(),
        &["timer", "run", "--task", &id, "--tick-ms", "1", "--json"],
    );
    let summary = json(out.lines().last().unwrap());
    assert_eq!(summary["completed_pomodoros"], 1);
    assert_eq!(summary["interrupted"], false);
    assert_eq!(summary["effect_failures"], 0);
    assert!(out.contains("\"type\":\"FocusCompleted\""));

    let task = json(&run_ok(home.path(), &["task", "get", &id]));
    assert_eq!(task["completed_pomodoros"], 1);
    assert_eq!(task["completed"], true);

    let sessions = json(&run_ok(home.path(), &["session", "list", "--json"]));
    assert_eq!(sessions.as_array().unwrap().len(), 1);
    assert_eq!(sessions[0]["duration"], 1);

    // A completed task can no longer be timed.
    let (code, _, _) = run_cli(home.path(), &["timer", "run", "--task", &id, "--tick-ms", "1"]);
    assert_eq!(code, 1);
}

#[test]
fn test_timer_status_prints_snapshot() {
    let home = tempfile::tempdir().unwrap();
    let snapshot = json(&run_ok(home.path(), &["timer", "status"]));
    assert_eq!(snapshot["type"], "StateSnapshot");
    assert_eq!(snapshot["clock"], "25:00");
}
