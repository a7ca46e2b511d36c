//! Integration tests for the analytics aggregator.
//!
//! Covers the pure aggregation as well as the full path from sessions stored
//! in an on-disk database, through a date-range query, to the statistics.

use chrono::{NaiveDate, TimeZone, Utc};
use focusflow_core::{
    compute_statistics, DataStore, DateRange, MostProductiveDay, NewTask, RangePreset, Session,
    SessionDraft, SqliteStore,
};

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, n).unwrap()
}

fn session(d: u32, hour: u32, duration: u32) -> Session {
    Session {
        id: format!("{d}-{hour}"),
        user_id: "local".into(),
        task_id: None,
        duration,
        completed: true,
        start_time: Utc.with_ymd_and_hms(2024, 3, d, hour, 0, 0).unwrap(),
        end_time: None,
        notes: None,
    }
}

#[test]
fn test_three_day_round_trip() {
    let sessions = vec![session(1, 9, 25), session(1, 10, 25), session(3, 9, 50)];
    let stats = compute_statistics(&sessions, day(1), day(3), day(3));

    assert_eq!(stats.total_sessions_completed, 3);
    assert_eq!(stats.total_focus_time, 100);
    assert_eq!(stats.daily_stats.len(), 3);
    assert_eq!(stats.daily_stats[0].total_sessions, 2);
    assert_eq!(stats.daily_stats[0].total_minutes, 50);
    assert_eq!(stats.daily_stats[1].total_sessions, 0);
    assert_eq!(stats.daily_stats[2].total_minutes, 50);
    assert_eq!(stats.most_productive_day.date(), Some(day(1)));
    assert_eq!(stats.streak, 1);
}

#[test]
fn test_empty_input_never_fails() {
    for (start, end) in [(day(1), day(1)), (day(1), day(31)), (day(10), day(2))] {
        let stats = compute_statistics(&[], start, end, day(15));
        assert_eq!(stats.total_sessions_completed, 0);
        assert_eq!(stats.total_focus_time, 0);
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.most_productive_day, MostProductiveDay::NoData);
        assert!(stats.daily_stats.iter().all(|b| b.total_sessions == 0));
    }
}

#[test]
fn test_streak_skips_idle_today() {
    let sessions = vec![session(8, 9, 25), session(9, 9, 25), session(10, 9, 25)];
    let stats = compute_statistics(&sessions, day(4), day(11), day(11));
    assert_eq!(stats.streak, 3);
}

#[test]
fn test_stored_sessions_feed_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focusflow.db");
    let today = day(20);

    {
        let store = SqliteStore::open(&path, "local").unwrap();
        let task = store.create_task(&NewTask::new("Refactor")).unwrap();
        for (d, task_id) in [(18, None), (19, Some(task.id.clone())), (20, None)] {
            let end = Utc.with_ymd_and_hms(2024, 3, d, 11, 0, 0).unwrap();
            store
                .create_session(&SessionDraft::completed_focus(25, end, task_id))
                .unwrap();
        }
        // Outside the weekly window.
        let old = Utc.with_ymd_and_hms(2024, 3, 1, 11, 0, 0).unwrap();
        store
            .create_session(&SessionDraft::completed_focus(25, old, None))
            .unwrap();
    }

    // Reopen to read what was persisted.
    let store = SqliteStore::open(&path, "local").unwrap();
    let range = DateRange::preset(RangePreset::Week, today);
    let sessions = store.list_sessions(&range.query()).unwrap();
    assert_eq!(sessions.len(), 3);

    let stats = compute_statistics(&sessions, range.start, range.end, today);
    assert_eq!(stats.daily_stats.len(), 8);
    assert_eq!(stats.total_sessions_completed, 3);
    assert_eq!(stats.total_focus_time, 75);
    assert_eq!(stats.streak, 3);
    assert_eq!(stats.most_productive_day.date(), Some(day(18)));
    let completed_tasks: u32 = stats.daily_stats.iter().map(|b| b.completed_tasks).sum();
    assert_eq!(completed_tasks, 1);

    // Another user sees none of it.
    let other = SqliteStore::open(&path, "someone-else").unwrap();
    assert!(other.list_sessions(&range.query()).unwrap().is_empty());
}
