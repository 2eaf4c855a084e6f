// laratail - tests/e2e_watch.rs
//
// End-to-end tests for the tail, parse, and filter pipeline.
//
// These tests drive a real WatchSession against real files in temporary
// directories: appends, partial writes, truncation, deletion, file switches,
// and filter changes while the poll thread is running. No mocks.

use laratail::app::session::{WatchOptions, WatchSession};
use laratail::core::filter::FilterSet;
use laratail::core::model::{LogEntry, Severity, WatchEvent};
use laratail::platform::fs::empty_file;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

const POLL: Duration = Duration::from_millis(20);

fn session(filter: FilterSet) -> WatchSession {
    WatchSession::new(
        WatchOptions {
            poll_interval: POLL,
            missing_file_poll: POLL,
        },
        filter,
    )
}

fn append(path: &Path, text: &str) {
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    f.write_all(text.as_bytes()).unwrap();
    f.flush().unwrap();
}

/// Wait for `count` entries (or time out) and return them.
fn wait_for_entries(session: &WatchSession, count: usize) -> Vec<LogEntry> {
    let deadline = Instant::now() + Duration::from_secs(3);
    let mut entries = Vec::new();
    while entries.len() < count && Instant::now() < deadline {
        if let Some(WatchEvent::Entry(e)) = session.recv_timeout(POLL) {
            entries.push(e);
        }
    }
    entries
}

/// Wait until an event matching `pred` arrives. Other events are discarded.
fn wait_for_event(session: &WatchSession, pred: impl Fn(&WatchEvent) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if let Some(event) = session.recv_timeout(POLL) {
            if pred(&event) {
                return true;
            }
        }
    }
    false
}

fn messages(entries: &[LogEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.message.as_str()).collect()
}

// =============================================================================
// Parsing through the session
// =============================================================================

#[test]
fn e2e_exception_entry_parsed_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("laravel.log");
    append(
        &path,
        "[2024-01-01 10:00:00] local.ERROR: {\"exception\":\"RuntimeException: boom\\nat file.php:10\"}\n",
    );

    let mut s = session(FilterSet::default());
    s.start(&path);
    let entries = wait_for_entries(&s, 1);
    s.stop();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, "error");
    assert_eq!(entries[0].message, "RuntimeException: boom");
    assert_eq!(entries[0].details, "RuntimeException: boom\nat file.php:10");
}

#[test]
fn e2e_unparsable_lines_are_skipped_without_stopping() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("laravel.log");
    append(
        &path,
        "not a log line\n#0 {main}\n\n[t] local.INFO: survived\n",
    );

    let mut s = session(FilterSet::default());
    s.start(&path);
    let entries = wait_for_entries(&s, 1);
    assert_eq!(messages(&entries), vec!["survived"]);
    assert!(s.is_active());
    s.stop();
}

// =============================================================================
// Incremental following
// =============================================================================

#[test]
fn e2e_incremental_appends_yield_each_line_once_in_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("laravel.log");
    append(&path, "");

    let mut s = session(FilterSet::default());
    s.start(&path);

    for i in 0..5 {
        append(&path, &format!("[t] local.INFO: line {i}\n"));
        std::thread::sleep(POLL * 2);
    }
    let entries = wait_for_entries(&s, 5);
    s.stop();

    assert_eq!(
        messages(&entries),
        vec!["line 0", "line 1", "line 2", "line 3", "line 4"]
    );
}

#[test]
fn e2e_partial_line_not_emitted_before_terminator() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("laravel.log");
    append(&path, "[t] local.INFO: half");

    let mut s = session(FilterSet::default());
    s.start(&path);
    std::thread::sleep(POLL * 5);
    let early: Vec<_> = s
        .poll_events()
        .into_iter()
        .filter(|e| matches!(e, WatchEvent::Entry(_)))
        .collect();
    assert!(early.is_empty(), "partial line leaked: {early:?}");

    append(&path, " done\n");
    let entries = wait_for_entries(&s, 1);
    s.stop();
    assert_eq!(messages(&entries), vec!["half done"]);
}

#[test]
fn e2e_missing_file_is_waited_for() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("not-yet.log");

    let mut s = session(FilterSet::default());
    s.start(&path);
    assert!(wait_for_event(&s, |e| matches!(e, WatchEvent::Waiting { .. })));

    append(&path, "[t] local.NOTICE: created\n");
    let entries = wait_for_entries(&s, 1);
    s.stop();
    assert_eq!(messages(&entries), vec!["created"]);
}

// =============================================================================
// Truncation and deletion
// =============================================================================

#[test]
fn e2e_emptied_file_restarts_from_zero_without_replay() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("laravel.log");
    append(
        &path,
        "[t] local.INFO: old one is long enough\n[t] local.INFO: old two is long enough\n",
    );

    let mut s = session(FilterSet::default());
    s.start(&path);
    assert_eq!(wait_for_entries(&s, 2).len(), 2);

    empty_file(&path).unwrap();
    assert!(wait_for_event(&s, |e| matches!(e, WatchEvent::Truncated { .. })));

    append(&path, "[t] local.INFO: fresh\n");
    let entries = wait_for_entries(&s, 1);
    std::thread::sleep(POLL * 3);
    let extra: Vec<_> = s
        .poll_events()
        .into_iter()
        .filter(|e| matches!(e, WatchEvent::Entry(_)))
        .collect();
    s.stop();

    assert_eq!(messages(&entries), vec!["fresh"]);
    assert!(extra.is_empty(), "pre-truncation content replayed: {extra:?}");
}

#[test]
fn e2e_deleted_then_recreated_file_is_followed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("laravel.log");
    append(&path, "[t] local.INFO: first life\n");

    let mut s = session(FilterSet::default());
    s.start(&path);
    assert_eq!(messages(&wait_for_entries(&s, 1)), vec!["first life"]);

    std::fs::remove_file(&path).unwrap();
    assert!(wait_for_event(&s, |e| matches!(e, WatchEvent::Waiting { .. })));

    append(&path, "[t] local.INFO: second life\n");
    let entries = wait_for_entries(&s, 1);
    s.stop();
    assert_eq!(messages(&entries), vec!["second life"]);
}

// =============================================================================
// Session control
// =============================================================================

#[test]
fn e2e_nothing_arrives_after_stop() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("laravel.log");
    append(&path, "[t] local.INFO: before\n");

    let mut s = session(FilterSet::default());
    s.start(&path);
    assert_eq!(wait_for_entries(&s, 1).len(), 1);
    s.stop();

    append(&path, "[t] local.INFO: after\n");
    std::thread::sleep(POLL * 3);
    assert!(s.poll_events().is_empty());
    assert!(s.recv_timeout(POLL).is_none());
    assert!(!s.is_active());
}

#[test]
fn e2e_switch_file_starts_new_file_from_zero() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("a.log");
    let second = dir.path().join("b.log");
    append(&first, "[t] local.INFO: from a\n");
    append(&second, "[t] local.INFO: b one\n[t] local.INFO: b two\n");

    let mut s = session(FilterSet::default());
    s.start(&first);
    assert_eq!(messages(&wait_for_entries(&s, 1)), vec!["from a"]);

    s.switch_file(&second);
    assert_eq!(s.current_path(), Some(second.as_path()));
    append(&first, "[t] local.INFO: a ignored\n");
    let entries = wait_for_entries(&s, 2);
    s.stop();
    assert_eq!(messages(&entries), vec!["b one", "b two"]);
}

#[test]
fn e2e_filter_update_from_another_thread() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("laravel.log");
    append(&path, "");

    let mut s = session(FilterSet::new([Severity::Debug]));
    s.start(&path);

    let handle = s.filter_handle();
    std::thread::spawn(move || handle.replace(FilterSet::new([Severity::Error])))
        .join()
        .unwrap();

    append(&path, "[t] local.DEBUG: filtered out\n[t] local.ERROR: let through\n");
    let entries = wait_for_entries(&s, 1);
    s.stop();
    assert_eq!(messages(&entries), vec!["let through"]);
}

#[test]
fn e2e_empty_filter_accepts_custom_levels() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("laravel.log");
    append(&path, "[t] local.AUDIT: custom level\n");

    let mut s = session(FilterSet::default());
    s.start(&path);
    let entries = wait_for_entries(&s, 1);
    s.stop();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, "audit");
}

// =============================================================================
// Read failures
// =============================================================================

#[cfg(unix)]
#[test]
fn e2e_read_error_reported_then_retried() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("laravel.log");
    // A directory stats fine but fails to read (EISDIR). The child keeps its
    // reported size above zero on every filesystem.
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("child"), b"x").unwrap();

    let mut s = session(FilterSet::default());
    s.start(&path);
    assert!(wait_for_event(&s, |e| matches!(e, WatchEvent::FileError { .. })));
    assert!(s.is_active());

    std::fs::remove_dir_all(&path).unwrap();
    append(&path, "[t] local.INFO: recovered\n");
    let entries = wait_for_entries(&s, 1);
    assert!(s.is_active());
    s.stop();
    assert_eq!(messages(&entries), vec!["recovered"]);
}
