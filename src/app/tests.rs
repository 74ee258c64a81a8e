use std::io::Cursor;
use std::thread;
use std::time::Duration;

use super::*;
use crate::test_utils::MockTerminal;

fn config() -> Config {
    Config {
        multi: false,
        case_sensitive: false,
        height: None,
        preview_template: None,
        scheme: Scheme::Default,
    }
}

fn build(content: &str, cfg: Config, query: &str) -> App<MockTerminal> {
    let backend = MockTerminal::new(24, 80);
    let app = App::new(backend, cfg, Cursor::new(content.as_bytes().to_vec()), query)
        .expect("mock terminal never fails to init");
    wait_for_reader(&app);
    app
}

/// The reader thread over a `Cursor` finishes almost instantly; give it a
/// generous bound rather than assume a single poll suffices.
fn wait_for_reader(app: &App<MockTerminal>) {
    for _ in 0..200 {
        if app.reader.join.is_finished() {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("reader thread did not finish in time");
}

/// Drains job messages until the in-flight match job (if any) completes.
/// `merger_query`/`merger` only update once a job's results are actually
/// applied, so tests that dispatch a non-empty query must poll this rather
/// than assert immediately after dispatch.
fn wait_for_match(app: &mut App<MockTerminal>) {
    for _ in 0..200 {
        app.drain_job_messages();
        if app.match_job.is_none() {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("match job did not complete in time");
}

#[test]
fn can_use_incremental_requires_strict_prefix_extension() {
    assert!(can_use_incremental("ab", "abc"));
    assert!(!can_use_incremental("", "abc"));
    assert!(!can_use_incremental("ab", "ab"));
    assert!(!can_use_incremental("ab", "xy"));
    assert!(!can_use_incremental("abc", "ab"));
}

#[test]
fn empty_query_projects_every_loaded_item_in_insertion_order() {
    let mut app = build("alpha\nbeta\ngamma\n", config(), "");
    app.dispatch_query();
    assert_eq!(app.state.merger.count(), 3);
    let indices: Vec<u32> = app.state.merger.all_items().iter().map(|m| m.item.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn typing_updates_query_and_arms_the_debounce() {
    let mut app = build("alpha\nbeta\n", config(), "");
    assert!(app.debounce_deadline.is_none());
    app.handle_key(Key::Char('a'));
    assert_eq!(app.state.query, "a");
    assert!(app.debounce_deadline.is_some());
}

#[test]
fn debounce_firing_dispatches_and_advances_merger_query_once_matched() {
    let mut app = build("alpha\nbeta\n", config(), "");
    app.handle_key(Key::Char('a'));
    app.debounce_deadline = Some(Instant::now() - Duration::from_millis(1));
    app.maybe_fire_debounce();
    assert!(app.debounce_deadline.is_none());
    assert!(app.match_job.is_some(), "dispatch should have spawned a background match");
    assert_eq!(
        app.state.merger_query, "",
        "merger_query must not advance until the dispatched job's results are applied"
    );

    wait_for_match(&mut app);
    assert_eq!(app.state.merger_query, "a");
}

/// Reproduces the race the incremental-filtering gate must avoid: a query
/// dispatched while an earlier, narrower job is still in flight must not be
/// treated as a narrowing of results that have not landed yet.
#[test]
fn incremental_dispatch_gates_on_merger_query_not_last_dispatched_query() {
    let mut app = build("abc\nabx\n", config(), "");

    app.state.query = "abc".to_string();
    app.dispatch_query();
    wait_for_match(&mut app);
    assert_eq!(app.state.merger_query, "abc");
    assert_eq!(app.state.merger.count(), 1);

    // Dispatch "ab" (a full rescan, since "ab" does not extend "abc") but do
    // not let it complete before typing further.
    app.state.query = "ab".to_string();
    app.dispatch_query();
    assert_eq!(app.state.merger_query, "abc", "still reflects the last applied merger");

    // Extend straight to "abx" before the "ab" job lands. The gate must
    // consult merger_query ("abc"), not the "ab" query just dispatched:
    // "abc" is not a prefix of "abx", so this must fall back to a full
    // rescan rather than incorrectly filtering the stale "abc"-only set.
    app.state.query = "abx".to_string();
    app.dispatch_query();

    wait_for_match(&mut app);
    assert_eq!(app.state.merger_query, "abx");
    let indices: Vec<u32> = app.state.merger.all_items().iter().map(|m| m.item.index).collect();
    assert_eq!(indices, vec![1], "\"abx\" must be found even though the stale \"abc\" merger excluded it");
}

#[test]
fn escape_requests_cancellation_without_selection() {
    let mut app = build("alpha\n", config(), "");
    app.handle_key(Key::Escape);
    assert!(app.state.should_exit);
    assert!(!app.state.exit_with_selection);
    assert!(!app.interrupted);
}

#[test]
fn ctrl_c_requests_interruption() {
    let mut app = build("alpha\n", config(), "");
    app.handle_key(Key::Ctrl(b'c'));
    assert!(app.state.should_exit);
    assert!(app.interrupted);
    match app.finish() {
        Outcome::Interrupted => {}
        _ => panic!("expected an interrupted outcome"),
    }
}

#[test]
fn enter_accepts_the_highlighted_line() {
    let mut app = build("alpha\nbeta\n", config(), "");
    app.dispatch_query();
    app.handle_key(Key::Enter);
    match app.finish() {
        Outcome::Accepted(lines) => assert_eq!(lines, vec!["alpha".to_string()]),
        _ => panic!("expected an accepted outcome"),
    }
}

#[test]
fn multi_select_accepts_every_toggled_line_in_insertion_order() {
    let mut cfg = config();
    cfg.multi = true;
    let mut app = build("alpha\nbeta\ngamma\n", cfg, "");
    app.dispatch_query();

    app.state.toggle_selection_at_cursor(); // alpha, index 0
    app.handle_key(Key::ArrowDown);
    app.handle_key(Key::ArrowDown);
    app.state.toggle_selection_at_cursor(); // gamma, index 2

    app.handle_key(Key::Enter);
    match app.finish() {
        Outcome::Accepted(lines) => assert_eq!(lines, vec!["alpha".to_string(), "gamma".to_string()]),
        _ => panic!("expected an accepted outcome"),
    }
}

#[test]
fn accepting_with_nothing_loaded_yields_an_empty_selection() {
    let mut app = build("", config(), "");
    app.dispatch_query();
    app.handle_key(Key::Enter);
    match app.finish() {
        Outcome::Accepted(lines) => assert!(lines.is_empty()),
        _ => panic!("expected an accepted outcome"),
    }
}

#[test]
fn preview_outcome_descriptions_cover_every_variant() {
    assert_eq!(describe_preview(&PreviewOutcome::Output("hi".into())), "hi");
    assert_eq!(describe_preview(&PreviewOutcome::TimedOut), "preview timed out");
    assert!(describe_preview(&PreviewOutcome::Failed("boom".into())).contains("boom"));
}
