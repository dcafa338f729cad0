// tests/scan_mock_fs.rs

mod common;
use crate::common::builders::WatcherConfigBuilder;
use crate::common::{at, base_path, init_tracing, mock_base, t0, RecordingHandler, BASE};

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use dirwatch::fs::mock::MockFileSystem;
use dirwatch::{DirectoryWatcher, ReferenceAdvance};

fn watcher_on(fs: &MockFileSystem, recursive: bool) -> DirectoryWatcher {
    let cfg = WatcherConfigBuilder::new(BASE).recursive(recursive).build();
    let mut watcher = DirectoryWatcher::with_file_system(cfg, Arc::new(fs.clone()))
        .expect("mock base directory should be accepted");
    watcher.set_reference_time(t0());
    watcher
}

#[test]
fn empty_base_directory_reports_nothing() {
    init_tracing();
    let fs = mock_base();
    let mut watcher = watcher_on(&fs, true);
    let mut recorder = RecordingHandler::new();

    let report = watcher.poll_once(&mut recorder);

    assert!(recorder.events().is_empty());
    assert_eq!(report.visited, 1, "only the base directory itself");
    assert_eq!(report.changed, 0);
}

#[test]
fn newer_file_is_reported_once_with_its_mtime() {
    init_tracing();
    let fs = mock_base();
    fs.add_file(base_path("a.txt"), 3, at(1));
    let mut watcher = watcher_on(&fs, true);
    let mut recorder = RecordingHandler::new();

    watcher.poll_once(&mut recorder);
    watcher.poll_once(&mut recorder);

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].path.ends_with("a.txt"));
    assert_eq!(events[0].modified, at(1));
    assert_eq!(events[0].reference_time, t0());
    assert!(!events[0].is_dir());
    assert_eq!(events[0].info.len, 3);
}

#[test]
fn entries_at_or_before_reference_are_never_reported() {
    let fs = mock_base();
    fs.add_file(base_path("same.txt"), 0, t0());
    fs.add_file(base_path("old.txt"), 0, at(-5));
    fs.add_file(base_path("new.txt"), 0, at(5));
    let mut watcher = watcher_on(&fs, true);
    let mut recorder = RecordingHandler::new();

    watcher.poll_once(&mut recorder);

    assert_eq!(recorder.names(), vec!["new.txt"]);
}

#[test]
fn non_recursive_skips_entries_inside_subdirectories() {
    let fs = mock_base();
    fs.add_file(base_path("a.txt"), 0, at(1));
    fs.add_dir(base_path("sub"), at(-50));
    fs.add_file(base_path("sub/b.txt"), 0, at(1));
    let mut watcher = watcher_on(&fs, false);
    let mut recorder = RecordingHandler::new();

    watcher.poll_once(&mut recorder);

    assert_eq!(recorder.names(), vec!["a.txt"]);
    assert_eq!(recorder.count_named("b.txt"), 0);
}

#[test]
fn non_recursive_still_checks_top_level_directories() {
    let fs = mock_base();
    fs.add_dir(base_path("sub"), at(2));
    fs.add_file(base_path("sub/b.txt"), 0, at(2));
    let mut watcher = watcher_on(&fs, false);
    let mut recorder = RecordingHandler::new();

    watcher.poll_once(&mut recorder);

    assert_eq!(recorder.names(), vec!["sub"]);
    assert!(recorder.events()[0].is_dir());
}

#[test]
fn recursive_reports_entries_at_any_depth() {
    let fs = mock_base();
    fs.add_file(base_path("x/y/z/deep.txt"), 0, at(1));
    fs.add_file(base_path("x/shallow.txt"), 0, at(-1));
    let mut watcher = watcher_on(&fs, true);
    let mut recorder = RecordingHandler::new();

    let report = watcher.poll_once(&mut recorder);

    assert_eq!(recorder.names(), vec!["deep.txt"]);
    // base, x, x/shallow.txt, x/y, x/y/z, x/y/z/deep.txt
    assert_eq!(report.visited, 6);
}

#[test]
fn base_directory_itself_is_compared() {
    let fs = MockFileSystem::new();
    fs.add_dir(BASE, at(1));
    let mut watcher = watcher_on(&fs, true);
    let mut recorder = RecordingHandler::new();

    watcher.poll_once(&mut recorder);

    assert_eq!(recorder.paths(), vec![std::path::PathBuf::from(BASE)]);
}

#[test]
fn walk_is_pre_order_with_sorted_siblings() {
    let fs = mock_base();
    fs.add_file(base_path("d.txt"), 0, at(1));
    fs.add_file(base_path("b/c.txt"), 0, at(1));
    fs.add_dir(base_path("b"), at(1));
    fs.add_file(base_path("a.txt"), 0, at(1));
    let mut watcher = watcher_on(&fs, true);
    let mut recorder = RecordingHandler::new();

    watcher.poll_once(&mut recorder);

    assert_eq!(
        recorder.paths(),
        vec![
            base_path("a.txt"),
            base_path("b"),
            base_path("b/c.txt"),
            base_path("d.txt"),
        ]
    );
}

#[test]
fn handler_error_on_directory_prunes_its_subtree() {
    init_tracing();
    let fs = mock_base();
    fs.add_dir(base_path("b"), at(1));
    fs.add_file(base_path("b/c.txt"), 0, at(1));
    fs.add_file(base_path("d.txt"), 0, at(1));
    let mut watcher = watcher_on(&fs, true);
    let mut recorder = RecordingHandler::new().fail_on("b");

    let report = watcher.poll_once(&mut recorder);

    assert_eq!(recorder.names(), vec!["b", "d.txt"]);
    assert_eq!(report.handler_errors, 1);
    assert_eq!(report.pruned, 1);
}

#[test]
fn handler_error_on_file_does_not_stop_siblings() {
    let fs = mock_base();
    fs.add_file(base_path("a.txt"), 0, at(1));
    fs.add_file(base_path("b.txt"), 0, at(1));
    let mut watcher = watcher_on(&fs, true);
    let mut recorder = RecordingHandler::new().fail_on("a.txt");

    let report = watcher.poll_once(&mut recorder);

    assert_eq!(recorder.names(), vec!["a.txt", "b.txt"]);
    assert_eq!(report.handler_errors, 1);
    assert_eq!(report.pruned, 0);
}

#[test]
fn walk_errors_are_forwarded_and_walk_continues() {
    init_tracing();
    let fs = mock_base();
    fs.add_dir(base_path("locked"), at(-1));
    fs.add_file(base_path("locked/secret.txt"), 0, at(1));
    fs.add_file(base_path("broken.txt"), 0, at(1));
    fs.add_file(base_path("ok.txt"), 0, at(1));
    fs.fail_read_dir(base_path("locked"));
    fs.fail_metadata(base_path("broken.txt"));
    let mut watcher = watcher_on(&fs, true);
    let mut recorder = RecordingHandler::new();

    let report = watcher.poll_once(&mut recorder);

    assert_eq!(recorder.names(), vec!["ok.txt"]);
    assert_eq!(
        recorder.walk_errors(),
        vec![base_path("broken.txt"), base_path("locked")]
    );
    assert_eq!(report.walk_errors, 2);
}

#[test]
fn closure_handlers_are_accepted() {
    let fs = mock_base();
    fs.add_file(base_path("a.txt"), 0, at(1));
    let mut watcher = watcher_on(&fs, true);

    let mut seen = Vec::new();
    let mut handler = |event: &dirwatch::ChangeEvent| -> anyhow::Result<()> {
        seen.push(event.path.clone());
        Ok(())
    };
    watcher.poll_once(&mut handler);

    assert_eq!(seen, vec![base_path("a.txt")]);
}

#[test]
fn reference_time_advances_after_a_cycle() {
    let fs = mock_base();
    let mut watcher = watcher_on(&fs, true);
    let before = watcher.reference_time();
    let wall_clock = SystemTime::now();

    watcher.poll_once(&mut RecordingHandler::new());

    assert!(watcher.reference_time() >= before);
    assert!(watcher.reference_time() >= wall_clock);
}

#[test]
fn reference_time_never_moves_backwards() {
    let fs = mock_base();
    let mut watcher = watcher_on(&fs, true);
    let future = SystemTime::now() + Duration::from_secs(3600);
    watcher.set_reference_time(future);

    watcher.poll_once(&mut RecordingHandler::new());

    assert_eq!(watcher.reference_time(), future);
}

#[test]
fn modification_after_a_cycle_is_picked_up_by_the_next_one() {
    let fs = mock_base();
    fs.add_file(base_path("a.txt"), 0, at(-1));
    let mut watcher = watcher_on(&fs, true);
    let mut recorder = RecordingHandler::new();

    watcher.poll_once(&mut recorder);
    assert!(recorder.events().is_empty());

    let touched = watcher.reference_time() + Duration::from_secs(1);
    fs.set_modified(base_path("a.txt"), touched);
    watcher.poll_once(&mut recorder);

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].modified, touched);
}

#[test]
fn cycle_advance_compares_every_entry_against_cycle_start() {
    let fs = mock_base();
    fs.add_file(base_path("a.txt"), 0, at(5));
    fs.add_file(base_path("b.txt"), 0, at(10));
    let mut watcher = watcher_on(&fs, true);
    assert_eq!(watcher.reference_advance(), ReferenceAdvance::Cycle);
    let mut recorder = RecordingHandler::new();

    watcher.poll_once(&mut recorder);

    assert_eq!(recorder.names(), vec!["a.txt", "b.txt"]);
    assert!(recorder.events().iter().all(|e| e.reference_time == t0()));
}

#[test]
fn per_match_advance_skips_entries_older_than_the_moved_reference() {
    let fs = mock_base();
    fs.add_file(base_path("a.txt"), 0, at(5));
    fs.add_file(base_path("b.txt"), 0, at(10));
    let mut watcher = watcher_on(&fs, true);
    watcher.set_reference_advance(ReferenceAdvance::PerMatch);
    let mut recorder = RecordingHandler::new();

    let report = watcher.poll_once(&mut recorder);

    // After a.txt the reference jumps to the wall clock, far past b.txt.
    assert_eq!(recorder.names(), vec!["a.txt"]);
    assert_eq!(report.changed, 1);
}

#[test]
fn symlinked_base_is_walked_through_the_link() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_dir("/real", at(-100));
    fs.add_file("/real/a.txt", 0, at(1));
    fs.add_dir("/real/sub", at(-100));
    fs.add_file("/real/sub/b.txt", 0, at(2));
    // A link back to the tree below the base must not be followed.
    fs.add_symlink("/real/loop", "/real", at(-100));
    fs.add_symlink("/link", "/real", at(-100));

    let cfg = WatcherConfigBuilder::new("/link").build();
    let mut watcher = DirectoryWatcher::with_file_system(cfg, Arc::new(fs.clone()))
        .expect("a link to a directory is a valid base");
    watcher.set_reference_time(t0());
    let mut recorder = RecordingHandler::new();

    let report = watcher.poll_once(&mut recorder);

    assert_eq!(recorder.names(), vec!["a.txt", "b.txt"]);
    assert_eq!(
        recorder.paths()[0],
        std::path::PathBuf::from("/link/a.txt"),
        "entries are reported under the base path as given"
    );
    // link, a.txt, loop, sub, sub/b.txt
    assert_eq!(report.visited, 5);
    assert_eq!(report.walk_errors, 0);
}

#[test]
fn symlinked_base_reports_the_links_own_mtime() {
    let fs = MockFileSystem::new();
    fs.add_dir("/real", at(-100));
    fs.add_symlink("/link", "/real", at(3));

    let cfg = WatcherConfigBuilder::new("/link").recursive(false).build();
    let mut watcher = DirectoryWatcher::with_file_system(cfg, Arc::new(fs.clone())).unwrap();
    watcher.set_reference_time(t0());
    let mut recorder = RecordingHandler::new();

    watcher.poll_once(&mut recorder);

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].modified, at(3));
    assert!(events[0].info.is_symlink);
}
