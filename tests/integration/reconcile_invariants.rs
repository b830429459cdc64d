//! Integration tests for properties that hold across reconcile cycles

use crate::integration::{build_tree, snapshot, Roots};
use filetime::{set_file_mtime, FileTime};
use std::fs;
use treesync::sync::{reconcile, EventKind, EventLog, NullSink, Reconciler, SyncOptions};

fn mixed_tree() -> Vec<(&'static str, Option<&'static str>)> {
    vec![
        ("docs/readme.md", Some("# readme")),
        ("docs/guide/intro.md", Some("intro")),
        ("src/main.rs", Some("fn main() {}")),
        ("empty", None),
        ("top.txt", Some("top")),
    ]
}

/// After one cycle the replica matches the source exactly
#[test]
fn test_single_cycle_converges() {
    let roots = Roots::new();
    build_tree(&roots.source, &mixed_tree());
    build_tree(
        &roots.replica,
        &[
            ("docs/readme.md", Some("stale")),
            ("docs/obsolete/a.txt", Some("a")),
            ("src", Some("file where a dir belongs")),
            ("stray.log", Some("x")),
        ],
    );

    reconcile(&roots.source, &roots.replica, &mut NullSink).unwrap();

    assert_eq!(snapshot(&roots.replica), snapshot(&roots.source));
}

/// A second cycle with no changes in between does nothing
#[test]
fn test_second_cycle_is_noop() {
    let roots = Roots::new();
    build_tree(&roots.source, &mixed_tree());

    let first = reconcile(&roots.source, &roots.replica, &mut NullSink).unwrap();
    assert!(!first.is_noop());

    let mut log = EventLog::new();
    let second = reconcile(&roots.source, &roots.replica, &mut log).unwrap();
    assert!(second.is_noop());
    assert!(log.events.is_empty());
}

/// The source tree is never modified
#[test]
fn test_source_is_untouched() {
    let roots = Roots::new();
    build_tree(&roots.source, &mixed_tree());
    build_tree(&roots.replica, &[("stray/deep/file.txt", Some("x"))]);
    let before = snapshot(&roots.source);

    reconcile(&roots.source, &roots.replica, &mut NullSink).unwrap();

    assert_eq!(snapshot(&roots.source), before);
}

/// Identical content is not recopied even when timestamps differ
#[test]
fn test_unchanged_content_with_different_mtime_is_skipped() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("x.txt", Some("same bytes"))]);
    build_tree(&roots.replica, &[("x.txt", Some("same bytes"))]);
    set_file_mtime(
        roots.replica.join("x.txt"),
        FileTime::from_unix_time(1_000_000, 0),
    )
    .unwrap();

    let mut log = EventLog::new();
    let report = reconcile(&roots.source, &roots.replica, &mut log).unwrap();

    assert!(log.events.is_empty());
    assert_eq!(report.files_compared, 1);
    assert_eq!(report.files_unchanged, 1);
    let mtime = FileTime::from_last_modification_time(
        &fs::metadata(roots.replica.join("x.txt")).unwrap(),
    );
    assert_eq!(mtime.unix_seconds(), 1_000_000);
}

/// Everything absent from the source is gone after one cycle, however deep
#[test]
fn test_deletion_is_complete() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("keep.txt", Some("k"))]);
    build_tree(
        &roots.replica,
        &[
            ("keep.txt", Some("k")),
            ("gone/a/b/c/d.txt", Some("d")),
            ("gone/a/e.txt", Some("e")),
            ("gone/empty", None),
        ],
    );

    let mut log = EventLog::new();
    reconcile(&roots.source, &roots.replica, &mut log).unwrap();

    assert!(!roots.replica.join("gone").exists());
    assert_eq!(log.events.last().unwrap().display_path(), "/gone");
    assert_eq!(log.events.last().unwrap().kind, EventKind::DeleteDir);
    assert_eq!(snapshot(&roots.replica), snapshot(&roots.source));
}

/// Changes made between cycles are picked up by the next cycle
#[test]
fn test_changes_between_cycles_are_mirrored() {
    let roots = Roots::new();
    build_tree(&roots.source, &mixed_tree());
    reconcile(&roots.source, &roots.replica, &mut NullSink).unwrap();

    fs::remove_dir_all(roots.source.join("docs")).unwrap();
    fs::write(roots.source.join("top.txt"), "top v2").unwrap();
    fs::write(roots.source.join("new.txt"), "new").unwrap();

    let mut log = EventLog::new();
    reconcile(&roots.source, &roots.replica, &mut log).unwrap();

    assert_eq!(snapshot(&roots.replica), snapshot(&roots.source));
    assert_eq!(log.events.iter().filter(|e| e.kind == EventKind::CopyFile).count(), 2);
    assert!(log
        .events
        .iter()
        .any(|e| e.kind == EventKind::DeleteDir && e.display_path() == "/docs"));
}

/// Small chunk sizes hash and copy multi-chunk files correctly
#[test]
fn test_small_chunk_size_round_trips_large_file() {
    let roots = Roots::new();
    let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    fs::write(roots.source.join("blob.bin"), &content).unwrap();

    let reconciler = Reconciler::new(SyncOptions {
        chunk_size: 7,
        ..SyncOptions::default()
    });
    let report = reconciler
        .reconcile(&roots.source, &roots.replica, &mut NullSink)
        .unwrap();

    assert_eq!(report.bytes_copied, content.len() as u64);
    assert_eq!(fs::read(roots.replica.join("blob.bin")).unwrap(), content);

    let again = reconciler
        .reconcile(&roots.source, &roots.replica, &mut NullSink)
        .unwrap();
    assert!(again.is_noop());
}

/// Quick check trusts matching size and mtime; hashing still catches other changes
#[test]
fn test_quick_check_uses_size_and_mtime() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("x.txt", Some("abcd"))]);
    let reconciler = Reconciler::new(SyncOptions {
        quick_check: true,
        ..SyncOptions::default()
    });
    reconciler
        .reconcile(&roots.source, &roots.replica, &mut NullSink)
        .unwrap();

    // Same size, content changed, mtime forced equal: trusted as unchanged
    let stamp = FileTime::from_unix_time(1_500_000_000, 0);
    fs::write(roots.replica.join("x.txt"), "abce").unwrap();
    set_file_mtime(roots.source.join("x.txt"), stamp).unwrap();
    set_file_mtime(roots.replica.join("x.txt"), stamp).unwrap();
    let report = reconciler
        .reconcile(&roots.source, &roots.replica, &mut NullSink)
        .unwrap();
    assert!(report.is_noop());

    // Different mtime falls through to content comparison
    set_file_mtime(
        roots.replica.join("x.txt"),
        FileTime::from_unix_time(1_000_000, 0),
    )
    .unwrap();
    let report = reconciler
        .reconcile(&roots.source, &roots.replica, &mut NullSink)
        .unwrap();
    assert_eq!(report.count(EventKind::CopyFile), 1);
    assert_eq!(fs::read_to_string(roots.replica.join("x.txt")).unwrap(), "abcd");
}
