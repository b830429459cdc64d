//! Integration tests for single-cycle reconciliation outcomes

use crate::integration::{build_tree, snapshot, Roots};
use std::fs;
use treesync::error::SyncError;
use treesync::sync::{reconcile, EventKind, EventLog, Reconciler, SyncOptions};

fn events(log: &EventLog) -> Vec<(EventKind, String)> {
    log.events
        .iter()
        .map(|e| (e.kind, e.display_path()))
        .collect()
}

/// New directory and file are created in the replica
#[test]
fn test_new_nested_file_is_copied() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("a/x.txt", Some("hello"))]);

    let mut log = EventLog::new();
    reconcile(&roots.source, &roots.replica, &mut log).unwrap();

    assert_eq!(
        fs::read_to_string(roots.replica.join("a/x.txt")).unwrap(),
        "hello"
    );
    assert_eq!(
        events(&log),
        vec![
            (EventKind::CreateDir, "/a".to_string()),
            (EventKind::CopyFile, "/a/x.txt".to_string()),
        ]
    );
}

/// Byte-identical trees produce no operations
#[test]
fn test_identical_file_reports_nothing() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("x.txt", Some("hello"))]);
    build_tree(&roots.replica, &[("x.txt", Some("hello"))]);

    let mut log = EventLog::new();
    let report = reconcile(&roots.source, &roots.replica, &mut log).unwrap();

    assert!(log.events.is_empty());
    assert!(report.is_noop());
    assert_eq!(report.files_unchanged, 1);
}

/// Stale directory is emptied bottom-up, then removed
#[test]
fn test_stale_directory_removed_after_contents() {
    let roots = Roots::new();
    build_tree(&roots.replica, &[("old/y.txt", Some("bye"))]);

    let mut log = EventLog::new();
    reconcile(&roots.source, &roots.replica, &mut log).unwrap();

    assert!(!roots.replica.join("old").exists());
    assert_eq!(
        events(&log),
        vec![
            (EventKind::DeleteFile, "/old/y.txt".to_string()),
            (EventKind::DeleteDir, "/old".to_string()),
        ]
    );
}

/// Changed content is copied over the replica file
#[test]
fn test_changed_file_is_recopied() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("x.txt", Some("v2"))]);
    build_tree(&roots.replica, &[("x.txt", Some("v1"))]);

    let mut log = EventLog::new();
    reconcile(&roots.source, &roots.replica, &mut log).unwrap();

    assert_eq!(events(&log), vec![(EventKind::CopyFile, "/x.txt".to_string())]);
    assert_eq!(fs::read_to_string(roots.replica.join("x.txt")).unwrap(), "v2");
}

/// Same size, different bytes: still detected as changed
#[test]
fn test_same_length_change_is_detected() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("x.txt", Some("abcd"))]);
    build_tree(&roots.replica, &[("x.txt", Some("abce"))]);

    let mut log = EventLog::new();
    reconcile(&roots.source, &roots.replica, &mut log).unwrap();

    assert_eq!(log.kinds(), vec![EventKind::CopyFile]);
    assert_eq!(snapshot(&roots.replica), snapshot(&roots.source));
}

/// Empty source directories are mirrored
#[test]
fn test_empty_directory_is_created() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("empty/nested", None)]);

    let mut log = EventLog::new();
    reconcile(&roots.source, &roots.replica, &mut log).unwrap();

    assert!(roots.replica.join("empty/nested").is_dir());
    assert_eq!(log.kinds(), vec![EventKind::CreateDir, EventKind::CreateDir]);
}

/// Parent directories are created before their children
#[test]
fn test_events_respect_parent_child_order() {
    let roots = Roots::new();
    build_tree(
        &roots.source,
        &[
            ("b/c/d.txt", Some("d")),
            ("a.txt", Some("a")),
            ("b/e.txt", Some("e")),
        ],
    );

    let mut log = EventLog::new();
    reconcile(&roots.source, &roots.replica, &mut log).unwrap();

    let paths: Vec<String> = log.events.iter().map(|e| e.display_path()).collect();
    let position = |p: &str| paths.iter().position(|x| x == p).unwrap();
    assert!(position("/b") < position("/b/c"));
    assert!(position("/b/c") < position("/b/c/d.txt"));
    assert!(position("/b") < position("/b/e.txt"));
    assert_eq!(paths.len(), 5);
}

/// A directory where the source has a file is replaced, and vice versa
#[test]
fn test_kind_mismatch_is_replaced() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("p", Some("file now")), ("q/inner.txt", Some("i"))]);
    build_tree(&roots.replica, &[("p/old.txt", Some("o")), ("q", Some("was a file"))]);

    let mut log = EventLog::new();
    reconcile(&roots.source, &roots.replica, &mut log).unwrap();

    assert_eq!(snapshot(&roots.replica), snapshot(&roots.source));
    assert!(log.errors.is_empty());
}

/// A missing source never touches the replica
#[test]
fn test_missing_source_leaves_replica_alone() {
    let roots = Roots::new();
    build_tree(&roots.replica, &[("keep.txt", Some("precious"))]);
    fs::remove_dir(&roots.source).unwrap();

    let mut log = EventLog::new();
    let result = reconcile(&roots.source, &roots.replica, &mut log);

    assert!(result.is_err());
    assert!(log.events.is_empty());
    assert_eq!(log.errors.len(), 1);
    assert_eq!(
        fs::read_to_string(roots.replica.join("keep.txt")).unwrap(),
        "precious"
    );
}

/// A failure partway through ends the cycle; earlier operations stay applied
#[cfg(unix)]
#[test]
fn test_mid_cycle_failure_keeps_applied_operations() {
    let roots = Roots::new();
    build_tree(&roots.source, &[("a.txt", Some("first"))]);
    std::os::unix::fs::symlink(
        roots.source.join("missing-target"),
        roots.source.join("z_dangling"),
    )
    .unwrap();
    build_tree(&roots.replica, &[("stale.txt", Some("pruned only in pass 2"))]);

    let reconciler = Reconciler::new(SyncOptions {
        follow_symlinks: true,
        ..SyncOptions::default()
    });
    let mut log = EventLog::new();
    let result = reconciler.reconcile(&roots.source, &roots.replica, &mut log);

    assert!(matches!(result, Err(SyncError::Io { .. })));
    assert_eq!(fs::read_to_string(roots.replica.join("a.txt")).unwrap(), "first");
    assert_eq!(events(&log), vec![(EventKind::CopyFile, "/a.txt".to_string())]);
    assert_eq!(log.errors.len(), 1);
    assert!(roots.replica.join("stale.txt").exists());
}
