//! Shared test utilities for integration tests
//!
//! Tree builders, a comparable snapshot of a tree, and serialized access to the
//! process environment for tests that change it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use treesync::tree::walker::{EntryKind, Walker};

/// Serializes environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// A source and replica root under one temporary directory
pub struct Roots {
    _temp: TempDir,
    pub source: PathBuf,
    pub replica: PathBuf,
}

impl Roots {
    /// Both roots exist and are empty
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        let replica = temp.path().join("replica");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&replica).unwrap();
        Self {
            _temp: temp,
            source,
            replica,
        }
    }
}

/// What a tree entry holds: file content, or `None` for a directory
pub type Snapshot = BTreeMap<String, Option<Vec<u8>>>;

/// Populate `root` from `(relative path, content)` pairs
///
/// A `None` content creates a directory. Parents are created as needed.
pub fn build_tree(root: &Path, entries: &[(&str, Option<&str>)]) {
    for (rel, content) in entries {
        let path = root.join(rel);
        match content {
            Some(content) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).unwrap();
                }
                fs::write(&path, content).unwrap();
            }
            None => fs::create_dir_all(&path).unwrap(),
        }
    }
}

/// Every entry below `root`, keyed by forward-slash relative path
pub fn snapshot(root: &Path) -> Snapshot {
    Walker::new(root)
        .walk()
        .unwrap()
        .into_iter()
        .map(|entry| {
            let key = entry
                .rel_path
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            let content = match entry.kind {
                EntryKind::File => Some(fs::read(&entry.path).unwrap()),
                _ => None,
            };
            (key, content)
        })
        .collect()
}

/// Run `f` with the given environment variables set, restoring them afterwards
pub fn with_env<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(key, _)| (key.to_string(), std::env::var(key).ok()))
        .collect();

    for (key, value) in vars {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }

    let result = f();

    for (key, value) in saved {
        match value {
            Some(value) => std::env::set_var(&key, value),
            None => std::env::remove_var(&key),
        }
    }

    result
}
