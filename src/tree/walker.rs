//! Filesystem walker for traversing directory structures

use crate::error::SyncError;
use crate::tree::path::relative_to;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Kind of a walked entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Only produced when symlinks are not followed
    Symlink,
}

/// A walked entry, addressed both absolutely and relative to the walk root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub rel_path: PathBuf,
    pub kind: EntryKind,
}

/// Filesystem walker configuration
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links (default: false)
    pub follow_symlinks: bool,
}

/// Lazy walker over everything below a root (the root itself is not yielded)
///
/// Traversal is driven by walkdir's explicit stack of open directories, so tree depth
/// does not grow the call stack. Children are visited in file-name order.
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: impl Into<PathBuf>, config: WalkerConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parents before children
    pub fn pre_order(&self) -> Entries {
        self.entries(false)
    }

    /// Children before parents
    pub fn post_order(&self) -> Entries {
        self.entries(true)
    }

    /// Walk the tree and collect all entries, sorted by relative path
    pub fn walk(&self) -> Result<Vec<Entry>, SyncError> {
        let mut entries = self.pre_order().collect::<Result<Vec<_>, _>>()?;
        entries.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        Ok(entries)
    }

    fn entries(&self, contents_first: bool) -> Entries {
        let inner = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(self.config.follow_symlinks)
            .contents_first(contents_first)
            .sort_by_file_name()
            .into_iter();
        Entries {
            root: self.root.clone(),
            inner,
        }
    }
}

/// Iterator returned by [`Walker::pre_order`] and [`Walker::post_order`]
pub struct Entries {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

impl Iterator for Entries {
    type Item = Result<Entry, SyncError>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e.into())),
        };

        let file_type = entry.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::File
        };

        Some(relative_to(entry.path(), &self.root).map(|rel_path| Entry {
            path: entry.into_path(),
            rel_path,
            kind,
        }))
    }
}

/// Look up what exists at `path` without walking
///
/// Returns None when nothing is there. `follow_symlinks` decides whether a link reports
/// its own kind or its target's.
pub fn probe(path: &Path, follow_symlinks: bool) -> Result<Option<EntryKind>, SyncError> {
    let meta = if follow_symlinks {
        std::fs::metadata(path)
    } else {
        std::fs::symlink_metadata(path)
    };

    match meta {
        Ok(meta) => {
            let ft = meta.file_type();
            Ok(Some(if ft.is_dir() {
                EntryKind::Directory
            } else if ft.is_symlink() {
                EntryKind::Symlink
            } else {
                EntryKind::File
            }))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound || parent_not_directory(&e) => {
            Ok(None)
        }
        Err(e) => Err(SyncError::io("stat", path, e)),
    }
}

/// ENOTDIR: some ancestor of the path is not a directory, so nothing exists there
#[cfg(unix)]
fn parent_not_directory(e: &std::io::Error) -> bool {
    const ENOTDIR: i32 = 20;
    e.raw_os_error() == Some(ENOTDIR)
}

#[cfg(not(unix))]
fn parent_not_directory(_e: &std::io::Error) -> bool {
    false
}
