//! Relative path helpers used to join source and replica entries

use crate::error::SyncError;
use std::path::{Component, Path, PathBuf};

/// Strip `root` from `path`, yielding the tree-relative path (empty for the root itself)
pub fn relative_to(path: &Path, root: &Path) -> Result<PathBuf, SyncError> {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .map_err(|_| SyncError::Walk {
            path: path.to_path_buf(),
            message: format!("entry is outside of root {:?}", root),
        })
}

/// Render a relative path the way events display it: `/a/x.txt`, `/` for the root
pub fn display_relative(rel: &Path) -> String {
    let mut out = String::new();
    for component in rel.components() {
        if let Component::Normal(name) = component {
            out.push('/');
            out.push_str(&name.to_string_lossy());
        }
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Canonicalize a root for overlap checks, falling back to the path as given
pub fn canonical_root(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// True when `inner` is `outer` or lies below it
///
/// Missing replica roots are resolved through their nearest existing ancestor.
pub fn is_within(inner: &Path, outer: &Path) -> bool {
    let outer = canonical_root(outer);
    let mut probe = inner.to_path_buf();
    let mut tail = Vec::new();
    while !probe.exists() {
        match (probe.file_name().map(|n| n.to_os_string()), probe.parent()) {
            (Some(name), Some(parent)) => {
                tail.push(name);
                probe = parent.to_path_buf();
            }
            _ => break,
        }
    }
    let mut resolved = canonical_root(&probe);
    for name in tail.into_iter().rev() {
        resolved.push(name);
    }
    resolved.starts_with(&outer)
}
