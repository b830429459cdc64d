//! Whole-file copy with best-effort metadata preservation

use crate::error::SyncError;
use filetime::{set_file_times, FileTime};
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use tracing::warn;

/// Outcome of a single file copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOutcome {
    pub bytes: u64,
    /// False when permissions or timestamps could not be applied
    pub metadata_applied: bool,
}

/// Copy `source` over `destination` in `chunk_size` pieces, then apply metadata
///
/// Content failures are errors. Metadata failures are logged and reflected in the
/// returned outcome only.
pub fn copy_file(
    source: &Path,
    destination: &Path,
    chunk_size: usize,
    preserve_metadata: bool,
) -> Result<CopyOutcome, SyncError> {
    let bytes = copy_contents(source, destination, chunk_size)?;

    let metadata_applied = if preserve_metadata {
        match apply_metadata(source, destination) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    source = %source.display(),
                    destination = %destination.display(),
                    error = %e,
                    "Copied content but failed to preserve metadata"
                );
                false
            }
        }
    } else {
        true
    };

    Ok(CopyOutcome {
        bytes,
        metadata_applied,
    })
}

fn copy_contents(source: &Path, destination: &Path, chunk_size: usize) -> Result<u64, SyncError> {
    let mut reader = File::open(source).map_err(|e| SyncError::io("open", source, e))?;
    let mut writer = match File::create(destination) {
        Ok(file) => file,
        // A read-only replica file carries permissions copied on a previous cycle
        Err(e) if e.kind() == ErrorKind::PermissionDenied && clear_readonly(destination) => {
            File::create(destination).map_err(|e| SyncError::io("create", destination, e))?
        }
        Err(e) => return Err(SyncError::io("create", destination, e)),
    };

    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;
    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(SyncError::io("read", source, e)),
        };
        writer
            .write_all(&buf[..read])
            .map_err(|e| SyncError::io("write", destination, e))?;
        total += read as u64;
    }
    writer
        .flush()
        .map_err(|e| SyncError::io("flush", destination, e))?;

    Ok(total)
}

/// Make an existing file writable; false if it is not a file or cannot be changed
fn clear_readonly(path: &Path) -> bool {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return false;
    };
    if !meta.is_file() || !meta.permissions().readonly() {
        return false;
    }
    let mut permissions = meta.permissions();
    #[allow(clippy::permissions_set_readonly_false)]
    permissions.set_readonly(false);
    fs::set_permissions(path, permissions).is_ok()
}

fn apply_metadata(source: &Path, destination: &Path) -> std::io::Result<()> {
    let meta = fs::metadata(source)?;
    let accessed = FileTime::from_last_access_time(&meta);
    let modified = FileTime::from_last_modification_time(&meta);
    set_file_times(destination, accessed, modified)?;
    fs::set_permissions(destination, meta.permissions())
}
