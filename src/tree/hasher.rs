//! Content fingerprinting and comparison using BLAKE3

use crate::error::SyncError;
use crate::types::{Fingerprint, DEFAULT_CHUNK_SIZE};
use blake3::Hasher;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Stream a reader through BLAKE3 in `chunk_size` reads
///
/// `path` is only used to give errors context.
pub fn hash_reader<R: Read>(
    mut reader: R,
    chunk_size: usize,
    path: &Path,
) -> Result<Fingerprint, SyncError> {
    let mut hasher = Hasher::new();
    let mut buf = vec![0u8; chunk_size.max(1)];

    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(SyncError::io("read", path, e)),
        };
        hasher.update(&buf[..read]);
    }

    Ok(hasher.finalize().into())
}

/// Compute the fingerprint of in-memory bytes
///
/// Equal to what [`ContentComparator::fingerprint`] returns for a file with the same bytes.
pub fn compute_content_hash(content: &[u8]) -> Fingerprint {
    let mut hasher = Hasher::new();
    hasher.update(content);
    hasher.finalize().into()
}

/// Decides whether two files hold identical bytes.
///
/// Every call re-reads the files in full; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct ContentComparator {
    chunk_size: usize,
    quick_check: bool,
}

impl Default for ContentComparator {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl ContentComparator {
    /// Create a comparator reading `chunk_size` bytes at a time (0 is treated as 1)
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            quick_check: false,
        }
    }

    /// Enable the size/modification-time pre-filter
    ///
    /// Different sizes are reported unequal without hashing. Equal size and equal
    /// modification time are reported equal without hashing. Anything else is hashed.
    pub fn with_quick_check(mut self, enabled: bool) -> Self {
        self.quick_check = enabled;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn quick_check(&self) -> bool {
        self.quick_check
    }

    /// Fingerprint a file's full content
    pub fn fingerprint(&self, path: &Path) -> Result<Fingerprint, SyncError> {
        let file = File::open(path).map_err(|e| SyncError::io("open", path, e))?;
        hash_reader(file, self.chunk_size, path)
    }

    /// True when both files have the same fingerprint
    pub fn contents_equal(&self, a: &Path, b: &Path) -> Result<bool, SyncError> {
        if self.quick_check {
            if let Some(verdict) = quick_verdict(a, b)? {
                tracing::trace!(a = %a.display(), b = %b.display(), verdict, "quick check");
                return Ok(verdict);
            }
        }

        let left = self.fingerprint(a)?;
        let right = self.fingerprint(b)?;
        Ok(left == right)
    }
}

/// Metadata-only verdict, or None when the files must be hashed
fn quick_verdict(a: &Path, b: &Path) -> Result<Option<bool>, SyncError> {
    let meta_a = std::fs::metadata(a).map_err(|e| SyncError::io("stat", a, e))?;
    let meta_b = std::fs::metadata(b).map_err(|e| SyncError::io("stat", b, e))?;

    if meta_a.len() != meta_b.len() {
        return Ok(Some(false));
    }

    match (meta_a.modified(), meta_b.modified()) {
        (Ok(ma), Ok(mb)) if ma == mb => Ok(Some(true)),
        _ => Ok(None),
    }
}
