//! Two-pass tree reconciliation: propagate source into replica, then prune replica

use crate::error::SyncError;
use crate::sync::copy::copy_file;
use crate::sync::event::{EventKind, EventSink, SyncEvent};
use crate::tree::hasher::ContentComparator;
use crate::tree::path::{display_relative, is_within};
use crate::tree::walker::{probe, Entry, EntryKind, Walker, WalkerConfig};
use crate::types::DEFAULT_CHUNK_SIZE;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, instrument, trace};

/// Knobs for one reconciler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Read size for hashing and copying
    pub chunk_size: usize,
    /// Size/modification-time pre-filter before hashing
    pub quick_check: bool,
    /// Follow symlinks in the source tree
    pub follow_symlinks: bool,
    /// Copy permissions and timestamps after content
    pub preserve_metadata: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            quick_check: false,
            follow_symlinks: false,
            preserve_metadata: true,
        }
    }
}

/// What one cycle did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Applied operations in application order
    pub operations: Vec<SyncEvent>,
    pub files_compared: usize,
    pub files_unchanged: usize,
    pub bytes_copied: u64,
}

impl SyncReport {
    /// True when nothing was mutated
    pub fn is_noop(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.operations.iter().filter(|op| op.kind == kind).count()
    }
}

/// Makes a replica tree identical to a source tree
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    options: SyncOptions,
    comparator: ContentComparator,
}

impl Reconciler {
    pub fn new(options: SyncOptions) -> Self {
        let comparator =
            ContentComparator::new(options.chunk_size).with_quick_check(options.quick_check);
        Self {
            options,
            comparator,
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn comparator(&self) -> &ContentComparator {
        &self.comparator
    }

    /// Run one cycle
    ///
    /// Pass 1 (propagate) finishes before pass 2 (prune) starts. Every applied operation
    /// goes to `sink` as it happens. The first failure ends the cycle: it is reported to
    /// `sink` and returned, and operations applied before it stay applied.
    #[instrument(skip_all, fields(source = %source.display(), replica = %replica.display()))]
    pub fn reconcile(
        &self,
        source: &Path,
        replica: &Path,
        sink: &mut dyn EventSink,
    ) -> Result<SyncReport, SyncError> {
        let started = Instant::now();
        let mut cycle = Cycle {
            source,
            replica,
            options: &self.options,
            comparator: &self.comparator,
            sink: &mut *sink,
            report: SyncReport::default(),
        };

        let outcome = check_roots(source, replica)
            .and_then(|_| cycle.propagate())
            .and_then(|_| cycle.prune());

        match outcome {
            Ok(()) => {
                let report = cycle.report;
                debug!(
                    operations = report.operations.len(),
                    files_compared = report.files_compared,
                    files_unchanged = report.files_unchanged,
                    bytes_copied = report.bytes_copied,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Reconciliation finished"
                );
                Ok(report)
            }
            Err(e) => {
                sink.report_error(&e);
                Err(e)
            }
        }
    }
}

/// Reconcile with default options
pub fn reconcile(
    source: &Path,
    replica: &Path,
    sink: &mut dyn EventSink,
) -> Result<SyncReport, SyncError> {
    Reconciler::default().reconcile(source, replica, sink)
}

/// Reject roots that would make the cycle destroy data
fn check_roots(source: &Path, replica: &Path) -> Result<(), SyncError> {
    match probe(source, true)? {
        Some(EntryKind::Directory) => {}
        Some(_) => return Err(SyncError::NotADirectory(source.to_path_buf())),
        None => return Err(SyncError::SourceMissing(source.to_path_buf())),
    }

    if is_within(replica, source) || is_within(source, replica) {
        return Err(SyncError::OverlappingRoots {
            source_root: source.to_path_buf(),
            replica: replica.to_path_buf(),
        });
    }

    Ok(())
}

/// State of a single in-flight cycle
struct Cycle<'a> {
    source: &'a Path,
    replica: &'a Path,
    options: &'a SyncOptions,
    comparator: &'a ContentComparator,
    sink: &'a mut dyn EventSink,
    report: SyncReport,
}

impl Cycle<'_> {
    /// Pass 1: create missing directories and copy missing or changed files, top-down
    fn propagate(&mut self) -> Result<(), SyncError> {
        self.ensure_replica_root()?;

        let walker = Walker::with_config(
            self.source,
            WalkerConfig {
                follow_symlinks: self.options.follow_symlinks,
            },
        );
        for entry in walker.pre_order() {
            let entry = entry?;
            let target = self.replica.join(&entry.rel_path);
            match entry.kind {
                EntryKind::Directory => self.propagate_dir(&entry, &target)?,
                EntryKind::File => self.propagate_file(&entry, &target)?,
                EntryKind::Symlink => {
                    debug!(path = %display_relative(&entry.rel_path), "Skipping symlink");
                }
            }
        }
        Ok(())
    }

    /// Pass 2: delete replica entries with no same-kind source counterpart, bottom-up
    ///
    /// Contents are yielded before their directory, so a directory is only removed once
    /// the walk is done with everything below it.
    fn prune(&mut self) -> Result<(), SyncError> {
        let walker = Walker::new(self.replica);
        for entry in walker.post_order() {
            let entry = entry?;
            let counterpart = self.source.join(&entry.rel_path);
            let source_kind = probe(&counterpart, self.options.follow_symlinks)?;

            match entry.kind {
                EntryKind::Directory if source_kind != Some(EntryKind::Directory) => {
                    self.remove_dir(&entry.path, &entry.rel_path)?;
                }
                EntryKind::File | EntryKind::Symlink if source_kind != Some(EntryKind::File) => {
                    self.remove_file(&entry.path, &entry.rel_path)?;
                }
                _ => trace!(path = %display_relative(&entry.rel_path), "Kept"),
            }
        }
        Ok(())
    }

    fn ensure_replica_root(&mut self) -> Result<(), SyncError> {
        match probe(self.replica, true)? {
            Some(EntryKind::Directory) => Ok(()),
            Some(_) => Err(SyncError::NotADirectory(self.replica.to_path_buf())),
            None => {
                fs::create_dir_all(self.replica)
                    .map_err(|e| SyncError::io("create directory", self.replica, e))?;
                self.applied(EventKind::CreateDir, PathBuf::new());
                Ok(())
            }
        }
    }

    fn propagate_dir(&mut self, entry: &Entry, target: &Path) -> Result<(), SyncError> {
        match probe(target, false)? {
            Some(EntryKind::Directory) => return Ok(()),
            Some(EntryKind::File) | Some(EntryKind::Symlink) => {
                self.remove_file(target, &entry.rel_path)?;
            }
            None => {}
        }
        fs::create_dir(target).map_err(|e| SyncError::io("create directory", target, e))?;
        self.applied(EventKind::CreateDir, entry.rel_path.clone());
        Ok(())
    }

    fn propagate_file(&mut self, entry: &Entry, target: &Path) -> Result<(), SyncError> {
        match probe(target, false)? {
            None => {}
            Some(EntryKind::File) => {
                self.report.files_compared += 1;
                if self.comparator.contents_equal(&entry.path, target)? {
                    self.report.files_unchanged += 1;
                    trace!(path = %display_relative(&entry.rel_path), "Unchanged");
                    return Ok(());
                }
            }
            Some(EntryKind::Symlink) => self.remove_file(target, &entry.rel_path)?,
            Some(EntryKind::Directory) => self.remove_dir(target, &entry.rel_path)?,
        }

        let outcome = copy_file(
            &entry.path,
            target,
            self.options.chunk_size,
            self.options.preserve_metadata,
        )?;
        self.report.bytes_copied += outcome.bytes;
        self.applied(EventKind::CopyFile, entry.rel_path.clone());
        Ok(())
    }

    fn remove_file(&mut self, path: &Path, rel_path: &Path) -> Result<(), SyncError> {
        fs::remove_file(path).map_err(|e| SyncError::io("remove file", path, e))?;
        self.applied(EventKind::DeleteFile, rel_path.to_path_buf());
        Ok(())
    }

    fn remove_dir(&mut self, path: &Path, rel_path: &Path) -> Result<(), SyncError> {
        fs::remove_dir_all(path).map_err(|e| SyncError::io("remove directory", path, e))?;
        self.applied(EventKind::DeleteDir, rel_path.to_path_buf());
        Ok(())
    }

    fn applied(&mut self, kind: EventKind, rel_path: PathBuf) {
        let event = SyncEvent::new(kind, rel_path);
        debug!(kind = %event.kind, path = %event.display_path(), "Applied");
        self.sink.report(&event);
        self.report.operations.push(event);
    }
}
