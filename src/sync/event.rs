//! Event schema for reporting applied operations.

use crate::error::SyncError;
use crate::sync::SyncReport;
use crate::tree::path::display_relative;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Kind of filesystem mutation applied to the replica
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CreateDir,
    CopyFile,
    DeleteFile,
    DeleteDir,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::CreateDir => "create_dir",
            EventKind::CopyFile => "copy_file",
            EventKind::DeleteFile => "delete_file",
            EventKind::DeleteDir => "delete_dir",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One applied operation; `path` is relative to the tree roots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEvent {
    pub kind: EventKind,
    pub path: PathBuf,
}

impl SyncEvent {
    pub fn new(kind: EventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// `/a/x.txt` style rendering of the path
    pub fn display_path(&self) -> String {
        display_relative(&self.path)
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.display_path())
    }
}

/// Receiver of reconciliation events
///
/// Implementations own presentation and durable logging; the reconciler only calls these.
pub trait EventSink {
    /// An operation was applied to the replica
    fn report(&mut self, event: &SyncEvent);

    /// A cycle stopped on an error
    fn report_error(&mut self, _error: &SyncError) {}

    /// A scheduled cycle finished successfully
    fn cycle_completed(&mut self, _cycle: u64, _report: &SyncReport) {}

    /// The scheduler will start the next cycle after `delay`
    fn next_cycle_scheduled(&mut self, _delay: Duration) {}
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn report(&mut self, event: &SyncEvent) {
        (**self).report(event)
    }

    fn report_error(&mut self, error: &SyncError) {
        (**self).report_error(error)
    }

    fn cycle_completed(&mut self, cycle: u64, report: &SyncReport) {
        (**self).cycle_completed(cycle, report)
    }

    fn next_cycle_scheduled(&mut self, delay: Duration) {
        (**self).next_cycle_scheduled(delay)
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn report(&mut self, _event: &SyncEvent) {}
}

/// Collects events and errors in memory
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<SyncEvent>,
    pub errors: Vec<String>,
    pub cycles: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.iter().map(|e| e.kind).collect()
    }
}

impl EventSink for EventLog {
    fn report(&mut self, event: &SyncEvent) {
        self.events.push(event.clone());
    }

    fn report_error(&mut self, error: &SyncError) {
        self.errors.push(error.to_string());
    }

    fn cycle_completed(&mut self, _cycle: u64, _report: &SyncReport) {
        self.cycles += 1;
    }
}

/// Forwards events to `tracing` as structured records
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn report(&mut self, event: &SyncEvent) {
        tracing::info!(kind = %event.kind, path = %event.display_path(), "replica updated");
    }

    fn report_error(&mut self, error: &SyncError) {
        tracing::error!(error = %error, "synchronization cycle failed");
    }

    fn cycle_completed(&mut self, cycle: u64, report: &SyncReport) {
        tracing::info!(
            cycle,
            operations = report.operations.len(),
            files_unchanged = report.files_unchanged,
            "synchronization cycle completed"
        );
    }
}
