//! Sync Daemon
//!
//! Repeats reconciliation cycles on a fixed interval until stopped. A stop request is
//! honoured between cycles and while sleeping; a running cycle always completes.

use crate::config::{ScheduleSettings, TreesyncConfig};
use crate::error::{AppError, SyncError};
use crate::sync::{EventSink, Reconciler, SyncOptions, SyncReport};
use crate::tree::walker::{probe, EntryKind};
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Longest uninterrupted sleep between stop-flag checks
const POLL_SLICE: Duration = Duration::from_millis(200);

/// Cloneable handle that asks a running daemon to stop
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// The underlying flag, for signal registration
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Totals over a daemon run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DaemonSummary {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub operations: u64,
    /// True when the run ended because of a stop request
    pub stopped: bool,
}

/// Runs the reconciler for one (source, replica) pair on a schedule
pub struct SyncDaemon {
    source: PathBuf,
    replica: PathBuf,
    reconciler: Reconciler,
    schedule: ScheduleSettings,
    stop: StopHandle,
}

impl SyncDaemon {
    /// Create a daemon; the source root must already be a directory
    pub fn new(
        source: PathBuf,
        replica: PathBuf,
        options: SyncOptions,
        schedule: ScheduleSettings,
    ) -> Result<Self, AppError> {
        validate_source(&source)?;
        schedule.validate().map_err(AppError::Config)?;

        Ok(Self {
            source,
            replica,
            reconciler: Reconciler::new(options),
            schedule,
            stop: StopHandle::new(),
        })
    }

    /// Create a daemon from a validated configuration
    pub fn from_config(config: &TreesyncConfig) -> Result<Self, AppError> {
        config.sync.validate().map_err(AppError::Config)?;
        let (Some(source), Some(replica)) = (&config.sync.source, &config.sync.replica) else {
            return Err(AppError::Config(
                "source and replica directories must be specified".to_string(),
            ));
        };
        Self::new(
            source.clone(),
            replica.clone(),
            config.sync.options(),
            config.schedule.clone(),
        )
    }

    /// Use an externally owned stop handle (e.g. one already wired to signals)
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn replica(&self) -> &Path {
        &self.replica
    }

    pub fn schedule(&self) -> &ScheduleSettings {
        &self.schedule
    }

    /// Run a single cycle, returning its error instead of continuing
    pub fn run_once(&self, sink: &mut dyn EventSink) -> Result<SyncReport, SyncError> {
        let report = self.reconciler.reconcile(&self.source, &self.replica, sink)?;
        sink.cycle_completed(1, &report);
        Ok(report)
    }

    /// Run cycles until stopped or `max_cycles` is reached
    ///
    /// A failed cycle is logged and reported, then the schedule carries on.
    pub fn run(&self, sink: &mut dyn EventSink) -> DaemonSummary {
        let mut summary = DaemonSummary::default();
        let interval = self.schedule.interval();

        info!(
            source = %self.source.display(),
            replica = %self.replica.display(),
            interval_secs = self.schedule.interval_secs,
            "Starting folder synchronization"
        );

        loop {
            if self.stop.is_stopped() {
                summary.stopped = true;
                break;
            }

            summary.cycles += 1;
            let cycle = summary.cycles;
            match self.reconciler.reconcile(&self.source, &self.replica, sink) {
                Ok(report) => {
                    summary.operations += report.operations.len() as u64;
                    sink.cycle_completed(cycle, &report);
                }
                // The reconciler already reported the error to the sink
                Err(_) => summary.failed_cycles += 1,
            }

            if self
                .schedule
                .max_cycles
                .is_some_and(|max| summary.cycles >= max)
            {
                break;
            }

            let next_run = chrono::Duration::from_std(interval)
                .ok()
                .map(|d| (Utc::now() + d).to_rfc3339());
            info!(cycle, next_run = next_run.as_deref().unwrap_or("-"), "Next synchronization scheduled");
            sink.next_cycle_scheduled(interval);

            if !self.sleep(interval) {
                summary.stopped = true;
                break;
            }
        }

        if summary.stopped {
            info!(cycles = summary.cycles, "Program stopped by the user");
        }
        summary
    }

    /// Sleep for `duration` in short slices; false if a stop was requested meanwhile
    fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.stop.is_stopped() {
                return false;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return true;
            }
            std::thread::sleep(remaining.min(POLL_SLICE));
        }
    }
}

fn validate_source(source: &Path) -> Result<(), AppError> {
    match probe(source, true) {
        Ok(Some(EntryKind::Directory)) => Ok(()),
        Ok(Some(_)) => Err(AppError::Config(format!(
            "The source path '{}' is not a directory.",
            source.display()
        ))),
        Ok(None) => Err(AppError::Config(format!(
            "The source directory '{}' doesn't exist.",
            source.display()
        ))),
        Err(e) => {
            warn!(error = %e, "Could not inspect source directory");
            Err(AppError::Sync(e))
        }
    }
}
