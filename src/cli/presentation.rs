//! CLI presentation: console rendering of sync events, in text or json.

use crate::daemon::DaemonSummary;
use crate::error::{AppError, SyncError};
use crate::sync::{EventKind, EventSink, SyncEvent, SyncReport, TracingSink};
use owo_colors::OwoColorize;
use serde_json::json;
use std::io::{Stderr, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Console event format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleFormat {
    Text,
    Json,
}

impl ConsoleFormat {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "text" => Ok(ConsoleFormat::Text),
            "json" => Ok(ConsoleFormat::Json),
            other => Err(AppError::Config(format!(
                "Invalid output format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }
}

fn label(kind: EventKind) -> &'static str {
    match kind {
        EventKind::CreateDir => "Created directory",
        EventKind::CopyFile => "Copied file",
        EventKind::DeleteFile => "Removed file",
        EventKind::DeleteDir => "Removed directory",
    }
}

/// One human-readable line per event, with absolute paths
pub fn format_event_text(event: &SyncEvent, source: &Path, replica: &Path, color: bool) -> String {
    let target = replica.join(&event.path);
    let detail = match event.kind {
        EventKind::CopyFile => format!(
            "{} to {}",
            source.join(&event.path).display(),
            target.display()
        ),
        _ => target.display().to_string(),
    };

    let label = label(event.kind);
    if !color {
        return format!("{}: {}", label, detail);
    }
    match event.kind {
        EventKind::CreateDir | EventKind::CopyFile => format!("{}: {}", label.green(), detail),
        EventKind::DeleteFile | EventKind::DeleteDir => format!("{}: {}", label.red(), detail),
    }
}

/// One JSON object per event
pub fn format_event_json(event: &SyncEvent) -> String {
    json!({
        "kind": event.kind,
        "path": event.display_path(),
    })
    .to_string()
}

pub fn format_summary_text(summary: &DaemonSummary) -> String {
    format!(
        "Completed {} cycle(s): {} operation(s), {} failed cycle(s)",
        summary.cycles, summary.operations, summary.failed_cycles
    )
}

/// Prints events to the console and forwards them to the log
///
/// Event lines go to `out`; in text mode, errors go to `err` (stderr by default).
pub struct ConsoleSink<W: Write, E: Write = Stderr> {
    out: W,
    err: E,
    source: PathBuf,
    replica: PathBuf,
    format: ConsoleFormat,
    color: bool,
    log: TracingSink,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, source: PathBuf, replica: PathBuf, format: ConsoleFormat) -> Self {
        Self {
            out,
            err: std::io::stderr(),
            source,
            replica,
            format,
            color: false,
            log: TracingSink,
        }
    }
}

impl<W: Write, E: Write> ConsoleSink<W, E> {
    /// Send text-mode error lines to `err` instead of stderr
    pub fn with_error_writer<E2: Write>(self, err: E2) -> ConsoleSink<W, E2> {
        ConsoleSink {
            out: self.out,
            err,
            source: self.source,
            replica: self.replica,
            format: self.format,
            color: self.color,
            log: self.log,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color && self.format == ConsoleFormat::Text;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn into_parts(self) -> (W, E) {
        (self.out, self.err)
    }

    fn line(&mut self, line: &str) {
        // A closed stdout must not stop synchronization
        let _ = writeln!(self.out, "{}", line);
    }
}

impl<W: Write, E: Write> EventSink for ConsoleSink<W, E> {
    fn report(&mut self, event: &SyncEvent) {
        self.log.report(event);
        let line = match self.format {
            ConsoleFormat::Text => format_event_text(event, &self.source, &self.replica, self.color),
            ConsoleFormat::Json => format_event_json(event),
        };
        self.line(&line);
    }

    fn report_error(&mut self, error: &SyncError) {
        self.log.report_error(error);
        match self.format {
            ConsoleFormat::Text => {
                let _ = writeln!(self.err, "Error: {}", error);
            }
            ConsoleFormat::Json => {
                let line = json!({ "error": error.to_string() }).to_string();
                self.line(&line);
            }
        }
    }

    fn cycle_completed(&mut self, cycle: u64, report: &SyncReport) {
        self.log.cycle_completed(cycle, report);
        if self.format == ConsoleFormat::Json {
            let line = json!({
                "cycle": cycle,
                "operations": report.operations.len(),
                "files_unchanged": report.files_unchanged,
                "bytes_copied": report.bytes_copied,
            })
            .to_string();
            self.line(&line);
        }
    }

    fn next_cycle_scheduled(&mut self, delay: Duration) {
        if self.format == ConsoleFormat::Text {
            let line = format!("Next synchronization in {} seconds.", delay.as_secs());
            self.line(&line);
        }
    }
}
