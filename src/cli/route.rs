//! CLI route: merges CLI flags into configuration and runs the daemon.

use crate::cli::parse::Cli;
use crate::cli::presentation::{ConsoleFormat, ConsoleSink};
use crate::config::{ConfigLoader, TreesyncConfig};
use crate::daemon::{DaemonSummary, StopHandle, SyncDaemon};
use crate::error::AppError;
use crate::logging::{default_log_file_path, LoggingConfig};
use std::io::{IsTerminal, Write};
use tracing::info;

/// Runtime context for CLI execution: merged config and the daemon built from it
pub struct RunContext {
    config: TreesyncConfig,
    daemon: SyncDaemon,
    once: bool,
    format: ConsoleFormat,
    color: bool,
}

impl RunContext {
    /// Load config, apply CLI overrides, validate, and build the daemon
    ///
    /// Fails before any cycle runs when configuration is invalid or the source is missing.
    pub fn new(cli: &Cli) -> Result<Self, AppError> {
        let mut config = ConfigLoader::load(cli.config.as_deref())?;
        apply_cli_overrides(&mut config, cli);

        config.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            AppError::Config(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })?;

        let format = ConsoleFormat::parse(&cli.format)?;
        let daemon = SyncDaemon::from_config(&config)?;

        Ok(Self {
            config,
            daemon,
            once: cli.once,
            format,
            color: !cli.no_color && std::io::stdout().is_terminal(),
        })
    }

    pub fn config(&self) -> &TreesyncConfig {
        &self.config
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.config.logging
    }

    pub fn daemon(&self) -> &SyncDaemon {
        &self.daemon
    }

    /// Make `stop` the daemon's stop handle
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.daemon = self.daemon.with_stop_handle(stop);
        self
    }

    /// Run the daemon, writing console output to `out`
    pub fn execute<W: Write>(&self, out: W) -> Result<DaemonSummary, AppError> {
        let mut sink = ConsoleSink::new(
            out,
            self.daemon.source().to_path_buf(),
            self.daemon.replica().to_path_buf(),
            self.format,
        )
        .with_color(self.color);

        if self.once {
            let report = self.daemon.run_once(&mut sink)?;
            info!(operations = report.operations.len(), "Single cycle completed");
            return Ok(DaemonSummary {
                cycles: 1,
                failed_cycles: 0,
                operations: report.operations.len() as u64,
                stopped: false,
            });
        }

        Ok(self.daemon.run(&mut sink))
    }
}

/// Apply CLI flags and positionals over loaded configuration
///
/// Precedence: CLI flags override config file override defaults.
pub fn apply_cli_overrides(config: &mut TreesyncConfig, cli: &Cli) {
    if let Some(ref source) = cli.source {
        config.sync.source = Some(source.clone());
    }
    if let Some(ref replica) = cli.replica {
        config.sync.replica = Some(replica.clone());
    }
    if let Some(interval) = cli.interval {
        config.schedule.interval_secs = interval;
    }
    if let Some(max_cycles) = cli.max_cycles {
        config.schedule.max_cycles = Some(max_cycles);
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.sync.chunk_size = chunk_size;
    }
    if cli.quick_check {
        config.sync.quick_check = true;
    }
    if cli.follow_symlinks {
        config.sync.follow_symlinks = true;
    }
    if cli.no_preserve_metadata {
        config.sync.preserve_metadata = false;
    }

    let logging = &mut config.logging;
    if let Some(ref logfile) = cli.logfile {
        logging.file = Some(logfile.clone());
        logging.output = "file".to_string();
    }
    if cli.quiet {
        logging.enabled = false;
    }
    if cli.verbose {
        logging.level = "debug".to_string();
        // Verbose is visible in the terminal without losing file logs.
        // An explicit --log-output value still takes precedence below.
        if logging.output == "file" {
            logging.output = "file+stderr".to_string();
        }
    }
    if let Some(ref level) = cli.log_level {
        logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        logging.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        logging.output = output.clone();
    }
    if logging.enabled && logging.uses_file() && logging.file.is_none() {
        logging.file = default_log_file_path();
    }
}
