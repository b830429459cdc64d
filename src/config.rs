//! Configuration System
//!
//! Layered configuration for the synchronizer: built-in defaults, the global config file,
//! an explicit `--config` file, `TREESYNC__*` environment variables, and finally CLI
//! flags applied by the caller.

use crate::logging::LoggingConfig;
use crate::sync::SyncOptions;
use crate::types::DEFAULT_CHUNK_SIZE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use merge::merge_policy::DEFAULT_INTERVAL_SECS;
pub use sources::environment::ENV_PREFIX;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreesyncConfig {
    /// What to mirror and how
    #[serde(default)]
    pub sync: SyncSettings,

    /// Cycle scheduling
    #[serde(default)]
    pub schedule: ScheduleSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Source/replica roots and reconciler knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Authoritative tree; never modified
    pub source: Option<PathBuf>,

    /// Tree kept identical to the source
    pub replica: Option<PathBuf>,

    /// Bytes read at a time when hashing or copying
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Trust equal size and modification time instead of hashing
    #[serde(default)]
    pub quick_check: bool,

    /// Follow symbolic links found in the source
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Copy permissions and timestamps along with content
    #[serde(default = "default_true")]
    pub preserve_metadata: bool,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_true() -> bool {
    true
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            source: None,
            replica: None,
            chunk_size: default_chunk_size(),
            quick_check: false,
            follow_symlinks: false,
            preserve_metadata: true,
        }
    }
}

impl SyncSettings {
    /// Reconciler options derived from these settings
    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            chunk_size: self.chunk_size,
            quick_check: self.quick_check,
            follow_symlinks: self.follow_symlinks,
            preserve_metadata: self.preserve_metadata,
        }
    }

    /// Validate sync settings
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than zero".to_string());
        }
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| "source directory not specified".to_string())?;
        let replica = self
            .replica
            .as_ref()
            .ok_or_else(|| "replica directory not specified".to_string())?;
        if source == replica {
            return Err("source and replica must be different directories".to_string());
        }
        Ok(())
    }
}

/// How often cycles run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSettings {
    /// Delay between the end of one cycle and the start of the next
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Stop after this many cycles (None = run until stopped)
    #[serde(default)]
    pub max_cycles: Option<u64>,
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_cycles: None,
        }
    }
}

impl ScheduleSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Validate schedule settings
    pub fn validate(&self) -> Result<(), String> {
        if self.interval_secs == 0 {
            return Err("interval_secs must be greater than zero".to_string());
        }
        if self.max_cycles == Some(0) {
            return Err("max_cycles must be greater than zero when set".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Sync(String),
    Schedule(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Sync(msg) => write!(f, "sync: {}", msg),
            ValidationError::Schedule(msg) => write!(f, "schedule: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl TreesyncConfig {
    /// Validate the entire configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.sync.validate() {
            errors.push(ValidationError::Sync(e));
        }
        if let Err(e) = self.schedule.validate() {
            errors.push(ValidationError::Schedule(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
