//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

use crate::types::DEFAULT_CHUNK_SIZE;

/// Seconds between cycles when nothing else is configured
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Create a Config builder with merge policy defaults applied.
///
/// Sources added afterwards override these in the order they are added.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("sync.chunk_size", DEFAULT_CHUNK_SIZE as u64)?
        .set_default("sync.quick_check", false)?
        .set_default("sync.follow_symlinks", false)?
        .set_default("sync.preserve_metadata", true)?
        .set_default("schedule.interval_secs", DEFAULT_INTERVAL_SECS)
}
