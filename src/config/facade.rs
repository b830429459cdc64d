//! Config loading facade: assembles sources in precedence order and deserializes.

use super::merge::merge_policy::builder_with_defaults;
use super::sources::{environment, explicit_file, global_file};
use super::TreesyncConfig;
use crate::error::AppError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`TreesyncConfig`] from the layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, the global file, the optional explicit file and the environment
    pub fn load(explicit: Option<&Path>) -> Result<TreesyncConfig, AppError> {
        let mut builder = global_file::add_to_builder(builder_with_defaults()?)?;
        if let Some(path) = explicit {
            debug!(config_path = %path.display(), "Loading explicit configuration");
            builder = explicit_file::add_to_builder(builder, path)?;
        }
        builder = environment::add_to_builder(builder);

        let config = builder.build()?.try_deserialize::<TreesyncConfig>()?;
        Ok(config)
    }

    /// Load only defaults plus a single file, ignoring global file and environment
    pub fn load_from_file(path: &Path) -> Result<TreesyncConfig, AppError> {
        let builder = explicit_file::add_to_builder(builder_with_defaults()?, path)?;
        let config = builder.build()?.try_deserialize::<TreesyncConfig>()?;
        Ok(config)
    }

    /// Where the global config file is looked up
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
