//! Error types for treesync.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while comparing or reconciling trees
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to {op} {path:?}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {path:?}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("Source directory does not exist: {0:?}")]
    SourceMissing(PathBuf),

    #[error("Not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("Source {source_root:?} and replica {replica:?} must not contain each other")]
    OverlappingRoots {
        source_root: PathBuf,
        replica: PathBuf,
    },
}

impl SyncError {
    /// Attach an operation name and path to an I/O error
    pub fn io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        SyncError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// The path the error is about, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            SyncError::Io { path, .. } | SyncError::Walk { path, .. } => Some(path),
            SyncError::SourceMissing(path) | SyncError::NotADirectory(path) => Some(path),
            SyncError::OverlappingRoots { replica, .. } => Some(replica),
        }
    }
}

impl From<walkdir::Error> for SyncError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
        match err.into_io_error() {
            Some(io) => SyncError::Io {
                op: "read directory",
                path,
                source: io,
            },
            // Only symlink loops surface without an underlying io::Error
            None => SyncError::Walk {
                path,
                message: "filesystem loop detected".to_string(),
            },
        }
    }
}

/// Application-level errors: configuration, logging and wrapped sync failures
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
