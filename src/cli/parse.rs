//! CLI parse: clap types for treesync. No behavior; definitions only.

use clap::Parser;
use std::path::PathBuf;

/// Synchronize replica folder with source folder.
///
/// Positional arguments override the configuration file; any of them may be omitted
/// when the configuration provides it.
#[derive(Parser, Debug)]
#[command(name = "treesync", version)]
#[command(about = "Synchronize replica folder with source folder")]
pub struct Cli {
    /// Source folder
    pub source: Option<PathBuf>,

    /// Replica folder
    pub replica: Option<PathBuf>,

    /// Time interval between synchronizations in seconds
    pub interval: Option<u64>,

    /// Log file
    pub logfile: Option<PathBuf>,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Stop after this many cycles
    #[arg(long)]
    pub max_cycles: Option<u64>,

    /// Bytes read at a time when hashing and copying
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Treat equal size and modification time as unchanged without hashing
    #[arg(long)]
    pub quick_check: bool,

    /// Follow symbolic links in the source tree
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Do not copy permissions and timestamps
    #[arg(long)]
    pub no_preserve_metadata: bool,

    /// Console event format (text or json)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Disable colored console output
    #[arg(long)]
    pub no_color: bool,

    /// Debug logging, mirrored to stderr
    #[arg(long)]
    pub verbose: bool,

    /// Disable logging
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,
}
