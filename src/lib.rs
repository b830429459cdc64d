//! Treesync: Periodic One-Way Directory Mirroring
//!
//! Keeps a replica directory tree identical to a source tree. Each cycle walks the source
//! to create directories and copy new or changed files (compared by BLAKE3 content
//! fingerprint), then walks the replica bottom-up to remove anything the source no longer
//! has. The source is never modified.

pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod logging;
pub mod sync;
pub mod tree;
pub mod types;
