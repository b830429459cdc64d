//! Filesystem trees
//!
//! Lazy traversal of source and replica trees, relative-path joining, and content
//! fingerprinting.

pub mod hasher;
pub mod path;
pub mod walker;
