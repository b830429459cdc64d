//! Integration tests for treesync

mod reconcile_invariants;
mod reconcile_scenarios;
mod test_utils;

pub use test_utils::*;
