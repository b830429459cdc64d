//! Synchronization core
//!
//! [`Reconciler`] runs one propagate-then-prune cycle and reports every applied
//! operation to an [`EventSink`].

pub mod copy;
pub mod event;
pub mod reconciler;

pub use event::{EventKind, EventLog, EventSink, NullSink, SyncEvent, TracingSink};
pub use reconciler::{reconcile, Reconciler, SyncOptions, SyncReport};
