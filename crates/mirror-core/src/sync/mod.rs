//! Reconciliation of a replica tree against its source
//!
//! This module provides:
//! - **plan**: Compute the create/delete actions separating two snapshots
//! - **engine**: Apply a plan to the replica in dependency-safe order
//! - **event**: Events recorded for every mutation, and the sinks receiving them

mod engine;
mod event;
mod plan;

pub use engine::{CycleReport, Reconciler};
pub use event::{Action, EventKind, EventSink, SyncEvent, TIMESTAMP_FORMAT, Target};
pub use plan::{ActionPlan, ChecksumProbe, ContentProbe, plan};
