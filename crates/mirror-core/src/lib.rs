//! Reconciliation engine for folder-mirror
//!
//! This crate turns two directory trees into a converged pair:
//!
//! - **Diff planning**: set algebra over two scanned snapshots, hashing only
//!   the files both trees share
//! - **Reconciler**: applies a plan to the replica in a fixed, safe order and
//!   records one [`SyncEvent`] per mutation
//! - **Scheduler**: repeats full cycles at a fixed interval until asked to
//!   stop
//! - **Configuration**: layered settings with path validation
//!
//! # Architecture
//!
//! ```text
//!                  mirror-cli
//!                      |
//!                 mirror-core
//!                      |
//!                  mirror-fs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use mirror_core::{Reconciler, SyncEvent};
//!
//! let reconciler = Reconciler::new("/data/source", "/data/replica");
//! let mut events: Vec<SyncEvent> = Vec::new();
//! let report = reconciler.run_cycle(&mut events)?;
//! println!("{report}");
//! # Ok::<(), mirror_core::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod schedule;
pub mod sync;

pub use config::{MirrorConfig, PartialConfig};
pub use error::{Error, Operation, Result, TreeRole};
pub use schedule::{RunSummary, Scheduler, ShutdownHandle, StopReason};
pub use sync::{
    Action, ActionPlan, ChecksumProbe, ContentProbe, CycleReport, EventKind, EventSink,
    Reconciler, SyncEvent, TIMESTAMP_FORMAT, Target, plan,
};
