//! Sync events and the sinks that record them

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Local};
use mirror_fs::RelativePath;

use crate::Result;

/// Timestamp layout used in rendered log lines
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// What happened to an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Created,
    Modified,
    Deleted,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Modified => write!(f, "modified"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// Kind of entry an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    File,
    Folder,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "File"),
            Self::Folder => write!(f, "Folder"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// One replica mutation
    Mutation {
        action: Action,
        target: Target,
        path: RelativePath,
    },
    /// Terminal marker emitted once per cycle
    CycleCompleted,
}

/// Immutable record of one mutation, or of a finished cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEvent {
    pub kind: EventKind,
    pub timestamp: DateTime<Local>,
}

impl SyncEvent {
    pub fn mutation(action: Action, target: Target, path: RelativePath) -> Self {
        Self {
            kind: EventKind::Mutation {
                action,
                target,
                path,
            },
            timestamp: Local::now(),
        }
    }

    pub fn cycle_completed() -> Self {
        Self {
            kind: EventKind::CycleCompleted,
            timestamp: Local::now(),
        }
    }

    /// Event message, naming the affected entry by its path under
    /// `replica_root`.
    pub fn message(&self, replica_root: &Path) -> String {
        match &self.kind {
            EventKind::Mutation {
                action,
                target,
                path,
            } => format!(
                "{} \"{}\" was {}",
                target,
                path.under(replica_root).display(),
                action
            ),
            EventKind::CycleCompleted => "Sync operation cycle completed".to_string(),
        }
    }

    /// Full log line: `<message> at <timestamp>`.
    pub fn log_line(&self, replica_root: &Path) -> String {
        format!(
            "{} at {}",
            self.message(replica_root),
            self.timestamp.format(TIMESTAMP_FORMAT)
        )
    }

    /// True for the end-of-cycle marker.
    pub fn is_cycle_completed(&self) -> bool {
        matches!(self.kind, EventKind::CycleCompleted)
    }
}

/// Receives events in the order mutations happen.
///
/// A sink error aborts the cycle that produced the event.
pub trait EventSink {
    fn record(&mut self, event: &SyncEvent) -> Result<()>;
}

impl EventSink for Vec<SyncEvent> {
    fn record(&mut self, event: &SyncEvent) -> Result<()> {
        self.push(event.clone());
        Ok(())
    }
}
