//! Reconciler implementation
//!
//! The Reconciler scans both trees, plans the difference and applies it to
//! the replica, reporting every mutation to an [`EventSink`].

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use mirror_fs::{PathSet, RelativePath, SymlinkMode, TreeSnapshot, io, scan_tree_with};
use tracing::{debug, info, warn};

use crate::error::{Error, Operation, Result, TreeRole};

use super::event::{Action, EventSink, SyncEvent, Target};
use super::plan::{ActionPlan, ChecksumProbe, plan};

/// Counts of what one cycle did to the replica
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub folders_deleted: usize,
    pub folders_created: usize,
    pub files_created: usize,
    pub files_modified: usize,
    pub files_deleted: usize,
    /// Shared files left for the next cycle because they could not be read
    pub deferred: usize,
    pub bytes_copied: u64,
}

impl CycleReport {
    /// Number of mutation events emitted, excluding the completion marker.
    pub fn changes(&self) -> usize {
        self.folders_deleted
            + self.folders_created
            + self.files_created
            + self.files_modified
            + self.files_deleted
    }

    /// True if the replica was already in sync.
    pub fn is_noop(&self) -> bool {
        self.changes() == 0
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} folders created, {} folders deleted, {} files created, {} files modified, {} files deleted",
            self.folders_created,
            self.folders_deleted,
            self.files_created,
            self.files_modified,
            self.files_deleted
        )?;
        if self.deferred > 0 {
            write!(f, ", {} files deferred", self.deferred)?;
        }
        Ok(())
    }
}

/// Converges a replica tree onto a source tree.
///
/// The Reconciler is the only component that mutates the replica. It keeps
/// no state between cycles: every cycle rescans both trees.
#[derive(Debug, Clone)]
pub struct Reconciler {
    source_root: PathBuf,
    replica_root: PathBuf,
}

impl Reconciler {
    /// Create a reconciler for the given roots.
    pub fn new(source_root: impl Into<PathBuf>, replica_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            replica_root: replica_root.into(),
        }
    }

    pub fn replica_root(&self) -> &Path {
        &self.replica_root
    }

    /// Scan both trees once each.
    ///
    /// Source links to directories count as directories. Every replica link
    /// counts as a file, so it is replaced instead of written through.
    pub fn scan(&self) -> Result<(TreeSnapshot, TreeSnapshot)> {
        let source =
            scan_tree_with(&self.source_root, SymlinkMode::Resolve).map_err(|source| Error::Scan {
                role: TreeRole::Source,
                source,
            })?;
        let replica =
            scan_tree_with(&self.replica_root, SymlinkMode::Entry).map_err(|source| Error::Scan {
                role: TreeRole::Replica,
                source,
            })?;
        Ok((source, replica))
    }

    /// Compute the plan for the current state of both trees without
    /// touching anything.
    pub fn preview(&self) -> Result<ActionPlan> {
        let (source, replica) = self.scan()?;
        let probe = ChecksumProbe::new(&self.source_root, &self.replica_root);
        Ok(plan(&source, &replica, &probe))
    }

    /// Run one full cycle: scan, plan, apply.
    pub fn run_cycle(&self, sink: &mut dyn EventSink) -> Result<CycleReport> {
        let plan = self.preview()?;
        self.apply(&plan, sink)
    }

    /// Apply a plan to the replica.
    ///
    /// Mutations run in a fixed order: folder deletions, folder creations,
    /// file copies, file deletions, then the completion marker. Each event
    /// is recorded right after its mutation succeeds; the first failure
    /// aborts the cycle.
    ///
    /// A sink failure leaves its mutation applied but unrecorded, and the
    /// next cycle sees no difference to report for it. The path is named in
    /// a warning so the gap in the log can be traced.
    pub fn apply(&self, plan: &ActionPlan, sink: &mut dyn EventSink) -> Result<CycleReport> {
        let mut report = CycleReport {
            deferred: plan.deferred.len(),
            ..CycleReport::default()
        };

        // Descendants sort after their ancestors, so reverse order removes
        // nested stale folders before their parents.
        for dir in plan.dirs_to_delete.iter().rev() {
            let target = dir.under(&self.replica_root);
            let removed = io::remove_dir_all(&target)
                .map_err(|e| Error::mutation(Operation::DeleteFolder, dir, e))?;
            if !removed {
                debug!("Folder \"{}\" already gone", dir);
            }
            self.emit(sink, Action::Deleted, Target::Folder, dir)?;
            report.folders_deleted += 1;
        }

        // Replica files or links standing where the source has a folder
        let mut displaced: BTreeSet<&RelativePath> = BTreeSet::new();
        for dir in &plan.dirs_to_create {
            let target = dir.under(&self.replica_root);
            if plan.files_to_delete.contains(dir) {
                io::remove_file(&target)
                    .map_err(|e| Error::mutation(Operation::DeleteFile, dir, e))?;
                displaced.insert(dir);
            }
            io::create_dir_all(&target)
                .map_err(|e| Error::mutation(Operation::CreateFolder, dir, e))?;
            self.emit(sink, Action::Created, Target::Folder, dir)?;
            report.folders_created += 1;
        }

        for file in &plan.files_to_create {
            let from = file.under(&self.source_root);
            let to = file.under(&self.replica_root);
            report.bytes_copied += io::copy_file(&from, &to)
                .map_err(|e| Error::mutation(Operation::CopyFile, file, e))?;

            if plan.is_overwrite(file) {
                self.emit(sink, Action::Modified, Target::File, file)?;
                report.files_modified += 1;
            } else {
                self.emit(sink, Action::Created, Target::File, file)?;
                report.files_created += 1;
            }
        }

        for file in plan.pure_deletions() {
            // Already removed along with a stale folder, or replaced by a
            // folder above
            let handled = displaced.contains(file) || within_any(file, &plan.dirs_to_delete);
            if !handled {
                io::remove_file(&file.under(&self.replica_root))
                    .map_err(|e| Error::mutation(Operation::DeleteFile, file, e))?;
            }
            self.emit(sink, Action::Deleted, Target::File, file)?;
            report.files_deleted += 1;
        }

        sink.record(&SyncEvent::cycle_completed())?;
        info!("Cycle completed: {}", report);
        Ok(report)
    }

    fn emit(
        &self,
        sink: &mut dyn EventSink,
        action: Action,
        target: Target,
        path: &RelativePath,
    ) -> Result<()> {
        debug!("{} \"{}\" {}", target, path, action);
        sink.record(&SyncEvent::mutation(action, target, path.clone()))
            .inspect_err(|e| {
                warn!(
                    "{} \"{}\" was {} but the event was not recorded: {}",
                    target,
                    path.under(&self.replica_root).display(),
                    action,
                    e
                )
            })
    }
}

/// True if any ancestor of `path` is in `dirs`.
fn within_any(path: &RelativePath, dirs: &PathSet) -> bool {
    let mut current = path.parent();
    while let Some(dir) = current {
        if dirs.contains(&dir) {
            return true;
        }
        current = dir.parent();
    }
    false
}
