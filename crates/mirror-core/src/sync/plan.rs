//! Diff planning between a source and a replica snapshot

use std::path::Path;

use mirror_fs::{PathSet, RelativePath, TreeSnapshot, checksum};
use tracing::{debug, warn};

/// Mutations that converge a replica onto its source for one cycle.
///
/// An overwrite is modelled as delete-then-recreate: the path is present in
/// both `files_to_create` and `files_to_delete`. A path is never in both
/// directory sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionPlan {
    /// Directories present in the source only
    pub dirs_to_create: PathSet,
    /// Directories present in the replica only
    pub dirs_to_delete: PathSet,
    /// Source-only files plus overwrites
    pub files_to_create: PathSet,
    /// Replica-only files plus the old half of overwrites
    pub files_to_delete: PathSet,
    /// Shared files whose content could not be compared this cycle
    pub deferred: PathSet,
}

impl ActionPlan {
    /// True if applying the plan would not touch the replica.
    pub fn is_empty(&self) -> bool {
        self.dirs_to_create.is_empty()
            && self.dirs_to_delete.is_empty()
            && self.files_to_create.is_empty()
            && self.files_to_delete.is_empty()
    }

    /// True if `path` will be replaced rather than created or deleted.
    pub fn is_overwrite(&self, path: &RelativePath) -> bool {
        self.files_to_create.contains(path) && self.files_to_delete.contains(path)
    }

    /// Files that will be removed without being recreated.
    pub fn pure_deletions(&self) -> impl Iterator<Item = &RelativePath> {
        self.files_to_delete.difference(&self.files_to_create)
    }

    /// Human-readable list of planned actions, in the order they would be
    /// applied.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for dir in self.dirs_to_delete.iter().rev() {
            lines.push(format!("Would delete folder \"{}\"", dir));
        }
        for dir in &self.dirs_to_create {
            lines.push(format!("Would create folder \"{}\"", dir));
        }
        for file in &self.files_to_create {
            if self.is_overwrite(file) {
                lines.push(format!("Would modify file \"{}\"", file));
            } else {
                lines.push(format!("Would create file \"{}\"", file));
            }
        }
        for file in self.pure_deletions() {
            lines.push(format!("Would delete file \"{}\"", file));
        }
        for file in &self.deferred {
            lines.push(format!("Could not verify file \"{}\"", file));
        }
        lines
    }
}

/// Decides whether a file shared by both trees holds identical bytes.
///
/// An error means the source copy could not be read; the planner defers the
/// file. Anything wrong on the replica side is reported as a difference.
pub trait ContentProbe {
    fn same_content(&self, path: &RelativePath) -> mirror_fs::Result<bool>;
}

/// Compares files by checksum across a source and a replica root.
#[derive(Debug, Clone, Copy)]
pub struct ChecksumProbe<'a> {
    source: &'a Path,
    replica: &'a Path,
}

impl<'a> ChecksumProbe<'a> {
    pub fn new(source: &'a Path, replica: &'a Path) -> Self {
        Self { source, replica }
    }
}

impl ContentProbe for ChecksumProbe<'_> {
    fn same_content(&self, path: &RelativePath) -> mirror_fs::Result<bool> {
        checksum::files_match(&path.under(self.source), &path.under(self.replica))
    }
}

/// Compute the action plan that converges `replica` onto `source`.
///
/// Only files present in both trees are handed to `probe`. A probe failure
/// defers that file to the next cycle instead of failing the plan.
pub fn plan(source: &TreeSnapshot, replica: &TreeSnapshot, probe: &dyn ContentProbe) -> ActionPlan {
    let dirs_to_delete: PathSet = replica.dirs.difference(&source.dirs).cloned().collect();
    let dirs_to_create: PathSet = source.dirs.difference(&replica.dirs).cloned().collect();

    let created_only = source.files.difference(&replica.files);
    let deleted_only = replica.files.difference(&source.files);

    let mut changed = PathSet::new();
    let mut deferred = PathSet::new();
    for path in source.files.intersection(&replica.files) {
        match probe.same_content(path) {
            Ok(true) => {}
            Ok(false) => {
                changed.insert(path.clone());
            }
            Err(e) => {
                warn!("Deferring \"{}\" to the next cycle: {}", path, e);
                deferred.insert(path.clone());
            }
        }
    }

    let files_to_create: PathSet = created_only.chain(changed.iter()).cloned().collect();
    let files_to_delete: PathSet = deleted_only.chain(changed.iter()).cloned().collect();

    debug!(
        dirs_to_create = dirs_to_create.len(),
        dirs_to_delete = dirs_to_delete.len(),
        files_to_create = files_to_create.len(),
        files_to_delete = files_to_delete.len(),
        overwrites = changed.len(),
        deferred = deferred.len(),
        "Planned cycle"
    );

    ActionPlan {
        dirs_to_create,
        dirs_to_delete,
        files_to_create,
        files_to_delete,
        deferred,
    }
}
