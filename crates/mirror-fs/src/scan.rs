//! Single-pass directory tree scanning

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::{Error, RelativePath, Result};

/// A set of root-relative paths.
///
/// Backed by a `BTreeSet` so iteration is deterministic, but callers must
/// only rely on set semantics.
pub type PathSet = BTreeSet<RelativePath>;

/// Files and directories found under a root in one traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    /// Every non-directory entry
    pub files: PathSet,
    /// Every directory below the root (the root itself is excluded)
    pub dirs: PathSet,
}

impl TreeSnapshot {
    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.files.len() + self.dirs.len()
    }

    /// True if the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }
}

/// How symbolic links are classified. Links are never followed during the
/// walk in either mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymlinkMode {
    /// A link that resolves to a directory is recorded as a directory, any
    /// other link as a file. Used for the source tree, whose links stand for
    /// the content they point at.
    Resolve,
    /// Every link is recorded as a file, whatever it points at. Used for the
    /// replica tree, where a link is an entry to be replaced and never a
    /// place to write into.
    Entry,
}

/// Recursively enumerate everything under `root`, resolving symlinks to
/// directories as directories.
///
/// # Errors
///
/// Fails if `root` does not exist, is not a directory, or an entry cannot be
/// read during the walk.
pub fn scan_tree(root: &Path) -> Result<TreeSnapshot> {
    scan_tree_with(root, SymlinkMode::Resolve)
}

/// Recursively enumerate everything under `root`, classifying links
/// according to `links`.
pub fn scan_tree_with(root: &Path, links: SymlinkMode) -> Result<TreeSnapshot> {
    let metadata = std::fs::metadata(root).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::RootNotFound {
            path: root.to_path_buf(),
        },
        _ => Error::io(root, e),
    })?;
    if !metadata.is_dir() {
        return Err(Error::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut snapshot = TreeSnapshot::default();

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|source| Error::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        let relative = RelativePath::from_entry(root, entry.path())?;
        let file_type = entry.file_type();

        let is_dir = if file_type.is_symlink() {
            links == SymlinkMode::Resolve && entry.path().is_dir()
        } else {
            file_type.is_dir()
        };

        if is_dir {
            snapshot.dirs.insert(relative);
        } else {
            snapshot.files.insert(relative);
        }
    }

    debug!(
        root = %root.display(),
        files = snapshot.files.len(),
        dirs = snapshot.dirs.len(),
        "Scanned tree"
    );
    Ok(snapshot)
}
