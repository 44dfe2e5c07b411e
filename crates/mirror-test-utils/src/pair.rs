//! [`MirrorPair`]: a source tree, a replica tree and a log path inside one
//! temporary directory.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::tree::TestTree;

/// Sibling `source/` and `replica/` trees plus a log file path next to them.
///
/// The log path lies outside both trees, so it is never mirrored or deleted.
pub struct MirrorPair {
    temp_dir: TempDir,
    pub source: TestTree,
    pub replica: TestTree,
}

impl Default for MirrorPair {
    fn default() -> Self {
        Self::new()
    }
}

impl MirrorPair {
    /// Create empty source and replica trees.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let source = TestTree::at(temp_dir.path().join("source"));
        let replica = TestTree::at(temp_dir.path().join("replica"));
        Self {
            temp_dir,
            source,
            replica,
        }
    }

    /// Path of the event log (not created).
    pub fn log_path(&self) -> PathBuf {
        self.temp_dir.path().join("mirror.log")
    }

    /// Path of a scratch location outside both trees.
    pub fn outside(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Assert that the replica holds exactly the source's entries and bytes.
    ///
    /// # Panics
    /// Panics with both listings if they differ.
    pub fn assert_converged(&self) {
        let source = self.source.listing();
        let replica = self.replica.listing();
        assert!(
            source == replica,
            "Replica differs from source.\nSource:  {:?}\nReplica: {:?}",
            source.keys().collect::<Vec<_>>(),
            replica.keys().collect::<Vec<_>>()
        );
    }
}
