//! [`TestTree`]: a directory tree rooted at a path, with builders and
//! assertions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One entry in a tree listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Dir,
    File(Vec<u8>),
    /// A symbolic link, never followed; holds the link target
    Symlink(PathBuf),
}

/// A directory tree used as a source or replica in tests.
///
/// All paths passed to the helpers are relative to the root and use `/`.
///
/// # Example
///
/// ```rust,no_run
/// use mirror_test_utils::TestTree;
///
/// let tree = TestTree::at(std::env::temp_dir().join("example"));
/// tree.file("dir/b.txt", "hello");
/// tree.assert_file_content("dir/b.txt", "hello");
/// ```
#[derive(Debug, Clone)]
pub struct TestTree {
    root: PathBuf,
}

impl TestTree {
    /// Use `root` as the tree root, creating it if missing.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        fs::create_dir_all(&root)
            .unwrap_or_else(|e| panic!("TestTree: failed to create {}: {e}", root.display()));
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Native path of a relative entry.
    pub fn path(&self, rel: &str) -> PathBuf {
        rel.split('/')
            .filter(|p| !p.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }

    /// Write a file, creating parent directories.
    pub fn file(&self, rel: &str, content: impl AsRef<[u8]>) -> &Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("TestTree: failed to create {}: {e}", parent.display()));
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("TestTree: failed to write {}: {e}", path.display()));
        self
    }

    /// Create a symbolic link at `rel` pointing at `target`, creating parent
    /// directories.
    #[cfg(unix)]
    pub fn symlink(&self, rel: &str, target: impl AsRef<Path>) -> &Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("TestTree: failed to create {}: {e}", parent.display()));
        }
        std::os::unix::fs::symlink(target.as_ref(), &path)
            .unwrap_or_else(|e| panic!("TestTree: failed to link {}: {e}", path.display()));
        self
    }

    /// True if `rel` is a symbolic link (dangling or not).
    pub fn is_symlink(&self, rel: &str) -> bool {
        fs::symlink_metadata(self.path(rel)).is_ok_and(|m| m.file_type().is_symlink())
    }

    /// Create a directory and its parents.
    pub fn dir(&self, rel: &str) -> &Self {
        let path = self.path(rel);
        fs::create_dir_all(&path)
            .unwrap_or_else(|e| panic!("TestTree: failed to create {}: {e}", path.display()));
        self
    }

    /// Every entry below the root, keyed by relative path.
    pub fn listing(&self) -> BTreeMap<String, Entry> {
        let mut entries = BTreeMap::new();
        collect(&self.root, "", &mut entries);
        entries
    }

    /// True if the root has no entries.
    pub fn is_empty(&self) -> bool {
        self.listing().is_empty()
    }

    /// Last modification time of a file, for detecting rewrites.
    pub fn modified(&self, rel: &str) -> std::time::SystemTime {
        let path = self.path(rel);
        fs::metadata(&path)
            .and_then(|m| m.modified())
            .unwrap_or_else(|e| panic!("TestTree: cannot stat {}: {e}", path.display()))
    }

    /// Assert that `rel` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            full_path.exists(),
            "Expected path to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `rel` does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_not_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            !full_path.exists(),
            "Expected path NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `rel` holds exactly `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or differs.
    pub fn assert_file_content(&self, rel: &str, content: impl AsRef<[u8]>) {
        let full_path = self.path(rel);
        let actual = fs::read(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert_eq!(
            actual,
            content.as_ref(),
            "File {} does not hold the expected bytes",
            full_path.display()
        );
    }
}

fn collect(dir: &Path, prefix: &str, entries: &mut BTreeMap<String, Entry>) {
    let read = fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("TestTree: cannot list {}: {e}", dir.display()));
    for item in read {
        let item = item.unwrap_or_else(|e| panic!("TestTree: bad entry in {}: {e}", dir.display()));
        let name = item.file_name().to_string_lossy().into_owned();
        let rel = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        let path = item.path();
        let file_type = item
            .file_type()
            .unwrap_or_else(|e| panic!("TestTree: cannot stat {}: {e}", path.display()));
        if file_type.is_symlink() {
            let target = fs::read_link(&path)
                .unwrap_or_else(|e| panic!("TestTree: cannot read link {}: {e}", path.display()));
            entries.insert(rel, Entry::Symlink(target));
        } else if file_type.is_dir() {
            entries.insert(rel.clone(), Entry::Dir);
            collect(&path, &rel, entries);
        } else {
            let bytes = fs::read(&path)
                .unwrap_or_else(|e| panic!("TestTree: cannot read {}: {e}", path.display()));
            entries.insert(rel, Entry::File(bytes));
        }
    }
}
