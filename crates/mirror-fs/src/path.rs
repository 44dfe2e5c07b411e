//! Root-relative path handling

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// A path relative to a tree root, normalized to forward slashes.
///
/// Two trees are compared by these paths, so equality is exact and
/// case-sensitive. Ordering is plain string ordering, which places every
/// directory before its descendants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath {
    /// Internal representation always uses forward slashes, no leading or
    /// trailing separator
    inner: String,
}

impl RelativePath {
    /// Create a RelativePath from any path-like input.
    ///
    /// Backslashes become forward slashes, and empty or `.` components are
    /// dropped.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        let inner = raw
            .split('/')
            .filter(|part| !part.is_empty() && *part != ".")
            .collect::<Vec<_>>()
            .join("/");
        Self { inner }
    }

    /// Build the relative path of `entry` inside `root`.
    pub fn from_entry(root: &Path, entry: &Path) -> Result<Self> {
        let relative = entry.strip_prefix(root).map_err(|_| Error::OutsideRoot {
            path: entry.to_path_buf(),
            root: root.to_path_buf(),
        })?;

        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => {
                    return Err(Error::OutsideRoot {
                        path: entry.to_path_buf(),
                        root: root.to_path_buf(),
                    });
                }
            }
        }

        Ok(Self {
            inner: parts.join("/"),
        })
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Get the parent directory, `None` for top-level entries.
    pub fn parent(&self) -> Option<Self> {
        self.inner.rfind('/').map(|idx| Self {
            inner: self.inner[..idx].to_string(),
        })
    }

    /// Resolve this path under a tree root, in platform-native form.
    pub fn under(&self, root: &Path) -> PathBuf {
        let mut native = root.to_path_buf();
        for part in self.inner.split('/').filter(|p| !p.is_empty()) {
            native.push(part);
        }
        native
    }
}

impl std::fmt::Display for RelativePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for RelativePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RelativePath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&Path> for RelativePath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
