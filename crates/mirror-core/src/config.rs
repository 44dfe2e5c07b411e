//! Settings resolution
//!
//! Settings are merged from, in increasing precedence: an optional config
//! file, environment variables and command-line flags. The CLI folds the
//! last two together before handing a [`PartialConfig`] over; this module
//! merges it with the file layer and validates the result.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mirror_fs::ConfigStore;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result, TreeRole};

/// One layer of settings; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    pub source: Option<PathBuf>,
    pub replica: Option<PathBuf>,
    pub log: Option<PathBuf>,
    pub interval_secs: Option<u64>,
}

impl PartialConfig {
    /// Load a layer from a `.toml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        let layer: Self = ConfigStore::new().load(path)?;
        debug!("Loaded settings from {}", path.display());
        Ok(layer)
    }

    /// Fill every unset field from `fallback`.
    pub fn or(self, fallback: PartialConfig) -> Self {
        Self {
            source: self.source.or(fallback.source),
            replica: self.replica.or(fallback.replica),
            log: self.log.or(fallback.log),
            interval_secs: self.interval_secs.or(fallback.interval_secs),
        }
    }
}

/// Fully resolved settings for a mirroring run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    pub source: PathBuf,
    pub replica: PathBuf,
    pub log: PathBuf,
    pub interval: Duration,
}

impl MirrorConfig {
    /// Check that every required setting is present and well-formed.
    ///
    /// Does not touch the filesystem; see [`MirrorConfig::validate_paths`].
    pub fn resolve(partial: PartialConfig) -> Result<Self> {
        let source = partial.source.ok_or(Error::MissingOption { name: "source" })?;
        let replica = partial
            .replica
            .ok_or(Error::MissingOption { name: "replica" })?;
        let log = partial.log.ok_or(Error::MissingOption { name: "log" })?;
        let interval_secs = partial
            .interval_secs
            .ok_or(Error::MissingOption { name: "time" })?;

        if interval_secs == 0 {
            return Err(Error::InvalidOption {
                name: "time",
                reason: "interval must be a positive number of seconds".to_string(),
            });
        }

        Ok(Self {
            source,
            replica,
            log,
            interval: Duration::from_secs(interval_secs),
        })
    }

    /// Check the roots exist and that source, replica and log do not nest
    /// inside one another.
    ///
    /// Roots are returned in canonical form.
    pub fn validate_paths(self) -> Result<Self> {
        let source = canonical_root(TreeRole::Source, &self.source)?;
        let replica = canonical_root(TreeRole::Replica, &self.replica)?;

        if source == replica {
            return Err(Error::OverlappingPaths {
                message: format!("source and replica are the same directory: {}", source.display()),
            });
        }
        if replica.starts_with(&source) {
            return Err(Error::OverlappingPaths {
                message: format!(
                    "replica {} is inside source {}",
                    replica.display(),
                    source.display()
                ),
            });
        }
        if source.starts_with(&replica) {
            return Err(Error::OverlappingPaths {
                message: format!(
                    "source {} is inside replica {}",
                    source.display(),
                    replica.display()
                ),
            });
        }

        // The log would be deleted as an orphan on every cycle
        if canonical_log(&self.log).starts_with(&replica) {
            return Err(Error::OverlappingPaths {
                message: format!(
                    "log file {} is inside replica {}",
                    self.log.display(),
                    replica.display()
                ),
            });
        }

        Ok(Self {
            source,
            replica,
            ..self
        })
    }
}

fn canonical_root(role: TreeRole, path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(Error::RootNotFound {
            role,
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(Error::RootNotADirectory {
            role,
            path: path.to_path_buf(),
        });
    }
    Ok(dunce::canonicalize(path)?)
}

/// Best-effort canonical form of a log path that may not exist yet.
fn canonical_log(log: &Path) -> PathBuf {
    if let Ok(path) = dunce::canonicalize(log) {
        return path;
    }
    let parent = match log.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    match (dunce::canonicalize(&parent), log.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => log.to_path_buf(),
    }
}
