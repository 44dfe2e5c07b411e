//! Error types for mirror-core

use std::fmt;
use std::path::PathBuf;

use mirror_fs::RelativePath;

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which of the two trees an error concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeRole {
    Source,
    Replica,
}

impl fmt::Display for TreeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Replica => write!(f, "replica"),
        }
    }
}

/// Filesystem mutation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    DeleteFolder,
    CreateFolder,
    CopyFile,
    DeleteFile,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteFolder => write!(f, "delete folder"),
            Self::CreateFolder => write!(f, "create folder"),
            Self::CopyFile => write!(f, "copy file"),
            Self::DeleteFile => write!(f, "delete file"),
        }
    }
}

/// Errors that can occur in mirror-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required setting was given neither on the command line nor in a
    /// config file
    #[error("Missing required option --{name}")]
    MissingOption { name: &'static str },

    /// A setting was present but unusable
    #[error("Invalid value for --{name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    /// A tree root does not exist at startup
    #[error("The {role} directory does not exist: {path}")]
    RootNotFound { role: TreeRole, path: PathBuf },

    /// A tree root exists but is not a directory
    #[error("The {role} path is not a directory: {path}")]
    RootNotADirectory { role: TreeRole, path: PathBuf },

    /// Source, replica and log paths must not contain one another
    #[error("Overlapping paths: {message}")]
    OverlappingPaths { message: String },

    /// A tree could not be scanned; aborts the current cycle
    #[error("Failed to scan {role} tree: {source}")]
    Scan {
        role: TreeRole,
        #[source]
        source: mirror_fs::Error,
    },

    /// A replica mutation failed; aborts the current cycle
    #[error("Failed to {operation} \"{path}\": {source}")]
    Mutation {
        operation: Operation,
        path: RelativePath,
        #[source]
        source: mirror_fs::Error,
    },

    /// Filesystem error from mirror-fs
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn mutation(operation: Operation, path: &RelativePath, source: mirror_fs::Error) -> Self {
        Self::Mutation {
            operation,
            path: path.clone(),
            source,
        }
    }

    /// True for errors detected while resolving configuration, before any
    /// cycle runs.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::MissingOption { .. }
                | Self::InvalidOption { .. }
                | Self::RootNotFound { .. }
                | Self::RootNotADirectory { .. }
                | Self::OverlappingPaths { .. }
        )
    }
}
