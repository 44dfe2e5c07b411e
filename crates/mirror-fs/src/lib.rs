//! Filesystem layer for folder-mirror
//!
//! Scans directory trees into root-relative path sets, compares file content
//! by SHA-256 checksum, and performs the file-level mutations used to bring a
//! replica in line with its source.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;
pub mod scan;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::RelativePath;
pub use scan::{PathSet, SymlinkMode, TreeSnapshot, scan_tree, scan_tree_with};
