//! SHA-256 checksum utilities
//!
//! Provides a single canonical checksum format (`sha256:<hex>`) used to decide
//! whether a source file and its replica counterpart hold the same bytes.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{Error, Result};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Files are streamed through the hasher in chunks of this size.
const CHUNK_SIZE: usize = 8192;

/// Compute the SHA-256 checksum of a file's contents.
///
/// The file is read in fixed-size chunks, so memory use does not grow with
/// file size.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or becomes unreadable while
/// it is being streamed (for example, it is deleted concurrently).
pub fn compute_file_checksum(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut reader = BufReader::with_capacity(CHUNK_SIZE, file);
    let mut hasher = Sha256::new();
    let mut chunk = [0u8; CHUNK_SIZE];

    loop {
        let read = reader.read(&mut chunk).map_err(|e| Error::io(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&chunk[..read]);
    }

    Ok(format!("{}{:x}", PREFIX, hasher.finalize()))
}

/// Check whether `replica` holds the same bytes as `source`.
///
/// Only `source` has to be readable. A replica entry that is missing, is
/// not a regular file (a symlink included) or cannot be read counts as
/// different, so the caller replaces it. Files of different length are
/// reported as different without being hashed.
///
/// # Errors
///
/// Fails only when `source` cannot be read.
pub fn files_match(source: &Path, replica: &Path) -> Result<bool> {
    let source_len = fs::metadata(source)
        .map_err(|e| Error::io(source, e))?
        .len();

    let replica_len = match fs::symlink_metadata(replica) {
        Ok(meta) if meta.file_type().is_file() => meta.len(),
        Ok(_) => return Ok(false),
        Err(e) => {
            debug!("Replica {} unreadable, treating as changed: {}", replica.display(), e);
            return Ok(false);
        }
    };
    if source_len != replica_len {
        return Ok(false);
    }

    let expected = compute_file_checksum(source)?;
    match compute_file_checksum(replica) {
        Ok(actual) => Ok(actual == expected),
        Err(e) => {
            debug!("Replica unreadable, treating as changed: {}", e);
            Ok(false)
        }
    }
}
