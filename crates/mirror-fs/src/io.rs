//! File-level mutations and locked log appends

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, Result};

const COPY_CHUNK_SIZE: usize = 8192;

/// Copy `from` over `to`, replacing whatever entry sits at `to`.
///
/// The bytes are written to a temporary file next to `to`, which is then
/// renamed over it. `to` never holds a partial copy, and a symlink at `to`
/// is replaced rather than written through.
///
/// Returns the number of bytes copied. Failures to read are reported
/// against `from`, failures to write against `to`.
pub fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    let mut source = File::open(from).map_err(|e| Error::io(from, e))?;
    let permissions = source
        .metadata()
        .map_err(|e| Error::io(from, e))?
        .permissions();

    let temp_path = temp_sibling(to);
    let result = copy_into_temp(&mut source, from, &temp_path, to).and_then(|copied| {
        fs::set_permissions(&temp_path, permissions).map_err(|e| Error::io(to, e))?;
        fs::rename(&temp_path, to).map_err(|e| Error::io(to, e))?;
        Ok(copied)
    });

    if result.is_err() {
        // Best effort; a leftover is an orphan the next cycle removes
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// `.<name>.<pid>.tmp` in the same directory as `path`, so the final rename
/// stays on one filesystem.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

fn copy_into_temp(source: &mut File, from: &Path, temp_path: &Path, to: &Path) -> Result<u64> {
    let mut temp = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(to, e))?;

    let mut chunk = [0u8; COPY_CHUNK_SIZE];
    let mut copied = 0u64;
    loop {
        let read = match source.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::io(from, e)),
        };
        temp.write_all(&chunk[..read])
            .map_err(|e| Error::io(to, e))?;
        copied += read as u64;
    }

    temp.sync_all().map_err(|e| Error::io(to, e))?;
    Ok(copied)
}

/// Remove a single file.
///
/// Returns `false` if the file was already gone.
pub fn remove_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Remove a directory and everything below it.
///
/// Returns `false` if the directory was already gone.
pub fn remove_dir_all(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Create a directory and any missing parents.
///
/// Returns `false` if the directory already existed.
pub fn create_dir_all(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
    Ok(true)
}

/// Append one line to a text file, creating the file if needed.
///
/// Holds an exclusive advisory lock for the duration of the write so other
/// writers never interleave partial lines.
pub fn append_line(path: &Path, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;

    FileExt::lock_exclusive(&file).map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    let mut buffer = String::with_capacity(line.len() + 1);
    buffer.push_str(line);
    buffer.push('\n');
    file.write_all(buffer.as_bytes())
        .map_err(|e| Error::io(path, e))?;

    // Lock is released when the handle closes
    file.flush().map_err(|e| Error::io(path, e))
}
