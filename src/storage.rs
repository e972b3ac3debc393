//! File access helpers shared by the pipeline stages.
//!
//! Open failures are classified here so that a missing source file, a
//! permissions problem, and everything else surface as distinct errors.

use crate::error::{PipecryptError, Result};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// Opens a file read-only, classifying open failures.
pub fn open_readable(path: &Path) -> Result<File> {
    File::open(path).map_err(|err| classify_open_error(path, err))
}

/// Returns the size in bytes of the file at `path`.
pub fn file_len(path: &Path) -> Result<u64> {
    let metadata = std::fs::metadata(path).map_err(|err| classify_open_error(path, err))?;
    Ok(metadata.len())
}

/// Creates (or truncates) a file for writing, classifying open failures.
/// Existence checks belong to the caller; creation here always truncates.
pub fn create_writable(path: &Path) -> Result<File> {
    File::create(path).map_err(|err| match err.kind() {
        ErrorKind::PermissionDenied => PipecryptError::PermissionDenied(path.display().to_string()),
        _ => PipecryptError::Io(err),
    })
}

fn classify_open_error(path: &Path, err: std::io::Error) -> PipecryptError {
    match err.kind() {
        ErrorKind::NotFound => PipecryptError::SourceMissing(path.display().to_string()),
        ErrorKind::PermissionDenied => PipecryptError::PermissionDenied(path.display().to_string()),
        _ => PipecryptError::Io(err),
    }
}
