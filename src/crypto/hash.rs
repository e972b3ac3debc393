//! Streaming SHA-256 file hashing.
//!
//! A direct operation, not a pipeline one: the file is streamed through the
//! digest with `io::copy` so memory stays flat regardless of file size.

use crate::error::Result;
use crate::storage;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Computes the lowercase-hex SHA-256 digest of a file's contents.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = storage::open_readable(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
