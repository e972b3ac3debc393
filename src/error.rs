//! Error types for the pipecrypt library.
//!
//! One enum covers validation, file I/O, container format, cryptographic,
//! and pipeline-coordination failures so that every stage of the pipeline
//! can report through the same channel.

use thiserror::Error;

/// Main error type for all pipecrypt operations.
#[derive(Error, Debug)]
pub enum PipecryptError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A job parameter failed validation (paths, key length, worker counts,
    /// chunk size).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The source file does not exist.
    #[error("source file does not exist: {0}")]
    SourceMissing(String),

    /// A file could not be opened due to insufficient permissions.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A seek did not land on the requested byte offset.
    #[error("seek requested byte {expected} but landed at byte {actual}")]
    SeekMismatch { expected: u64, actual: u64 },

    /// A read returned fewer bytes than the chunk plan called for.
    #[error("short read in chunk {chunk_id}: wanted {wanted} bytes")]
    ShortRead { chunk_id: u32, wanted: u64 },

    /// The target file exists and overwriting was not forced.
    #[error("target file already exists and overwriting was not specified")]
    TargetExists,

    /// The file is too small, the header length indicator or JSON is
    /// malformed, or the header fields are implausible.
    #[error("not a recognized encrypted file: {0}")]
    InvalidFormat(String),

    /// The container was written by an unknown format version.
    #[error("unsupported container format version: {0}")]
    UnsupportedVersion(String),

    /// Header serialization failed.
    #[error("header serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tag verification failed during chunk decryption.
    #[error("decryption failed: wrong key or corrupt data")]
    AuthFailure,

    /// Cipher initialization or random number generation failed.
    #[error("cryptography error: {0}")]
    CryptoInternal(String),

    /// A pipeline stage violated an internal invariant.
    #[error("pipeline error: {0}")]
    Pipeline(String),
}

/// Type alias for Results using PipecryptError.
pub type Result<T> = std::result::Result<T, PipecryptError>;
