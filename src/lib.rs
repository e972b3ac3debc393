//! pipecrypt - concurrent chunked file encryption.
//!
//! Files of any size are transformed between plaintext and authenticated
//! ciphertext by a three-stage pipeline: readers pull ordered byte ranges
//! from the source, transformers seal or open each chunk with AES-256-GCM,
//! and a single writer appends the results in chunk order. Per-chunk
//! single-capacity handoff slots bind the stages together, bounding
//! in-flight memory and making output order independent of scheduling.
//!
//! Encrypted files are self-describing: a little-endian u16 header length
//! indicator, a JSON header (version, chunk count, chunk size, cipher
//! suite), then the sealed chunks, each framed as nonce ‖ ciphertext ‖ tag.
//!
//! # Example
//!
//! ```no_run
//! use pipecrypt::{encrypt_file, decrypt_file};
//! use std::path::Path;
//!
//! encrypt_file(Path::new("report.pdf"), Path::new("report.pdf.enc"), "hunter2!").unwrap();
//! decrypt_file(Path::new("report.pdf.enc"), Path::new("report.pdf"), "hunter2!").unwrap();
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod plan;
pub mod storage;
pub mod validation;

// Re-export commonly used types
pub use config::{DEFAULT_CHUNK_MB, DEFAULT_READERS, DEFAULT_TRANSFORMERS, KEY_LEN, NONCE_LEN, TAG_LEN};
pub use crypto::aes_gcm::AesGcmChunkCipher;
pub use crypto::hash::hash_file;
pub use crypto::kdf::{key_from_hex, key_from_password};
pub use crypto::ChunkCipher;
pub use error::{PipecryptError, Result};
pub use format::ContainerHeader;
pub use pipeline::{run_pipeline, Operation, PipelineJob};
pub use plan::ChunkReadRequest;

use std::path::Path;

/// Encrypts a file with a password using the pipeline defaults
/// (8 MiB chunks, 6 readers, 12 transformers, 1 writer).
///
/// The target must not already exist; build a [`PipelineJob`] directly for
/// overwrite or custom concurrency.
pub fn encrypt_file(source: &Path, target: &Path, password: &str) -> Result<()> {
    run_pipeline(default_job(source, target, password, Operation::Encrypt))
}

/// Decrypts a file with a password using the pipeline defaults.
pub fn decrypt_file(source: &Path, target: &Path, password: &str) -> Result<()> {
    run_pipeline(default_job(source, target, password, Operation::Decrypt))
}

fn default_job(source: &Path, target: &Path, password: &str, operation: Operation) -> PipelineJob {
    PipelineJob {
        readers: DEFAULT_READERS,
        transformers: DEFAULT_TRANSFORMERS,
        writers: 1,
        source: source.to_path_buf(),
        target: target.to_path_buf(),
        force: false,
        chunk_size_mb: DEFAULT_CHUNK_MB,
        operation,
        key: key_from_password(password),
    }
}
