//! The three-stage encryption pipeline and its conductor.
//!
//! A job flows through read → transform → write stages running
//! concurrently, one worker pool per stage. Every chunk owns three
//! single-capacity handoff slots: a pre-seeded read request, the
//! reader-to-transformer buffer handoff, and the transformer-to-writer
//! handoff. Because the writer drains its slots in ascending chunk order,
//! output byte order is deterministic no matter how the upstream workers
//! interleave, and in-flight memory stays near O(readers + transformers)
//! chunks.
//!
//! The conductor validates the job, derives the chunk plan (from the source
//! size when encrypting, from the container header when decrypting), seeds
//! the request slots, starts the stages, and waits for exactly three stage
//! completions. The first error observed becomes the job error; the other
//! stages drain on their own once the failed stage's slot endpoints drop.

mod slot;
mod stage;
mod worker;

use crate::config::{
    bytes_from_mb, KEY_LEN, MAX_CHUNK_MB, MAX_READERS, MAX_TRANSFORMERS, MAX_WRITERS, MIN_CHUNK_MB,
};
use crate::crypto::aes_gcm::AesGcmChunkCipher;
use crate::crypto::ChunkCipher;
use crate::error::{PipecryptError, Result};
use crate::format::{self, ContainerHeader};
use crate::plan::{self, ChunkReadRequest};
use crate::storage;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use zeroize::Zeroizing;

/// Number of pipeline stages reporting completion.
const STAGE_COUNT: usize = 3;

/// Direction of a pipeline job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encrypt,
    Decrypt,
}

/// A fully specified encryption or decryption job.
///
/// No `Debug` derive: the job carries raw key material.
pub struct PipelineJob {
    /// Read workers, 1..=30.
    pub readers: usize,
    /// Transform workers, 1..=60.
    pub transformers: usize,
    /// Write workers, currently pinned to 1.
    pub writers: usize,
    /// File to read.
    pub source: PathBuf,
    /// File to write.
    pub target: PathBuf,
    /// Overwrite the target if it exists.
    pub force: bool,
    /// Plaintext chunk size in MiB, 1..=64. Ignored for decryption, where
    /// the container header governs.
    pub chunk_size_mb: u64,
    /// Encrypt or decrypt.
    pub operation: Operation,
    /// 256-bit key material.
    pub key: Zeroizing<[u8; KEY_LEN]>,
}

impl PipelineJob {
    /// Checks worker counts, chunk size, and paths against the pipeline's
    /// hard bounds. The key length is enforced by the type.
    pub fn validate(&self) -> Result<()> {
        if self.source.as_os_str().is_empty() {
            return Err(PipecryptError::InvalidInput(
                "source path is empty".to_string(),
            ));
        }
        if self.target.as_os_str().is_empty() {
            return Err(PipecryptError::InvalidInput(
                "target path is empty".to_string(),
            ));
        }
        if self.readers < 1 || self.readers > MAX_READERS {
            return Err(PipecryptError::InvalidInput(format!(
                "read workers must be between 1 and {}",
                MAX_READERS
            )));
        }
        if self.transformers < 1 || self.transformers > MAX_TRANSFORMERS {
            return Err(PipecryptError::InvalidInput(format!(
                "transform workers must be between 1 and {}",
                MAX_TRANSFORMERS
            )));
        }
        if self.writers < 1 || self.writers > MAX_WRITERS {
            return Err(PipecryptError::InvalidInput(format!(
                "write workers are currently restricted to {}",
                MAX_WRITERS
            )));
        }
        if self.chunk_size_mb < MIN_CHUNK_MB || self.chunk_size_mb > MAX_CHUNK_MB {
            return Err(PipecryptError::InvalidInput(format!(
                "chunk size must be between {} and {} MB",
                MIN_CHUNK_MB, MAX_CHUNK_MB
            )));
        }
        Ok(())
    }
}

/// Runs a pipeline job to completion.
pub fn run_pipeline(job: PipelineJob) -> Result<()> {
    job.validate()?;

    let source_size = storage::file_len(&job.source)?;

    // Encryption plans from the source size; decryption re-derives the
    // chunk geometry from the header written at encryption time.
    let (requests, header_bytes) = match job.operation {
        Operation::Encrypt => {
            let chunk_size_bytes = bytes_from_mb(job.chunk_size_mb);
            let requests = plan::encrypt_plan(source_size, chunk_size_bytes)?;
            let header = ContainerHeader::new(requests.len() as u32, chunk_size_bytes);
            let header_bytes = header.to_bytes()?;
            (requests, Some(header_bytes))
        }
        Operation::Decrypt => {
            let (header, end_of_header) = format::read_header(&job.source)?;
            let requests = plan::decrypt_plan(&header, end_of_header, source_size);
            (requests, None)
        }
    };

    let num_chunks = requests.len();

    let mut request_slots = slot::slots::<ChunkReadRequest>(num_chunks);
    let read_slots = slot::slots::<Vec<u8>>(num_chunks);
    let write_slots = slot::slots::<Vec<u8>>(num_chunks);

    // Prime the pump: every request slot is seeded before any reader runs.
    for (i, request) in requests.into_iter().enumerate() {
        let sender = request_slots.senders[i]
            .take()
            .ok_or_else(|| PipecryptError::Pipeline("request slot seeded twice".to_string()))?;
        sender
            .send(request)
            .map_err(|_| PipecryptError::Pipeline("request slot rejected its seed".to_string()))?;
    }

    let cipher: Arc<dyn ChunkCipher> = Arc::new(AesGcmChunkCipher::new());
    let key = Arc::new(job.key);

    let (done_tx, done_rx) = mpsc::sync_channel::<Result<()>>(STAGE_COUNT);

    let read_done = done_tx.clone();
    let source = job.source.clone();
    let readers = job.readers;
    let request_receivers = request_slots.receivers;
    let read_senders = read_slots.senders;
    let read_handle = thread::Builder::new()
        .name("pipecrypt-read-stage".to_string())
        .spawn(move || {
            let _ = read_done.send(stage::read_stage(
                source,
                readers,
                request_receivers,
                read_senders,
            ));
        })?;

    let transform_done = done_tx.clone();
    let operation = job.operation;
    let transformers = job.transformers;
    let transform_receivers = read_slots.receivers;
    let transform_senders = write_slots.senders;
    let transform_handle = thread::Builder::new()
        .name("pipecrypt-transform-stage".to_string())
        .spawn(move || {
            let _ = transform_done.send(stage::transform_stage(
                operation,
                cipher,
                key,
                transformers,
                transform_receivers,
                transform_senders,
            ));
        })?;

    let write_done = done_tx.clone();
    let target = job.target.clone();
    let force = job.force;
    let write_receivers = write_slots.receivers;
    let write_handle = thread::Builder::new()
        .name("pipecrypt-write-stage".to_string())
        .spawn(move || {
            let _ = write_done.send(stage::write_stage(
                target,
                force,
                header_bytes,
                write_receivers,
            ));
        })?;
    drop(done_tx);

    // Wait for all three stages; the first error observed is the job error.
    let mut first_error = None;
    for _ in 0..STAGE_COUNT {
        match done_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
            Err(_) => {
                if first_error.is_none() {
                    first_error = Some(PipecryptError::Pipeline(
                        "a stage exited without reporting completion".to_string(),
                    ));
                }
            }
        }
    }

    for handle in [read_handle, transform_handle, write_handle] {
        let _ = handle.join();
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(operation: Operation) -> PipelineJob {
        PipelineJob {
            readers: 6,
            transformers: 12,
            writers: 1,
            source: PathBuf::from("in.bin"),
            target: PathBuf::from("out.bin"),
            force: false,
            chunk_size_mb: 8,
            operation,
            key: Zeroizing::new([0u8; KEY_LEN]),
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(job(Operation::Encrypt).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_paths() {
        let mut j = job(Operation::Encrypt);
        j.source = PathBuf::new();
        assert!(j.validate().is_err());

        let mut j = job(Operation::Decrypt);
        j.target = PathBuf::new();
        assert!(j.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_workers() {
        let mut j = job(Operation::Encrypt);
        j.readers = 0;
        assert!(j.validate().is_err());

        let mut j = job(Operation::Encrypt);
        j.readers = MAX_READERS + 1;
        assert!(j.validate().is_err());

        let mut j = job(Operation::Encrypt);
        j.transformers = MAX_TRANSFORMERS + 1;
        assert!(j.validate().is_err());

        let mut j = job(Operation::Encrypt);
        j.writers = 2;
        assert!(j.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_chunk_size() {
        let mut j = job(Operation::Encrypt);
        j.chunk_size_mb = 0;
        assert!(j.validate().is_err());

        let mut j = job(Operation::Encrypt);
        j.chunk_size_mb = MAX_CHUNK_MB + 1;
        assert!(j.validate().is_err());
    }

    #[test]
    fn test_encrypting_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut j = job(Operation::Encrypt);
        j.source = dir.path().join("missing.txt");
        j.target = dir.path().join("out.enc");
        assert!(matches!(
            run_pipeline(j),
            Err(PipecryptError::SourceMissing(_))
        ));
    }

    #[test]
    fn test_encrypting_empty_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("empty.txt");
        std::fs::write(&source, b"").unwrap();

        let mut j = job(Operation::Encrypt);
        j.source = source;
        j.target = dir.path().join("out.enc");
        assert!(matches!(
            run_pipeline(j),
            Err(PipecryptError::InvalidInput(_))
        ));
    }
}
