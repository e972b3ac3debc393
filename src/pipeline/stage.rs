//! Stage orchestration: each stage spawns its worker pool, partitions the
//! chunk index space by `chunk_index % workers`, and reports a single
//! stage-level result to the conductor.
//!
//! Partitioning hands each chunk to exactly one worker per stage without
//! any shared queue or lock; the slot arrays carry everything else.

use crate::config::KEY_LEN;
use crate::crypto::ChunkCipher;
use crate::error::{PipecryptError, Result};
use crate::plan::ChunkReadRequest;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use zeroize::Zeroizing;

use super::worker::{self, ReadAssignment, TransformAssignment};
use super::Operation;

/// Claims endpoint `index` from a slot-endpoint array, failing if it was
/// already claimed. Each endpoint belongs to exactly one worker.
fn claim<T>(cells: &mut [Option<T>], index: usize, what: &str) -> Result<T> {
    cells[index]
        .take()
        .ok_or_else(|| PipecryptError::Pipeline(format!("{} slot {} claimed twice", what, index)))
}

/// Joins a worker pool and keeps the first error observed.
fn join_pool(handles: Vec<JoinHandle<Result<()>>>, stage: &str) -> Result<()> {
    let mut first_error = None;

    for handle in handles {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
            Err(_) => {
                if first_error.is_none() {
                    first_error =
                        Some(PipecryptError::Pipeline(format!("{} worker panicked", stage)));
                }
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Runs the read stage: `workers` readers, each with its own descriptor,
/// covering the chunk index space by modulo partition.
pub(crate) fn read_stage(
    source: PathBuf,
    workers: usize,
    mut request_rxs: Vec<Option<Receiver<ChunkReadRequest>>>,
    mut out_txs: Vec<Option<SyncSender<Vec<u8>>>>,
) -> Result<()> {
    let num_chunks = request_rxs.len();
    let mut handles = Vec::with_capacity(workers);

    for w in 0..workers {
        let mut assignments: Vec<ReadAssignment> = Vec::new();
        for i in (w..num_chunks).step_by(workers) {
            assignments.push((
                claim(&mut request_rxs, i, "request")?,
                claim(&mut out_txs, i, "read output")?,
            ));
        }

        let source = source.clone();
        let handle = thread::Builder::new()
            .name(format!("pipecrypt-reader-{}", w))
            .spawn(move || worker::read_worker(&source, assignments))?;
        handles.push(handle);
    }

    join_pool(handles, "read")
}

/// Runs the transform stage: `workers` transformers sharing the immutable
/// key and cipher, partitioned like the readers.
pub(crate) fn transform_stage(
    operation: Operation,
    cipher: Arc<dyn ChunkCipher>,
    key: Arc<Zeroizing<[u8; KEY_LEN]>>,
    workers: usize,
    mut in_rxs: Vec<Option<Receiver<Vec<u8>>>>,
    mut out_txs: Vec<Option<SyncSender<Vec<u8>>>>,
) -> Result<()> {
    let num_chunks = in_rxs.len();
    let mut handles = Vec::with_capacity(workers);

    for w in 0..workers {
        let mut assignments: Vec<TransformAssignment> = Vec::new();
        for i in (w..num_chunks).step_by(workers) {
            assignments.push((
                claim(&mut in_rxs, i, "transform input")?,
                claim(&mut out_txs, i, "transform output")?,
            ));
        }

        let cipher = Arc::clone(&cipher);
        let key = Arc::clone(&key);
        let handle = thread::Builder::new()
            .name(format!("pipecrypt-transformer-{}", w))
            .spawn(move || worker::transform_worker(operation, cipher, key, assignments))?;
        handles.push(handle);
    }

    join_pool(handles, "transform")
}

/// Runs the write stage. The pool size is pinned to a single writer so the
/// target file is appended in strict chunk order; the worker receives every
/// chunk's consumer endpoint, ascending.
pub(crate) fn write_stage(
    target: PathBuf,
    force: bool,
    header_bytes: Option<Vec<u8>>,
    mut in_rxs: Vec<Option<Receiver<Vec<u8>>>>,
) -> Result<()> {
    let mut receivers = Vec::with_capacity(in_rxs.len());
    for i in 0..in_rxs.len() {
        receivers.push(claim(&mut in_rxs, i, "write input")?);
    }

    let handle = thread::Builder::new()
        .name("pipecrypt-writer-0".to_string())
        .spawn(move || worker::write_worker(&target, force, header_bytes, receivers))?;

    join_pool(vec![handle], "write")
}
