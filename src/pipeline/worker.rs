//! The workers that staff each pipeline stage.
//!
//! Workers receive the endpoints of the slots for their partition of the
//! chunk index space (ascending order) and nothing else; all coordination
//! happens through the slots. Each worker yields after finishing a chunk so
//! no stage races far ahead of its downstream.

use crate::config::KEY_LEN;
use crate::crypto::ChunkCipher;
use crate::error::{PipecryptError, Result};
use crate::plan::ChunkReadRequest;
use crate::storage;
use std::io::{BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::mpsc::{Receiver, SyncSender};
use std::sync::Arc;
use std::thread;
use zeroize::Zeroizing;

use super::Operation;

/// Slot endpoints a read worker holds for one chunk.
pub(crate) type ReadAssignment = (Receiver<ChunkReadRequest>, SyncSender<Vec<u8>>);

/// Slot endpoints a transform worker holds for one chunk.
pub(crate) type TransformAssignment = (Receiver<Vec<u8>>, SyncSender<Vec<u8>>);

fn handoff_abandoned() -> PipecryptError {
    PipecryptError::Pipeline("chunk handoff abandoned by a failed stage".to_string())
}

/// Reads this worker's share of chunks from the source file.
///
/// The worker owns its file descriptor and seek position, so readers never
/// contend on a shared cursor. Buffers are freshly allocated per chunk and
/// ownership moves downstream with the send.
pub(crate) fn read_worker(source: &Path, assignments: Vec<ReadAssignment>) -> Result<()> {
    let mut file = storage::open_readable(source)?;

    for (request_rx, out_tx) in assignments {
        let request = request_rx.recv().map_err(|_| handoff_abandoned())?;

        let position = file.seek(SeekFrom::Start(request.range_start))?;
        if position != request.range_start {
            return Err(PipecryptError::SeekMismatch {
                expected: request.range_start,
                actual: position,
            });
        }

        let wanted = request.range_end.saturating_sub(request.range_start);
        let mut chunk = vec![0u8; wanted as usize];
        file.read_exact(&mut chunk).map_err(|err| match err.kind() {
            ErrorKind::UnexpectedEof => PipecryptError::ShortRead {
                chunk_id: request.chunk_id,
                wanted,
            },
            _ => PipecryptError::Io(err),
        })?;

        out_tx.send(chunk).map_err(|_| handoff_abandoned())?;
        thread::yield_now();
    }

    Ok(())
}

/// Seals or opens this worker's share of chunks.
pub(crate) fn transform_worker(
    operation: Operation,
    cipher: Arc<dyn ChunkCipher>,
    key: Arc<Zeroizing<[u8; KEY_LEN]>>,
    assignments: Vec<TransformAssignment>,
) -> Result<()> {
    for (in_rx, out_tx) in assignments {
        let chunk = in_rx.recv().map_err(|_| handoff_abandoned())?;

        let transformed = match operation {
            Operation::Encrypt => cipher.seal(&key, &chunk)?,
            Operation::Decrypt => cipher.open(&key, &chunk)?,
        };

        out_tx.send(transformed).map_err(|_| handoff_abandoned())?;
        thread::yield_now();
    }

    Ok(())
}

/// Writes every chunk, in strict chunk order, to the target file.
///
/// The single writer is what makes output byte order deterministic: it
/// drains slot 0, then slot 1, and so on, no matter how the upstream
/// stages interleaved. On encryption the container header goes out first.
pub(crate) fn write_worker(
    target: &Path,
    force: bool,
    header_bytes: Option<Vec<u8>>,
    receivers: Vec<Receiver<Vec<u8>>>,
) -> Result<()> {
    if target.exists() && !force {
        return Err(PipecryptError::TargetExists);
    }

    let file = storage::create_writable(target)?;
    let mut writer = BufWriter::new(file);

    if let Some(header) = header_bytes {
        writer.write_all(&header)?;
    }

    for receiver in receivers {
        let chunk = receiver.recv().map_err(|_| handoff_abandoned())?;
        writer.write_all(&chunk)?;
        writer.flush()?;
    }

    writer.flush()?;
    Ok(())
}
