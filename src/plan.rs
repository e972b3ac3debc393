//! Chunk planning: the ordered list of read requests for a job.
//!
//! For encryption the plan is derived from the source size; for decryption
//! it comes from the parsed container header. Either way the output is the
//! same shape, so the read stage never cares which direction it serves.

use crate::error::{PipecryptError, Result};
use crate::format::{self, ContainerHeader};

/// One chunk's worth of read work: which chunk, and which byte range of the
/// source file holds it. Chunk ids are 1-based; ranges are half-open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReadRequest {
    pub chunk_id: u32,
    pub range_start: u64,
    pub range_end: u64,
}

/// Number of chunks needed to cover `file_size` bytes.
///
/// Rejects empty sources (nothing meaningful to seal) and sizes that would
/// need more chunks than the header's u32 can record.
pub fn num_chunks_for(file_size: u64, chunk_size_bytes: u64) -> Result<u32> {
    if file_size == 0 {
        return Err(PipecryptError::InvalidInput(
            "refusing to encrypt an empty file".to_string(),
        ));
    }

    let chunks = file_size.div_ceil(chunk_size_bytes);
    u32::try_from(chunks).map_err(|_| {
        PipecryptError::InvalidInput(format!(
            "{} chunks of {} bytes exceed the container's chunk count limit",
            chunks, chunk_size_bytes
        ))
    })
}

/// Builds the encryption plan: plaintext ranges of the source file.
pub fn encrypt_plan(file_size: u64, chunk_size_bytes: u64) -> Result<Vec<ChunkReadRequest>> {
    let num_chunks = num_chunks_for(file_size, chunk_size_bytes)?;

    let requests = (0..num_chunks)
        .map(|i| {
            let (range_start, range_end) =
                format::chunk_range_encrypt(u64::from(i), chunk_size_bytes, file_size);
            ChunkReadRequest {
                chunk_id: i + 1,
                range_start,
                range_end,
            }
        })
        .collect();

    Ok(requests)
}

/// Builds the decryption plan: sealed-chunk ranges of the encrypted file,
/// offset past the header and clamped to file size for the final chunk.
pub fn decrypt_plan(
    header: &ContainerHeader,
    end_of_header: u64,
    file_size: u64,
) -> Vec<ChunkReadRequest> {
    (0..header.num_chunks)
        .map(|i| {
            let (range_start, range_end) = format::chunk_range_decrypt(
                u64::from(i),
                header.chunk_size_bytes,
                end_of_header,
                file_size,
            );
            ChunkReadRequest {
                chunk_id: i + 1,
                range_start,
                range_end,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_rejected() {
        assert!(matches!(
            encrypt_plan(0, 1024),
            Err(PipecryptError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_single_partial_chunk() {
        let plan = encrypt_plan(100, 1024).unwrap();
        assert_eq!(
            plan,
            vec![ChunkReadRequest {
                chunk_id: 1,
                range_start: 0,
                range_end: 100,
            }]
        );
    }

    #[test]
    fn test_exact_multiple_has_no_phantom_chunk() {
        let plan = encrypt_plan(2048, 1024).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[1].range_start, 1024);
        assert_eq!(plan[1].range_end, 2048);
    }

    #[test]
    fn test_trailing_partial_chunk() {
        let plan = encrypt_plan(2049, 1024).unwrap();
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[2].range_start, 2048);
        assert_eq!(plan[2].range_end, 2049);
    }

    #[test]
    fn test_chunk_ids_are_one_based_and_ordered() {
        let plan = encrypt_plan(5000, 1024).unwrap();
        let ids: Vec<u32> = plan.iter().map(|r| r.chunk_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_decrypt_plan_follows_header() {
        let header = ContainerHeader::new(2, 1024);
        let stride = header.sealed_stride();
        let end_of_header = 70;
        // Final plaintext chunk was 24 bytes: sealed = 12 + 24 + 16.
        let file_size = end_of_header + stride + 52;

        let plan = decrypt_plan(&header, end_of_header, file_size);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].range_start, end_of_header);
        assert_eq!(plan[0].range_end, end_of_header + stride);
        assert_eq!(plan[1].range_start, end_of_header + stride);
        assert_eq!(plan[1].range_end, file_size);
    }

    #[test]
    fn test_decrypt_plan_truncated_file_yields_empty_ranges() {
        // A header that promises more chunks than the file holds produces
        // zero-length tail ranges; those fail later as malformed chunks
        // instead of panicking here.
        let header = ContainerHeader::new(3, 1024);
        let plan = decrypt_plan(&header, 70, 80);
        assert_eq!(plan[1].range_start, plan[1].range_end);
        assert_eq!(plan[2].range_start, plan[2].range_end);
    }
}
