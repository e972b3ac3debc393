//! Container format: header framing and chunk offset arithmetic.
//!
//! An encrypted file is laid out as:
//!
//! ```text
//! [0..2)        header length indicator (HLI), little-endian u16 = N
//! [2..2+N)      header JSON (UTF-8)
//! [2+N..)       sealed chunks in chunk order
//! ```
//!
//! Every sealed chunk occupies `12 + ChunkSizeBytes + 16` bytes except the
//! last, which shrinks by however much the final plaintext chunk fell short
//! of `ChunkSizeBytes`. That fixed stride is what lets decryption re-derive
//! chunk boundaries without any per-chunk length fields.

use crate::config::{
    ALGORITHM, CIPHER_MODE, FORMAT_VERSION, KEY_SIZE_BITS, NONCE_LEN, TAG_LEN,
};
use crate::error::{PipecryptError, Result};
use crate::storage;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Bytes occupied by the header length indicator.
pub const HLI_LEN: u64 = 2;

/// Plaintext metadata describing an encrypted container.
///
/// Serialized as JSON with the on-disk field names fixed by the format;
/// unknown versions are rejected rather than best-effort parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerHeader {
    /// Format version, "1.0" for this layout.
    pub format_version: String,
    /// Number of sealed chunks following the header.
    pub num_chunks: u32,
    /// Plaintext chunk size the file was encrypted with.
    pub chunk_size_bytes: u64,
    /// Cipher name, "AES".
    pub algorithm: String,
    /// Cipher mode, "GCM".
    pub mode: String,
    /// Key size in bits, 256.
    pub key_size: u32,
}

impl ContainerHeader {
    /// Creates a header for the current format version.
    pub fn new(num_chunks: u32, chunk_size_bytes: u64) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            num_chunks,
            chunk_size_bytes,
            algorithm: ALGORITHM.to_string(),
            mode: CIPHER_MODE.to_string(),
            key_size: KEY_SIZE_BITS,
        }
    }

    /// Serializes the complete on-disk header: HLI followed by JSON.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(self)?;
        if json.len() > u16::MAX as usize {
            return Err(PipecryptError::InvalidFormat(format!(
                "header JSON of {} bytes exceeds the u16 length indicator",
                json.len()
            )));
        }

        let mut bytes = Vec::with_capacity(HLI_LEN as usize + json.len());
        bytes.extend_from_slice(&(json.len() as u16).to_le_bytes());
        bytes.extend_from_slice(&json);
        Ok(bytes)
    }

    /// Parses a header from its JSON bytes and validates it.
    pub fn from_json(json: &[u8]) -> Result<Self> {
        let header: ContainerHeader = serde_json::from_slice(json).map_err(|e| {
            PipecryptError::InvalidFormat(format!("header is not valid JSON: {}", e))
        })?;
        header.validate()?;
        Ok(header)
    }

    /// Rejects headers from unknown versions or with implausible fields.
    pub fn validate(&self) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(PipecryptError::UnsupportedVersion(
                self.format_version.clone(),
            ));
        }
        if self.algorithm != ALGORITHM
            || self.mode != CIPHER_MODE
            || self.key_size != KEY_SIZE_BITS
        {
            return Err(PipecryptError::InvalidFormat(format!(
                "unsupported cipher suite {}-{}-{}",
                self.algorithm, self.mode, self.key_size
            )));
        }
        if self.num_chunks == 0 || self.chunk_size_bytes == 0 {
            return Err(PipecryptError::InvalidFormat(
                "header declares an empty container".to_string(),
            ));
        }
        Ok(())
    }

    /// On-disk bytes per full sealed chunk: nonce + plaintext + tag.
    pub fn sealed_stride(&self) -> u64 {
        NONCE_LEN as u64 + self.chunk_size_bytes + TAG_LEN as u64
    }
}

/// Reads and parses the header of an encrypted file.
///
/// Returns the header and the end-of-header offset (`2 + HLI`), which is
/// where the first sealed chunk begins.
pub fn read_header(path: &Path) -> Result<(ContainerHeader, u64)> {
    let mut file = storage::open_readable(path)?;
    let size = file.metadata()?.len();

    // Smallest conceivable container: 2-byte HLI plus at least one byte.
    if size < 3 {
        return Err(PipecryptError::InvalidFormat(
            "file is too small to hold a header".to_string(),
        ));
    }

    let mut hli_bytes = [0u8; HLI_LEN as usize];
    file.read_exact(&mut hli_bytes)?;
    let hli = u16::from_le_bytes(hli_bytes) as u64;

    if hli == 0 || HLI_LEN + hli > size {
        return Err(PipecryptError::InvalidFormat(
            "header length indicator does not fit the file".to_string(),
        ));
    }

    let mut json = vec![0u8; hli as usize];
    file.read_exact(&mut json).map_err(|_| {
        PipecryptError::InvalidFormat("could not read header, file may not be encrypted".to_string())
    })?;

    let header = ContainerHeader::from_json(&json)?;
    Ok((header, HLI_LEN + hli))
}

/// Byte range of plaintext chunk `index` (0-based) in the source file.
pub fn chunk_range_encrypt(index: u64, chunk_size_bytes: u64, file_size: u64) -> (u64, u64) {
    let start = (index * chunk_size_bytes).min(file_size);
    let end = (start + chunk_size_bytes).min(file_size);
    (start, end)
}

/// Byte range of sealed chunk `index` (0-based) in the encrypted file.
///
/// The end is clamped to file size so the final chunk, shortened by
/// plaintext truncation, still maps to a well-formed range.
pub fn chunk_range_decrypt(
    index: u64,
    chunk_size_bytes: u64,
    end_of_header: u64,
    file_size: u64,
) -> (u64, u64) {
    let stride = NONCE_LEN as u64 + chunk_size_bytes + TAG_LEN as u64;
    let start = (end_of_header + index * stride).min(file_size);
    let end = (start + stride).min(file_size);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_header_roundtrip() {
        let header = ContainerHeader::new(42, 8 * 1024 * 1024);
        let bytes = header.to_bytes().unwrap();

        let hli = u16::from_le_bytes([bytes[0], bytes[1]]) as usize;
        assert_eq!(hli, bytes.len() - 2);

        let parsed = ContainerHeader::from_json(&bytes[2..]).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_header_field_names_on_disk() {
        let header = ContainerHeader::new(1, 1024);
        let json = serde_json::to_string(&header).unwrap();
        for field in [
            "FormatVersion",
            "NumChunks",
            "ChunkSizeBytes",
            "Algorithm",
            "Mode",
            "KeySize",
        ] {
            assert!(json.contains(field), "missing {} in {}", field, json);
        }
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut header = ContainerHeader::new(1, 1024);
        header.format_version = "2.0".to_string();
        assert!(matches!(
            header.validate(),
            Err(PipecryptError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_empty_container_rejected() {
        let header = ContainerHeader::new(0, 1024);
        assert!(header.validate().is_err());
        let header = ContainerHeader::new(1, 0);
        assert!(header.validate().is_err());
    }

    #[test]
    fn test_foreign_cipher_suite_rejected() {
        let mut header = ContainerHeader::new(1, 1024);
        header.mode = "CBC".to_string();
        assert!(matches!(
            header.validate(),
            Err(PipecryptError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_read_header_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("container.enc");

        let header = ContainerHeader::new(3, 1024 * 1024);
        let bytes = header.to_bytes().unwrap();
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&bytes).unwrap();
        file.write_all(&[0u8; 64]).unwrap();
        drop(file);

        let (parsed, end_of_header) = read_header(&path).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(end_of_header, bytes.len() as u64);
    }

    #[test]
    fn test_read_header_too_small() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.enc");
        std::fs::write(&path, [0u8, 1u8]).unwrap();
        assert!(matches!(
            read_header(&path),
            Err(PipecryptError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_read_header_hli_past_eof() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lying.enc");
        // HLI claims 512 bytes of header in a 6-byte file.
        std::fs::write(&path, [0x00, 0x02, b'{', b'}', 0, 0]).unwrap();
        assert!(matches!(
            read_header(&path),
            Err(PipecryptError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_encrypt_ranges() {
        let chunk = 1024;
        assert_eq!(chunk_range_encrypt(0, chunk, 3000), (0, 1024));
        assert_eq!(chunk_range_encrypt(1, chunk, 3000), (1024, 2048));
        assert_eq!(chunk_range_encrypt(2, chunk, 3000), (2048, 3000));
        // Exact multiple: the final chunk is full-size.
        assert_eq!(chunk_range_encrypt(1, chunk, 2048), (1024, 2048));
    }

    #[test]
    fn test_decrypt_ranges_clamped() {
        let chunk = 1024;
        let stride = 12 + chunk + 16;
        let eoh = 100;
        let file_size = eoh + 2 * stride - 40; // final chunk 40 bytes short

        assert_eq!(chunk_range_decrypt(0, chunk, eoh, file_size), (eoh, eoh + stride));
        assert_eq!(
            chunk_range_decrypt(1, chunk, eoh, file_size),
            (eoh + stride, file_size)
        );
    }

    #[test]
    fn test_sealed_stride() {
        let header = ContainerHeader::new(1, 1024);
        assert_eq!(header.sealed_stride(), 12 + 1024 + 16);
    }
}
