//! Configuration constants for pipecrypt.
//!
//! Cipher geometry, container format identifiers, key-derivation parameters,
//! and the worker/chunk limits enforced by the pipeline.

/// AES-GCM standard nonce size (96 bits / 12 bytes).
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag size (128 bits / 16 bytes).
pub const TAG_LEN: usize = 16;

/// Bytes a sealed chunk adds on top of its plaintext (nonce + tag).
pub const SEALED_OVERHEAD: usize = NONCE_LEN + TAG_LEN;

/// Key material length in bytes (256-bit keys only).
pub const KEY_LEN: usize = 32;

/// Key size recorded in the container header, in bits.
pub const KEY_SIZE_BITS: u32 = 256;

/// Container format version this build writes and accepts.
pub const FORMAT_VERSION: &str = "1.0";

/// Cipher name recorded in the container header.
pub const ALGORITHM: &str = "AES";

/// Cipher mode recorded in the container header.
pub const CIPHER_MODE: &str = "GCM";

/// PBKDF2-HMAC-SHA256 iteration count for password-derived keys.
pub const PBKDF2_ITERATIONS: u32 = 350_000;

/// Minimum chunk size in MiB.
pub const MIN_CHUNK_MB: u64 = 1;

/// Maximum chunk size in MiB.
pub const MAX_CHUNK_MB: u64 = 64;

/// Default chunk size in MiB.
pub const DEFAULT_CHUNK_MB: u64 = 8;

/// Maximum number of read workers.
pub const MAX_READERS: usize = 30;

/// Maximum number of transform workers.
pub const MAX_TRANSFORMERS: usize = 60;

/// Maximum number of write workers. Held at 1 to preserve append order;
/// a multi-writer variant needs positional writes offset by the header.
pub const MAX_WRITERS: usize = 1;

/// Default number of read workers.
pub const DEFAULT_READERS: usize = 6;

/// Default number of transform workers.
pub const DEFAULT_TRANSFORMERS: usize = 12;

/// Converts a chunk size in MiB to bytes.
pub fn bytes_from_mb(mb: u64) -> u64 {
    mb * 1024 * 1024
}
