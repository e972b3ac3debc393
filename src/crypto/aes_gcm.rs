//! AES-256-GCM chunk sealing.
//!
//! Each chunk is sealed independently under a fresh random 96-bit nonce.
//! AES-GCM keeps ciphertext length equal to plaintext length (no padding),
//! which lets the container derive chunk boundaries arithmetically, and its
//! tag authenticates every chunk on the way back in.
//!
//! Random nonces are safe here: one key seals at most `NumChunks` ≤ 2³²
//! chunks per file, well inside the 2⁹⁶ collision space.

use super::ChunkCipher;
use crate::config::{NONCE_LEN, SEALED_OVERHEAD};
use crate::error::{PipecryptError, Result};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::rngs::OsRng;
use rand_core::TryRngCore;

/// AES-256-GCM implementation of [`ChunkCipher`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmChunkCipher;

impl AesGcmChunkCipher {
    /// Creates a new AES-256-GCM chunk cipher.
    pub fn new() -> Self {
        Self
    }
}

impl ChunkCipher for AesGcmChunkCipher {
    fn seal(&self, key: &[u8; 32], plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.try_fill_bytes(&mut nonce_bytes).map_err(|e| {
            PipecryptError::CryptoInternal(format!("random nonce generation failed: {}", e))
        })?;

        let cipher = Aes256Gcm::new(key.into());
        let nonce = Nonce::from(nonce_bytes);

        // No associated data: the header is self-describing and nothing
        // outside the chunk participates in its authenticity.
        let ciphertext = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| PipecryptError::CryptoInternal(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn open(&self, key: &[u8; 32], sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < SEALED_OVERHEAD {
            return Err(PipecryptError::InvalidFormat(format!(
                "sealed chunk of {} bytes is shorter than nonce and tag",
                sealed.len()
            )));
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce_array: [u8; NONCE_LEN] = nonce_bytes
            .try_into()
            .map_err(|_| PipecryptError::CryptoInternal("nonce split failed".to_string()))?;

        let cipher = Aes256Gcm::new(key.into());
        cipher
            .decrypt(&Nonce::from(nonce_array), ciphertext)
            .map_err(|_| PipecryptError::AuthFailure)
    }

    fn sealed_overhead(&self) -> usize {
        SEALED_OVERHEAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TAG_LEN;

    #[test]
    fn test_seal_open_roundtrip() {
        let cipher = AesGcmChunkCipher::new();
        let key = [7u8; 32];
        let plaintext = b"chunk payload";

        let sealed = cipher.seal(&key, plaintext).unwrap();
        assert_eq!(sealed.len(), NONCE_LEN + plaintext.len() + TAG_LEN);

        let opened = cipher.open(&key, &sealed).unwrap();
        assert_eq!(opened.as_slice(), plaintext);
    }

    #[test]
    fn test_open_wrong_key() {
        let cipher = AesGcmChunkCipher::new();
        let sealed = cipher.seal(&[1u8; 32], b"secret").unwrap();
        let result = cipher.open(&[2u8; 32], &sealed);
        assert!(matches!(result, Err(PipecryptError::AuthFailure)));
    }

    #[test]
    fn test_open_tampered_body() {
        let cipher = AesGcmChunkCipher::new();
        let key = [9u8; 32];
        let mut sealed = cipher.seal(&key, b"integrity matters").unwrap();
        sealed[NONCE_LEN] ^= 0x01;
        assert!(matches!(
            cipher.open(&key, &sealed),
            Err(PipecryptError::AuthFailure)
        ));
    }

    #[test]
    fn test_open_tampered_nonce() {
        let cipher = AesGcmChunkCipher::new();
        let key = [9u8; 32];
        let mut sealed = cipher.seal(&key, b"integrity matters").unwrap();
        sealed[0] ^= 0x01;
        assert!(matches!(
            cipher.open(&key, &sealed),
            Err(PipecryptError::AuthFailure)
        ));
    }

    #[test]
    fn test_open_too_short() {
        let cipher = AesGcmChunkCipher::new();
        let result = cipher.open(&[0u8; 32], &[0u8; SEALED_OVERHEAD - 1]);
        assert!(matches!(result, Err(PipecryptError::InvalidFormat(_))));
    }

    #[test]
    fn test_empty_plaintext_seals() {
        // A zero-byte chunk still carries nonce and tag.
        let cipher = AesGcmChunkCipher::new();
        let key = [3u8; 32];
        let sealed = cipher.seal(&key, b"").unwrap();
        assert_eq!(sealed.len(), SEALED_OVERHEAD);
        assert_eq!(cipher.open(&key, &sealed).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_nonces_differ_between_seals() {
        let cipher = AesGcmChunkCipher::new();
        let key = [5u8; 32];
        let a = cipher.seal(&key, b"same input").unwrap();
        let b = cipher.seal(&key, b"same input").unwrap();
        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
        assert_ne!(a, b);
    }
}
