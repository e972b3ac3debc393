//! Key provisioning: hex-encoded keys and password-derived keys.
//!
//! The pipeline consumes exactly 32 bytes of key material. It arrives
//! either as a 64-character hex string or as the PBKDF2-HMAC-SHA256
//! derivation of a password. Derived and decoded keys live in zeroizing
//! memory for their whole lifetime.

use crate::config::{KEY_LEN, PBKDF2_ITERATIONS};
use crate::error::{PipecryptError, Result};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

/// Derives 32 bytes of key material from a password.
///
/// PBKDF2-HMAC-SHA256 with 350,000 iterations, matching the format the
/// container was introduced with. The derivation is saltless in format
/// version 1.0; a per-file salt needs a header field and a version bump.
pub fn key_from_password(password: &str) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), b"", PBKDF2_ITERATIONS, key.as_mut());
    key
}

/// Decodes a hex-encoded key, requiring exactly 32 raw bytes.
pub fn key_from_hex(hex_key: &str) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let mut raw = hex::decode(hex_key.trim())
        .map_err(|_| PipecryptError::InvalidInput("key material is not valid hex".to_string()))?;

    if raw.len() != KEY_LEN {
        let len = raw.len();
        raw.zeroize();
        return Err(PipecryptError::InvalidInput(format!(
            "only 256 bit (32 byte) keys are supported, key material is {} bytes",
            len
        )));
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&raw);
    raw.zeroize();
    Ok(key)
}
