//! Option normalization and interactive password input.
//!
//! Out-of-range worker counts and chunk sizes are clamped into range with a
//! warning rather than rejected; everything else about a job is validated
//! strictly by the pipeline itself.

use crate::config::{MAX_CHUNK_MB, MIN_CHUNK_MB};
use crate::error::{PipecryptError, Result};
use rpassword::read_password;
use std::io::Write;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Clamps a worker count into `[1, max]`, warning when it had to.
pub fn clamp_count(label: &str, requested: usize, max: usize) -> usize {
    if requested < 1 || requested > max {
        eprintln!("{} workers must be between 1 and {}", label, max);
        requested.clamp(1, max)
    } else {
        requested
    }
}

/// Clamps a chunk size in MiB into the supported range, warning when it
/// had to.
pub fn clamp_chunk_mb(requested: u64) -> u64 {
    if requested < MIN_CHUNK_MB || requested > MAX_CHUNK_MB {
        eprintln!(
            "chunk size (MB) must be between {} and {}",
            MIN_CHUNK_MB, MAX_CHUNK_MB
        );
        requested.clamp(MIN_CHUNK_MB, MAX_CHUNK_MB)
    } else {
        requested
    }
}

/// Prompts for a password with hidden input, looping until it is non-blank.
///
/// With `confirm` set (encryption), the password is entered twice and the
/// two entries are compared in constant time.
pub fn prompt_password(confirm: bool) -> Result<Zeroizing<String>> {
    let password = loop {
        print!("Please supply a password: ");
        std::io::stdout().flush()?;
        let entered = Zeroizing::new(read_password()?);

        let trimmed = entered.trim();
        if trimmed.is_empty() {
            println!("Password cannot be empty or blank");
            continue;
        }
        break Zeroizing::new(trimmed.to_string());
    };

    if confirm {
        print!("Confirm password: ");
        std::io::stdout().flush()?;
        let again = Zeroizing::new(read_password()?);

        if !bool::from(password.as_bytes().ct_eq(again.trim().as_bytes())) {
            return Err(PipecryptError::InvalidInput(
                "passwords do not match".to_string(),
            ));
        }
    }

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAX_READERS, MAX_TRANSFORMERS, MAX_WRITERS};

    #[test]
    fn test_in_range_counts_pass_through() {
        assert_eq!(clamp_count("read", 1, MAX_READERS), 1);
        assert_eq!(clamp_count("read", 30, MAX_READERS), 30);
        assert_eq!(clamp_count("transform", 12, MAX_TRANSFORMERS), 12);
    }

    #[test]
    fn test_out_of_range_counts_clamp() {
        assert_eq!(clamp_count("read", 0, MAX_READERS), 1);
        assert_eq!(clamp_count("read", 32, MAX_READERS), 30);
        assert_eq!(clamp_count("transform", 64, MAX_TRANSFORMERS), 60);
        assert_eq!(clamp_count("write", 4, MAX_WRITERS), 1);
    }

    #[test]
    fn test_chunk_size_clamps() {
        assert_eq!(clamp_chunk_mb(0), MIN_CHUNK_MB);
        assert_eq!(clamp_chunk_mb(8), 8);
        assert_eq!(clamp_chunk_mb(65), MAX_CHUNK_MB);
    }
}
