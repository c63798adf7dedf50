//! Integrity checks on a downloaded asset before it is installed.
//!
//! Size is checked first (cheap metadata read), then SHA-256 when the
//! catalog provides one. A spec with neither passes trivially.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{ErrorKind, InstallFailure};
use crate::request::FetchSpec;

const BUF_SIZE: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error("read asset: {0}")]
    Io(#[from] io::Error),
}

impl From<VerifyError> for InstallFailure {
    fn from(err: VerifyError) -> Self {
        let kind = match err {
            VerifyError::SizeMismatch { .. } => ErrorKind::SizeMismatch,
            VerifyError::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
            VerifyError::Io(_) => ErrorKind::Io,
        };
        InstallFailure::new(kind, err.to_string())
    }
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded; suitable for large models.
pub fn sha256_path(path: &Path) -> io::Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Check `path` against the size and checksum in `spec`.
pub fn verify(path: &Path, spec: &FetchSpec) -> Result<(), VerifyError> {
    if let Some(expected) = spec.expected_size_bytes {
        let actual = std::fs::metadata(path)?.len();
        if actual != expected {
            return Err(VerifyError::SizeMismatch { expected, actual });
        }
    }
    if let Some(expected) = spec.checksum.as_deref() {
        let actual = sha256_path(path)?;
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(VerifyError::ChecksumMismatch {
                expected: expected.trim().to_ascii_lowercase(),
                actual,
            });
        }
    }
    Ok(())
}
