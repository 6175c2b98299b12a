//! SHA-256 verification of the downloaded archive.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::InstallError;

const BUF_SIZE: usize = 64 * 1024;

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded.
pub fn sha256_path(path: &Path) -> io::Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Verify stage: hash the whole file and compare against `expected` (case-insensitive hex).
/// Returns the computed digest on success.
pub fn verify_file(path: &Path, expected: &str) -> Result<String, InstallError> {
    let actual = sha256_path(path).map_err(|source| InstallError::ChecksumRead {
        path: path.to_path_buf(),
        source,
    })?;
    let expected = expected.trim();
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(InstallError::ChecksumMismatch {
            expected: expected.to_ascii_lowercase(),
            actual,
        });
    }
    Ok(actual)
}
