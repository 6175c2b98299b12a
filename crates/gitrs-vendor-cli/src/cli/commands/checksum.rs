//! `gitrs-vendor checksum` – compute SHA-256 of a file.

use anyhow::{Context, Result};
use gitrs_vendor_core::checksum;
use std::path::Path;

/// Compute and print SHA-256 of the given file in `sha256sum` format.
pub fn run_checksum(path: &Path) -> Result<()> {
    let digest =
        checksum::sha256_path(path).with_context(|| format!("hash {}", path.display()))?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
