//! Vendor directory preparation and archive cleanup.

use std::fs;
use std::path::Path;

use crate::error::InstallError;

/// Prepare stage: create `dir` and any missing parents. Succeeds if it already exists as a directory.
pub fn prepare_dir(dir: &Path) -> Result<(), InstallError> {
    fs::create_dir_all(dir).map_err(|source| InstallError::DirectoryCreation {
        path: dir.to_path_buf(),
        source,
    })
}

/// Cleanup stage: delete the downloaded archive. Fails if it is already gone.
pub fn remove_archive(path: &Path) -> Result<(), InstallError> {
    fs::remove_file(path).map_err(|source| InstallError::Cleanup {
        path: path.to_path_buf(),
        source,
    })
}
