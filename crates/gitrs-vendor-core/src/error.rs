//! Error taxonomy for the install pipeline.
//!
//! Every variant belongs to exactly one [`Stage`] so the top level can report
//! which step failed without inspecting messages.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Pipeline step an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Platform detection and plan resolution (before any I/O).
    Resolve,
    Download,
    Verify,
    Prepare,
    Extract,
    Cleanup,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Resolve => "resolve",
            Stage::Download => "download",
            Stage::Verify => "verify",
            Stage::Prepare => "prepare",
            Stage::Extract => "extract",
            Stage::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one install stage. The first one raised aborts the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("unsupported platform '{os}': no prebuilt archive for this OS")]
    UnsupportedPlatform { os: String },

    #[error("failed to fetch {url}")]
    Network {
        url: String,
        #[source]
        source: curl::Error,
    },

    #[error("GET {url} returned HTTP {status}, expected 200")]
    HttpStatus { url: String, status: u32 },

    #[error("failed to write archive {}", path.display())]
    ArchiveWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {} for checksum", path.display())]
    ChecksumRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("checksum validation failed: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("could not create vendor directory {}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not unzip archive {}", archive.display())]
    Extraction {
        archive: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("archive entry '{name}' would be written outside the vendor directory")]
    UnsafeArchiveEntry { name: String },

    #[error("could not delete archive {}", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InstallError {
    pub fn stage(&self) -> Stage {
        match self {
            InstallError::UnsupportedPlatform { .. } => Stage::Resolve,
            InstallError::Network { .. }
            | InstallError::HttpStatus { .. }
            | InstallError::ArchiveWrite { .. } => Stage::Download,
            InstallError::ChecksumRead { .. } | InstallError::ChecksumMismatch { .. } => {
                Stage::Verify
            }
            InstallError::DirectoryCreation { .. } => Stage::Prepare,
            InstallError::Extraction { .. } | InstallError::UnsafeArchiveEntry { .. } => {
                Stage::Extract
            }
            InstallError::Cleanup { .. } => Stage::Cleanup,
        }
    }
}
