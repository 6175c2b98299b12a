//! Install plan: everything the pipeline needs, resolved once from the platform.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::ReleaseConfig;
use crate::platform::PlatformKey;

/// Default vendor directory name under the working directory.
pub const DEFAULT_VENDOR_DIR: &str = "vendor";

/// Resolved install parameters. Built only by [`InstallPlan::for_platform`] or
/// [`resolve_plan`], so platform, URL, digest and archive name always come
/// from the same table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    platform: PlatformKey,
    source_url: String,
    expected_digest: String,
    archive_file_name: String,
    work_dir: PathBuf,
    vendor_directory: PathBuf,
}

impl InstallPlan {
    /// Plan for `platform` with the archive in `work_dir` and the default vendor dir.
    pub fn for_platform(platform: PlatformKey, release: &ReleaseConfig, work_dir: &Path) -> Self {
        InstallPlan {
            platform,
            source_url: release.source_url(platform),
            expected_digest: release.digest_for(platform),
            archive_file_name: platform.archive_identifier().to_string(),
            work_dir: work_dir.to_path_buf(),
            vendor_directory: work_dir.join(DEFAULT_VENDOR_DIR),
        }
    }

    /// Replace the vendor directory. Relative paths are resolved against the working directory.
    pub fn with_vendor_dir(mut self, vendor_dir: impl AsRef<Path>) -> Self {
        self.vendor_directory = self.work_dir.join(vendor_dir);
        self
    }

    pub fn platform(&self) -> PlatformKey {
        self.platform
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Lowercase hex SHA-256 the downloaded archive must match.
    pub fn expected_digest(&self) -> &str {
        &self.expected_digest
    }

    pub fn archive_file_name(&self) -> &str {
        &self.archive_file_name
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Temporary archive location: `<work_dir>/<archive_file_name>`.
    pub fn archive_path(&self) -> PathBuf {
        self.work_dir.join(&self.archive_file_name)
    }

    pub fn vendor_directory(&self) -> &Path {
        &self.vendor_directory
    }
}

impl fmt::Display for InstallPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "platform:  {}", self.platform)?;
        writeln!(f, "source:    {}", self.source_url)?;
        writeln!(f, "sha256:    {}", self.expected_digest)?;
        writeln!(f, "archive:   {}", self.archive_path().display())?;
        write!(f, "vendor:    {}", self.vendor_directory.display())
    }
}

/// Resolve the plan for an OS identifier (`linux`, `win32`, `macos`, ...) or a
/// platform key (`linux-x64`). Returns `None` when no prebuilt archive exists for it.
pub fn resolve_plan(
    platform_identifier: &str,
    release: &ReleaseConfig,
    work_dir: &Path,
) -> Option<InstallPlan> {
    let platform = platform_identifier.parse::<PlatformKey>().ok()?;
    Some(InstallPlan::for_platform(platform, release, work_dir))
}
