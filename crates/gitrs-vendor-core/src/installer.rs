//! ArtifactInstaller: download, verify, prepare, extract, cleanup.
//!
//! Stages run strictly in order. The first failure stops the pipeline and
//! nothing already done is rolled back: a failed extraction leaves the archive
//! and any partially extracted files in place.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::checksum;
use crate::config::{InstallerConfig, TransferConfig};
use crate::download;
use crate::error::InstallError;
use crate::extract;
use crate::plan::{resolve_plan, InstallPlan};
use crate::retry::RetryPolicy;
use crate::vendor;

/// What a successful install did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub bytes_downloaded: u64,
    /// Lowercase hex SHA-256 of the archive.
    pub digest: String,
    pub files_extracted: usize,
    pub vendor_directory: PathBuf,
}

#[derive(Debug)]
pub struct ArtifactInstaller {
    plan: InstallPlan,
    transfer: TransferConfig,
    retry: RetryPolicy,
}

impl ArtifactInstaller {
    pub fn new(plan: InstallPlan, transfer: TransferConfig, retry: RetryPolicy) -> Self {
        Self {
            plan,
            transfer,
            retry,
        }
    }

    /// Build an installer for the OS identifier `os` using `cfg`, with `work_dir`
    /// as the working directory. Fails with `UnsupportedPlatform` when there is no
    /// prebuilt archive for `os`.
    pub fn for_platform(
        os: &str,
        cfg: &InstallerConfig,
        work_dir: &Path,
    ) -> Result<Self, InstallError> {
        let plan = resolve_plan(os, &cfg.release, work_dir)
            .ok_or_else(|| InstallError::UnsupportedPlatform { os: os.to_string() })?
            .with_vendor_dir(&cfg.vendor_dir);
        Ok(Self::new(plan, cfg.transfer.clone(), cfg.retry_policy()))
    }

    pub fn plan(&self) -> &InstallPlan {
        &self.plan
    }

    /// Run all five stages, returning the first error.
    pub fn install(&self) -> Result<InstallReport, InstallError> {
        let plan = &self.plan;
        let archive = plan.archive_path();

        tracing::info!(
            platform = %plan.platform(),
            url = plan.source_url(),
            archive = %archive.display(),
            "downloading"
        );
        let bytes_downloaded =
            download::fetch_with_retry(plan.source_url(), &archive, &self.transfer, &self.retry)?;
        tracing::debug!(bytes = bytes_downloaded, "download complete");

        let digest = checksum::verify_file(&archive, plan.expected_digest())?;
        tracing::debug!(sha256 = %digest, "checksum ok");

        vendor::prepare_dir(plan.vendor_directory())?;

        let files_extracted = extract::extract_zip(&archive, plan.vendor_directory())?;
        tracing::debug!(
            files = files_extracted,
            dest = %plan.vendor_directory().display(),
            "extracted"
        );

        vendor::remove_archive(&archive)?;

        Ok(InstallReport {
            bytes_downloaded,
            digest,
            files_extracted,
            vendor_directory: plan.vendor_directory().to_path_buf(),
        })
    }

    /// Top-level entry point: run the pipeline and report the outcome once.
    ///
    /// On failure exactly one error line naming the stage is logged; the error is
    /// returned so the caller can choose the process exit status.
    pub fn run(&self) -> Result<InstallReport, InstallError> {
        let started = Instant::now();
        match self.install() {
            Ok(report) => {
                tracing::info!(
                    files = report.files_extracted,
                    vendor = %report.vendor_directory.display(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "installed {}",
                    self.plan.archive_file_name()
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(stage = %e.stage(), "install failed: {}", error_chain(&e));
                Err(e)
            }
        }
    }
}

/// `error: cause: cause` rendering of an error and its sources.
pub fn error_chain(e: &dyn std::error::Error) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        out.push_str(": ");
        out.push_str(&s.to_string());
        source = s.source();
    }
    out
}
