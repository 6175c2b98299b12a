//! Installs the prebuilt git-rs bundle for the running platform into a vendor
//! directory: download, verify SHA-256, create the directory, unzip, delete the
//! archive.

pub mod config;
pub mod logging;

pub mod checksum;
pub mod download;
pub mod error;
pub mod extract;
pub mod installer;
pub mod plan;
pub mod platform;
pub mod retry;
pub mod vendor;

pub use error::{InstallError, Stage};
pub use installer::{ArtifactInstaller, InstallReport};
pub use plan::{resolve_plan, InstallPlan};
pub use platform::PlatformKey;
