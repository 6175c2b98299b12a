//! CLI for the git-rs vendor installer.

mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gitrs_vendor_core::config::{self, InstallerConfig};
use gitrs_vendor_core::PlatformKey;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use commands::{run_checksum, run_install, run_plan};

/// Top-level CLI for the git-rs vendor installer.
#[derive(Debug, Parser)]
#[command(name = "gitrs-vendor")]
#[command(about = "Download, verify and unpack the prebuilt git-rs bundle into ./vendor", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/gitrs-vendor/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Append logs to ~/.local/state/gitrs-vendor/gitrs-vendor.log instead of stderr.
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Which platform to install for and where.
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// Working directory that receives the archive and the vendor dir (default: current dir).
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// OS name (linux, windows, macos, win32, darwin) or key (linux-x64). Default: this machine.
    #[arg(long, value_name = "PLATFORM")]
    pub platform: Option<String>,

    /// Vendor directory relative to the working directory (overrides config).
    #[arg(long, value_name = "NAME")]
    pub vendor_dir: Option<String>,
}

impl TargetArgs {
    pub fn work_dir(&self) -> Result<PathBuf> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("current directory"),
        }
    }

    /// `--platform` if given, else this machine's key. An unsupported machine
    /// yields `<os>-<arch>`, which no release row matches.
    pub fn platform(&self) -> String {
        if let Some(platform) = &self.platform {
            return platform.clone();
        }
        match PlatformKey::detect() {
            Some(key) => key.as_str().to_string(),
            None => format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }

    /// Config with command-line overrides applied.
    pub fn apply(&self, cfg: &InstallerConfig) -> InstallerConfig {
        let mut cfg = cfg.clone();
        if let Some(vendor_dir) = &self.vendor_dir {
            cfg.vendor_dir = vendor_dir.clone();
        }
        cfg
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download, verify and extract the bundle, then delete the archive.
    Install {
        #[command(flatten)]
        target: TargetArgs,

        /// Exit 0 even if a stage fails (the failure is still reported).
        #[arg(long)]
        allow_failure: bool,
    },

    /// Show the resolved URL, digest and paths without downloading anything.
    Plan {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Compute SHA-256 of a file (e.g. a manually downloaded archive).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    pub fn run(self) -> Result<ExitCode> {
        let cfg = config::load(self.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Install {
                target,
                allow_failure,
            } => run_install(&cfg, &target, allow_failure, self.log_file),
            CliCommand::Plan { target } => {
                run_plan(&cfg, &target)?;
                Ok(ExitCode::SUCCESS)
            }
            CliCommand::Checksum { path } => {
                run_checksum(Path::new(&path))?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

#[cfg(test)]
mod tests;
