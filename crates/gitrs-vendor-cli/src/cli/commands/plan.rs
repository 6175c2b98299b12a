//! `gitrs-vendor plan` – print what `install` would do.

use anyhow::{anyhow, Result};
use gitrs_vendor_core::config::InstallerConfig;
use gitrs_vendor_core::resolve_plan;

use crate::cli::TargetArgs;

pub fn run_plan(cfg: &InstallerConfig, target: &TargetArgs) -> Result<()> {
    let cfg = target.apply(cfg);
    let work_dir = target.work_dir()?;
    let platform = target.platform();
    let plan = resolve_plan(&platform, &cfg.release, &work_dir)
        .ok_or_else(|| anyhow!("no prebuilt git-rs archive for platform '{}'", platform))?
        .with_vendor_dir(&cfg.vendor_dir);
    println!("{}", plan);
    Ok(())
}
