//! CLI command handlers, one per file.

mod checksum;
mod install;
mod plan;

pub use checksum::run_checksum;
pub use install::run_install;
pub use plan::run_plan;
