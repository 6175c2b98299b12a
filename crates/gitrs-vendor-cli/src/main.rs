use std::process::ExitCode;

use gitrs_vendor_core::logging;

mod cli;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if cli.log_file {
        if let Err(err) = logging::init_logging() {
            logging::init_logging_stderr();
            tracing::warn!("log file unavailable ({:#}), logging to stderr", err);
        }
    } else {
        logging::init_logging_stderr();
    }

    match cli.run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("gitrs-vendor error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
