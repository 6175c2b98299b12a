//! Download stage: single-stream HTTP GET of the release archive to a local file.
//!
//! The response status is checked from the header callback, so the body of a
//! non-200 response (an HTML error page, say) is never written to the archive.

use std::cell::Cell;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::str;
use std::time::Duration;

use crate::config::TransferConfig;
use crate::error::InstallError;
use crate::retry::{run_with_retry, RetryPolicy};

const USER_AGENT: &str = concat!("gitrs-vendor/", env!("CARGO_PKG_VERSION"));

/// Downloads `url` into `dest` (created or truncated), returning the number of body bytes written.
///
/// Follows redirects. Fails with `HttpStatus` unless the final response is 200,
/// `Network` on transport errors (including timeouts) and `ArchiveWrite` when
/// the local file cannot be written.
pub fn fetch_to_file(url: &str, dest: &Path, transfer: &TransferConfig) -> Result<u64, InstallError> {
    let net = |source: curl::Error| InstallError::Network {
        url: url.to_string(),
        source,
    };
    let write_failed = |source: io::Error| InstallError::ArchiveWrite {
        path: dest.to_path_buf(),
        source,
    };

    let mut file = File::create(dest).map_err(write_failed)?;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(net)?;
    easy.useragent(USER_AGENT).map_err(net)?;
    easy.follow_location(true).map_err(net)?;
    easy.max_redirections(transfer.max_redirections).map_err(net)?;
    easy.connect_timeout(Duration::from_secs(transfer.connect_timeout_secs))
        .map_err(net)?;
    if transfer.timeout_secs > 0 {
        easy.timeout(Duration::from_secs(transfer.timeout_secs))
            .map_err(net)?;
    }
    if transfer.low_speed_limit_bytes > 0 {
        easy.low_speed_limit(transfer.low_speed_limit_bytes)
            .map_err(net)?;
        easy.low_speed_time(Duration::from_secs(transfer.low_speed_time_secs))
            .map_err(net)?;
    }

    // Status of the most recent response; redirects produce several.
    let status: Cell<Option<u32>> = Cell::new(None);
    let mut written = 0u64;
    let mut write_error: Option<io::Error> = None;

    let performed = {
        let mut handle = easy.transfer();
        handle
            .header_function(|line| {
                if let Some(code) = parse_status_line(line) {
                    status.set(Some(code));
                }
                true
            })
            .map_err(net)?;
        handle
            .write_function(|data| {
                if status.get() != Some(200) {
                    // abort before trusting any body bytes
                    return Ok(0);
                }
                if let Err(e) = file.write_all(data) {
                    write_error = Some(e);
                    return Ok(0);
                }
                written += data.len() as u64;
                Ok(data.len())
            })
            .map_err(net)?;
        handle.perform()
    };

    if let Err(e) = performed {
        if let Some(source) = write_error {
            return Err(write_failed(source));
        }
        if let Some(code) = status.get().filter(|c| *c != 200) {
            return Err(InstallError::HttpStatus {
                url: url.to_string(),
                status: code,
            });
        }
        return Err(net(e));
    }

    let code = easy.response_code().map_err(net)?;
    if code != 200 {
        return Err(InstallError::HttpStatus {
            url: url.to_string(),
            status: code,
        });
    }

    file.sync_all().map_err(write_failed)?;
    Ok(written)
}

/// Download with the given retry policy. Each attempt starts the file over.
pub fn fetch_with_retry(
    url: &str,
    dest: &Path,
    transfer: &TransferConfig,
    policy: &RetryPolicy,
) -> Result<u64, InstallError> {
    run_with_retry(policy, || fetch_to_file(url, dest, transfer))
}

/// Status code from an HTTP status line (`HTTP/1.1 200 OK`, `HTTP/2 404`), if `line` is one.
fn parse_status_line(line: &[u8]) -> Option<u32> {
    let line = str::from_utf8(line).ok()?;
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}
