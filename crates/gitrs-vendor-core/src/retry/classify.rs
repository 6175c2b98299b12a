//! Classify HTTP status and curl errors into retry policy error kinds.

use super::policy::ErrorKind;
use crate::error::InstallError;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify an install error. Only download-stage network/HTTP failures can be retryable.
pub fn classify(e: &InstallError) -> ErrorKind {
    match e {
        InstallError::Network { source, .. } => classify_curl_error(source),
        InstallError::HttpStatus { status, .. } => classify_http_status(*status),
        _ => ErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn http_429_and_503_throttled() {
        assert_eq!(classify_http_status(429), ErrorKind::Throttled);
        assert_eq!(classify_http_status(503), ErrorKind::Throttled);
    }

    #[test]
    fn http_5xx_retryable() {
        assert!(matches!(classify_http_status(500), ErrorKind::Http5xx(500)));
        assert!(matches!(classify_http_status(502), ErrorKind::Http5xx(502)));
    }

    #[test]
    fn http_4xx_other() {
        assert_eq!(classify_http_status(404), ErrorKind::Other);
        assert_eq!(classify_http_status(403), ErrorKind::Other);
    }

    #[test]
    fn non_download_errors_are_not_retryable() {
        let e = InstallError::ChecksumMismatch {
            expected: "a".into(),
            actual: "b".into(),
        };
        assert_eq!(classify(&e), ErrorKind::Other);
        let e = InstallError::ArchiveWrite {
            path: PathBuf::from("x"),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(classify(&e), ErrorKind::Other);
    }

    #[test]
    fn http_status_error_uses_status_classification() {
        let e = InstallError::HttpStatus {
            url: "http://h/a.zip".into(),
            status: 429,
        };
        assert_eq!(classify(&e), ErrorKind::Throttled);
    }
}
