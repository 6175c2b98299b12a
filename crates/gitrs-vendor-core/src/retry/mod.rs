//! Retry and backoff policy for the download stage.
//!
//! Only transport-level failures and throttling/5xx responses are retryable;
//! checksum, filesystem and extraction failures never are.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
