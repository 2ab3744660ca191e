//! Shared HTTP plumbing for the store clients

use appenv_core::{Error, Result};
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::time::Duration;

/// Longest error body kept in an error message
const MAX_ERROR_BODY: usize = 256;

/// Build a pooled client with a per-request timeout
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("appenv/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))
}

/// Map a transport failure to a typed error
pub(crate) fn transport_error(err: reqwest::Error, endpoint: &str, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::timeout(format!("GET {endpoint}"), timeout)
    } else {
        Error::network(endpoint, err.to_string())
    }
}

/// Read the server's backoff hint.
///
/// Millisecond headers win over the standard `Retry-After` seconds value.
/// HTTP-date values are ignored.
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
    };

    read("retry-after-ms")
        .or_else(|| read("x-ms-retry-after-ms"))
        .map(Duration::from_millis)
        .or_else(|| read("retry-after").map(Duration::from_secs))
}

/// Trim an error body for inclusion in a message
pub(crate) fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let body = body.trim();
    let reason = status.canonical_reason().unwrap_or("unexpected status");
    if body.is_empty() {
        return reason.to_string();
    }
    let mut end = body.len().min(MAX_ERROR_BODY);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{reason}: {}", &body[..end])
}
