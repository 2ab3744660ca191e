//! Machine-readable classification of errors
//!
//! Every error exposes a stable kind code, an optional backoff hint and a
//! retryability verdict. Store clients use these to drive their retry
//! policy; the engine only records them.

use super::types::Error;
use std::fmt;
use std::time::Duration;

/// Stable, machine-readable error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    StoreFetch,
    SecretResolution,
    MalformedReference,
    RateLimited,
    Configuration,
    Environment,
    FileSystem,
    Json,
    Network,
    Timeout,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::StoreFetch => "store_fetch",
            ErrorKind::SecretResolution => "secret_resolution",
            ErrorKind::MalformedReference => "malformed_reference",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Environment => "environment",
            ErrorKind::FileSystem => "file_system",
            ErrorKind::Json => "json",
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an HTTP status from a backing service is worth retrying
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 408 | 429) || (500..600).contains(&status)
}

impl Error {
    /// Stable kind code for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::StoreFetch { .. } => ErrorKind::StoreFetch,
            Error::SecretResolution { .. } => ErrorKind::SecretResolution,
            Error::MalformedReference { .. } => ErrorKind::MalformedReference,
            Error::RateLimited { .. } => ErrorKind::RateLimited,
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::Environment { .. } => ErrorKind::Environment,
            Error::FileSystem { .. } => ErrorKind::FileSystem,
            Error::Json { .. } => ErrorKind::Json,
            Error::Network { .. } => ErrorKind::Network,
            Error::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    /// HTTP status reported by a backing service, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::StoreFetch { status, .. } | Error::SecretResolution { status, .. } => *status,
            Error::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Server-provided backoff hint
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::StoreFetch { retry_after, .. }
            | Error::SecretResolution { retry_after, .. }
            | Error::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Transient server errors, rate limits, timeouts and transport failures
    /// are retryable. Not-found, authorization and malformed input are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::StoreFetch { status, .. } | Error::SecretResolution { status, .. } => {
                status.is_some_and(is_transient_status)
            }
            Error::RateLimited { .. } | Error::Network { .. } | Error::Timeout { .. } => true,
            Error::FileSystem { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::TimedOut
            ),
            Error::MalformedReference { .. }
            | Error::Configuration { .. }
            | Error::Environment { .. }
            | Error::Json { .. } => false,
        }
    }
}
