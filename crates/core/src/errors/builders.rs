//! Builder methods for creating errors with context

use super::types::{BackingService, Error, MalformedReason};
use std::path::PathBuf;
use std::time::Duration;

impl Error {
    /// Create a configuration-store fetch error
    #[must_use]
    pub fn store_fetch(
        key: impl Into<String>,
        label: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Error::StoreFetch {
            key: key.into(),
            label: label.into(),
            status,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Create a secret resolution error
    #[must_use]
    pub fn secret_resolution(
        uri: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Error::SecretResolution {
            uri: uri.into(),
            status,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Create a malformed reference error
    #[must_use]
    pub fn malformed_reference(raw_value: impl Into<String>, reason: MalformedReason) -> Self {
        Error::MalformedReference {
            raw_value: raw_value.into(),
            reason,
        }
    }

    /// Create a rate limited error
    #[must_use]
    pub fn rate_limited(service: BackingService, retry_after: Option<Duration>) -> Self {
        Error::RateLimited {
            service,
            retry_after,
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create an environment variable error
    #[must_use]
    pub fn environment(variable: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Environment {
            variable: variable.into(),
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a network error
    #[must_use]
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Attach a server-provided backoff hint to a fetch or resolution error.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn with_retry_after(mut self, delay: Option<Duration>) -> Self {
        match &mut self {
            Error::StoreFetch { retry_after, .. }
            | Error::SecretResolution { retry_after, .. }
            | Error::RateLimited { retry_after, .. } => *retry_after = delay,
            _ => {}
        }
        self
    }
}
