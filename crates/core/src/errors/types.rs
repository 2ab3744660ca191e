//! Core error type definitions

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Result type alias for appenv operations
pub type Result<T> = std::result::Result<T, Error>;

/// The backing service an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackingService {
    ConfigStore,
    SecretStore,
}

impl BackingService {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackingService::ConfigStore => "config_store",
            BackingService::SecretStore => "secret_store",
        }
    }
}

impl fmt::Display for BackingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a stored secret reference could not be understood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MalformedReason {
    /// The stored value is not a JSON document
    InvalidJson,
    /// The JSON document has no usable `uri` field
    MissingUri,
    /// The `uri` does not address a secret
    InvalidUri,
}

impl MalformedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            MalformedReason::InvalidJson => "invalid_json",
            MalformedReason::MissingUri => "missing_uri",
            MalformedReason::InvalidUri => "invalid_uri",
        }
    }
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error type for appenv operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configuration store could not return an entry
    #[error("failed to fetch '{key}' (label '{label}') from the configuration store{}: {message}", format_status(.status))]
    StoreFetch {
        key: String,
        label: String,
        status: Option<u16>,
        message: String,
        retry_after: Option<Duration>,
    },

    /// The secret store could not resolve a reference
    #[error("failed to resolve secret '{uri}'{}: {message}", format_status(.status))]
    SecretResolution {
        uri: String,
        status: Option<u16>,
        message: String,
        retry_after: Option<Duration>,
    },

    /// A stored secret indirection could not be parsed.
    ///
    /// The raw value is kept for diagnostics but never rendered.
    #[error("malformed secret reference ({reason})")]
    MalformedReference {
        raw_value: String,
        reason: MalformedReason,
    },

    /// A backing service asked us to slow down
    #[error("{service} rate limited the request{}", format_retry_after(.retry_after))]
    RateLimited {
        service: BackingService,
        retry_after: Option<Duration>,
    },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Environment variable related errors
    #[error("environment variable '{variable}' error: {message}")]
    Environment { variable: String, message: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Network-related errors
    #[error("network error for '{endpoint}': {message}")]
    Network { endpoint: String, message: String },

    /// Operation timeout errors
    #[error("operation '{operation}' timed out after {duration:?}")]
    Timeout {
        operation: String,
        duration: Duration,
    },
}

fn format_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => String::new(),
    }
}

fn format_retry_after(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(delay) => format!(", retry after {delay:?}"),
        None => String::new(),
    }
}
