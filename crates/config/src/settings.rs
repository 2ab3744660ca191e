//! Settings for one appenv workspace
//!
//! Settings are immutable once loaded and cheap to clone. Access tokens are
//! read from the environment only and are never serialized.

use appenv_core::{
    constants::{DEFAULT_ALLOWED_VAULT_HOSTS, DEFAULT_MAX_CONCURRENCY},
    Error, ResolutionBatch, Result, ResultExt,
};
use appenv_utils::{write_atomic_string, RetryConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Retry policy as written in the settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let defaults = RetryConfig::default();
        Self {
            max_attempts: defaults.max_attempts,
            base_delay_ms: defaults.base_delay.as_millis() as u64,
            max_delay_ms: defaults.max_delay.as_millis() as u64,
        }
    }
}

/// Which keys to resolve, from where, and how
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the configuration store
    pub endpoint: Option<String>,
    /// Label variant to fetch; empty means "no label"
    pub label: String,
    /// Keys to resolve, in order
    pub keys: Vec<String>,
    /// Upper bound on keys resolved at once
    pub max_concurrency: usize,
    /// Wait before the first automatic refresh in watch mode
    pub startup_delay_ms: u64,
    /// Per-request timeout for both stores
    pub request_timeout_ms: u64,
    pub retry: RetrySettings,
    /// Hosts the secret store token may be sent to; `.suffix` matches subdomains
    pub allowed_vault_hosts: Vec<String>,
    /// Accept plain-http vault locations. Only for local test servers.
    pub allow_http_vaults: bool,

    /// Bearer token for the configuration store
    #[serde(skip)]
    pub access_token: Option<String>,
    /// Bearer token for the secret store; falls back to `access_token`
    #[serde(skip)]
    pub vault_access_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: None,
            label: String::new(),
            keys: Vec::new(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            startup_delay_ms: 0,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            retry: RetrySettings::default(),
            allowed_vault_hosts: DEFAULT_ALLOWED_VAULT_HOSTS
                .iter()
                .map(|host| host.to_string())
                .collect(),
            allow_http_vaults: false,
            access_token: None,
            vault_access_token: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |token: &Option<String>| token.as_ref().map(|_| "<redacted>");
        f.debug_struct("Settings")
            .field("endpoint", &self.endpoint)
            .field("label", &self.label)
            .field("keys", &self.keys)
            .field("max_concurrency", &self.max_concurrency)
            .field("startup_delay_ms", &self.startup_delay_ms)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("retry", &self.retry)
            .field("allowed_vault_hosts", &self.allowed_vault_hosts)
            .field("allow_http_vaults", &self.allow_http_vaults)
            .field("access_token", &redact(&self.access_token))
            .field("vault_access_token", &redact(&self.vault_access_token))
            .finish()
    }
}

impl Settings {
    /// Parse settings from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("failed to parse settings")
    }

    /// Check values that would otherwise fail late
    pub fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.endpoint {
            parse_endpoint(endpoint)?;
        }
        if self.max_concurrency == 0 {
            return Err(Error::configuration("max_concurrency must be at least 1"));
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::configuration("request_timeout_ms must be positive"));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::configuration("retry.max_attempts must be at least 1"));
        }
        if let Some(bad) = self
            .allowed_vault_hosts
            .iter()
            .find(|host| host.trim_start_matches('.').is_empty() || host.contains(['/', ':']))
        {
            return Err(Error::configuration(format!(
                "allowed_vault_hosts entry '{bad}' must be a host name or a '.suffix'"
            )));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(Error::configuration(
                "retry.base_delay_ms must not exceed retry.max_delay_ms",
            ));
        }
        Ok(())
    }

    /// The configuration store endpoint, required to talk to the store
    pub fn endpoint_url(&self) -> Result<Url> {
        match &self.endpoint {
            Some(endpoint) => parse_endpoint(endpoint),
            None => Err(Error::configuration(
                "no configuration store endpoint set; add \"endpoint\" to the settings file \
                 or set APPENV_ENDPOINT",
            )),
        }
    }

    /// Token for the secret store
    pub fn effective_vault_token(&self) -> Option<&str> {
        self.vault_access_token
            .as_deref()
            .or(self.access_token.as_deref())
    }

    /// The resolution batch these settings describe
    pub fn batch(&self) -> ResolutionBatch {
        ResolutionBatch::new(self.keys.iter().cloned(), self.label.clone())
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.retry.max_attempts,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
            ..RetryConfig::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    /// Persist the non-secret settings
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        write_atomic_string(path, &text)?;
        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint)
        .map_err(|e| Error::configuration(format!("invalid endpoint '{endpoint}': {e}")))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(Error::configuration(format!(
            "invalid endpoint '{endpoint}': expected an absolute http(s) URL"
        ))),
    }
}
