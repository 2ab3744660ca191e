//! HTTP client for the secret store
//!
//! One [`VaultConnection`] is kept per vault location, so repeated lookups
//! against the same vault reuse its base URL and connection pool.

use crate::auth::TokenProvider;
use crate::http::{build_client, error_message, retry_after, transport_error};
use crate::traits::SecretStore;
use appenv_core::{
    constants::{DEFAULT_ALLOWED_VAULT_HOSTS, SECRETS_PATH_SEGMENT, SECRET_STORE_API_VERSION},
    BackingService, Error, Result, SecretReference,
};
use appenv_utils::{retry, RetryConfig};
use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Secret bundle returned by `GET /secrets/{name}[/{version}]`
#[derive(Deserialize)]
struct SecretBundle {
    #[serde(default)]
    value: Option<String>,
}

/// Cached state for one vault
#[derive(Debug)]
pub struct VaultConnection {
    base: Url,
    client: Client,
    requests: AtomicU64,
}

impl VaultConnection {
    fn open(
        vault_location: &str,
        client: Client,
        allow_http: bool,
        allowed_hosts: &[String],
    ) -> Result<Self> {
        let base = Url::parse(vault_location).map_err(|e| {
            Error::secret_resolution(vault_location, None, format!("invalid vault location: {e}"))
        })?;
        match base.scheme() {
            "https" => {}
            "http" if allow_http => {}
            scheme => {
                return Err(Error::secret_resolution(
                    vault_location,
                    None,
                    format!("refusing to send credentials over '{scheme}'"),
                ))
            }
        }
        let host = base.host_str().unwrap_or_default();
        if !host_allowed(host, allowed_hosts) {
            tracing::warn!(vault = vault_location, "vault host not in the allowed list");
            return Err(Error::secret_resolution(
                vault_location,
                None,
                "vault host not allowed",
            ));
        }
        Ok(Self {
            base,
            client,
            requests: AtomicU64::new(0),
        })
    }

    /// Requests issued through this connection
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    fn secret_url(&self, reference: &SecretReference) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::secret_resolution(reference.to_uri(), None, "vault location cannot be a base URL")
            })?;
            segments
                .pop_if_empty()
                .push(SECRETS_PATH_SEGMENT)
                .push(&reference.secret_name);
            if let Some(version) = &reference.version {
                segments.push(version);
            }
        }
        url.query_pairs_mut()
            .append_pair("api-version", SECRET_STORE_API_VERSION);
        Ok(url)
    }
}

/// `.example.net` matches any subdomain of example.net; other entries match exactly
fn host_allowed(host: &str, allowed_hosts: &[String]) -> bool {
    let host = host.to_ascii_lowercase();
    allowed_hosts.iter().any(|allowed| {
        let allowed = allowed.to_ascii_lowercase();
        if allowed.starts_with('.') {
            host.len() > allowed.len() && host.ends_with(&allowed)
        } else {
            !host.is_empty() && host == allowed
        }
    })
}

/// Resolves secret references over HTTP.
///
/// The bearer token is only sent to vaults whose host is in the allowed
/// list, since vault locations come from stored data.
pub struct KeyVaultClient {
    client: Client,
    auth: Arc<dyn TokenProvider>,
    retry: RetryConfig,
    timeout: Duration,
    allow_http: bool,
    allowed_hosts: Vec<String>,
    connections: DashMap<String, Arc<VaultConnection>>,
}

impl KeyVaultClient {
    pub fn new(auth: Arc<dyn TokenProvider>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            auth,
            retry: RetryConfig::default(),
            timeout,
            allow_http: false,
            allowed_hosts: DEFAULT_ALLOWED_VAULT_HOSTS
                .iter()
                .map(|host| host.to_string())
                .collect(),
            connections: DashMap::new(),
        })
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Permit plain-http vault locations. Only meant for local test servers.
    #[must_use]
    pub fn allow_http(mut self, allow: bool) -> Self {
        self.allow_http = allow;
        self
    }

    /// Replace the hosts the token may be sent to
    #[must_use]
    pub fn with_allowed_hosts(mut self, hosts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.allowed_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Number of vaults with a cached connection
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get or open the connection for a vault
    pub fn connection(&self, vault_location: &str) -> Result<Arc<VaultConnection>> {
        if let Some(existing) = self.connections.get(vault_location) {
            return Ok(existing.clone());
        }
        let opened = Arc::new(VaultConnection::open(
            vault_location,
            self.client.clone(),
            self.allow_http,
            &self.allowed_hosts,
        )?);
        // Another task may have raced us here; keep whichever landed first
        let connection = self
            .connections
            .entry(vault_location.to_string())
            .or_insert(opened)
            .clone();
        tracing::debug!(vault = vault_location, "opened vault connection");
        Ok(connection)
    }

    async fn resolve_once(
        &self,
        connection: &VaultConnection,
        reference: &SecretReference,
    ) -> Result<String> {
        let url = connection.secret_url(reference)?;
        let uri = reference.to_uri();
        let authorization = self.auth.authorization().await?;

        connection.requests.fetch_add(1, Ordering::Relaxed);
        let response = connection
            .client
            .get(url.clone())
            .header("Authorization", authorization)
            .send()
            .await
            .map_err(|e| transport_error(e, url.as_str(), self.timeout))?;

        let status = response.status();
        let hint = retry_after(response.headers());

        if status.is_success() {
            let bundle: SecretBundle = response.json().await.map_err(|e| {
                Error::secret_resolution(&uri, None, format!("invalid response body: {e}"))
            })?;
            return Ok(bundle.value.unwrap_or_default());
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::rate_limited(BackingService::SecretStore, hint));
        }

        let body = response.text().await.unwrap_or_default();
        Err(
            Error::secret_resolution(uri, Some(status.as_u16()), error_message(status, &body))
                .with_retry_after(hint),
        )
    }
}

#[async_trait]
impl SecretStore for KeyVaultClient {
    async fn resolve_secret(&self, reference: &SecretReference) -> Result<String> {
        let connection = self.connection(&reference.vault_location)?;
        tracing::debug!(
            vault = %reference.vault_location,
            secret = %reference.secret_name,
            "resolving secret"
        );
        retry(&self.retry, || self.resolve_once(&connection, reference)).await
    }
}
