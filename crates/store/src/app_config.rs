//! HTTP client for the configuration store

use crate::auth::TokenProvider;
use crate::http::{build_client, error_message, retry_after, transport_error};
use crate::traits::ConfigStore;
use appenv_core::{
    constants::{CONFIG_STORE_API_VERSION, NULL_LABEL},
    BackingService, Error, Result, StoreEntry,
};
use appenv_utils::{retry, RetryConfig};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Key-value document returned by `GET /kv/{key}`
#[derive(Debug, Deserialize)]
struct KeyValueResponse {
    key: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
}

impl From<KeyValueResponse> for StoreEntry {
    fn from(kv: KeyValueResponse) -> Self {
        StoreEntry {
            key: kv.key,
            value: kv.value,
            content_type: kv.content_type,
        }
    }
}

/// Fetches entries from a configuration store over HTTP
pub struct AppConfigClient {
    endpoint: Url,
    client: Client,
    auth: Arc<dyn TokenProvider>,
    retry: RetryConfig,
    timeout: Duration,
}

impl AppConfigClient {
    pub fn new(endpoint: Url, auth: Arc<dyn TokenProvider>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            endpoint,
            client: build_client(timeout)?,
            auth,
            retry: RetryConfig::default(),
            timeout,
        })
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// `{endpoint}/kv/{key}?label=...&api-version=...`
    fn entry_url(&self, key: &str, label: &str) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::configuration(format!(
                    "endpoint '{}' cannot be used as a base URL",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .push("kv")
            .push(key);
        let label = if label.is_empty() { NULL_LABEL } else { label };
        url.query_pairs_mut()
            .append_pair("label", label)
            .append_pair("api-version", CONFIG_STORE_API_VERSION);
        Ok(url)
    }

    async fn fetch_once(&self, key: &str, label: &str) -> Result<StoreEntry> {
        let url = self.entry_url(key, label)?;
        let authorization = self.auth.authorization().await?;

        let response = self
            .client
            .get(url.clone())
            .header("Authorization", authorization)
            .header("Accept", "application/vnd.microsoft.appconfig.kv+json")
            .send()
            .await
            .map_err(|e| transport_error(e, url.as_str(), self.timeout))?;

        let status = response.status();
        let hint = retry_after(response.headers());

        if status.is_success() {
            let kv: KeyValueResponse = response.json().await.map_err(|e| {
                Error::store_fetch(key, label, None, format!("invalid response body: {e}"))
            })?;
            return Ok(kv.into());
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::rate_limited(BackingService::ConfigStore, hint));
        }

        let body = response.text().await.unwrap_or_default();
        Err(
            Error::store_fetch(key, label, Some(status.as_u16()), error_message(status, &body))
                .with_retry_after(hint),
        )
    }
}

#[async_trait]
impl ConfigStore for AppConfigClient {
    async fn fetch_entry(&self, key: &str, label: &str) -> Result<StoreEntry> {
        tracing::debug!(key, label, "fetching entry");
        retry(&self.retry, || self.fetch_once(key, label)).await
    }
}
