//! Collaborator contracts consumed by the resolution engine

use appenv_core::{Result, SecretReference, StoreEntry};
use async_trait::async_trait;
use std::sync::Arc;

/// Fetches labeled entries from a configuration store.
///
/// Implementations own their retry and timeout policy and fail with typed
/// errors (`StoreFetch`, `RateLimited`, `Network`, `Timeout`).
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetch one entry. An empty `label` means "no label".
    async fn fetch_entry(&self, key: &str, label: &str) -> Result<StoreEntry>;
}

/// Resolves secret references to their values.
///
/// Implementations own their retry and timeout policy and fail with typed
/// errors (`SecretResolution`, `RateLimited`, `Network`, `Timeout`).
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn resolve_secret(&self, reference: &SecretReference) -> Result<String>;
}

#[async_trait]
impl<T: ConfigStore + ?Sized> ConfigStore for Arc<T> {
    async fn fetch_entry(&self, key: &str, label: &str) -> Result<StoreEntry> {
        (**self).fetch_entry(key, label).await
    }
}

#[async_trait]
impl<T: SecretStore + ?Sized> SecretStore for Arc<T> {
    async fn resolve_secret(&self, reference: &SecretReference) -> Result<String> {
        (**self).resolve_secret(reference).await
    }
}
