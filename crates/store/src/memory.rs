//! In-memory stores for tests and offline runs
//!
//! Both stores can be told to fail specific lookups and to sleep before
//! answering, and they track how many calls were in flight at once.

use crate::traits::{ConfigStore, SecretStore};
use appenv_core::{BackingService, Error, Result, SecretReference, StoreEntry};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A failure an in-memory store can be primed with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    Forbidden,
    RateLimited,
    Unavailable,
}

impl FailureKind {
    fn status(self) -> u16 {
        match self {
            FailureKind::NotFound => 404,
            FailureKind::Forbidden => 403,
            FailureKind::RateLimited => 429,
            FailureKind::Unavailable => 503,
        }
    }
}

/// Counts calls and the highest number running at the same time
#[derive(Debug, Default)]
struct CallTracker {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl CallTracker {
    fn enter(&self) -> InFlight<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlight(self)
    }
}

struct InFlight<'a>(&'a CallTracker);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Configuration store backed by a map of `(key, label)` to entry
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    entries: RwLock<HashMap<(String, String), StoreEntry>>,
    failures: RwLock<HashMap<String, FailureKind>>,
    latency: RwLock<Duration>,
    tracker: CallTracker,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a plain entry under `label`
    pub fn insert(&self, key: impl Into<String>, label: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let entry = StoreEntry::new(key.clone(), value);
        self.insert_entry(label, entry);
    }

    /// Store a prepared entry under `label`
    pub fn insert_entry(&self, label: impl Into<String>, entry: StoreEntry) {
        self.entries
            .write()
            .insert((entry.key.clone(), label.into()), entry);
    }

    /// Make every lookup of `key` fail, whatever the label
    pub fn fail_key(&self, key: impl Into<String>, failure: FailureKind) {
        self.failures.write().insert(key.into(), failure);
    }

    /// Delay every lookup by `latency`
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.write() = latency;
    }

    /// Total `fetch_entry` calls so far
    pub fn call_count(&self) -> usize {
        self.tracker.calls.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent `fetch_entry` calls observed
    pub fn peak_in_flight(&self) -> usize {
        self.tracker.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn fetch_entry(&self, key: &str, label: &str) -> Result<StoreEntry> {
        let _in_flight = self.tracker.enter();

        let latency = *self.latency.read();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let failure = self.failures.read().get(key).copied();
        match failure {
            Some(FailureKind::RateLimited) => {
                return Err(Error::rate_limited(BackingService::ConfigStore, None))
            }
            Some(kind) => {
                return Err(Error::store_fetch(
                    key,
                    label,
                    Some(kind.status()),
                    format!("injected {kind:?}"),
                ))
            }
            None => {}
        }

        self.entries
            .read()
            .get(&(key.to_string(), label.to_string()))
            .cloned()
            .ok_or_else(|| Error::store_fetch(key, label, Some(404), "key not found"))
    }
}

/// Secret store backed by a map of secret URI to value
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
    failures: RwLock<HashMap<String, FailureKind>>,
    latency: RwLock<Duration>,
    tracker: CallTracker,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a secret under its full URI, e.g.
    /// `https://v.vault.azure.net/secrets/Name` or `.../Name/{version}`
    pub fn insert(&self, uri: impl Into<String>, value: impl Into<String>) {
        self.secrets.write().insert(uri.into(), value.into());
    }

    /// Make resolution of `uri` fail
    pub fn fail_uri(&self, uri: impl Into<String>, failure: FailureKind) {
        self.failures.write().insert(uri.into(), failure);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.write() = latency;
    }

    pub fn call_count(&self) -> usize {
        self.tracker.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.tracker.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn resolve_secret(&self, reference: &SecretReference) -> Result<String> {
        let _in_flight = self.tracker.enter();

        let latency = *self.latency.read();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let uri = reference.to_uri();
        let failure = self.failures.read().get(&uri).copied();
        match failure {
            Some(FailureKind::RateLimited) => {
                return Err(Error::rate_limited(BackingService::SecretStore, None))
            }
            Some(kind) => {
                return Err(Error::secret_resolution(
                    uri,
                    Some(kind.status()),
                    format!("injected {kind:?}"),
                ))
            }
            None => {}
        }

        let found = self.secrets.read().get(&uri).cloned();
        found.ok_or_else(|| Error::secret_resolution(uri, Some(404), "secret not found"))
    }
}
