//! Batch resolution of configuration keys into environment variables

use crate::sink::EnvironmentSink;
use appenv_core::{
    constants::DEFAULT_MAX_CONCURRENCY, parse_secret_reference, ConfigEntry, ResolutionBatch,
    ResolutionOutcome, Result, StoreEntry,
};
use appenv_store::{ConfigStore, SecretStore};
use appenv_utils::{GuardOutcome, SingleFlight};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Resolves batches of keys and writes the results to a sink.
///
/// Share one instance by `Arc` between everything that triggers refreshes;
/// the single-flight guard only serializes passes on the same instance.
pub struct ResolutionEngine {
    config_store: Arc<dyn ConfigStore>,
    secret_store: Arc<dyn SecretStore>,
    sink: Arc<dyn EnvironmentSink>,
    max_concurrency: usize,
    guard: SingleFlight,
}

impl ResolutionEngine {
    pub fn new(
        config_store: Arc<dyn ConfigStore>,
        secret_store: Arc<dyn SecretStore>,
        sink: Arc<dyn EnvironmentSink>,
    ) -> Self {
        Self {
            config_store,
            secret_store,
            sink,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            guard: SingleFlight::new(),
        }
    }

    /// Upper bound on keys resolved at once. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Whether a guarded refresh is currently running
    pub fn is_refreshing(&self) -> bool {
        self.guard.is_in_flight()
    }

    /// Run one resolution pass.
    ///
    /// The sink is cleared first, even for an empty batch. Each key is then
    /// resolved on its own; a failure is recorded against that key and never
    /// stops the others. `cancel` is checked before each key starts, and keys
    /// already running are allowed to finish.
    pub async fn resolve(
        &self,
        batch: &ResolutionBatch,
        cancel: &CancellationToken,
    ) -> ResolutionOutcome {
        let span = tracing::info_span!(
            "refresh",
            keys = batch.len(),
            label = %batch.label,
            max_concurrency = self.max_concurrency
        );

        async move {
            self.sink.clear();

            let label = batch.label.as_str();
            let mut outcome = ResolutionOutcome::new();
            let mut results = stream::iter(batch.requested_keys.iter().cloned())
                .take_while(|_| futures::future::ready(!cancel.is_cancelled()))
                .map(|key| async move {
                    let result = self.resolve_one(&key, label).await;
                    (key, result)
                })
                .buffer_unordered(self.max_concurrency);

            while let Some((key, result)) = results.next().await {
                match result {
                    Ok(entry) => {
                        tracing::debug!(
                            key = %key,
                            env_name = entry.env_name(),
                            secret = entry.is_secret_reference(),
                            "resolved key"
                        );
                        outcome.record_success(entry);
                    }
                    Err(error) => {
                        tracing::warn!(
                            key = %key,
                            kind = %error.kind(),
                            status = ?error.status(),
                            error = %error,
                            "failed to resolve key"
                        );
                        outcome.record_failure(key.as_str(), error);
                    }
                }
            }

            // Every started key reports back, so a short count means the
            // token stopped the pass before the batch was exhausted
            outcome.cancelled = outcome.total() < batch.len();

            if outcome.cancelled {
                tracing::info!(summary = %outcome.summary(), "resolution pass cancelled");
            } else {
                tracing::info!(summary = %outcome.summary(), "resolution pass finished");
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Run [`resolve`](Self::resolve) unless a pass is already in flight on
    /// this engine, in which case nothing happens and `Skipped` is returned.
    pub async fn refresh(
        &self,
        batch: &ResolutionBatch,
        cancel: &CancellationToken,
    ) -> GuardOutcome<ResolutionOutcome> {
        self.guard.run_guarded(|| self.resolve(batch, cancel)).await
    }

    async fn resolve_one(&self, key: &str, label: &str) -> Result<ConfigEntry> {
        let stored = self.config_store.fetch_entry(key, label).await?;
        // The name is derived from the key that was asked for
        let stored = StoreEntry {
            key: key.to_string(),
            ..stored
        };

        let resolved = if stored.is_secret_reference() {
            let reference = parse_secret_reference(stored.value_or_empty())?;
            self.secret_store.resolve_secret(&reference).await?
        } else {
            stored.value_or_empty().to_string()
        };

        let entry = ConfigEntry::new(&stored, resolved);
        self.sink.replace(entry.env_name(), entry.resolved_value())?;
        Ok(entry)
    }
}
