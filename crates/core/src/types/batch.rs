//! The unit of work for one refresh and its aggregate result

use super::entry::ConfigEntry;
use crate::errors::Error;

/// Keys to resolve in one pass, scoped to a single label.
///
/// Duplicate keys are allowed and resolved independently. An empty label
/// means "no label".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionBatch {
    pub requested_keys: Vec<String>,
    pub label: String,
}

impl ResolutionBatch {
    #[must_use]
    pub fn new<I, S>(keys: I, label: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            requested_keys: keys.into_iter().map(Into::into).collect(),
            label: label.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.requested_keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requested_keys.is_empty()
    }
}

/// Aggregate result of one resolution pass.
///
/// `items` and `errors` are in completion order, not input order.
#[derive(Debug, Default)]
pub struct ResolutionOutcome {
    pub items: Vec<ConfigEntry>,
    pub errors: Vec<(String, Error)>,
    /// Set when the pass stopped early on cancellation
    pub cancelled: bool,
}

impl ResolutionOutcome {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, entry: ConfigEntry) {
        self.items.push(entry);
    }

    pub fn record_failure(&mut self, key: impl Into<String>, error: Error) {
        self.errors.push((key.into(), error));
    }

    #[must_use]
    pub fn succeeded_count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of keys that were attempted
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded_count() + self.failed_count()
    }

    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.errors.is_empty() && !self.cancelled
    }

    /// Keys that failed, in completion order
    pub fn failed_keys(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|(key, _)| key.as_str())
    }

    /// Look up a successful entry by key
    #[must_use]
    pub fn item(&self, key: &str) -> Option<&ConfigEntry> {
        self.items.iter().find(|entry| entry.key() == key)
    }

    /// Human readable "N succeeded, M failed" line
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} succeeded, {} failed",
            self.succeeded_count(),
            self.failed_count()
        );
        if self.cancelled {
            line.push_str(" (cancelled)");
        }
        line
    }
}
