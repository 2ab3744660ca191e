//! Configuration entries before and after resolution

use crate::transform::{derive_env_name, is_secret_reference};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// An entry as returned by a configuration store.
///
/// This is the validated boundary type: once a store client has produced a
/// `StoreEntry`, the engine can rely on its shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEntry {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl StoreEntry {
    /// Create an entry with a plain value
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            content_type: None,
        }
    }

    /// Set the content type hint
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Stored value, with an absent value read as empty
    #[must_use]
    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    /// Whether the content type marks this entry as a secret indirection
    #[must_use]
    pub fn is_secret_reference(&self) -> bool {
        is_secret_reference(self.content_type.as_deref())
    }
}

/// The result of resolving one key.
///
/// Immutable after construction. The resolved value is wiped from memory on
/// drop and never rendered by `Debug` when it came from the secret store.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ConfigEntry {
    key: String,
    env_name: String,
    raw_value: String,
    content_type: Option<String>,
    resolved_value: String,
    is_secret_reference: bool,
}

impl ConfigEntry {
    /// Build an entry from what the store returned and the final value
    #[must_use]
    pub fn new(entry: &StoreEntry, resolved_value: impl Into<String>) -> Self {
        Self {
            key: entry.key.clone(),
            env_name: derive_env_name(&entry.key),
            raw_value: entry.value_or_empty().to_string(),
            content_type: entry.content_type.clone(),
            resolved_value: resolved_value.into(),
            is_secret_reference: entry.is_secret_reference(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Environment variable name derived from the key
    #[must_use]
    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    #[must_use]
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    #[must_use]
    pub fn resolved_value(&self) -> &str {
        &self.resolved_value
    }

    #[must_use]
    pub fn is_secret_reference(&self) -> bool {
        self.is_secret_reference
    }
}

impl fmt::Debug for ConfigEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolved: &dyn fmt::Debug = if self.is_secret_reference {
            &"<redacted>"
        } else {
            &self.resolved_value
        };
        f.debug_struct("ConfigEntry")
            .field("key", &self.key)
            .field("env_name", &self.env_name)
            .field("content_type", &self.content_type)
            .field("resolved_value", resolved)
            .field("is_secret_reference", &self.is_secret_reference)
            .finish()
    }
}
