//! Pointers from configuration entries into the secret store

use crate::constants::SECRETS_PATH_SEGMENT;
use std::fmt;

/// A parsed pointer to one secret.
///
/// `vault_location`, `secret_name` and `version` round-trip to the URI the
/// configuration store held (see [`SecretReference::to_uri`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretReference {
    /// Scheme and host of the secret store instance, no trailing slash
    pub vault_location: String,
    pub secret_name: String,
    /// Absent means "latest"
    pub version: Option<String>,
}

impl SecretReference {
    #[must_use]
    pub fn new(
        vault_location: impl Into<String>,
        secret_name: impl Into<String>,
        version: Option<String>,
    ) -> Self {
        Self {
            vault_location: vault_location.into(),
            secret_name: secret_name.into(),
            version,
        }
    }

    /// Reassemble the secret URI
    #[must_use]
    pub fn to_uri(&self) -> String {
        match &self.version {
            Some(version) => format!(
                "{}/{SECRETS_PATH_SEGMENT}/{}/{version}",
                self.vault_location, self.secret_name
            ),
            None => format!(
                "{}/{SECRETS_PATH_SEGMENT}/{}",
                self.vault_location, self.secret_name
            ),
        }
    }
}

impl fmt::Display for SecretReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}
