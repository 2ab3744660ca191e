//! Settings loader
//!
//! Reads the settings file, overlays `APPENV_*` environment variables and
//! validates the result.

use crate::settings::Settings;
use appenv_core::{
    constants::{
        APPENV_ACCESS_TOKEN_VAR, APPENV_ALLOWED_VAULT_HOSTS_VAR, APPENV_CONFIG_VAR,
        APPENV_ENDPOINT_VAR, APPENV_KEYS_VAR, APPENV_LABEL_VAR, APPENV_MAX_CONCURRENCY_VAR,
        APPENV_VAULT_ACCESS_TOKEN_VAR, DEFAULT_SETTINGS_FILENAME,
    },
    Error, IoResultExt, Result,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where environment overrides come from
enum EnvSource {
    Process,
    Fixed(HashMap<String, String>),
}

impl EnvSource {
    fn get(&self, name: &str) -> Option<String> {
        let value = match self {
            EnvSource::Process => std::env::var(name).ok(),
            EnvSource::Fixed(vars) => vars.get(name).cloned(),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// Loads [`Settings`] from disk and the environment
pub struct SettingsLoader {
    /// Explicit settings file; a missing explicit file is an error
    path: Option<PathBuf>,
    /// Directory searched for the default file name
    directory: Option<PathBuf>,
    env: EnvSource,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self {
            path: None,
            directory: None,
            env: EnvSource::Process,
        }
    }

    /// Load from this file instead of the default location
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Look for the default file in this directory (defaults to the current one)
    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directory = Some(dir.into());
        self
    }

    /// Read overrides from a fixed map rather than the process environment
    pub fn env_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.env = EnvSource::Fixed(vars);
        self
    }

    /// The file this loader reads, and whether it must exist
    pub fn resolve_path(&self) -> (PathBuf, bool) {
        if let Some(path) = &self.path {
            return (path.clone(), true);
        }
        if let Some(path) = self.env.get(APPENV_CONFIG_VAR) {
            return (PathBuf::from(path), true);
        }
        let dir = self
            .directory
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        (dir.join(DEFAULT_SETTINGS_FILENAME), false)
    }

    pub fn load(self) -> Result<Settings> {
        let (path, required) = self.resolve_path();
        let mut settings = read_settings_file(&path, required)?;
        self.apply_env(&mut settings)?;
        settings.validate()?;

        tracing::debug!(
            path = %path.display(),
            keys = settings.keys.len(),
            label = %settings.label,
            "settings loaded"
        );
        Ok(settings)
    }

    fn apply_env(&self, settings: &mut Settings) -> Result<()> {
        if let Some(endpoint) = self.env.get(APPENV_ENDPOINT_VAR) {
            settings.endpoint = Some(endpoint);
        }
        if let Some(label) = self.env.get(APPENV_LABEL_VAR) {
            settings.label = label;
        }
        if let Some(keys) = self.env.get(APPENV_KEYS_VAR) {
            settings.keys = split_keys(&keys);
        }
        if let Some(raw) = self.env.get(APPENV_MAX_CONCURRENCY_VAR) {
            settings.max_concurrency = raw.trim().parse().map_err(|_| {
                Error::configuration(format!(
                    "{APPENV_MAX_CONCURRENCY_VAR} must be a positive integer, got '{raw}'"
                ))
            })?;
        }
        if let Some(hosts) = self.env.get(APPENV_ALLOWED_VAULT_HOSTS_VAR) {
            settings.allowed_vault_hosts = split_keys(&hosts);
        }
        if let Some(token) = self.env.get(APPENV_ACCESS_TOKEN_VAR) {
            settings.access_token = Some(token);
        }
        if let Some(token) = self.env.get(APPENV_VAULT_ACCESS_TOKEN_VAR) {
            settings.vault_access_token = Some(token);
        }
        Ok(())
    }
}

/// Split a comma-separated list, dropping blanks
pub fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(String::from)
        .collect()
}

fn read_settings_file(path: &Path, required: bool) -> Result<Settings> {
    match std::fs::read_to_string(path) {
        Ok(text) => Settings::from_json(&text).map_err(|e| {
            Error::configuration(format!("{}: {e}", path.display()))
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Settings::default())
        }
        Err(e) => Err(e).fs_context(path, "read settings"),
    }
}
