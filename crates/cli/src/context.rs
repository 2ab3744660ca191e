//! Settings and collaborators shared by the store-backed commands

use appenv_config::{Settings, SettingsLoader};
use appenv_core::{Error, ResolutionBatch, ResolutionOutcome};
use appenv_env::{EnvironmentSink, ResolutionEngine};
use appenv_store::{AppConfigClient, KeyVaultClient, StaticTokenProvider};
use appenv_utils::suggest_recovery;
use eyre::WrapErr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

pub struct Context {
    pub settings: Settings,
}

impl Context {
    pub fn load(config: Option<PathBuf>) -> eyre::Result<Self> {
        let mut loader = SettingsLoader::new();
        if let Some(path) = config {
            loader = loader.path(path);
        }
        let settings = loader.load().wrap_err("failed to load settings")?;
        Ok(Self { settings })
    }

    /// Batch from settings, with command-line overrides applied
    pub fn batch(&self, label: Option<String>, keys: Vec<String>) -> ResolutionBatch {
        let mut batch = self.settings.batch();
        if let Some(label) = label {
            batch.label = label;
        }
        if !keys.is_empty() {
            batch.requested_keys = keys;
        }
        batch
    }

    /// Build an engine over the HTTP store clients writing into `sink`
    pub fn engine(&self, sink: Arc<dyn EnvironmentSink>) -> eyre::Result<Arc<ResolutionEngine>> {
        let settings = &self.settings;
        let endpoint = settings.endpoint_url()?;
        let token = settings.access_token.as_deref().ok_or_else(|| {
            Error::configuration(format!(
                "no access token; set {}",
                appenv_core::APPENV_ACCESS_TOKEN_VAR
            ))
        })?;
        let vault_token = settings.effective_vault_token().unwrap_or(token);

        let config_store = AppConfigClient::new(
            endpoint,
            Arc::new(StaticTokenProvider::new(token)),
            settings.request_timeout(),
        )?
        .with_retry(settings.retry_config());

        let secret_store = KeyVaultClient::new(
            Arc::new(StaticTokenProvider::new(vault_token)),
            settings.request_timeout(),
        )?
        .with_retry(settings.retry_config())
        .with_allowed_hosts(settings.allowed_vault_hosts.iter().cloned())
        .allow_http(settings.allow_http_vaults);

        tracing::debug!(
            endpoint = %config_store.endpoint(),
            max_concurrency = settings.max_concurrency,
            "engine ready"
        );

        Ok(Arc::new(
            ResolutionEngine::new(Arc::new(config_store), Arc::new(secret_store), sink)
                .with_max_concurrency(settings.max_concurrency),
        ))
    }
}

/// Print the summary and each failure with a hint to stderr
pub fn report(outcome: &ResolutionOutcome) {
    eprintln!("{}", outcome.summary());
    for (key, error) in &outcome.errors {
        eprintln!("  {key}: {error}");
        eprintln!("    hint: {}", suggest_recovery(error));
    }
}

pub fn exit_code(outcome: &ResolutionOutcome) -> ExitCode {
    if outcome.is_complete_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
