//! Retry logic and recovery suggestions for store calls

use super::config::RetryConfig;
use appenv_core::{Error, Result};
use std::future::Future;
use tokio::time::sleep;

/// Execute an operation, retrying retryable failures with backoff.
///
/// A failure carrying a `retry_after` hint waits for that long instead of the
/// computed backoff. Non-retryable failures return immediately.
pub async fn retry<F, Fut, T>(config: &RetryConfig, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::debug!(retries = attempt, "operation succeeded after retries");
                }
                return Ok(result);
            }
            Err(error) => {
                attempt += 1;
                if attempt >= max_attempts || !error.is_retryable() {
                    return Err(error);
                }

                let delay = config.delay_for(attempt - 1, error.retry_after());
                tracing::warn!(
                    attempt,
                    max_attempts,
                    kind = %error.kind(),
                    status = ?error.status(),
                    delay_ms = delay.as_millis() as u64,
                    "operation failed, retrying"
                );
                sleep(delay).await;
            }
        }
    }
}

/// Suggest a recovery action for an error
pub fn suggest_recovery(error: &Error) -> String {
    match error {
        Error::StoreFetch {
            status: Some(404), ..
        } => "Key not found: check the key name and label in your settings.".to_string(),
        Error::StoreFetch {
            status: Some(401 | 403),
            ..
        }
        | Error::SecretResolution {
            status: Some(401 | 403),
            ..
        } => "Access denied: make sure the access token is valid and grants read access."
            .to_string(),
        Error::SecretResolution {
            status: Some(404), ..
        } => "Secret not found: the reference points at a secret or version that does not exist."
            .to_string(),
        Error::StoreFetch { .. } | Error::SecretResolution { .. } => {
            "The store returned an error. Try again later.".to_string()
        }
        Error::MalformedReference { reason, .. } => format!(
            "The stored secret reference is malformed ({reason}). Expected a JSON document \
             like {{\"uri\": \"https://<vault>/secrets/<name>\"}}."
        ),
        Error::RateLimited { service, .. } => {
            format!("The {service} is throttling requests. Reduce concurrency or try again later.")
        }
        Error::Network { .. } => "Network error: check your connection and the endpoint URL."
            .to_string(),
        Error::Timeout { .. } => {
            "Request timed out: try again or raise request_timeout_ms.".to_string()
        }
        Error::Configuration { message } => {
            format!("Configuration error: {message}. Check your appenv.json settings.")
        }
        Error::Environment { .. } | Error::FileSystem { .. } | Error::Json { .. } => {
            "An error occurred. Please check the logs for more details.".to_string()
        }
    }
}
