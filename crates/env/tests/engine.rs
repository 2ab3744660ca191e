//! End-to-end behaviour of the resolution engine over in-memory stores

use appenv_core::{
    Error, ErrorKind, ResolutionBatch, Result, StoreEntry, SECRET_REFERENCE_CONTENT_TYPE,
};
use appenv_env::{EnvironmentSink, MemorySink, ResolutionEngine};
use appenv_store::{FailureKind, MemoryConfigStore, MemorySecretStore};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

struct Harness {
    config: Arc<MemoryConfigStore>,
    secrets: Arc<MemorySecretStore>,
    sink: Arc<MemorySink>,
    engine: Arc<ResolutionEngine>,
}

fn harness(max_concurrency: usize) -> Harness {
    let config = Arc::new(MemoryConfigStore::new());
    let secrets = Arc::new(MemorySecretStore::new());
    let sink = Arc::new(MemorySink::new());
    let engine = Arc::new(
        ResolutionEngine::new(config.clone(), secrets.clone(), sink.clone())
            .with_max_concurrency(max_concurrency),
    );
    Harness {
        config,
        secrets,
        sink,
        engine,
    }
}

fn secret_entry(key: &str, uri: &str) -> StoreEntry {
    StoreEntry::new(key, format!(r#"{{"uri":"{uri}"}}"#))
        .with_content_type(SECRET_REFERENCE_CONTENT_TYPE)
}

#[tokio::test]
async fn empty_batch_clears_sink_once() {
    let h = harness(8);
    let outcome = h
        .engine
        .resolve(&ResolutionBatch::default(), &CancellationToken::new())
        .await;

    assert_eq!(outcome.succeeded_count(), 0);
    assert_eq!(outcome.failed_count(), 0);
    assert!(!outcome.cancelled);
    assert_eq!(h.sink.clear_count(), 1);
    assert!(h.sink.is_empty());
    assert_eq!(h.config.call_count(), 0);
}

#[tokio::test]
async fn plain_values_are_written_under_derived_names() {
    let h = harness(8);
    h.config.insert("MyService/Database/Host", "", "db.internal");
    h.config.insert("MyService/Empty", "", "");

    let batch = ResolutionBatch::new(["MyService/Database/Host", "MyService/Empty"], "");
    let outcome = h.engine.resolve(&batch, &CancellationToken::new()).await;

    assert!(outcome.is_complete_success());
    assert_eq!(
        h.sink.get("MYSERVICE_DATABASE_HOST").as_deref(),
        Some("db.internal")
    );
    assert_eq!(h.sink.get("MYSERVICE_EMPTY").as_deref(), Some(""));
    assert_eq!(outcome.summary(), "2 succeeded, 0 failed");
}

#[tokio::test]
async fn absent_value_is_written_as_empty() {
    let h = harness(8);
    h.config.insert_entry(
        "",
        StoreEntry {
            key: "App/Blank".to_string(),
            value: None,
            content_type: None,
        },
    );

    let outcome = h
        .engine
        .resolve(
            &ResolutionBatch::new(["App/Blank"], ""),
            &CancellationToken::new(),
        )
        .await;
    assert!(outcome.is_complete_success());
    assert_eq!(h.sink.get("APP_BLANK").as_deref(), Some(""));
}

#[tokio::test]
async fn secret_reference_is_followed() {
    let h = harness(8);
    h.config.insert_entry(
        "",
        secret_entry("App/Secret", "https://v.vault.azure.net/secrets/MySecret"),
    );
    h.secrets
        .insert("https://v.vault.azure.net/secrets/MySecret", "top-secret");

    let outcome = h
        .engine
        .resolve(
            &ResolutionBatch::new(["App/Secret"], ""),
            &CancellationToken::new(),
        )
        .await;

    assert!(outcome.is_complete_success());
    assert_eq!(h.sink.get("APP_SECRET").as_deref(), Some("top-secret"));
    let entry = outcome.item("App/Secret").unwrap();
    assert!(entry.is_secret_reference());
    assert_eq!(entry.resolved_value(), "top-secret");
    assert!(!format!("{outcome:?}").contains("top-secret"));
}

#[tokio::test]
async fn label_scopes_the_lookup() {
    let h = harness(8);
    h.config.insert("App/Mode", "prod", "live");
    h.config.insert("App/Mode", "", "dev");

    let outcome = h
        .engine
        .resolve(
            &ResolutionBatch::new(["App/Mode"], "prod"),
            &CancellationToken::new(),
        )
        .await;
    assert!(outcome.is_complete_success());
    assert_eq!(h.sink.get("APP_MODE").as_deref(), Some("live"));
}

#[tokio::test]
async fn one_failure_does_not_affect_the_rest() {
    let h = harness(8);
    for key in ["a", "b", "c", "d"] {
        h.config.insert(key, "", format!("value-{key}"));
    }
    h.config.fail_key("c", FailureKind::Forbidden);

    let batch = ResolutionBatch::new(["a", "b", "c", "d"], "");
    let outcome = h.engine.resolve(&batch, &CancellationToken::new()).await;

    assert_eq!(outcome.succeeded_count(), 3);
    assert_eq!(outcome.failed_count(), 1);
    assert_eq!(outcome.failed_keys().collect::<Vec<_>>(), vec!["c"]);
    assert_eq!(h.sink.len(), 3);
    assert!(h.sink.get("C").is_none());
    assert!(matches!(
        outcome.errors[0].1,
        Error::StoreFetch {
            status: Some(403),
            ..
        }
    ));
}

/// Refuses writes to one variable name and forwards everything else
struct RejectingSink {
    rejected: &'static str,
    inner: MemorySink,
}

impl EnvironmentSink for RejectingSink {
    fn clear(&self) {
        self.inner.clear();
    }

    fn replace(&self, name: &str, value: &str) -> Result<()> {
        if name == self.rejected {
            return Err(Error::environment(name, "write refused"));
        }
        self.inner.replace(name, value)
    }
}

#[tokio::test]
async fn sink_failure_is_recorded_against_its_key() {
    let config = Arc::new(MemoryConfigStore::new());
    for key in ["App/One", "App/Two", "App/Three"] {
        config.insert(key, "", "v");
    }
    let sink = Arc::new(RejectingSink {
        rejected: "APP_TWO",
        inner: MemorySink::new(),
    });
    let engine = ResolutionEngine::new(config, Arc::new(MemorySecretStore::new()), sink.clone());

    let batch = ResolutionBatch::new(["App/One", "App/Two", "App/Three"], "");
    let outcome = engine.resolve(&batch, &CancellationToken::new()).await;

    assert_eq!(outcome.failed_count(), 1);
    assert_eq!(outcome.succeeded_count(), 2);
    assert_eq!(outcome.errors[0].0, "App/Two");
    assert_eq!(outcome.errors[0].1.kind(), ErrorKind::Environment);
    assert_eq!(sink.inner.get("APP_ONE").as_deref(), Some("v"));
    assert_eq!(sink.inner.get("APP_THREE").as_deref(), Some("v"));
    assert!(sink.inner.get("APP_TWO").is_none());
}

#[tokio::test]
async fn unrepresentable_variable_name_fails_only_that_key() {
    let h = harness(8);
    h.config.insert("App/Mode=Fast", "", "on");
    h.config.insert("App/Mode", "", "slow");

    let batch = ResolutionBatch::new(["App/Mode=Fast", "App/Mode"], "");
    let outcome = h.engine.resolve(&batch, &CancellationToken::new()).await;

    assert_eq!(outcome.failed_keys().collect::<Vec<_>>(), vec!["App/Mode=Fast"]);
    assert_eq!(outcome.errors[0].1.kind(), ErrorKind::Environment);
    assert_eq!(h.sink.snapshot().len(), 1);
    assert_eq!(h.sink.get("APP_MODE").as_deref(), Some("slow"));
}

#[tokio::test]
async fn failed_secret_never_writes_the_raw_reference() {
    let h = harness(8);
    let uri = "https://v.vault.azure.net/secrets/Locked";
    h.config.insert_entry("", secret_entry("App/Locked", uri));
    h.secrets.fail_uri(uri, FailureKind::Forbidden);

    let outcome = h
        .engine
        .resolve(
            &ResolutionBatch::new(["App/Locked"], ""),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(outcome.failed_count(), 1);
    assert!(h.sink.get("APP_LOCKED").is_none());
    assert!(matches!(
        outcome.errors[0].1,
        Error::SecretResolution { .. }
    ));
}

#[tokio::test]
async fn malformed_reference_is_recorded_not_fatal() {
    let h = harness(8);
    h.config.insert_entry(
        "",
        StoreEntry::new("App/Broken", "not json").with_content_type(SECRET_REFERENCE_CONTENT_TYPE),
    );
    h.config.insert("App/Fine", "", "ok");

    let outcome = h
        .engine
        .resolve(
            &ResolutionBatch::new(["App/Broken", "App/Fine"], ""),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(outcome.succeeded_count(), 1);
    assert_eq!(outcome.failed_count(), 1);
    let (key, error) = &outcome.errors[0];
    assert_eq!(key, "App/Broken");
    assert!(matches!(error, Error::MalformedReference { .. }));
    assert!(!error.is_retryable());
    assert_eq!(h.secrets.call_count(), 0);
}

#[tokio::test]
async fn repeated_passes_are_idempotent() {
    let h = harness(8);
    h.config.insert("a", "", "1");
    h.config.insert("b", "", "2");
    let batch = ResolutionBatch::new(["a", "b"], "");

    let first = h.engine.resolve(&batch, &CancellationToken::new()).await;
    let after_first = h.sink.snapshot();
    let second = h.engine.resolve(&batch, &CancellationToken::new()).await;

    assert_eq!(first.summary(), second.summary());
    assert_eq!(after_first, h.sink.snapshot());
    assert_eq!(h.sink.clear_count(), 2);
}

#[tokio::test]
async fn stale_values_are_cleared_between_passes() {
    let h = harness(8);
    h.config.insert("a", "", "1");
    h.config.insert("b", "", "2");

    h.engine
        .resolve(
            &ResolutionBatch::new(["a", "b"], ""),
            &CancellationToken::new(),
        )
        .await;
    h.engine
        .resolve(&ResolutionBatch::new(["a"], ""), &CancellationToken::new())
        .await;

    assert_eq!(h.sink.get("A").as_deref(), Some("1"));
    assert!(h.sink.get("B").is_none());
}

#[tokio::test]
async fn duplicate_keys_are_resolved_independently() {
    let h = harness(8);
    h.config.insert("a", "", "1");

    let outcome = h
        .engine
        .resolve(
            &ResolutionBatch::new(["a", "a", "a"], ""),
            &CancellationToken::new(),
        )
        .await;
    assert_eq!(outcome.succeeded_count(), 3);
    assert_eq!(h.config.call_count(), 3);
    assert_eq!(h.sink.len(), 1);
}

#[tokio::test]
async fn cancelled_before_start_is_empty_and_not_an_error() {
    let h = harness(8);
    h.config.insert("a", "", "1");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = h
        .engine
        .resolve(&ResolutionBatch::new(["a"], ""), &cancel)
        .await;

    assert_eq!(outcome.total(), 0);
    assert!(outcome.cancelled);
    assert!(!outcome.is_complete_success());
    assert_eq!(h.sink.clear_count(), 1);
    assert_eq!(h.config.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancellation_lets_running_keys_finish() {
    let h = harness(1);
    for key in ["a", "b", "c", "d", "e"] {
        h.config.insert(key, "", "v");
    }
    h.config.set_latency(Duration::from_millis(20));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        trigger.cancel();
    });

    let batch = ResolutionBatch::new(["a", "b", "c", "d", "e"], "");
    let outcome = h.engine.resolve(&batch, &cancel).await;

    assert!(outcome.cancelled);
    assert_eq!(outcome.failed_count(), 0);
    assert!(outcome.succeeded_count() >= 1);
    assert!(outcome.succeeded_count() < 5);
    assert_eq!(h.sink.len(), outcome.succeeded_count());
    assert!(outcome.summary().ends_with("(cancelled)"));
}

#[tokio::test(start_paused = true)]
async fn fan_out_respects_max_concurrency() {
    let h = harness(4);
    let keys: Vec<String> = (0..20).map(|i| format!("k{i}")).collect();
    for key in &keys {
        h.config.insert(key.clone(), "", "v");
    }
    h.config.set_latency(Duration::from_millis(10));

    let outcome = h
        .engine
        .resolve(&ResolutionBatch::new(keys, ""), &CancellationToken::new())
        .await;

    assert_eq!(outcome.succeeded_count(), 20);
    assert_eq!(h.config.peak_in_flight(), 4);
}

#[tokio::test(start_paused = true)]
async fn overlapping_refresh_is_skipped() {
    let h = harness(8);
    h.config.insert("a", "", "1");
    h.config.set_latency(Duration::from_millis(50));
    let batch = ResolutionBatch::new(["a"], "");

    let engine = h.engine.clone();
    let first_batch = batch.clone();
    let first = tokio::spawn(async move {
        engine
            .refresh(&first_batch, &CancellationToken::new())
            .await
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(h.engine.is_refreshing());
    let second = h.engine.refresh(&batch, &CancellationToken::new()).await;
    assert!(second.is_skipped());

    let first = first.await.unwrap();
    let outcome = first.into_option().unwrap();
    assert!(outcome.is_complete_success());
    assert_eq!(h.sink.clear_count(), 1);
    assert_eq!(h.config.call_count(), 1);

    // Released after completion
    assert!(!h.engine.is_refreshing());
    let third = h.engine.refresh(&batch, &CancellationToken::new()).await;
    assert!(third.is_executed());
}

#[tokio::test]
async fn guard_is_released_after_a_failing_pass() {
    let h = harness(8);
    h.config.fail_key("a", FailureKind::Unavailable);
    let batch = ResolutionBatch::new(["a"], "");

    let failed = h.engine.refresh(&batch, &CancellationToken::new()).await;
    let outcome = failed.into_option().unwrap();
    assert_eq!(outcome.failed_count(), 1);
    assert!(outcome.errors[0].1.is_retryable());

    assert!(!h.engine.is_refreshing());
    let again = h.engine.refresh(&batch, &CancellationToken::new()).await;
    assert!(again.is_executed());
}
