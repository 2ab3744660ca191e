//! HTTP behaviour of the store clients against a mock server

use appenv_core::{Error, SecretReference, SECRET_REFERENCE_CONTENT_TYPE};
use appenv_store::{AppConfigClient, ConfigStore, KeyVaultClient, SecretStore, StaticTokenProvider};
use appenv_utils::RetryConfig;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        jitter_factor: 0.0,
    }
}

fn config_client(server: &MockServer) -> AppConfigClient {
    AppConfigClient::new(
        Url::parse(&server.uri()).unwrap(),
        Arc::new(StaticTokenProvider::new("token-1")),
        Duration::from_secs(5),
    )
    .unwrap()
    .with_retry(fast_retry())
}

fn vault_client() -> KeyVaultClient {
    KeyVaultClient::new(
        Arc::new(StaticTokenProvider::new("token-2")),
        Duration::from_secs(5),
    )
    .unwrap()
    .with_retry(fast_retry())
    .allow_http(true)
    .with_allowed_hosts(["127.0.0.1"])
}

#[tokio::test]
async fn fetches_entry_with_label_and_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/kv/App%2FName"))
        .and(query_param("label", "prod"))
        .and(query_param("api-version", "1.0"))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "App/Name",
            "label": "prod",
            "value": "svc",
            "content_type": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entry = config_client(&server)
        .fetch_entry("App/Name", "prod")
        .await
        .unwrap();
    assert_eq!(entry.key, "App/Name");
    assert_eq!(entry.value.as_deref(), Some("svc"));
    assert!(!entry.is_secret_reference());
}

#[tokio::test]
async fn empty_label_is_sent_as_null_label() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/kv/a"))
        .and(query_param("label", "\0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "a",
            "value": "1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entry = config_client(&server).fetch_entry("a", "").await.unwrap();
    assert_eq!(entry.value_or_empty(), "1");
}

#[tokio::test]
async fn secret_reference_content_type_survives() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/kv/App%2FSecret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "App/Secret",
            "value": "{\"uri\":\"https://v.vault.azure.net/secrets/MySecret\"}",
            "content_type": SECRET_REFERENCE_CONTENT_TYPE
        })))
        .mount(&server)
        .await;

    let entry = config_client(&server)
        .fetch_entry("App/Secret", "")
        .await
        .unwrap();
    assert!(entry.is_secret_reference());
}

#[tokio::test]
async fn missing_key_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .expect(1)
        .mount(&server)
        .await;

    let err = config_client(&server)
        .fetch_entry("missing", "")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::StoreFetch {
            status: Some(404),
            ..
        }
    ));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn transient_failure_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "a",
            "value": "ok"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entry = config_client(&server).fetch_entry("a", "").await.unwrap();
    assert_eq!(entry.value_or_empty(), "ok");
}

#[tokio::test]
async fn throttling_exhausts_attempts_with_hint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after-ms", "2"))
        .expect(3)
        .mount(&server)
        .await;

    let err = config_client(&server).fetch_entry("a", "").await.unwrap_err();
    assert!(matches!(err, Error::RateLimited { .. }));
    assert_eq!(err.retry_after(), Some(Duration::from_millis(2)));
}

#[tokio::test]
async fn resolves_latest_and_pinned_secrets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/secrets/MySecret"))
        .and(query_param("api-version", "7.4"))
        .and(header("Authorization", "Bearer token-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": "top-secret",
            "id": "ignored"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/secrets/MySecret/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": "old" })))
        .mount(&server)
        .await;

    let client = vault_client();
    let latest = SecretReference::new(server.uri(), "MySecret", None);
    let pinned = SecretReference::new(server.uri(), "MySecret", Some("v1".to_string()));

    assert_eq!(client.resolve_secret(&latest).await.unwrap(), "top-secret");
    assert_eq!(client.resolve_secret(&pinned).await.unwrap(), "old");
    assert_eq!(client.connection_count(), 1);
    assert_eq!(client.connection(&server.uri()).unwrap().request_count(), 2);
}

#[tokio::test]
async fn secret_without_value_reads_as_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "x" })))
        .mount(&server)
        .await;

    let reference = SecretReference::new(server.uri(), "Blank", None);
    assert_eq!(vault_client().resolve_secret(&reference).await.unwrap(), "");
}

#[tokio::test]
async fn forbidden_secret_reports_uri() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let reference = SecretReference::new(server.uri(), "Locked", None);
    let err = vault_client().resolve_secret(&reference).await.unwrap_err();
    match err {
        Error::SecretResolution { uri, status, .. } => {
            assert_eq!(uri, reference.to_uri());
            assert_eq!(status, Some(403));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn token_is_never_sent_to_unlisted_vault() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": "leaked" })))
        .expect(0)
        .mount(&server)
        .await;

    let client = vault_client().with_allowed_hosts([".vault.azure.net"]);
    let reference = SecretReference::new(server.uri(), "Stolen", None);
    let err = client.resolve_secret(&reference).await.unwrap_err();

    match &err {
        Error::SecretResolution { uri, status, message, .. } => {
            assert_eq!(uri, &server.uri());
            assert_eq!(*status, None);
            assert_eq!(message, "vault host not allowed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_retryable());
    assert_eq!(client.connection_count(), 0);
}
