use std::sync::Arc;

use scholarai::{
    Error, FixedClock,
    client::{ClientError, ScholarClient},
    config::Provider,
    local_store::{LocalCredential, LocalStore},
    server::AppState,
};
use tempfile::TempDir;

use crate::helpers::{
    MockResponse, MockUpstream, fast_policy, google_text, openrouter_text, provider_error,
    start_app, start_app_with,
};

struct Fixture {
    _dir: TempDir,
    store: LocalStore,
}

async fn fixture(credential: Option<LocalCredential>) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::in_dir(dir.path());
    if let Some(credential) = credential {
        store.set_credential(credential).await.unwrap();
    }
    Fixture { _dir: dir, store }
}

/// A backend that only ever answers with a proxy error page.
async fn html_backend() -> String {
    let mock = MockUpstream::new().respond(MockResponse::Html(
        502,
        "<html><body>Bad Gateway</body></html>".to_string(),
    ));
    format!("{}/api/gemini", mock.start().await)
}

fn client(endpoint: &str, store: LocalStore) -> ScholarClient {
    ScholarClient::new(endpoint, store)
        .unwrap()
        .with_retry_policy(fast_policy())
        .with_clock(Arc::new(FixedClock::default()))
}

#[tokio::test]
async fn test_html_backend_falls_back_to_local_credential() {
    let fixture = fixture(Some(LocalCredential::new(Provider::OpenRouter, "local-key"))).await;
    let provider = MockUpstream::new().respond(openrouter_text("## Photosynthesis"));
    let provider_url = provider.start().await;

    let client = client(&html_backend().await, fixture.store.clone())
        .with_direct_base_url(provider_url);
    let notes = client.generate_notes("Photosynthesis").await.unwrap();

    assert_eq!(notes, "## Photosynthesis");
    let recorded = &provider.requests()[0];
    assert_eq!(recorded.headers["authorization"], "Bearer local-key");
}

#[tokio::test]
async fn test_unreachable_backend_falls_back() {
    let fixture = fixture(Some(LocalCredential::new(Provider::Google, "local-key"))).await;
    let provider = MockUpstream::new().respond(google_text("Keep going!"));
    let provider_url = provider.start().await;

    let client = client("http://127.0.0.1:9/api/gemini", fixture.store.clone())
        .with_direct_base_url(provider_url);
    let reply = client
        .chat_with_coach(&[], "I am stuck on vectors", "Class 11")
        .await
        .unwrap();

    assert_eq!(reply, "Keep going!");
    assert_eq!(provider.requests()[0].headers["x-goog-api-key"], "local-key");
}

#[tokio::test]
async fn test_fallback_without_local_credential_asks_for_key() {
    let fixture = fixture(None).await;
    let client = client(&html_backend().await, fixture.store.clone());

    let err = client.generate_notes("Optics").await.unwrap_err();
    assert!(err.is_missing_local_credential());
    assert!(err.to_string().contains("enter your API key"));
}

#[tokio::test]
async fn test_server_error_body_is_not_retried_locally() {
    let fixture = fixture(Some(LocalCredential::new(Provider::OpenRouter, "local-key"))).await;
    let provider = MockUpstream::new();
    let provider_url = provider.start().await;
    let backend = start_app(AppState::unconfigured(Provider::Google)).await;

    let client = client(&format!("{backend}/api/gemini"), fixture.store.clone())
        .with_direct_base_url(provider_url);
    let err = client.generate_notes("Optics").await.unwrap_err();

    match err {
        Error::Client(ClientError::Server { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("no API key configured"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_plain_text_client_error_is_not_unreachable() {
    let fixture = fixture(Some(LocalCredential::new(Provider::Google, "local-key"))).await;
    let provider = MockUpstream::new();
    let provider_url = provider.start().await;
    let backend = MockUpstream::new().respond(MockResponse::Html(
        413,
        "Failed to buffer the request body: length limit exceeded".to_string(),
    ));
    let endpoint = format!("{}/api/gemini", backend.start().await);

    let client = client(&endpoint, fixture.store.clone()).with_direct_base_url(provider_url);
    let err = client.solve_doubt("Find x", None).await.unwrap_err();

    match err {
        Error::Client(ClientError::Server { status, message }) => {
            assert_eq!(status, 413);
            assert!(message.contains("length limit"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_fallback_retries_on_local_policy() {
    let fixture = fixture(Some(LocalCredential::new(Provider::Google, "local-key"))).await;
    let provider = MockUpstream::new()
        .respond(provider_error(429, "quota"))
        .respond(google_text("## Optics"));
    let provider_url = provider.start().await;

    let client = client("http://127.0.0.1:9/api/gemini", fixture.store.clone())
        .with_direct_base_url(provider_url);
    let notes = client.generate_notes("Optics").await.unwrap();

    assert_eq!(notes, "## Optics");
    assert_eq!(provider.requests().len(), 2);
}

#[tokio::test]
async fn test_quiz_through_healthy_backend() {
    let fixture = fixture(None).await;
    let raw = r#"{"questions":[{"question":"Unit of force?","options":["N","J","W","Pa"],"correctAnswer":0,"explanation":"Newton."}]}"#;
    let provider = MockUpstream::new().respond(google_text(raw));
    let upstream = provider.start().await;
    let backend = start_app_with(Provider::Google, &upstream).await;

    let client = client(&format!("{backend}/api/gemini"), fixture.store.clone());
    let quiz = client.generate_quiz("Mechanics", "Easy").await.unwrap();

    assert_eq!(quiz.len(), 1);
    assert_eq!(quiz[0].id, 1);
    assert_eq!(quiz[0].options[quiz[0].correct_answer], "N");
}
