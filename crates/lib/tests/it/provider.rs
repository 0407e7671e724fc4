use scholarai::{
    config::Provider,
    provider::{ProviderError, adapter_for},
    tier::ModelTier,
    types::{GenerationRequest, Turn},
};

use crate::helpers::{MockUpstream, google_text, mock_config, openrouter_text, provider_error};

fn request() -> GenerationRequest {
    GenerationRequest::conversation(vec![Turn::user("Explain osmosis")])
        .with_system("Be brief")
        .with_temperature(0.3)
}

#[tokio::test]
async fn test_google_adapter_wire_format() {
    let mock = MockUpstream::new().respond(google_text("Osmosis is diffusion of water."));
    let base = mock.start().await;
    let adapter = adapter_for(&mock_config(Provider::Google, &base)).unwrap();

    let text = adapter
        .generate(&ModelTier::fast("gemini-2.0-flash"), &request())
        .await
        .unwrap();
    assert_eq!(text, "Osmosis is diffusion of water.");

    let recorded = &mock.requests()[0];
    assert_eq!(
        recorded.path,
        "/v1beta/models/gemini-2.0-flash:generateContent"
    );
    assert_eq!(recorded.headers["x-goog-api-key"], "test-key");
    assert_eq!(recorded.body["contents"][0]["role"], "user");
    assert_eq!(
        recorded.body["contents"][0]["parts"][0]["text"],
        "Explain osmosis"
    );
    assert_eq!(
        recorded.body["systemInstruction"]["parts"][0]["text"],
        "Be brief"
    );
}

#[tokio::test]
async fn test_openrouter_adapter_wire_format() {
    let mock = MockUpstream::new().respond(openrouter_text("Water moves across a membrane."));
    let base = mock.start().await;
    let adapter = adapter_for(&mock_config(Provider::OpenRouter, &base)).unwrap();

    let text = adapter
        .generate(&ModelTier::fast("google/gemini-2.0-flash-001"), &request())
        .await
        .unwrap();
    assert_eq!(text, "Water moves across a membrane.");

    let recorded = &mock.requests()[0];
    assert_eq!(recorded.path, "/api/v1/chat/completions");
    assert_eq!(recorded.headers["authorization"], "Bearer test-key");
    assert_eq!(recorded.headers["x-title"], "ScholarAI");
    assert_eq!(recorded.body["model"], "google/gemini-2.0-flash-001");
    assert_eq!(recorded.body["messages"][0]["role"], "system");
    assert_eq!(recorded.body["messages"][1]["content"], "Explain osmosis");
}

#[tokio::test]
async fn test_status_codes_are_classified() {
    let mock = MockUpstream::new()
        .respond(provider_error(401, "bad key"))
        .respond(provider_error(429, "quota"))
        .respond(provider_error(503, "overloaded"))
        .respond(provider_error(500, "boom"));
    let base = mock.start().await;
    let adapter = adapter_for(&mock_config(Provider::Google, &base)).unwrap();
    let tier = ModelTier::fast("gemini-2.0-flash");

    let err = adapter.generate(&tier, &request()).await.unwrap_err();
    assert!(err.is_authentication_error());
    assert!(!err.is_retryable());

    let err = adapter.generate(&tier, &request()).await.unwrap_err();
    assert!(matches!(
        err,
        scholarai::Error::Provider(ProviderError::RateLimited { .. })
    ));
    assert!(err.is_retryable());

    let err = adapter.generate(&tier, &request()).await.unwrap_err();
    assert!(matches!(
        err,
        scholarai::Error::Provider(ProviderError::Overloaded { .. })
    ));

    let err = adapter.generate(&tier, &request()).await.unwrap_err();
    assert!(matches!(
        err,
        scholarai::Error::Provider(ProviderError::Http { status: 500, .. })
    ));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_provider_is_transport_error() {
    // Port 9 (discard) is not listening on loopback.
    let adapter = adapter_for(&mock_config(Provider::OpenRouter, "http://127.0.0.1:9")).unwrap();
    let err = adapter
        .generate(&ModelTier::fast("m"), &request())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        scholarai::Error::Provider(ProviderError::Transport(_))
    ));
}
