use std::{sync::Arc, time::Duration};

use scholarai::{
    FixedClock,
    config::Provider,
    orchestrator::Orchestrator,
    prompts,
    provider::adapter_for,
    tier::TierKind,
    types::RequestOption,
};

use crate::helpers::{MockUpstream, fast_policy, google_text, mock_config, provider_error};

fn orchestrator(base: &str) -> (Orchestrator, Arc<FixedClock>) {
    let config = mock_config(Provider::Google, base);
    let clock = Arc::new(FixedClock::new(0));
    let adapter = adapter_for(&config).unwrap();
    (
        Orchestrator::new(adapter, config, fast_policy(), clock.clone()),
        clock,
    )
}

#[tokio::test]
async fn test_rate_limit_then_success_waits_one_base_delay() {
    let mock = MockUpstream::new()
        .respond(provider_error(429, "Resource has been exhausted"))
        .respond(google_text("## Notes"));
    let base = mock.start().await;
    let (orchestrator, clock) = orchestrator(&base);

    let result = orchestrator
        .run(TierKind::Fast, &prompts::notes("Photosynthesis"))
        .await
        .unwrap();

    assert_eq!(result.text, "## Notes");
    assert_eq!(result.attempts, 2);
    assert_eq!(clock.total_slept(), Duration::from_secs(1));
    assert_eq!(clock.get(), 1_000);
    assert_eq!(mock.requests().len(), 2);
}

#[tokio::test]
async fn test_overloaded_reasoning_tier_falls_back_to_fast() {
    let mock = MockUpstream::new()
        .respond(provider_error(503, "overloaded"))
        .respond(provider_error(503, "overloaded"))
        .respond(google_text("x = 5"));
    let base = mock.start().await;
    let (orchestrator, clock) = orchestrator(&base);

    let result = orchestrator
        .run(TierKind::Reasoning, &prompts::doubt("Solve 2x+5=15", None))
        .await
        .unwrap();

    assert_eq!(result.model, "gemini-2.0-flash");
    assert_eq!(result.attempts, 3);
    assert_eq!(result.dropped_options, vec![RequestOption::Thinking]);
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );

    let requests = mock.requests();
    assert!(requests[0].path.contains("gemini-2.5-pro"));
    assert!(requests[0].body["generationConfig"]["thinkingConfig"].is_object());
    assert!(requests[2].path.contains("gemini-2.0-flash"));
    assert!(requests[2].body["generationConfig"]["thinkingConfig"].is_null());
}

#[tokio::test]
async fn test_exhausted_attempts_surface_last_error() {
    let mock = MockUpstream::new()
        .respond(provider_error(429, "quota"))
        .respond(provider_error(429, "quota"))
        .respond(provider_error(429, "quota"))
        .respond(google_text("never reached"));
    let base = mock.start().await;
    let (orchestrator, clock) = orchestrator(&base);

    let err = orchestrator
        .run(TierKind::Fast, &prompts::notes("Optics"))
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(mock.requests().len(), 3);
    assert_eq!(clock.total_slept(), Duration::from_secs(3));
}
