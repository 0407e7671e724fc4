//! Retry and model-tier fallback around a provider adapter.
//!
//! Each logical request moves through these states:
//!
//! * `Attempting(tier, n)`, starting at `(primary, 1)`
//! * `Succeeded(text)` on the first successful call
//! * `Failed(error)` on a non-retryable error, or a retryable one at `n == max_attempts`
//!
//! A retryable failure (rate limited or overloaded) below the attempt limit
//! waits `backoff(n)`, possibly drops to the next tier down, and tries again.
//! Attempts are strictly sequential and cannot be cancelled.

use std::sync::Arc;

use crate::{
    Clock, Result,
    config::{ProviderConfig, RetryPolicy},
    provider::ProviderAdapter,
    tier::{ModelTier, TierKind},
    types::{GenerationRequest, GenerationResult},
};

/// Executes generation requests with bounded retry and tier degradation.
#[derive(Clone)]
pub struct Orchestrator {
    adapter: Arc<dyn ProviderAdapter>,
    config: ProviderConfig,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl Orchestrator {
    pub fn new(
        adapter: Arc<dyn ProviderAdapter>,
        config: ProviderConfig,
        policy: RetryPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            adapter,
            config,
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Run `request`, starting on the `primary` tier.
    pub async fn run(
        &self,
        primary: TierKind,
        request: &GenerationRequest,
    ) -> Result<GenerationResult> {
        let provider = self.adapter.provider();
        let mut tier: &ModelTier = self.config.tier(primary);
        let mut attempt: u32 = 1;
        let mut failures_on_tier: u32 = 0;

        loop {
            let (prepared, dropped) = tier.prepare(request);
            for option in &dropped {
                tracing::warn!(
                    model = %tier.model,
                    option = %option,
                    "Model tier does not support request option; dropping it"
                );
            }

            tracing::debug!(%provider, model = %tier.model, attempt, "Attempting generation");

            match self.adapter.generate(tier, &prepared).await {
                Ok(text) => {
                    tracing::info!(%provider, model = %tier.model, attempt, "Generation succeeded");
                    return Ok(GenerationResult {
                        text,
                        provider,
                        model: tier.model.clone(),
                        attempts: attempt,
                        dropped_options: dropped,
                    });
                }
                Err(e) if e.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    tracing::warn!(
                        %provider,
                        model = %tier.model,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retryable provider failure: {e}"
                    );
                    self.clock.sleep(delay).await;

                    failures_on_tier += 1;
                    if failures_on_tier >= self.policy.downgrade_after
                        && let Some(lower) = self.config.downgrade(tier.kind)
                    {
                        tracing::info!(from = %tier.model, to = %lower.model, "Falling back to a lower model tier");
                        tier = lower;
                        failures_on_tier = 0;
                    }
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(%provider, model = %tier.model, attempt, "Generation failed: {e}");
                    return Err(e);
                }
            }
        }
    }
}
