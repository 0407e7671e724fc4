//! Provider and retry configuration.
//!
//! The provider is always an explicit setting. Credentials are looked up
//! from deployment configuration (the process environment in production)
//! under the provider's candidate variable names.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tier::{ModelTier, TierKind};

/// A hosted LLM API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google GenAI (`generateContent`).
    Google,
    /// OpenRouter, or any OpenAI-compatible chat-completions endpoint.
    OpenRouter,
}

impl Provider {
    /// Environment variables searched for this provider's credential, in order.
    pub fn credential_vars(self) -> &'static [&'static str] {
        match self {
            Provider::Google => &["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"],
            Provider::OpenRouter => &["OPENROUTER_API_KEY", "API_KEY"],
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::Google => "https://generativelanguage.googleapis.com",
            Provider::OpenRouter => "https://openrouter.ai",
        }
    }

    /// Default model for a tier on this provider.
    pub fn default_tier(self, kind: TierKind) -> ModelTier {
        match (self, kind) {
            (Provider::Google, TierKind::Fast) => ModelTier::fast("gemini-2.0-flash"),
            (Provider::Google, TierKind::Reasoning) => ModelTier::reasoning("gemini-2.5-pro"),
            (Provider::OpenRouter, TierKind::Fast) => {
                ModelTier::fast("google/gemini-2.0-flash-001")
            }
            (Provider::OpenRouter, TierKind::Reasoning) => {
                ModelTier::reasoning("google/gemini-2.5-pro")
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::OpenRouter => "openrouter",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" | "gemini" => Ok(Provider::Google),
            "openrouter" | "openai" => Ok(Provider::OpenRouter),
            other => Err(ConfigError::UnknownProvider {
                name: other.to_string(),
            }),
        }
    }
}

/// Errors raised while assembling configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// No credential found for the configured provider.
    #[error(
        "Server configuration error: no API key configured for provider '{provider}'. Set one of: {candidates}"
    )]
    MissingCredential {
        provider: Provider,
        candidates: String,
    },

    /// Provider name not recognized.
    #[error("Unknown provider '{name}'. Expected 'google' or 'openrouter'")]
    UnknownProvider { name: String },

    /// Base URL could not be parsed.
    #[error("Invalid provider URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A setting had a value outside its allowed set.
    #[error("Invalid value '{value}' for {field}")]
    InvalidValue { field: String, value: String },

    /// Provider HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl ConfigError {
    /// Build the missing-credential error listing every variable that was searched.
    pub fn missing_credential(provider: Provider) -> Self {
        ConfigError::MissingCredential {
            provider,
            candidates: provider.credential_vars().join(", "),
        }
    }

    pub fn is_missing_credential(&self) -> bool {
        matches!(self, ConfigError::MissingCredential { .. })
    }
}

/// A provider credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Resolve a credential through `lookup`, first non-empty candidate wins.
pub fn resolve_credential<F>(provider: Provider, lookup: F) -> Result<Credential, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    provider
        .credential_vars()
        .iter()
        .find_map(|name| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
        .map(Credential)
        .ok_or_else(|| ConfigError::missing_credential(provider))
}

/// Everything needed to talk to one provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub credential: Credential,
    pub base_url: url::Url,
    pub fast: ModelTier,
    pub reasoning: ModelTier,
}

impl ProviderConfig {
    /// Config with the provider's default endpoint and models.
    pub fn new(provider: Provider, credential: Credential) -> Self {
        let base_url = url::Url::parse(provider.default_base_url())
            .unwrap_or_else(|_| unreachable!("default provider URLs are valid"));
        Self {
            provider,
            credential,
            base_url,
            fast: provider.default_tier(TierKind::Fast),
            reasoning: provider.default_tier(TierKind::Reasoning),
        }
    }

    /// Config with the credential read from the process environment.
    pub fn from_env(provider: Provider) -> Result<Self, ConfigError> {
        let credential = resolve_credential(provider, |name| std::env::var(name).ok())?;
        Ok(Self::new(provider, credential))
    }

    /// Point the adapter at a different endpoint (proxy, self-hosted gateway, tests).
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.base_url = url::Url::parse(url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self)
    }

    pub fn with_fast_model(mut self, model: impl Into<String>) -> Self {
        self.fast = ModelTier::fast(model);
        self
    }

    pub fn with_reasoning_model(mut self, model: impl Into<String>) -> Self {
        self.reasoning = ModelTier::reasoning(model);
        self
    }

    /// The configured tier of the given kind.
    pub fn tier(&self, kind: TierKind) -> &ModelTier {
        match kind {
            TierKind::Fast => &self.fast,
            TierKind::Reasoning => &self.reasoning,
        }
    }

    /// The tier to fall back to after a retryable failure on `kind`, if any.
    pub fn downgrade(&self, kind: TierKind) -> Option<&ModelTier> {
        kind.downgrade().map(|k| self.tier(k))
    }

    /// Join a path onto the base URL, keeping any path prefix the base carries.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Failed attempts on a tier before falling back to the next tier down.
    pub downgrade_after: u32,
}

/// Attempts per logical request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Delay before the second attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Retry once on the same tier, then fall back.
pub const DEFAULT_DOWNGRADE_AFTER: u32 = 2;

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            downgrade_after: DEFAULT_DOWNGRADE_AFTER,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            downgrade_after: DEFAULT_DOWNGRADE_AFTER,
        }
    }

    pub fn with_downgrade_after(mut self, failures: u32) -> Self {
        self.downgrade_after = failures.max(1);
        self
    }

    /// Delay after failed attempt `attempt` (1-based): base, 2*base, 4*base, ...
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}
