//! Model tiers and their capability descriptors.
//!
//! A tier names a concrete model together with the request options it accepts.
//! The orchestrator consults the descriptor before every attempt instead of
//! editing requests after a failure.

use serde::Serialize;

use crate::types::{GenerationRequest, RequestOption};

/// Capability/latency class of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    /// Low-latency model for chat, notes and quizzes.
    Fast,
    /// Slower model with extended reasoning for doubts, careers and plans.
    Reasoning,
}

impl TierKind {
    /// Next tier down when this one is rate limited or overloaded.
    pub fn downgrade(self) -> Option<TierKind> {
        match self {
            TierKind::Reasoning => Some(TierKind::Fast),
            TierKind::Fast => None,
        }
    }
}

/// Optional request features a tier accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub thinking: bool,
    pub json_mode: bool,
    pub vision: bool,
}

impl Capabilities {
    pub const FAST: Capabilities = Capabilities {
        thinking: false,
        json_mode: true,
        vision: true,
    };

    pub const REASONING: Capabilities = Capabilities {
        thinking: true,
        json_mode: true,
        vision: true,
    };

    pub fn supports(&self, option: RequestOption) -> bool {
        match option {
            RequestOption::Thinking => self.thinking,
            RequestOption::JsonMode => self.json_mode,
            RequestOption::Image => self.vision,
        }
    }
}

/// A named model variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTier {
    pub model: String,
    pub kind: TierKind,
    pub capabilities: Capabilities,
}

impl ModelTier {
    pub fn fast(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            kind: TierKind::Fast,
            capabilities: Capabilities::FAST,
        }
    }

    pub fn reasoning(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            kind: TierKind::Reasoning,
            capabilities: Capabilities::REASONING,
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Fit `request` to this tier.
    ///
    /// Returns the request stripped of unsupported options, and the options removed.
    pub fn prepare(&self, request: &GenerationRequest) -> (GenerationRequest, Vec<RequestOption>) {
        let mut prepared = request.clone();
        let mut dropped = Vec::new();

        if prepared.thinking_budget.is_some() && !self.capabilities.supports(RequestOption::Thinking)
        {
            prepared.thinking_budget = None;
            dropped.push(RequestOption::Thinking);
        }
        if prepared.json_mode && !self.capabilities.supports(RequestOption::JsonMode) {
            prepared.json_mode = false;
            dropped.push(RequestOption::JsonMode);
        }
        if prepared.image.is_some() && !self.capabilities.supports(RequestOption::Image) {
            prepared.image = None;
            dropped.push(RequestOption::Image);
        }

        (prepared, dropped)
    }
}
