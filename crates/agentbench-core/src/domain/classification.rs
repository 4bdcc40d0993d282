//! Category judgment returned by the classification service.

use serde::{Deserialize, Serialize};

/// Sentinel tag for content that matches no category.
pub const UNRELATED: &str = "unrelated";

/// Agent list reported when classification fails.
pub const FALLBACK_AGENTS: [&str; 5] = [
    "blogging",
    "content_writing",
    "technical_writing",
    "data_analysis",
    "general",
];

fn unrelated_tag() -> String {
    UNRELATED.to_string()
}

/// Structured category judgment for one submission.
///
/// # Invariants
///
/// When `is_relevant` is false, `confidence_score` is 0 and both tags equal
/// [`UNRELATED`]. `available_agents` is never empty. Use [`normalized`] to
/// bring an upstream value into this shape.
///
/// [`normalized`]: ClassificationResult::normalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(default = "unrelated_tag")]
    pub content_type: String,

    #[serde(default = "unrelated_tag")]
    pub recommended_agent: String,

    #[serde(default)]
    pub available_agents: Vec<String>,

    /// Confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence_score: f64,

    #[serde(default)]
    pub is_relevant: bool,
}

impl ClassificationResult {
    /// The fail-open default used whenever classification cannot complete.
    pub fn unrelated() -> Self {
        Self {
            content_type: unrelated_tag(),
            recommended_agent: unrelated_tag(),
            available_agents: FALLBACK_AGENTS.iter().map(|s| s.to_string()).collect(),
            confidence_score: 0.0,
            is_relevant: false,
        }
    }

    /// Enforce the type's invariants on a value received from upstream.
    pub fn normalized(mut self) -> Self {
        let mut seen = std::collections::HashSet::new();
        self.available_agents = self
            .available_agents
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty() && seen.insert(a.clone()))
            .collect();
        if self.available_agents.is_empty() {
            self.available_agents = FALLBACK_AGENTS.iter().map(|s| s.to_string()).collect();
        }

        if self.content_type.trim().is_empty() || self.content_type == UNRELATED {
            self.is_relevant = false;
        }

        if !self.is_relevant {
            self.content_type = unrelated_tag();
            self.recommended_agent = unrelated_tag();
            self.confidence_score = 0.0;
            return self;
        }

        self.confidence_score = if self.confidence_score.is_finite() {
            self.confidence_score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if self.recommended_agent.trim().is_empty() {
            self.recommended_agent = unrelated_tag();
        }
        self
    }
}
