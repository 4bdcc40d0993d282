//! Evaluation scores and aggregate statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::{BenchError, Result};

/// One externally supplied score entry, before validation.
///
/// `id` may arrive as a JSON string or number. A missing id is rejected
/// rather than defaulted to the entry's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawScore {
    #[serde(default, alias = "agent_id")]
    pub id: Option<serde_json::Value>,

    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
}

impl RawScore {
    pub fn new(id: &str, scores: BTreeMap<String, f64>) -> Self {
        Self {
            id: Some(serde_json::Value::String(id.to_string())),
            scores,
        }
    }

    /// Resolve the agent id, rejecting missing or non-scalar ids.
    pub fn agent_id(&self) -> Result<String> {
        let id = match &self.id {
            Some(serde_json::Value::String(s)) => s.trim().to_string(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(BenchError::invalid(format!(
                    "score entry id must be a string or number, got {other}"
                )))
            }
            None => String::new(),
        };
        if id.is_empty() {
            return Err(BenchError::invalid("score entry is missing an agent id"));
        }
        Ok(id)
    }
}

/// Per-agent scores over a set of named criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationScore {
    pub agent_id: String,
    pub scores: BTreeMap<String, f64>,
    /// Arithmetic mean of `scores` values.
    pub average_score: f64,
}

impl EvaluationScore {
    /// Build a score entry, computing `average_score`.
    ///
    /// Fails on an empty criterion map or a non-finite value.
    pub fn new(agent_id: &str, scores: BTreeMap<String, f64>) -> Result<Self> {
        if scores.is_empty() {
            return Err(BenchError::invalid(format!(
                "agent {agent_id} has no criterion scores"
            )));
        }
        if let Some((criterion, value)) = scores.iter().find(|(_, v)| !v.is_finite()) {
            return Err(BenchError::invalid(format!(
                "agent {agent_id} has non-finite score {value} for {criterion}"
            )));
        }
        let average_score = scores.values().sum::<f64>() / scores.len() as f64;
        Ok(Self {
            agent_id: agent_id.to_string(),
            scores,
            average_score,
        })
    }

    /// Criterion names, sorted.
    pub fn criteria(&self) -> Vec<&str> {
        self.scores.keys().map(String::as_str).collect()
    }

    /// Whether two entries were scored on exactly the same criteria.
    pub fn same_criteria(&self, other: &EvaluationScore) -> bool {
        self.scores.keys().eq(other.scores.keys())
    }
}

/// Cross-agent statistics for one evaluation batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Mean of all `average_score` values.
    pub avg_score: f64,
    /// Max of all `average_score` values.
    pub highest_score: f64,
    /// Number of valid entries.
    pub total_evaluations: usize,
    /// Number of distinct criteria in the shared key set.
    pub category_count: usize,
}

/// A score entry dropped because its criteria disagree with the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWarning {
    pub agent_id: String,
    pub expected_criteria: Vec<String>,
    pub found_criteria: Vec<String>,
}

impl std::fmt::Display for ScoreWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "agent {} scored on [{}], batch uses [{}]; entry excluded",
            self.agent_id,
            self.found_criteria.join(", "),
            self.expected_criteria.join(", ")
        )
    }
}

/// Ranked scores plus the statistics derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Valid entries, best first.
    pub scores: Vec<EvaluationScore>,
    pub stats: AggregateStats,
    pub warnings: Vec<ScoreWarning>,
}
