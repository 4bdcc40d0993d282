//! Fan-out generation task and per-agent outcomes.

use serde::{Deserialize, Serialize};

use crate::domain::error::{BenchError, Result};

/// One submit action: the same prompt sent to several agents of one category.
///
/// Immutable once built. `agent_ids` is trimmed and de-duplicated, keeping
/// the first occurrence of each id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationTask {
    category: String,
    agent_ids: Vec<String>,
    prompt_text: String,
}

impl GenerationTask {
    pub fn new<I, S>(category: &str, agent_ids: I, prompt_text: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let category = category.trim();
        if category.is_empty() {
            return Err(BenchError::invalid("category must not be empty"));
        }
        let prompt_text = prompt_text.trim();
        if prompt_text.is_empty() {
            return Err(BenchError::invalid("prompt must not be empty"));
        }

        let mut ids: Vec<String> = Vec::new();
        for id in agent_ids {
            let id = id.as_ref().trim();
            if id.is_empty() {
                return Err(BenchError::invalid("agent id must not be empty"));
            }
            if !ids.iter().any(|existing| existing == id) {
                ids.push(id.to_string());
            }
        }

        Ok(Self {
            category: category.to_string(),
            agent_ids: ids,
            prompt_text: prompt_text.to_string(),
        })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn agent_ids(&self) -> &[String] {
        &self.agent_ids
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }
}

/// Why a single agent call produced no content.
///
/// Recorded into [`GenerationResult::error`]; never aborts the batch except
/// for [`AgentCallError::Rejected`], which means the request shape itself was
/// refused and every sibling request would be refused the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentCallError {
    #[error("timeout")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("generation service returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("generation request rejected (status {status}): {body}")]
    Rejected { status: u16, body: String },

    /// Error reported by the agent itself inside a successful response.
    #[error("{0}")]
    Agent(String),

    #[error("agent returned no content")]
    EmptyContent,

    #[error("malformed generation response: {0}")]
    Malformed(String),

    #[error("agent task aborted: {0}")]
    Aborted(String),
}

impl AgentCallError {
    /// Whether this failure invalidates the whole dispatch.
    pub fn rejects_batch(&self) -> bool {
        matches!(self, AgentCallError::Rejected { .. })
    }
}

impl From<reqwest::Error> for AgentCallError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AgentCallError::Timeout
        } else {
            AgentCallError::Transport(err.to_string())
        }
    }
}

/// Outcome of one agent call.
///
/// Exactly one of `content` / `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub agent_id: String,
    pub content: Option<String>,
    pub response_time_ms: Option<u64>,
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn success(agent_id: &str, content: String, response_time_ms: u64) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            content: Some(content),
            response_time_ms: Some(response_time_ms),
            error: None,
        }
    }

    pub fn failure(agent_id: &str, error: &AgentCallError) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            content: None,
            response_time_ms: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.content.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_dedupes_preserving_first_occurrence() {
        let task = GenerationTask::new("blog", ["2", "1", "2", " 3 ", "1"], "Write about Rust").unwrap();
        assert_eq!(task.agent_ids(), &["2", "1", "3"]);
        assert_eq!(task.category(), "blog");
        assert_eq!(task.prompt_text(), "Write about Rust");
    }

    #[test]
    fn test_task_allows_zero_agents() {
        let task = GenerationTask::new("blog", Vec::<String>::new(), "topic").unwrap();
        assert!(task.agent_ids().is_empty());
    }

    #[test]
    fn test_task_rejects_blank_fields() {
        assert!(GenerationTask::new(" ", ["1"], "topic").is_err());
        assert!(GenerationTask::new("blog", ["1"], "  ").is_err());
        assert!(GenerationTask::new("blog", ["1", ""], "topic").is_err());
    }

    #[test]
    fn test_timeout_renders_as_plain_timeout() {
        let result = GenerationResult::failure("1", &AgentCallError::Timeout);
        assert_eq!(result.error.as_deref(), Some("timeout"));
        assert!(result.content.is_none());
        assert!(result.response_time_ms.is_none());
        assert!(!result.is_success());
    }

    #[test]
    fn test_only_rejection_fails_the_batch() {
        assert!(AgentCallError::Rejected {
            status: 400,
            body: String::new()
        }
        .rejects_batch());
        assert!(!AgentCallError::Upstream {
            status: 500,
            body: String::new()
        }
        .rejects_batch());
        assert!(!AgentCallError::Timeout.rejects_batch());
    }
}
