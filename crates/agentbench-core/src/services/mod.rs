//! Seams to the three external services the pipeline consumes.
//!
//! - [`ClassificationService`]: content → category judgment
//! - [`DocumentExtractor`]: uploaded file → plain text
//! - [`GenerationBackend`]: one agent request → generated content
//!
//! Production wiring uses the reqwest adapters in [`http`]; tests inject
//! in-process stubs.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{AgentCallError, ClassificationResult, UploadedDocument};

pub use http::HttpServices;

/// Failure talking to the classification service. Never surfaced past the
/// classifier client, which falls back to the unrelated default.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationServiceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("classification service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed classification response: {0}")]
    Malformed(String),

    #[error("classification timed out")]
    Timeout,
}

impl From<reqwest::Error> for ClassificationServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClassificationServiceError::Timeout
        } else {
            ClassificationServiceError::Transport(err.to_string())
        }
    }
}

/// Failure talking to the document extraction service.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("extraction service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed extraction response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        ExtractionError::Transport(err.to_string())
    }
}

#[async_trait]
pub trait ClassificationService: Send + Sync {
    /// Classify `prompt`. The returned value may still violate the
    /// result invariants; callers normalise it.
    async fn classify(
        &self,
        prompt: &str,
    ) -> std::result::Result<ClassificationResult, ClassificationServiceError>;
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Convert an uploaded document to text. `Ok(None)` means the service
    /// answered but produced no `content` field.
    async fn extract(
        &self,
        document: &UploadedDocument,
    ) -> std::result::Result<Option<String>, ExtractionError>;
}

/// Wire shape of one agent request: `{id, category, input}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub id: String,
    pub category: String,
    pub input: String,
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run one agent and return its generated content.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<String, AgentCallError>;
}

/// Body returned by the generation endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub results: Vec<GenerationItem>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One entry of `GenerationResponse::results`.
///
/// Agents name their output field after what they produce, so content is
/// taken from the first non-empty of `content`, `blog`, `response`,
/// `itinerary`, `summary`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationItem {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub itinerary: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl GenerationItem {
    fn id_matches(&self, id: &str) -> bool {
        match &self.id {
            Some(serde_json::Value::String(s)) => s == id,
            Some(serde_json::Value::Number(n)) => n.to_string() == id,
            _ => false,
        }
    }

    pub fn into_content(self) -> std::result::Result<String, AgentCallError> {
        if let Some(err) = self.error.filter(|e| !e.trim().is_empty()) {
            return Err(AgentCallError::Agent(err));
        }
        [
            self.content,
            self.blog,
            self.response,
            self.itinerary,
            self.summary,
        ]
        .into_iter()
        .flatten()
        .find(|c| !c.trim().is_empty())
        .ok_or(AgentCallError::EmptyContent)
    }
}

impl GenerationResponse {
    /// Pull the content for agent `id` out of a successful response.
    pub fn content_for(self, id: &str) -> std::result::Result<String, AgentCallError> {
        if let Some(status) = self.status.as_deref() {
            if status != "success" {
                let detail = self.error.unwrap_or_else(|| format!("status {status}"));
                return Err(AgentCallError::Agent(detail));
            }
        }
        let mut results = self.results;
        // A lone item may omit its id; one naming another agent is never ours.
        let index = match results.iter().position(|item| item.id_matches(id)) {
            Some(index) => index,
            None if results.len() == 1 && results[0].id.is_none() => 0,
            None => {
                return Err(AgentCallError::Malformed(format!(
                    "no result for agent {id}"
                )))
            }
        };
        results.swap_remove(index).into_content()
    }
}

/// Strip markdown code fences some models wrap around JSON.
pub fn strip_json_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}
