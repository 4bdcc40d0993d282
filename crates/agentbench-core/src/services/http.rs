//! reqwest adapters for the classification, extraction and generation services.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::{
    strip_json_fences, ClassificationService, ClassificationServiceError, DocumentExtractor,
    ExtractionError, GenerationBackend, GenerationRequest, GenerationResponse,
};
use crate::config::ServiceConfig;
use crate::domain::{AgentCallError, BenchError, ClassificationResult, Result, UploadedDocument};

const MAX_ERROR_BODY: usize = 512;

/// HTTP client for all three services, sharing one connection pool.
#[derive(Debug, Clone)]
pub struct HttpServices {
    config: ServiceConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ExtractionResponse {
    #[serde(default)]
    content: Option<String>,
}

impl HttpServices {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("agentbench/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| BenchError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Truncate an error body for inclusion in messages.
fn snippet(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// Statuses meaning the request shape itself was refused.
fn is_rejection(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNSUPPORTED_MEDIA_TYPE | StatusCode::UNPROCESSABLE_ENTITY
    )
}

#[async_trait]
impl ClassificationService for HttpServices {
    async fn classify(
        &self,
        prompt: &str,
    ) -> std::result::Result<ClassificationResult, ClassificationServiceError> {
        let url = self.config.url(&self.config.classify_path);
        debug!(url = %url, chars = prompt.len(), "requesting classification");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClassificationServiceError::Status {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        serde_json::from_str(strip_json_fences(&body))
            .map_err(|e| ClassificationServiceError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl DocumentExtractor for HttpServices {
    async fn extract(
        &self,
        document: &UploadedDocument,
    ) -> std::result::Result<Option<String>, ExtractionError> {
        let url = self.config.url(&self.config.extract_path);
        debug!(url = %url, file = %document.file_name, bytes = document.bytes.len(), "extracting document");

        let part = reqwest::multipart::Part::bytes(document.bytes.clone())
            .file_name(document.file_name.clone());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        let parsed: ExtractionResponse =
            serde_json::from_str(&body).map_err(|e| ExtractionError::Malformed(e.to_string()))?;
        Ok(parsed.content)
    }
}

#[async_trait]
impl GenerationBackend for HttpServices {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<String, AgentCallError> {
        let url = self.config.url(&self.config.generate_path);
        debug!(url = %url, agent_id = %request.id, category = %request.category, "dispatching agent request");

        let response = self
            .client
            .post(&url)
            .json(std::slice::from_ref(request))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if is_rejection(status) {
            return Err(AgentCallError::Rejected {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }
        if !status.is_success() {
            return Err(AgentCallError::Upstream {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        let parsed: GenerationResponse =
            serde_json::from_str(&body).map_err(|e| AgentCallError::Malformed(e.to_string()))?;
        parsed.content_for(&request.id)
    }
}
