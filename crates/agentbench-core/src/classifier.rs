//! Fail-open client for the classification service.
//!
//! Classification failure must never block a user from picking agents by
//! hand, so transport errors, timeouts and malformed responses all resolve to
//! [`ClassificationResult::unrelated`]. Only empty input is an error.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{BenchError, ClassificationResult, Result};
use crate::metrics::METRICS;
use crate::obs;
use crate::services::{ClassificationService, ClassificationServiceError};

pub struct ClassifierClient {
    service: Arc<dyn ClassificationService>,
    deadline: Duration,
}

impl ClassifierClient {
    pub fn new(service: Arc<dyn ClassificationService>, deadline: Duration) -> Self {
        Self { service, deadline }
    }

    /// Classify `content`.
    ///
    /// Returns `InvalidInput` for blank content; never fails otherwise.
    pub async fn classify(&self, content: &str) -> Result<ClassificationResult> {
        if content.trim().is_empty() {
            return Err(BenchError::invalid("no content to classify"));
        }
        METRICS.inc_classifications();

        let outcome = match tokio::time::timeout(self.deadline, self.service.classify(content)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ClassificationServiceError::Timeout),
        };

        let result = match outcome {
            Ok(raw) => raw.normalized(),
            Err(err) => {
                METRICS.inc_classification_fallbacks();
                obs::emit_classification_fallback(&err);
                ClassificationResult::unrelated()
            }
        };
        obs::emit_submission_classified(
            &result.content_type,
            result.confidence_score,
            result.is_relevant,
        );
        Ok(result)
    }
}
