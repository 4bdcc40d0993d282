//! Structured observability hooks for pipeline lifecycle events.
//!
//! Events are emitted at `info!` (failures at `warn!`) with an `event`
//! field naming them, so they can be filtered in JSON log output.

use tracing::{info, warn};

/// RAII guard that enters a pipeline-scoped tracing span.
///
/// ```ignore
/// let _span = PipelineSpan::enter("dispatch", "blog");
/// // tracing calls below carry stage = "dispatch", category = "blog"
/// ```
pub struct PipelineSpan {
    _span: tracing::span::EnteredSpan,
}

impl PipelineSpan {
    pub fn enter(stage: &str, category: &str) -> Self {
        Self {
            _span: pipeline_span(stage, category).entered(),
        }
    }
}

/// The span [`PipelineSpan`] enters, for instrumenting futures.
pub fn pipeline_span(stage: &str, category: &str) -> tracing::Span {
    tracing::info_span!("agentbench.pipeline", stage = %stage, category = %category)
}

/// Emit event: a submission was classified.
pub fn emit_submission_classified(content_type: &str, confidence: f64, is_relevant: bool) {
    info!(
        event = "submission.classified",
        content_type = %content_type,
        confidence = confidence,
        is_relevant = is_relevant,
    );
}

/// Emit event: classification failed and the unrelated default was used.
pub fn emit_classification_fallback(error: &dyn std::fmt::Display) {
    warn!(event = "classification.fallback", error = %error);
}

/// Emit event: a fan-out started.
pub fn emit_generation_dispatched(category: &str, agents: usize, max_concurrency: usize) {
    info!(
        event = "generation.dispatched",
        category = %category,
        agents = agents,
        max_concurrency = max_concurrency,
    );
}

/// Emit event: one agent call settled.
pub fn emit_agent_settled(agent_id: &str, elapsed_ms: u64, error: Option<&dyn std::fmt::Display>) {
    match error {
        None => info!(
            event = "generation.agent_settled",
            agent_id = %agent_id,
            elapsed_ms = elapsed_ms,
            success = true,
        ),
        Some(error) => warn!(
            event = "generation.agent_settled",
            agent_id = %agent_id,
            elapsed_ms = elapsed_ms,
            success = false,
            error = %error,
        ),
    }
}

/// Emit event: every agent call in a fan-out settled.
pub fn emit_generation_finished(category: &str, succeeded: usize, failed: usize, duration_ms: u64) {
    info!(
        event = "generation.finished",
        category = %category,
        succeeded = succeeded,
        failed = failed,
        duration_ms = duration_ms,
    );
}

/// Emit event: a score entry was dropped for disagreeing criteria.
pub fn emit_schema_mismatch(warning: &dyn std::fmt::Display) {
    warn!(event = "evaluation.schema_mismatch", detail = %warning);
}

/// Emit event: aggregate stats computed.
pub fn emit_evaluation_aggregated(total: usize, avg_score: f64, highest_score: f64) {
    info!(
        event = "evaluation.aggregated",
        total_evaluations = total,
        avg_score = avg_score,
        highest_score = highest_score,
    );
}

/// Emit event: a history record was written.
pub fn emit_history_recorded(user: &str, record_id: &str) {
    info!(event = "history.recorded", user = %user, record_id = %record_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_span_create() {
        let _span = PipelineSpan::enter("dispatch", "blog");
        emit_agent_settled("1", 10, None);
        emit_agent_settled("2", 10, Some(&"timeout" as &dyn std::fmt::Display));
    }
}
