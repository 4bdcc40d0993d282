//! The pipeline facade the surrounding application talks to.
//!
//! [`Pipeline`] wires the classifier, catalog, orchestrator and evaluation
//! engine together and exposes `submit`, `dispatch_generation` and
//! `evaluate`. Session state (the agent selection) is a value the caller
//! owns; see [`Pipeline::selector`].

use std::sync::Arc;

use agentbench_state::{HistoryRecord, HistoryStore, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::catalog::AgentCatalog;
use crate::classifier::ClassifierClient;
use crate::config::PipelineConfig;
use crate::domain::{
    validate_text, BenchError, ClassificationResult, ContentSubmission, Evaluation,
    GenerationResult, GenerationTask, RawScore, Result,
};
use crate::evaluation;
use crate::obs::{self, PipelineSpan};
use crate::orchestrator::GenerationOrchestrator;
use crate::selector::AgentSelector;
use crate::services::{
    ClassificationService, DocumentExtractor, GenerationBackend, HttpServices,
};

/// Outcome of [`Pipeline::run`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub category: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<GenerationResult>,
    pub evaluation: Evaluation,
    /// Set when a history store is attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

pub struct Pipeline {
    config: PipelineConfig,
    catalog: Arc<AgentCatalog>,
    classifier: ClassifierClient,
    extractor: Arc<dyn DocumentExtractor>,
    orchestrator: GenerationOrchestrator,
    history: Option<Arc<dyn HistoryStore>>,
}

impl Pipeline {
    /// Build a pipeline over explicit service implementations.
    pub fn new(
        config: PipelineConfig,
        catalog: Arc<AgentCatalog>,
        classification: Arc<dyn ClassificationService>,
        extraction: Arc<dyn DocumentExtractor>,
        generation: Arc<dyn GenerationBackend>,
    ) -> Result<Self> {
        config.validate()?;
        let classifier = ClassifierClient::new(classification, config.classify_timeout());
        let orchestrator = GenerationOrchestrator::new(generation, Arc::clone(&catalog));
        Ok(Self {
            config,
            catalog,
            classifier,
            extractor: extraction,
            orchestrator,
            history: None,
        })
    }

    /// Build a pipeline that talks HTTP to the configured services.
    ///
    /// When `config.catalog_path` is set, the catalog there is loaded and
    /// installed as the process-wide catalog (which fails if one is already
    /// installed). Otherwise the process-wide catalog is used as is.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => AgentCatalog::install_global(AgentCatalog::from_toml_file(path)?)?,
            None => AgentCatalog::global(),
        };
        let services = Arc::new(HttpServices::new(config.services.clone())?);
        Self::new(
            config,
            catalog,
            services.clone(),
            services.clone(),
            services,
        )
    }

    /// Attach the store `run` records history into.
    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<AgentCatalog> {
        &self.catalog
    }

    /// A fresh selector for one session, pre-seeded with the classifier's
    /// suggestion when there is one.
    pub fn selector(&self, classification: Option<&ClassificationResult>) -> AgentSelector {
        match classification {
            Some(classification) => {
                AgentSelector::with_classification(Arc::clone(&self.catalog), classification)
            }
            None => AgentSelector::new(Arc::clone(&self.catalog)),
        }
    }

    /// Resolve a submission to text, extracting documents first.
    pub async fn submission_text(&self, submission: &ContentSubmission) -> Result<String> {
        match submission {
            ContentSubmission::Text(text) => validate_text(text, self.config.max_content_chars),
            ContentSubmission::Document(document) => {
                document.validate()?;
                let extracted = self.extractor.extract(document).await.map_err(|err| {
                    BenchError::invalid(format!(
                        "document extraction failed for {}: {err}",
                        document.file_name
                    ))
                })?;
                match extracted {
                    Some(text) if !text.trim().is_empty() => {
                        validate_text(&text, self.config.max_content_chars)
                    }
                    _ => Err(BenchError::invalid(format!(
                        "no text could be extracted from {}",
                        document.file_name
                    ))),
                }
            }
        }
    }

    /// Classify a submission.
    ///
    /// Fails only on invalid input; classification service failures resolve
    /// to the unrelated default.
    pub async fn submit(&self, submission: &ContentSubmission) -> Result<ClassificationResult> {
        async {
            let text = self.submission_text(submission).await?;
            self.classifier.classify(&text).await
        }
        .instrument(obs::pipeline_span("submit", "-"))
        .await
    }

    /// Fan `task` out to its agents.
    pub async fn dispatch_generation(&self, task: &GenerationTask) -> Result<Vec<GenerationResult>> {
        self.orchestrator
            .generate(task, &self.config.dispatch())
            .instrument(obs::pipeline_span("generate", task.category()))
            .await
    }

    /// Validate, aggregate and rank externally supplied scores.
    pub fn evaluate(&self, raw: Vec<RawScore>) -> Result<Evaluation> {
        evaluation::evaluate(evaluation::score_raw(raw)?)
    }

    /// Score generation results with the built-in rubric, then aggregate.
    pub fn evaluate_results(&self, results: &[GenerationResult]) -> Result<Evaluation> {
        evaluation::evaluate(evaluation::score_results(results))
    }

    /// Dispatch, evaluate and record one task for `user`.
    ///
    /// History is written exactly once, after dispatch and evaluation have
    /// both succeeded. A failed write surfaces as `BenchError::History`.
    pub async fn run(
        &self,
        user: &str,
        task: &GenerationTask,
        classification: Option<&ClassificationResult>,
    ) -> Result<PipelineRun> {
        if user.trim().is_empty() {
            return Err(BenchError::invalid("user must not be empty"));
        }
        let started_at = Utc::now();
        let results = self.dispatch_generation(task).await?;
        let evaluation = {
            let _span = PipelineSpan::enter("evaluate", task.category());
            self.evaluate_results(&results)?
        };

        let record_id = match &self.history {
            Some(history) => {
                let id = self
                    .record_history(history.as_ref(), user, task, classification, &results, &evaluation)
                    .await?;
                Some(id.to_string())
            }
            None => None,
        };

        Ok(PipelineRun {
            category: task.category().to_string(),
            started_at,
            finished_at: Utc::now(),
            results,
            evaluation,
            record_id,
        })
    }

    async fn record_history(
        &self,
        history: &dyn HistoryStore,
        user: &str,
        task: &GenerationTask,
        classification: Option<&ClassificationResult>,
        results: &[GenerationResult],
        evaluation: &Evaluation,
    ) -> Result<RecordId> {
        let mut record = HistoryRecord::new(
            user,
            task.category(),
            serde_json::to_value(results)?,
            serde_json::to_value(&evaluation.scores)?,
            serde_json::to_value(&evaluation.stats)?,
        );
        if let Some(classification) = classification {
            record = record.with_classification(serde_json::to_value(classification)?);
        }
        let id = history.record(record).await?;
        obs::emit_history_recorded(user, &id.to_string());
        Ok(id)
    }

    /// The most recent aggregate statistics recorded for `user`, if any.
    pub async fn last_stats(&self, user: &str) -> Result<Option<crate::domain::AggregateStats>> {
        let Some(history) = &self.history else {
            return Ok(None);
        };
        match history.latest_stats(user).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}
