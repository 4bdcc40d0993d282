//! agentbench core library
//!
//! Classify submitted content, fan one task out to several candidate
//! generation agents, then score and rank what came back.

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod evaluation;
pub mod metrics;
pub mod obs;
pub mod orchestrator;
pub mod pipeline;
pub mod selector;
pub mod services;
pub mod telemetry;

pub use catalog::{AgentCatalog, AgentDescriptor, AgentKey, CategoryEntry};
pub use classifier::ClassifierClient;
pub use config::{DispatchConfig, PipelineConfig, ServiceConfig};

pub use domain::{
    AgentCallError, AggregateStats, BenchError, ClassificationResult, ContentSubmission,
    Evaluation, EvaluationScore, GenerationResult, GenerationTask, RawScore, Result, ScoreWarning,
    UploadedDocument, FALLBACK_AGENTS, UNRELATED,
};

pub use evaluation::{aggregate, parse_raw_scores, rank, score_raw, score_results, ValidatedBatch};
pub use orchestrator::GenerationOrchestrator;
pub use pipeline::{Pipeline, PipelineRun};
pub use selector::{AgentSelector, Selection, ToggleOutcome};
pub use services::{
    ClassificationService, ClassificationServiceError, DocumentExtractor, ExtractionError,
    GenerationBackend, GenerationRequest, HttpServices,
};

pub use metrics::METRICS;
pub use obs::PipelineSpan;
pub use telemetry::init_tracing;

pub use agentbench_state::{HistoryRecord, HistoryStore, MemoryHistoryStore, RecordId};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
