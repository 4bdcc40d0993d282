//! Domain models for agentbench.
//!
//! Canonical definitions for the values that flow through one pipeline
//! invocation:
//! - `ContentSubmission`: raw text or an uploaded document
//! - `ClassificationResult`: category judgment for a submission
//! - `GenerationTask` / `GenerationResult`: fan-out request and per-agent outcome
//! - `EvaluationScore` / `AggregateStats`: scoring and cross-agent statistics

pub mod classification;
pub mod error;
pub mod evaluation;
pub mod generation;
pub mod submission;

// Re-export main types and errors
pub use classification::{ClassificationResult, FALLBACK_AGENTS, UNRELATED};
pub use error::{BenchError, Result};
pub use evaluation::{AggregateStats, Evaluation, EvaluationScore, RawScore, ScoreWarning};
pub use generation::{AgentCallError, GenerationResult, GenerationTask};
pub use submission::{validate_text, ContentSubmission, UploadedDocument, DEFAULT_MAX_CONTENT_CHARS};
