//! Domain-level error taxonomy for agentbench.
//!
//! Only failures that make a whole request meaningless live here. Failures
//! local to one agent or one classification call are represented as data
//! (see `AgentCallError`, `ScoreWarning` and the fail-open classifier).

/// agentbench domain errors.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("agent {agent_id} is not registered in category {category}")]
    UnknownAgent { category: String, agent_id: String },

    #[error("generation batch rejected (status {status}): {detail}")]
    BatchDispatch { status: u16, detail: String },

    #[error("no valid evaluation scores to aggregate")]
    NoValidScores,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("history error: {0}")]
    History(#[from] agentbench_state::HistoryError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BenchError {
    /// Shorthand for `InvalidInput` from anything string-like.
    pub fn invalid(msg: impl Into<String>) -> Self {
        BenchError::InvalidInput(msg.into())
    }
}

/// Result type for agentbench domain operations.
pub type Result<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bench_error_display() {
        let err = BenchError::invalid("content must not be empty");
        assert!(err.to_string().contains("invalid input"));

        let err = BenchError::UnknownCategory("poetry".to_string());
        assert_eq!(err.to_string(), "unknown category: poetry");
    }

    #[test]
    fn test_batch_dispatch_error_carries_status() {
        let err = BenchError::BatchDispatch {
            status: 400,
            detail: "Input must be a list of requests".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("Input must be a list"));
    }

    #[test]
    fn test_unknown_agent_names_both_keys() {
        let err = BenchError::UnknownAgent {
            category: "blog".to_string(),
            agent_id: "9".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("blog"));
        assert!(msg.contains('9'));
    }
}
