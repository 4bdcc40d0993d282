//! Pipeline configuration.
//!
//! Defaults come from the environment (`AGENTBENCH_*`), and a TOML file can
//! override any field. Unset fields in the file fall back to those defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{BenchError, Result, DEFAULT_MAX_CONTENT_CHARS};

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_MAX_CONCURRENCY: usize = 4;

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = DEFAULT_TIMEOUT_MS * 2;

/// Read `key` from the environment. Unparseable values are logged and
/// replaced by `default`.
fn env_or<T: std::str::FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    let Ok(raw) = std::env::var(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(key, value = %raw, default = %default, "ignoring unparseable environment value");
            default
        }
    }
}

/// Where the external services live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub classify_path: String,
    pub generate_path: String,
    pub extract_path: String,
    /// Transport-level timeout for any single HTTP request.
    pub request_timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            request_timeout_ms: env_or("AGENTBENCH_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS),
            ..ServiceConfig::new(
                &std::env::var("AGENTBENCH_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            )
        }
    }
}

impl ServiceConfig {
    /// Config for a specific server with the standard endpoint paths.
    pub fn new(base_url: &str) -> Self {
        ServiceConfig {
            base_url: base_url.to_string(),
            classify_path: "/gemini".to_string(),
            generate_path: "/generate_content".to_string(),
            extract_path: "/parse-with-llama".to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    /// Join the base URL and an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Dispatch limits for one fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Deadline applied independently to every agent call.
    pub timeout_per_call: Duration,
    /// Maximum number of agent calls in flight at once.
    pub max_concurrency: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_per_call: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl DispatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(BenchError::Config("max_concurrency must be at least 1".to_string()));
        }
        if self.timeout_per_call.is_zero() {
            return Err(BenchError::Config("timeout_per_call must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Top-level configuration for a [`Pipeline`](crate::pipeline::Pipeline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub services: ServiceConfig,
    pub timeout_per_call_ms: u64,
    pub max_concurrency: usize,
    pub max_content_chars: usize,
    /// Deadline for one classification call.
    pub classify_timeout_ms: u64,
    /// Optional TOML catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            services: ServiceConfig::default(),
            timeout_per_call_ms: env_or("AGENTBENCH_TIMEOUT_MS", DEFAULT_TIMEOUT_MS),
            max_concurrency: env_or("AGENTBENCH_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY),
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
            classify_timeout_ms: env_or("AGENTBENCH_CLASSIFY_TIMEOUT_MS", DEFAULT_TIMEOUT_MS / 2),
            catalog_path: std::env::var("AGENTBENCH_CATALOG").ok().map(PathBuf::from),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: PipelineConfig =
            toml::from_str(raw).map_err(|e| BenchError::Config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.services.base_url.trim().is_empty() {
            return Err(BenchError::Config("services.base_url must not be empty".to_string()));
        }
        if self.max_content_chars == 0 {
            return Err(BenchError::Config("max_content_chars must be at least 1".to_string()));
        }
        if self.classify_timeout_ms == 0 {
            return Err(BenchError::Config("classify_timeout_ms must be non-zero".to_string()));
        }
        self.dispatch().validate()
    }

    pub fn dispatch(&self) -> DispatchConfig {
        DispatchConfig {
            timeout_per_call: Duration::from_millis(self.timeout_per_call_ms),
            max_concurrency: self.max_concurrency,
        }
    }

    pub fn classify_timeout(&self) -> Duration {
        Duration::from_millis(self.classify_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = ServiceConfig::new("http://api.local/");
        assert_eq!(config.url("/gemini"), "http://api.local/gemini");
        assert_eq!(config.url("generate_content"), "http://api.local/generate_content");
    }

    #[test]
    fn test_new_uses_fixed_request_timeout() {
        let config = ServiceConfig::new("http://api.local");
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
    }

    #[test]
    fn test_unparseable_env_value_falls_back_to_default() {
        std::env::set_var("AGENTBENCH_TEST_CONCURRENCY_GARBAGE", "abc");
        std::env::set_var("AGENTBENCH_TEST_CONCURRENCY_VALID", " 7 ");
        assert_eq!(env_or("AGENTBENCH_TEST_CONCURRENCY_GARBAGE", 4usize), 4);
        assert_eq!(env_or("AGENTBENCH_TEST_CONCURRENCY_VALID", 4usize), 7);
        assert_eq!(env_or("AGENTBENCH_TEST_CONCURRENCY_UNSET", 3usize), 3);
    }

    #[test]
    fn test_toml_overrides_selected_fields() {
        let config = PipelineConfig::from_toml_str(
            r#"
            timeout_per_call_ms = 200
            max_concurrency = 2

            [services]
            base_url = "http://gen.internal:8080"
            "#,
        )
        .unwrap();

        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.dispatch().timeout_per_call, Duration::from_millis(200));
        assert_eq!(config.services.base_url, "http://gen.internal:8080");
        assert_eq!(config.services.classify_path, "/gemini");
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = PipelineConfig::from_toml_str("max_concurrency = 0").unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dispatch = DispatchConfig {
            timeout_per_call: Duration::ZERO,
            max_concurrency: 1,
        };
        assert!(dispatch.validate().is_err());
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let err = PipelineConfig::from_toml_str("[services]\nbase_url = \"\"").unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agentbench.toml");
        std::fs::write(&path, "max_content_chars = 10\n").unwrap();
        let config = PipelineConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.max_content_chars, 10);
    }
}
