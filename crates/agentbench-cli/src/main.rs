//! agentbench - classify content, fan a task out to candidate agents, score
//! what comes back.
//!
//! ## Commands
//!
//! - `agents`: List catalog categories and their agents
//! - `classify`: Classify text or a document
//! - `generate`: Dispatch one prompt to several agents in a category
//! - `evaluate`: Aggregate and rank a file of externally supplied scores
//! - `run`: Generate, score with the built-in rubric, and record history

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, Level};

use agentbench_core::{
    parse_raw_scores, AgentCatalog, ContentSubmission, GenerationTask, Pipeline, PipelineConfig,
    PipelineRun, METRICS,
};
use agentbench_state::MemoryHistoryStore;

#[derive(Parser)]
#[command(name = "agentbench")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compare content-generation agents side by side", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Pipeline config file (TOML); environment defaults apply otherwise
    #[arg(short, long, global = true, env = "AGENTBENCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog categories and their agents
    Agents {
        /// Only show this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Classify text or a document and suggest a category
    Classify {
        /// Inline text to classify
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// Document to extract and classify
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Dispatch one prompt to several agents of a category
    Generate {
        #[arg(long)]
        category: String,

        /// Agent id (repeatable, order is kept)
        #[arg(long = "agent", required = true)]
        agents: Vec<String>,

        #[arg(long)]
        prompt: String,
    },

    /// Aggregate and rank scores from a JSON file
    Evaluate {
        /// `{"evaluations": [...]}` or a bare array of `{id, scores}`
        #[arg(long)]
        scores: PathBuf,
    },

    /// Generate and score with the built-in rubric
    ///
    /// The run is recorded into an in-memory history that only lives for
    /// this invocation, so no record id is printed.
    Run {
        #[arg(long)]
        category: String,

        /// Agent id (repeatable, order is kept)
        #[arg(long = "agent", required = true)]
        agents: Vec<String>,

        #[arg(long)]
        prompt: String,

        /// User the run is recorded under
        #[arg(long, default_value = "local")]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    agentbench_core::init_tracing(cli.json, level);

    let config = load_config(cli.config.as_deref())?;
    let pipeline = Pipeline::from_config(config).context("Failed to set up pipeline")?;

    let outcome = match cli.command {
        Commands::Agents { category } => cmd_agents(pipeline.catalog(), category.as_deref()),
        Commands::Classify { text, file } => cmd_classify(&pipeline, text, file.as_deref()).await,
        Commands::Generate {
            category,
            agents,
            prompt,
        } => cmd_generate(&pipeline, &category, &agents, &prompt).await,
        Commands::Evaluate { scores } => cmd_evaluate(&pipeline, &scores),
        Commands::Run {
            category,
            agents,
            prompt,
            user,
        } => cmd_run(pipeline, &category, &agents, &prompt, &user).await,
    };

    METRICS.flush();
    outcome
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            let config = PipelineConfig::from_env();
            config.validate().context("Invalid configuration from environment")?;
            Ok(config)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct CategoryListing<'a> {
    category: &'a str,
    aliases: &'a [String],
    agents: &'a [agentbench_core::AgentDescriptor],
}

fn cmd_agents(catalog: &AgentCatalog, category: Option<&str>) -> Result<()> {
    let listings = catalog
        .categories()
        .iter()
        .filter(|entry| category.map_or(true, |c| entry.name == c))
        .map(|entry| CategoryListing {
            category: &entry.name,
            aliases: &entry.aliases,
            agents: &entry.agents,
        })
        .collect::<Vec<_>>();

    if let (Some(category), true) = (category, listings.is_empty()) {
        bail!("Unknown category '{}'", category);
    }
    print_json(&listings)
}

#[derive(Serialize)]
struct ClassifyOutput {
    #[serde(flatten)]
    classification: agentbench_core::ClassificationResult,
    suggested_category: Option<String>,
}

async fn cmd_classify(pipeline: &Pipeline, text: Option<String>, file: Option<&Path>) -> Result<()> {
    let submission = match (text, file) {
        (Some(text), _) => ContentSubmission::text(text),
        (None, Some(path)) => ContentSubmission::from_path(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => bail!("Pass --text or --file"),
    };

    let classification = pipeline.submit(&submission).await?;
    let suggested_category = pipeline
        .selector(Some(&classification))
        .suggested_category()
        .map(str::to_string);
    info!(
        content_type = %classification.content_type,
        suggested = ?suggested_category,
        "Classified submission"
    );

    print_json(&ClassifyOutput {
        classification,
        suggested_category,
    })
}

async fn cmd_generate(
    pipeline: &Pipeline,
    category: &str,
    agents: &[String],
    prompt: &str,
) -> Result<()> {
    let task = GenerationTask::new(category, agents, prompt)?;
    let results = pipeline
        .dispatch_generation(&task)
        .await
        .context("Generation failed")?;
    print_json(&results)
}

fn cmd_evaluate(pipeline: &Pipeline, scores: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(scores)
        .with_context(|| format!("Failed to read scores from {}", scores.display()))?;
    let raw = parse_raw_scores(&raw).context("Failed to parse scores")?;
    let evaluation = pipeline.evaluate(raw)?;
    print_json(&evaluation)
}

async fn cmd_run(
    pipeline: Pipeline,
    category: &str,
    agents: &[String],
    prompt: &str,
    user: &str,
) -> Result<()> {
    let history = Arc::new(MemoryHistoryStore::new());
    let pipeline = pipeline.with_history(history);

    let task = GenerationTask::new(category, agents, prompt)?;
    let run = pipeline.run(user, &task, None).await.context("Run failed")?;
    info!(
        best = ?run.evaluation.scores.first().map(|s| &s.agent_id),
        "Run finished"
    );
    print_json(&without_record_id(run))
}

/// Record ids from the per-invocation history are meaningless once the
/// process exits.
fn without_record_id(mut run: PipelineRun) -> PipelineRun {
    run.record_id = None;
    run
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_repeated_agents_in_order() {
        let cli = Cli::try_parse_from([
            "agentbench",
            "--json",
            "generate",
            "--category",
            "blog",
            "--agent",
            "3",
            "--agent",
            "1",
            "--prompt",
            "hello",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Generate { agents, .. } => assert_eq!(agents, vec!["3", "1"]),
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_classify_requires_text_or_file() {
        assert!(Cli::try_parse_from(["agentbench", "classify"]).is_err());
        assert!(Cli::try_parse_from(["agentbench", "classify", "--text", "a", "--file", "b"]).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agentbench.toml");
        std::fs::write(
            &path,
            "max_concurrency = 2\n[services]\nbase_url = \"http://example.test\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.services.base_url, "http://example.test");
    }

    #[test]
    fn test_load_config_rejects_zero_concurrency() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "max_concurrency = 0\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_agents_unknown_category_fails() {
        let catalog = AgentCatalog::builtin();
        assert!(cmd_agents(&catalog, Some("blog")).is_ok());
        assert!(cmd_agents(&catalog, Some("podcast")).is_err());
    }

    #[test]
    fn test_run_output_omits_record_id() {
        let run: PipelineRun = serde_json::from_value(serde_json::json!({
            "category": "blog",
            "started_at": "2026-01-05T10:00:00Z",
            "finished_at": "2026-01-05T10:00:02Z",
            "results": [],
            "evaluation": {
                "scores": [],
                "stats": {
                    "avg_score": 3.0,
                    "highest_score": 3.0,
                    "total_evaluations": 1,
                    "category_count": 5
                },
                "warnings": []
            },
            "record_id": "0b0e6f1c"
        }))
        .unwrap();
        assert!(run.record_id.is_some());

        let value = serde_json::to_value(without_record_id(run)).unwrap();
        assert!(value.get("record_id").is_none());
        assert_eq!(value["category"], "blog");
    }

    #[tokio::test]
    async fn test_evaluate_reads_scores_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(
            &path,
            r#"[{"id": "1", "scores": {"clarity": 4, "depth": 2}}, {"id": "2", "scores": {"clarity": 5, "depth": 5}}]"#,
        )
        .unwrap();
        let pipeline = Pipeline::from_config(PipelineConfig {
            catalog_path: None,
            ..PipelineConfig::default()
        })
        .unwrap();

        assert!(cmd_evaluate(&pipeline, &path).is_ok());
        assert!(cmd_evaluate(&pipeline, &dir.path().join("missing.json")).is_err());
    }
}
