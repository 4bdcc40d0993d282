//! End-to-end fan-out behaviour through the `Pipeline` facade.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agentbench_core::{
    AgentCallError, AgentCatalog, BenchError, ClassificationResult, ClassificationService,
    ClassificationServiceError, DocumentExtractor, ExtractionError, GenerationBackend,
    GenerationRequest, GenerationTask, Pipeline, PipelineConfig, UploadedDocument,
};
use async_trait::async_trait;

/// Per-agent scripted behaviour: sleep, then answer.
#[derive(Default)]
struct ScriptedBackend {
    script: HashMap<String, (u64, Result<String, AgentCallError>)>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn with(mut self, id: &str, delay_ms: u64, outcome: Result<&str, AgentCallError>) -> Self {
        self.script
            .insert(id.to_string(), (delay_ms, outcome.map(str::to_string)));
        self
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AgentCallError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (delay_ms, outcome) = self
            .script
            .get(&request.id)
            .cloned()
            .unwrap_or((10, Ok(format!("## {}\n\nContent for {}.", request.id, request.input))));
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        outcome
    }
}

struct NoClassifier;

#[async_trait]
impl ClassificationService for NoClassifier {
    async fn classify(&self, _: &str) -> Result<ClassificationResult, ClassificationServiceError> {
        Err(ClassificationServiceError::Transport("offline".to_string()))
    }
}

struct NoExtractor;

#[async_trait]
impl DocumentExtractor for NoExtractor {
    async fn extract(&self, _: &UploadedDocument) -> Result<Option<String>, ExtractionError> {
        Ok(None)
    }
}

fn pipeline(backend: Arc<ScriptedBackend>, timeout_ms: u64, max_concurrency: usize) -> Pipeline {
    let config = PipelineConfig {
        timeout_per_call_ms: timeout_ms,
        max_concurrency,
        ..PipelineConfig::default()
    };
    Pipeline::new(
        config,
        Arc::new(AgentCatalog::builtin()),
        Arc::new(NoClassifier),
        Arc::new(NoExtractor),
        backend,
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn timed_out_agent_keeps_its_slot() {
    let backend = Arc::new(
        ScriptedBackend::default()
            .with("1", 10_000, Ok("late"))
            .with("2", 50, Ok("## Draft\n\nOn time.")),
    );
    let pipeline = pipeline(backend, 200, 4);
    let task = GenerationTask::new("blog", ["1", "2"], "write about rust").unwrap();

    let results = pipeline.dispatch_generation(&task).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].agent_id, "1");
    assert_eq!(results[0].content, None);
    assert_eq!(results[0].response_time_ms, None);
    assert_eq!(results[0].error.as_deref(), Some("timeout"));
    assert_eq!(results[1].agent_id, "2");
    assert_eq!(results[1].content.as_deref(), Some("## Draft\n\nOn time."));
    assert!(results[1].error.is_none());
}

#[tokio::test(start_paused = true)]
async fn results_follow_task_order_for_any_size() {
    for k in 0..=4usize {
        // Later agents finish first.
        let mut backend = ScriptedBackend::default();
        for i in 1..=k {
            let delay = (k + 1 - i) as u64 * 20;
            backend = backend.with(&i.to_string(), delay, Ok("body text"));
        }
        let backend = Arc::new(backend);
        let pipeline = pipeline(Arc::clone(&backend), 1_000, 2);
        let ids: Vec<String> = (1..=k).map(|i| i.to_string()).collect();
        let task = GenerationTask::new("travel", ids.clone(), "plan a week in Lisbon").unwrap();

        let results = pipeline.dispatch_generation(&task).await.unwrap();

        let got: Vec<String> = results.iter().map(|r| r.agent_id.clone()).collect();
        assert_eq!(got, ids, "k = {k}");
        assert_eq!(backend.calls.load(Ordering::SeqCst), k);
    }
}

#[tokio::test(start_paused = true)]
async fn agent_errors_are_isolated() {
    let backend = Arc::new(
        ScriptedBackend::default()
            .with("1", 5, Err(AgentCallError::Agent("model overloaded".to_string())))
            .with(
                "3",
                5,
                Err(AgentCallError::Upstream {
                    status: 502,
                    body: "bad gateway".to_string(),
                }),
            ),
    );
    let pipeline = pipeline(backend, 1_000, 4);
    let task = GenerationTask::new("linkedin", ["1", "2", "3"], "announce a launch").unwrap();

    let results = pipeline.dispatch_generation(&task).await.unwrap();

    assert_eq!(results[0].error.as_deref(), Some("model overloaded"));
    assert!(results[1].is_success());
    assert!(results[2]
        .error
        .as_deref()
        .is_some_and(|e| e.contains("502")));
}

#[tokio::test(start_paused = true)]
async fn rejected_request_shape_fails_the_whole_dispatch() {
    let backend = Arc::new(ScriptedBackend::default().with(
        "2",
        5,
        Err(AgentCallError::Rejected {
            status: 422,
            body: "input missing".to_string(),
        }),
    ));
    let pipeline = pipeline(backend, 1_000, 4);
    let task = GenerationTask::new("youtube", ["1", "2"], "summarise this talk").unwrap();

    let err = pipeline.dispatch_generation(&task).await.unwrap_err();

    assert!(matches!(err, BenchError::BatchDispatch { status: 422, .. }));
}

#[tokio::test(start_paused = true)]
async fn unknown_agent_is_rejected_before_dispatch() {
    let backend = Arc::new(ScriptedBackend::default());
    let pipeline = pipeline(Arc::clone(&backend), 1_000, 4);
    let task = GenerationTask::new("blog", ["1", "9"], "anything").unwrap();

    let err = pipeline.dispatch_generation(&task).await.unwrap_err();

    assert!(matches!(err, BenchError::UnknownAgent { .. }));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);

    let task = GenerationTask::new("podcast", ["1"], "anything").unwrap();
    let err = pipeline.dispatch_generation(&task).await.unwrap_err();
    assert!(matches!(err, BenchError::UnknownCategory(_)));
}

#[tokio::test(start_paused = true)]
async fn selector_output_feeds_dispatch() {
    let backend = Arc::new(ScriptedBackend::default());
    let pipeline = pipeline(backend, 1_000, 4);
    let mut selector = pipeline.selector(None);
    selector.toggle("3", "blog").unwrap();
    selector.toggle("1", "blog").unwrap();
    let task = selector.into_task("compare async runtimes").unwrap();

    let results = pipeline.dispatch_generation(&task).await.unwrap();

    let ids: Vec<&str> = results.iter().map(|r| r.agent_id.as_str()).collect();
    assert_eq!(ids, vec!["3", "1"]);
    assert!(results.iter().all(|r| r.is_success()));
}
