//! Bounded, order-preserving fan-out of one task to several agents.
//!
//! Every agent call runs in its own tokio task behind a semaphore sized to
//! `max_concurrency`; excess calls queue until a permit frees up. Each call
//! has its own deadline, measured from the moment it gets a permit. A slow
//! or failing agent only affects its own [`GenerationResult`].
//!
//! Completed outcomes are written into a slot vector indexed by the agent's
//! position in the task, so the returned list always follows
//! `GenerationTask::agent_ids` regardless of completion order.
//!
//! If the caller stops awaiting `generate` (e.g. the session went away),
//! the spawned calls keep running until they settle or time out and their
//! results are dropped.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::{Mutex, Semaphore};
use tracing::{instrument, warn};

use crate::catalog::AgentCatalog;
use crate::config::DispatchConfig;
use crate::domain::{AgentCallError, BenchError, GenerationResult, GenerationTask, Result};
use crate::metrics::METRICS;
use crate::obs;
use crate::services::{GenerationBackend, GenerationRequest};

/// What one slot ends up holding.
type Outcome = std::result::Result<(String, u64), AgentCallError>;

pub struct GenerationOrchestrator {
    backend: Arc<dyn GenerationBackend>,
    catalog: Arc<AgentCatalog>,
}

impl GenerationOrchestrator {
    pub fn new(backend: Arc<dyn GenerationBackend>, catalog: Arc<AgentCatalog>) -> Self {
        Self { backend, catalog }
    }

    /// Dispatch `task` to every agent it names and wait for all of them.
    ///
    /// Returns exactly one result per agent id, in task order. Fails as a
    /// whole only when the category or an agent id does not resolve (checked
    /// before anything is sent) or when the generation service rejects the
    /// request shape ([`BenchError::BatchDispatch`]).
    #[instrument(skip(self, task, config), fields(category = %task.category(), agents = task.agent_ids().len()))]
    pub async fn generate(
        &self,
        task: &GenerationTask,
        config: &DispatchConfig,
    ) -> Result<Vec<GenerationResult>> {
        config.validate()?;
        self.catalog.agents_for(task.category())?;
        for agent_id in task.agent_ids() {
            self.catalog.agent(task.category(), agent_id)?;
        }

        let agent_count = task.agent_ids().len();
        if agent_count == 0 {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        obs::emit_generation_dispatched(task.category(), agent_count, config.max_concurrency);

        let slots: Arc<Mutex<Vec<Option<Outcome>>>> = Arc::new(Mutex::new(vec![None; agent_count]));
        let sem = Arc::new(Semaphore::new(config.max_concurrency));
        let timeout_per_call = config.timeout_per_call;

        let mut tasks = Vec::with_capacity(agent_count);
        for (index, agent_id) in task.agent_ids().iter().enumerate() {
            let backend = Arc::clone(&self.backend);
            let slots = Arc::clone(&slots);
            let sem = Arc::clone(&sem);
            let request = GenerationRequest {
                id: agent_id.clone(),
                category: task.category().to_string(),
                input: task.prompt_text().to_string(),
            };

            tasks.push(tokio::spawn(async move {
                // Acquire only fails on a closed semaphore; this one is never closed.
                let _permit = sem.acquire_owned().await.ok();
                METRICS.inc_agent_calls();

                let call_started = Instant::now();
                let outcome: Outcome =
                    match tokio::time::timeout(timeout_per_call, backend.generate(&request)).await {
                        Ok(Ok(content)) => Ok((content, call_started.elapsed().as_millis() as u64)),
                        Ok(Err(err)) => Err(err),
                        Err(_) => Err(AgentCallError::Timeout),
                    };
                let elapsed_ms = call_started.elapsed().as_millis() as u64;

                match &outcome {
                    Ok(_) => obs::emit_agent_settled(&request.id, elapsed_ms, None),
                    Err(err) => {
                        METRICS.inc_agent_failures();
                        if *err == AgentCallError::Timeout {
                            METRICS.inc_agent_timeouts();
                        }
                        obs::emit_agent_settled(
                            &request.id,
                            elapsed_ms,
                            Some(err as &dyn std::fmt::Display),
                        );
                    }
                }

                let mut guard = slots.lock().await;
                if guard[index].is_some() {
                    warn!(agent_id = %request.id, index, "result slot already written");
                } else {
                    guard[index] = Some(outcome);
                }
            }));
        }

        for joined in join_all(tasks).await {
            if let Err(e) = joined {
                warn!(error = %e, "agent task did not complete");
            }
        }

        let outcomes = std::mem::take(&mut *slots.lock().await);

        let mut results = Vec::with_capacity(agent_count);
        for (agent_id, slot) in task.agent_ids().iter().zip(outcomes) {
            let outcome = slot.unwrap_or_else(|| {
                Err(AgentCallError::Aborted("agent task ended without a result".to_string()))
            });
            match outcome {
                Ok((content, elapsed_ms)) => {
                    results.push(GenerationResult::success(agent_id, content, elapsed_ms))
                }
                Err(AgentCallError::Rejected { status, body }) => {
                    warn!(agent_id = %agent_id, status, "generation service rejected the batch");
                    return Err(BenchError::BatchDispatch {
                        status,
                        detail: body,
                    });
                }
                Err(err) => results.push(GenerationResult::failure(agent_id, &err)),
            }
        }

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        obs::emit_generation_finished(
            task.category(),
            succeeded,
            results.len() - succeeded,
            started.elapsed().as_millis() as u64,
        );

        Ok(results)
    }
}
