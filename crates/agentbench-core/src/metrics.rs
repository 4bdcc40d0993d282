//! Global atomic counters for pipeline observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single `tracing::info!`
//! event, e.g. when a CLI command finishes.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters.
pub struct Metrics {
    classifications: AtomicU64,
    classification_fallbacks: AtomicU64,
    agent_calls: AtomicU64,
    agent_failures: AtomicU64,
    agent_timeouts: AtomicU64,
    scores_dropped: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            classifications: AtomicU64::new(0),
            classification_fallbacks: AtomicU64::new(0),
            agent_calls: AtomicU64::new(0),
            agent_failures: AtomicU64::new(0),
            agent_timeouts: AtomicU64::new(0),
            scores_dropped: AtomicU64::new(0),
        }
    }

    pub fn inc_classifications(&self) {
        self.classifications.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "classifications", "counter incremented");
    }

    pub fn inc_classification_fallbacks(&self) {
        self.classification_fallbacks.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "classification_fallbacks", "counter incremented");
    }

    pub fn inc_agent_calls(&self) {
        self.agent_calls.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "agent_calls", "counter incremented");
    }

    pub fn inc_agent_failures(&self) {
        self.agent_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "agent_failures", "counter incremented");
    }

    pub fn inc_agent_timeouts(&self) {
        self.agent_timeouts.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "agent_timeouts", "counter incremented");
    }

    pub fn add_scores_dropped(&self, n: u64) {
        self.scores_dropped.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "scores_dropped", n, "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            classifications = self.classifications(),
            classification_fallbacks = self.classification_fallbacks(),
            agent_calls = self.agent_calls(),
            agent_failures = self.agent_failures(),
            agent_timeouts = self.agent_timeouts(),
            scores_dropped = self.scores_dropped(),
        );
    }

    pub fn classifications(&self) -> u64 {
        self.classifications.load(Ordering::Relaxed)
    }

    pub fn classification_fallbacks(&self) -> u64 {
        self.classification_fallbacks.load(Ordering::Relaxed)
    }

    pub fn agent_calls(&self) -> u64 {
        self.agent_calls.load(Ordering::Relaxed)
    }

    pub fn agent_failures(&self) -> u64 {
        self.agent_failures.load(Ordering::Relaxed)
    }

    pub fn agent_timeouts(&self) -> u64 {
        self.agent_timeouts.load(Ordering::Relaxed)
    }

    pub fn scores_dropped(&self) -> u64 {
        self.scores_dropped.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.classifications.store(0, Ordering::Relaxed);
        self.classification_fallbacks.store(0, Ordering::Relaxed);
        self.agent_calls.store(0, Ordering::Relaxed);
        self.agent_failures.store(0, Ordering::Relaxed);
        self.agent_timeouts.store(0, Ordering::Relaxed);
        self.scores_dropped.store(0, Ordering::Relaxed);
    }
}
