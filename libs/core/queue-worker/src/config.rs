//! Worker configuration
//!
//! This module provides `WorkerConfig` for configuring the queue worker.

use crate::disposition::UnclassifiedPolicy;
use std::time::Duration;
use uuid::Uuid;

/// Retry ceiling used when none is configured
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// How long in-flight deliveries may drain after shutdown is signalled
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Configuration for the queue worker
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Primary queue to consume from and republish retries to
    pub queue_name: String,

    /// Consumer tag (auto-generated if not provided)
    pub consumer_tag: String,

    /// Size of the processing pool
    pub max_concurrent_jobs: usize,

    /// Retry ceiling. An envelope with `retry_count >= max_retries` is dead-lettered.
    pub max_retries: u32,

    /// Unacknowledged deliveries the broker may push ahead of the pool
    pub prefetch_count: u16,

    /// Drain period for in-flight tasks on shutdown
    pub shutdown_grace: Duration,

    /// Disposition of failures outside the error taxonomy
    pub unclassified_policy: UnclassifiedPolicy,
}

impl WorkerConfig {
    /// Create a new WorkerConfig for a queue with default values
    pub fn new(queue_name: impl Into<String>) -> Self {
        let max_concurrent_jobs = Self::default_concurrency();
        Self {
            queue_name: queue_name.into(),
            consumer_tag: format!("worker-{}", Uuid::new_v4()),
            max_concurrent_jobs,
            max_retries: DEFAULT_MAX_RETRIES,
            prefetch_count: prefetch_for(max_concurrent_jobs),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            unclassified_policy: UnclassifiedPolicy::default(),
        }
    }

    /// Twice the available hardware parallelism
    pub fn default_concurrency() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            * 2
    }

    /// Set the consumer tag
    pub fn with_consumer_tag(mut self, tag: impl Into<String>) -> Self {
        self.consumer_tag = tag.into();
        self
    }

    /// Set the pool size. The prefetch count follows it.
    pub fn with_max_concurrent_jobs(mut self, count: usize) -> Self {
        self.max_concurrent_jobs = count.max(1);
        self.prefetch_count = prefetch_for(self.max_concurrent_jobs);
        self
    }

    /// Set the retry ceiling
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the prefetch count explicitly
    pub fn with_prefetch_count(mut self, prefetch: u16) -> Self {
        self.prefetch_count = prefetch.max(1);
        self
    }

    /// Set the shutdown drain period
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Set the policy for unclassified failures
    pub fn with_unclassified_policy(mut self, policy: UnclassifiedPolicy) -> Self {
        self.unclassified_policy = policy;
        self
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self::new("notifications")
    }
}

fn prefetch_for(pool_size: usize) -> u16 {
    u16::try_from(pool_size).unwrap_or(u16::MAX).max(1)
}
