//! Worker settings loaded from the environment.

use core_config::{ConfigError, FromEnv, env_non_empty, env_parse, env_parse_or};
use queue_worker::{
    DEFAULT_MAX_RETRIES, DEFAULT_SHUTDOWN_GRACE, QueueError, QueueTopology, UnclassifiedPolicy,
    WorkerConfig,
};
use std::time::Duration;

/// Queue names and consumer tuning for the notification worker
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerSettings {
    pub queue_name: String,
    pub dead_letter_exchange: String,
    pub dead_letter_queue: String,
    pub max_workers: usize,
    pub max_retries: u32,
    pub shutdown_grace: Duration,
    pub unclassified_policy: UnclassifiedPolicy,
}

impl WorkerSettings {
    pub fn topology(&self) -> Result<QueueTopology, QueueError> {
        QueueTopology::new(
            &self.queue_name,
            &self.dead_letter_exchange,
            &self.dead_letter_queue,
        )
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig::new(&self.queue_name)
            .with_max_concurrent_jobs(self.max_workers)
            .with_max_retries(self.max_retries)
            .with_shutdown_grace(self.shutdown_grace)
            .with_unclassified_policy(self.unclassified_policy)
    }
}

impl FromEnv for WorkerSettings {
    /// - RABBITMQ_NOTIFICATION_QUEUE_NAME, DLX_EXCHANGE_NAME, DLX_QUEUE_NAME: required
    /// - MAX_WORKERS: defaults to twice the available parallelism
    /// - MAX_RETRY_COUNT: defaults to 3, also when unparseable
    /// - SHUTDOWN_GRACE_SECS: defaults to 10
    /// - UNCLASSIFIED_FAILURE_POLICY: `retry` (default) or `requeue`
    fn from_env() -> Result<Self, ConfigError> {
        let max_workers = match env_parse::<usize>("MAX_WORKERS")? {
            Some(0) => {
                return Err(ConfigError::ParseError {
                    key: "MAX_WORKERS".to_string(),
                    details: "must be at least 1".to_string(),
                });
            }
            Some(count) => count,
            None => WorkerConfig::default_concurrency(),
        };

        Ok(Self {
            queue_name: env_non_empty("RABBITMQ_NOTIFICATION_QUEUE_NAME")?,
            dead_letter_exchange: env_non_empty("DLX_EXCHANGE_NAME")?,
            dead_letter_queue: env_non_empty("DLX_QUEUE_NAME")?,
            max_workers,
            max_retries: env_parse_or("MAX_RETRY_COUNT", DEFAULT_MAX_RETRIES),
            shutdown_grace: Duration::from_secs(env_parse_or(
                "SHUTDOWN_GRACE_SECS",
                DEFAULT_SHUTDOWN_GRACE.as_secs(),
            )),
            unclassified_policy: env_parse("UNCLASSIFIED_FAILURE_POLICY")?.unwrap_or_default(),
        })
    }
}
