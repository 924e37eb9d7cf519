//! Job traits: the seams between the generic worker and a domain.
//!
//! This module provides:
//! - `QueueJob` trait for envelope payloads that carry their own retry count
//! - `JobHandler` trait for resolving and running the processor for a job

use crate::error::ProcessingOutcome;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// Trait for queue job payloads.
///
/// The retry count lives inside the message body, so the broker's native
/// redelivery can never advance it. A retry is a new message built with
/// [`QueueJob::with_retry`].
///
/// # Example
///
/// ```rust,ignore
/// use queue_worker::QueueJob;
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct ReportJob {
///     kind: String,
///     retry_count: u32,
/// }
///
/// impl QueueJob for ReportJob {
///     fn job_kind(&self) -> String {
///         self.kind.clone()
///     }
///
///     fn retry_count(&self) -> u32 {
///         self.retry_count
///     }
///
///     fn with_retry(&self) -> Self {
///         Self {
///             retry_count: self.retry_count + 1,
///             ..self.clone()
///         }
///     }
/// }
/// ```
pub trait QueueJob: Serialize + DeserializeOwned + Debug + Clone + Send + Sync + 'static {
    /// Returns the job kind used to pick a processor (for logging and dispatch).
    fn job_kind(&self) -> String;

    /// Returns the current retry count.
    fn retry_count(&self) -> u32;

    /// Creates a new job with the retry count incremented by exactly one.
    fn with_retry(&self) -> Self;

    /// Check if the job has reached the retry ceiling.
    fn exceeded_max_retries(&self, max_retries: u32) -> bool {
        self.retry_count() >= max_retries
    }
}

/// Trait for job handlers.
///
/// A handler owns processor resolution for a job kind. It reports unsupported
/// kinds as `ProcessingError::UnknownType` and any processing failure as
/// `ProcessingError::Retryable`. It never touches the broker.
#[async_trait]
pub trait JobHandler<J: QueueJob>: Send + Sync {
    /// Resolve the processor for `job` and run it.
    async fn handle(&self, job: &J) -> ProcessingOutcome<J>;

    /// Get the handler name for logging.
    fn name(&self) -> &'static str;
}
