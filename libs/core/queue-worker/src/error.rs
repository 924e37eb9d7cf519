//! Queue error types and the processing error taxonomy
//!
//! Processing errors are a closed set so the disposition classifier can match them exhaustively:
//! - **Deserialization**: the body does not match the envelope schema, dead-letter
//! - **UnknownType**: no processor is registered for the job kind, dead-letter
//! - **MaxRetryExceeded**: the retry ceiling was reached before processing, dead-letter
//! - **Retryable**: processing failed, republish with the incremented envelope
//! - **Unclassified**: processing failed outside the taxonomy (e.g. a panic)

use thiserror::Error;

/// Outcome of one processing attempt.
pub type ProcessingOutcome<J> = Result<(), ProcessingError<J>>;

/// Broker and infrastructure errors
#[derive(Error, Debug)]
pub enum QueueError {
    /// AMQP connection, channel or protocol error
    #[error("AMQP error: {0}")]
    Amqp(#[from] lapin::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Topology declaration failed
    #[error("Topology error: {0}")]
    Topology(String),

    /// Broker negatively acknowledged a publish
    #[error("Publish to '{0}' was not confirmed by the broker")]
    PublishNotConfirmed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for QueueError {
    fn from(err: serde_json::Error) -> Self {
        QueueError::Serialization(err.to_string())
    }
}

/// Failure of a single processing attempt.
///
/// `J` is the job (envelope) type. The retryable variants carry the envelope so the
/// classifier can decide what to republish without touching the broker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError<J> {
    /// Body bytes do not conform to the envelope schema
    #[error("Failed to deserialize envelope: {0}")]
    Deserialization(String),

    /// Envelope names a job kind with no registered processor
    #[error("No processor registered for type '{0}'")]
    UnknownType(String),

    /// Retry ceiling reached before any processing attempt
    #[error("Retry count {retry_count} reached the maximum of {max_retries}")]
    MaxRetryExceeded { retry_count: u32, max_retries: u32 },

    /// Processing failed for a reason assumed transient.
    /// `envelope` already has its retry count incremented.
    #[error("Retryable failure: {reason}")]
    Retryable { reason: String, envelope: J },

    /// Processing failed outside the taxonomy. `envelope` is the job as received.
    #[error("Unclassified failure: {reason}")]
    Unclassified { reason: String, envelope: J },
}

impl<J> ProcessingError<J> {
    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessingError::Deserialization(_) => "deserialization",
            ProcessingError::UnknownType(_) => "unknown_type",
            ProcessingError::MaxRetryExceeded { .. } => "max_retry_exceeded",
            ProcessingError::Retryable { .. } => "retryable",
            ProcessingError::Unclassified { .. } => "unclassified",
        }
    }

    /// Whether this error can never succeed on a later attempt
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessingError::Deserialization(_)
                | ProcessingError::UnknownType(_)
                | ProcessingError::MaxRetryExceeded { .. }
        )
    }
}
