//! Disposition classifier
//!
//! Maps the outcome of one processing attempt to exactly one queue action.
//! Pure: no I/O happens here, the worker applies the result.

use crate::error::{ProcessingError, ProcessingOutcome};
use crate::job::QueueJob;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Queue action for a finished delivery
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition<J> {
    /// Positive acknowledgment; the broker drops the message
    Acknowledge,
    /// Negative acknowledgment without requeue; the broker dead-letters it
    DeadLetter,
    /// Publish the envelope to the primary queue, then acknowledge the original
    RepublishThenAck(J),
    /// Negative acknowledgment with requeue; the same bytes come back
    Requeue,
}

impl<J> Disposition<J> {
    pub fn label(&self) -> &'static str {
        match self {
            Disposition::Acknowledge => "ack",
            Disposition::DeadLetter => "dead_letter",
            Disposition::RepublishThenAck(_) => "republish",
            Disposition::Requeue => "requeue",
        }
    }
}

/// What to do with a failure that is outside the error taxonomy
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum UnclassifiedPolicy {
    /// Treat as retryable: republish with the retry count incremented
    #[default]
    Retry,
    /// Hand the delivery back to the broker unchanged
    Requeue,
}

/// Classify a processing outcome
pub fn classify<J: QueueJob>(
    outcome: ProcessingOutcome<J>,
    policy: UnclassifiedPolicy,
) -> Disposition<J> {
    match outcome {
        Ok(()) => Disposition::Acknowledge,
        Err(ProcessingError::Deserialization(_))
        | Err(ProcessingError::UnknownType(_))
        | Err(ProcessingError::MaxRetryExceeded { .. }) => Disposition::DeadLetter,
        Err(ProcessingError::Retryable { envelope, .. }) => Disposition::RepublishThenAck(envelope),
        Err(ProcessingError::Unclassified { envelope, .. }) => match policy {
            UnclassifiedPolicy::Retry => Disposition::RepublishThenAck(envelope.with_retry()),
            UnclassifiedPolicy::Requeue => Disposition::Requeue,
        },
    }
}
