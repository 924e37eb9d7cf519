//! JSON envelope codec.
//!
//! Decoding fails only on structurally invalid input. Whether the decoded job
//! names a supported kind is the handler's concern, not the codec's.

use crate::error::{ProcessingError, QueueError};
use crate::job::QueueJob;
use serde::Serialize;

/// Serialize a job into a message body.
pub fn encode<J: Serialize>(job: &J) -> Result<Vec<u8>, QueueError> {
    Ok(serde_json::to_vec(job)?)
}

/// Deserialize a message body into a job.
pub fn decode<J: QueueJob>(body: &[u8]) -> Result<J, ProcessingError<J>> {
    serde_json::from_slice(body).map_err(|e| ProcessingError::Deserialization(e.to_string()))
}
