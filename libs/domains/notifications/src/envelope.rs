//! Retry envelope: the message body carried on the notification queue.
//!
//! ```json
//! {"notification": {"type": "email", "to": ["u1"], "from": "...", "subject": "...", "content": "..."}, "retryCount": 0}
//! ```

use crate::models::Notification;
use queue_worker::QueueJob;
use serde::{Deserialize, Serialize};

/// A notification plus the number of delivery attempts already retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryEnvelope {
    pub notification: Notification,
    #[serde(rename = "retryCount")]
    pub retry_count: u32,
}

impl RetryEnvelope {
    /// Fresh envelope for a newly enqueued notification
    pub fn new(notification: Notification) -> Self {
        Self {
            notification,
            retry_count: 0,
        }
    }
}

impl QueueJob for RetryEnvelope {
    fn job_kind(&self) -> String {
        self.notification.kind.to_string()
    }

    fn retry_count(&self) -> u32 {
        self.retry_count
    }

    fn with_retry(&self) -> Self {
        Self {
            notification: self.notification.clone(),
            retry_count: self.retry_count.saturating_add(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationType;
    use queue_worker::{ProcessingError, decode, encode};
    use serde_json::json;

    fn envelope(kind: NotificationType, retry_count: u32) -> RetryEnvelope {
        RetryEnvelope {
            notification: Notification::new(
                kind,
                vec!["u1".into()],
                "noreply@example.com",
                "Subject",
                "Content",
            ),
            retry_count,
        }
    }

    #[test]
    fn test_wire_format() {
        let bytes = encode(&envelope(NotificationType::Email, 2)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            value,
            json!({
                "notification": {
                    "type": "email",
                    "to": ["u1"],
                    "from": "noreply@example.com",
                    "subject": "Subject",
                    "content": "Content"
                },
                "retryCount": 2
            })
        );
    }

    #[test]
    fn test_round_trip_keeps_unknown_type() {
        let original = envelope(NotificationType::from("fax"), 1);
        let decoded: RetryEnvelope = decode(&encode(&original).unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_malformed_bytes_are_deserialization_errors() {
        let result = decode::<RetryEnvelope>(b"{not json");
        assert!(matches!(result, Err(ProcessingError::Deserialization(_))));

        let negative = br#"{"notification":{"type":"sms","to":[],"from":"","subject":"","content":""},"retryCount":-1}"#;
        assert!(matches!(
            decode::<RetryEnvelope>(negative),
            Err(ProcessingError::Deserialization(_))
        ));
    }

    #[test]
    fn test_with_retry_increments_by_one() {
        let first = envelope(NotificationType::Sms, 0);
        let second = first.with_retry();

        assert_eq!(second.retry_count, 1);
        assert_eq!(second.notification, first.notification);
        assert_eq!(second.with_retry().retry_count, 2);
    }

    #[test]
    fn test_ceiling_is_inclusive() {
        assert!(!envelope(NotificationType::Email, 2).exceeded_max_retries(3));
        assert!(envelope(NotificationType::Email, 3).exceeded_max_retries(3));
    }
}
