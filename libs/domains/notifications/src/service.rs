//! Notification service: the producer side of the queue.

use crate::envelope::RetryEnvelope;
use crate::error::{NotificationError, NotificationResult};
use crate::models::Notification;
use queue_worker::{MessagePublisher, encode};
use std::sync::Arc;
use tracing::info;

/// Enqueues notifications for the worker.
///
/// Enqueueing is fire-and-forget: processing failures never flow back here.
pub struct NotificationService<P: MessagePublisher> {
    publisher: Arc<P>,
    queue_name: String,
}

impl<P: MessagePublisher> NotificationService<P> {
    pub fn new(publisher: Arc<P>, queue_name: impl Into<String>) -> Self {
        Self {
            publisher,
            queue_name: queue_name.into(),
        }
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Validate a notification and publish it with a zero retry count.
    pub async fn send_notification(&self, notification: Notification) -> NotificationResult<()> {
        if !notification.kind.is_supported() {
            return Err(NotificationError::UnsupportedType(
                notification.kind.to_string(),
            ));
        }
        if notification.to.is_empty() {
            return Err(NotificationError::EmptyRecipients);
        }

        let notification_type = notification.kind.to_string();
        let recipients = notification.to.len();
        let payload = encode(&RetryEnvelope::new(notification))?;

        self.publisher.publish(&self.queue_name, payload).await?;

        info!(
            queue = %self.queue_name,
            notification_type = %notification_type,
            recipients,
            "Notification enqueued"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationType;
    use async_trait::async_trait;
    use mockall::mock;
    use queue_worker::QueueError;

    mock! {
        Publisher {}

        #[async_trait]
        impl MessagePublisher for Publisher {
            async fn publish(&self, queue: &str, payload: Vec<u8>) -> Result<(), QueueError>;
        }
    }

    fn notification(kind: &str, to: Vec<&str>) -> Notification {
        Notification::new(
            NotificationType::from(kind),
            to.into_iter().map(String::from).collect(),
            "noreply@example.com",
            "Subject",
            "Content",
        )
    }

    #[tokio::test]
    async fn test_publishes_fresh_envelope() {
        let mut publisher = MockPublisher::new();
        publisher
            .expect_publish()
            .withf(|queue, payload| {
                let envelope: RetryEnvelope = serde_json::from_slice(payload).unwrap();
                queue.to_string() == "notifications"
                    && envelope.retry_count == 0
                    && envelope.notification.to == vec!["u1".to_string()]
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let service = NotificationService::new(Arc::new(publisher), "notifications");
        service
            .send_notification(notification("email", vec!["u1"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejects_unsupported_type() {
        let mut publisher = MockPublisher::new();
        publisher.expect_publish().never();

        let service = NotificationService::new(Arc::new(publisher), "notifications");
        let result = service
            .send_notification(notification("fax", vec!["u1"]))
            .await;

        assert!(matches!(result, Err(NotificationError::UnsupportedType(t)) if t == "fax"));
    }

    #[tokio::test]
    async fn test_rejects_empty_recipients() {
        let mut publisher = MockPublisher::new();
        publisher.expect_publish().never();

        let service = NotificationService::new(Arc::new(publisher), "notifications");
        let result = service.send_notification(notification("sms", vec![])).await;

        assert!(matches!(result, Err(NotificationError::EmptyRecipients)));
    }

    #[tokio::test]
    async fn test_publish_failure_is_reported() {
        let mut publisher = MockPublisher::new();
        publisher
            .expect_publish()
            .returning(|queue, _| Err(QueueError::PublishNotConfirmed(queue.to_string())));

        let service = NotificationService::new(Arc::new(publisher), "notifications");
        let result = service
            .send_notification(notification("email", vec!["u1"]))
            .await;

        assert!(matches!(result, Err(NotificationError::Queue(_))));
    }
}
