use super::{NotificationProcessor, RecipientResolver};
use crate::error::{NotificationError, NotificationResult};
use crate::models::{Notification, NotificationType};
use crate::providers::{EmailMessage, EmailTransport, RecipientStatus};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Sends one email addressed to all resolved recipients.
pub struct EmailProcessor {
    recipients: RecipientResolver,
    transport: Arc<dyn EmailTransport>,
}

impl EmailProcessor {
    pub fn new(recipients: RecipientResolver, transport: Arc<dyn EmailTransport>) -> Self {
        Self {
            recipients,
            transport,
        }
    }
}

#[async_trait]
impl NotificationProcessor for EmailProcessor {
    fn channel(&self) -> NotificationType {
        NotificationType::Email
    }

    async fn deliver(&self, notification: &Notification) -> NotificationResult<()> {
        let emails = self.recipients.emails(&notification.to).await?;

        let message = EmailMessage {
            from: notification.from.clone(),
            subject: notification.subject.clone(),
            text: notification.content.clone(),
            recipients: emails,
        };

        let statuses = self.transport.send_email(&message).await?;
        check_statuses(&statuses)?;

        info!(
            transport = self.transport.name(),
            recipients = message.recipients.len(),
            "Email accepted"
        );
        Ok(())
    }
}

/// Any refused recipient fails the whole message.
///
/// A success response with an empty status array also fails: nothing confirms
/// that any recipient was accepted, so the message goes through the retry path
/// instead of being acknowledged.
fn check_statuses(statuses: &[RecipientStatus]) -> NotificationResult<()> {
    if statuses.is_empty() {
        return Err(NotificationError::UnexpectedResponse(
            "email transport reported no recipients".to_string(),
        ));
    }

    match statuses.iter().find(|s| s.is_refused()) {
        Some(refused) => Err(NotificationError::RecipientRejected {
            email: refused.email.clone(),
            status: refused.status.clone(),
            reason: refused
                .reject_reason
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MockUserDirectory;
    use crate::envelope::RetryEnvelope;
    use crate::providers::MockEmailTransport;
    use queue_worker::ProcessingError;

    fn status(email: &str, status: &str) -> RecipientStatus {
        RecipientStatus {
            email: email.to_string(),
            status: status.to_string(),
            reject_reason: None,
            id: Some("id".to_string()),
        }
    }

    fn envelope(to: &[&str]) -> RetryEnvelope {
        RetryEnvelope::new(Notification::new(
            NotificationType::Email,
            to.iter().map(|s| s.to_string()).collect(),
            "noreply@example.com",
            "Welcome",
            "Hello",
        ))
    }

    fn processor(directory: MockUserDirectory, transport: MockEmailTransport) -> EmailProcessor {
        EmailProcessor::new(
            RecipientResolver::new(Arc::new(directory)),
            Arc::new(transport),
        )
    }

    #[tokio::test]
    async fn test_sends_one_request_to_all_recipients() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_emails_by_ids()
            .withf(|ids| ids.to_vec() == vec!["u1".to_string(), "u2".to_string()])
            .times(1)
            .returning(|_| Ok(vec!["a@example.com".into(), "b@example.com".into()]));

        let mut transport = MockEmailTransport::new();
        transport
            .expect_send_email()
            .withf(|message| {
                message.recipients == ["a@example.com", "b@example.com"]
                    && message.from == "noreply@example.com"
                    && message.subject == "Welcome"
                    && message.text == "Hello"
            })
            .times(1)
            .returning(|_| {
                Ok(vec![
                    status("a@example.com", "sent"),
                    status("b@example.com", "queued"),
                ])
            });
        transport.expect_name().return_const("mock");

        let outcome = processor(directory, transport)
            .process(&envelope(&["u1", "u2"]))
            .await;

        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn test_no_resolved_emails_is_retryable() {
        let mut directory = MockUserDirectory::new();
        directory.expect_emails_by_ids().returning(|_| Ok(vec![]));

        let mut transport = MockEmailTransport::new();
        transport.expect_send_email().never();

        let outcome = processor(directory, transport)
            .process(&envelope(&["u1"]))
            .await;

        match outcome {
            Err(ProcessingError::Retryable { envelope, .. }) => {
                assert_eq!(envelope.retry_count, 1)
            }
            other => panic!("expected retryable failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_directory_failure_is_retryable() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_emails_by_ids()
            .returning(|_| Err(NotificationError::Directory("connection reset".into())));

        let outcome = processor(directory, MockEmailTransport::new())
            .process(&envelope(&["u1"]))
            .await;

        assert!(matches!(outcome, Err(ProcessingError::Retryable { .. })));
    }

    #[tokio::test]
    async fn test_transport_error_is_retryable() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_emails_by_ids()
            .returning(|_| Ok(vec!["a@example.com".into()]));

        let mut transport = MockEmailTransport::new();
        transport
            .expect_send_email()
            .returning(|_| Err(NotificationError::Transport("500".into())));

        let outcome = processor(directory, transport)
            .process(&envelope(&["u1"]))
            .await;

        assert!(matches!(outcome, Err(ProcessingError::Retryable { .. })));
    }

    #[test]
    fn test_refused_recipient_fails_message() {
        let statuses = vec![status("a@example.com", "sent"), status("b@example.com", "invalid")];

        match check_statuses(&statuses) {
            Err(NotificationError::RecipientRejected { email, status, .. }) => {
                assert_eq!(email, "b@example.com");
                assert_eq!(status, "invalid");
            }
            other => panic!("expected rejection, got {:?}", other),
        }

        assert!(check_statuses(&[status("a@example.com", "rejected")]).is_err());
    }

    #[test]
    fn test_accepted_statuses_pass() {
        let statuses = vec![
            status("a@example.com", "sent"),
            status("b@example.com", "queued"),
            status("c@example.com", "scheduled"),
        ];
        assert!(check_statuses(&statuses).is_ok());
    }

    #[test]
    fn test_empty_status_report_fails_message() {
        assert!(matches!(
            check_statuses(&[]),
            Err(NotificationError::UnexpectedResponse(_))
        ));
    }
}
