//! Channel processors.
//!
//! A processor renders one notification for its channel and hands it to the
//! channel's transport. Processors never settle deliveries: every failure they
//! report becomes a retryable outcome carrying the incremented envelope.

mod email;
mod sms;

pub use email::EmailProcessor;
pub use sms::SmsProcessor;

use crate::directory::UserDirectory;
use crate::envelope::RetryEnvelope;
use crate::error::{NotificationError, NotificationResult};
use crate::models::{Notification, NotificationType};
use async_trait::async_trait;
use queue_worker::{ProcessingError, ProcessingOutcome, QueueJob};
use std::sync::Arc;

/// Renders and delivers notifications of one channel type.
#[async_trait]
pub trait NotificationProcessor: Send + Sync {
    /// Channel this processor handles
    fn channel(&self) -> NotificationType;

    /// Deliver the notification to every resolvable recipient.
    async fn deliver(&self, notification: &Notification) -> NotificationResult<()>;

    /// Run one attempt for an envelope.
    async fn process(&self, envelope: &RetryEnvelope) -> ProcessingOutcome<RetryEnvelope> {
        self.deliver(&envelope.notification)
            .await
            .map_err(|e| ProcessingError::Retryable {
                reason: e.to_string(),
                envelope: envelope.with_retry(),
            })
    }
}

/// Directory access shared by every processor.
#[derive(Clone)]
pub struct RecipientResolver {
    directory: Arc<dyn UserDirectory>,
}

impl RecipientResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Email addresses for `ids`; an empty result is an error.
    pub async fn emails(&self, ids: &[String]) -> NotificationResult<Vec<String>> {
        non_empty(self.directory.emails_by_ids(ids).await?, "email")
    }

    /// Phone numbers for `ids`; an empty result is an error.
    pub async fn phones(&self, ids: &[String]) -> NotificationResult<Vec<String>> {
        non_empty(self.directory.phones_by_ids(ids).await?, "sms")
    }
}

fn non_empty(contacts: Vec<String>, channel: &'static str) -> NotificationResult<Vec<String>> {
    if contacts.is_empty() {
        return Err(NotificationError::NoRecipients(channel));
    }
    Ok(contacts)
}
