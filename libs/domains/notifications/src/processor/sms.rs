use super::{NotificationProcessor, RecipientResolver};
use crate::error::NotificationResult;
use crate::models::{Notification, NotificationType};
use crate::providers::{SmsMessage, SmsTransport};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Sends one SMS per resolved phone number.
///
/// The first failed send aborts the rest. Numbers already sent to are sent to
/// again when the envelope is retried.
pub struct SmsProcessor {
    recipients: RecipientResolver,
    transport: Arc<dyn SmsTransport>,
}

impl SmsProcessor {
    pub fn new(recipients: RecipientResolver, transport: Arc<dyn SmsTransport>) -> Self {
        Self {
            recipients,
            transport,
        }
    }
}

#[async_trait]
impl NotificationProcessor for SmsProcessor {
    fn channel(&self) -> NotificationType {
        NotificationType::Sms
    }

    async fn deliver(&self, notification: &Notification) -> NotificationResult<()> {
        let phones = self.recipients.phones(&notification.to).await?;

        for phone in phones {
            let message = SmsMessage {
                from: notification.from.clone(),
                to: phone,
                body: notification.content.clone(),
            };

            let receipt = self.transport.send_sms(&message).await?;
            info!(
                transport = self.transport.name(),
                sid = %receipt.sid,
                "SMS accepted"
            );
        }

        Ok(())
    }
}
