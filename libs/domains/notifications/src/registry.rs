//! Processor registry: resolves a notification type to its processor.

use crate::directory::UserDirectory;
use crate::envelope::RetryEnvelope;
use crate::models::NotificationType;
use crate::processor::{EmailProcessor, NotificationProcessor, RecipientResolver, SmsProcessor};
use crate::providers::{EmailTransport, SmsTransport};
use async_trait::async_trait;
use queue_worker::{JobHandler, ProcessingError, ProcessingOutcome};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Fixed set of processors keyed by channel, built once at startup.
#[derive(Default, Clone)]
pub struct ProcessorRegistry {
    processors: HashMap<NotificationType, Arc<dyn NotificationProcessor>>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the email and SMS processors sharing one directory.
    pub fn with_default_processors(
        directory: Arc<dyn UserDirectory>,
        email: Arc<dyn EmailTransport>,
        sms: Arc<dyn SmsTransport>,
    ) -> Self {
        let recipients = RecipientResolver::new(directory);
        Self::new()
            .register(EmailProcessor::new(recipients.clone(), email))
            .register(SmsProcessor::new(recipients, sms))
    }

    /// Add a processor under its own channel, replacing any previous one.
    pub fn register<P: NotificationProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.insert(processor.channel(), Arc::new(processor));
        self
    }

    pub fn resolve(
        &self,
        kind: &NotificationType,
    ) -> Result<Arc<dyn NotificationProcessor>, ProcessingError<RetryEnvelope>> {
        self.processors
            .get(kind)
            .cloned()
            .ok_or_else(|| ProcessingError::UnknownType(kind.to_string()))
    }

    /// Registered channels, sorted by name
    pub fn supported_types(&self) -> Vec<NotificationType> {
        let mut types: Vec<NotificationType> = self.processors.keys().cloned().collect();
        types.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        types
    }
}

#[async_trait]
impl JobHandler<RetryEnvelope> for ProcessorRegistry {
    async fn handle(&self, envelope: &RetryEnvelope) -> ProcessingOutcome<RetryEnvelope> {
        let processor = self.resolve(&envelope.notification.kind)?;

        debug!(
            notification_type = %envelope.notification.kind,
            retry_count = envelope.retry_count,
            recipients = envelope.notification.to.len(),
            "Processing notification"
        );

        processor.process(envelope).await
    }

    fn name(&self) -> &'static str {
        "notification-registry"
    }
}
