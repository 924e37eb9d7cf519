//! Confirmed, persistent publishing to a named queue.

use crate::error::QueueError;
use async_trait::async_trait;
use lapin::{
    options::{BasicPublishOptions, ConfirmSelectOptions},
    BasicProperties, Connection,
};
use std::sync::Arc;
use tracing::debug;

/// Persistent delivery mode
const PERSISTENT: u8 = 2;

/// Publishes message bodies to a queue via the default exchange
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publish `payload` and wait until the broker confirms it
    async fn publish(&self, queue: &str, payload: Vec<u8>) -> Result<(), QueueError>;
}

/// Publisher backed by a shared lapin connection.
///
/// Each publish uses its own short-lived channel in confirm mode, so
/// concurrent workers never share a channel.
#[derive(Clone)]
pub struct AmqpPublisher {
    connection: Arc<Connection>,
}

impl AmqpPublisher {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl MessagePublisher for AmqpPublisher {
    async fn publish(&self, queue: &str, payload: Vec<u8>) -> Result<(), QueueError> {
        let channel = self.connection.create_channel().await?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await?;

        let properties = BasicProperties::default()
            .with_delivery_mode(PERSISTENT)
            .with_content_type("application/json".into())
            .with_timestamp(chrono::Utc::now().timestamp().max(0) as u64);

        let confirmation = channel
            .basic_publish("", queue, BasicPublishOptions::default(), &payload, properties)
            .await?
            .await?;

        let _ = channel.close(200, "published").await;

        if confirmation.is_nack() {
            return Err(QueueError::PublishNotConfirmed(queue.to_string()));
        }

        debug!(queue = %queue, bytes = payload.len(), "Message published");
        Ok(())
    }
}
