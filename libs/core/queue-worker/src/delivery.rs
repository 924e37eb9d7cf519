//! Inbound deliveries and their settlement.
//!
//! `settle` consumes the delivery, so each delivery is settled at most once.

use crate::error::QueueError;
use async_trait::async_trait;
use lapin::{
    message::Delivery,
    options::{BasicAckOptions, BasicNackOptions},
};

/// Final broker action for a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Positive acknowledgment
    Ack,
    /// Negative acknowledgment without requeue (dead-letters on a DLX-backed queue)
    Reject,
    /// Negative acknowledgment with requeue
    Requeue,
}

impl Settlement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Settlement::Ack => "ack",
            Settlement::Reject => "reject",
            Settlement::Requeue => "requeue",
        }
    }
}

/// A message handed to the worker by the broker
#[async_trait]
pub trait InboundDelivery: Send + 'static {
    /// Raw message body
    fn body(&self) -> &[u8];

    /// Channel-scoped delivery tag
    fn delivery_tag(&self) -> u64;

    /// Whether the broker has delivered this message before
    fn redelivered(&self) -> bool {
        false
    }

    /// Settle the delivery with the broker
    async fn settle(self, settlement: Settlement) -> Result<(), QueueError>;
}

/// Delivery received from a lapin consumer
pub struct AmqpDelivery(Delivery);

impl AmqpDelivery {
    pub fn new(delivery: Delivery) -> Self {
        Self(delivery)
    }
}

impl From<Delivery> for AmqpDelivery {
    fn from(delivery: Delivery) -> Self {
        Self(delivery)
    }
}

#[async_trait]
impl InboundDelivery for AmqpDelivery {
    fn body(&self) -> &[u8] {
        &self.0.data
    }

    fn delivery_tag(&self) -> u64 {
        self.0.delivery_tag
    }

    fn redelivered(&self) -> bool {
        self.0.redelivered
    }

    async fn settle(self, settlement: Settlement) -> Result<(), QueueError> {
        let acker = &self.0.acker;
        match settlement {
            Settlement::Ack => {
                acker.ack(BasicAckOptions::default()).await?;
            }
            Settlement::Reject | Settlement::Requeue => {
                acker
                    .nack(BasicNackOptions {
                        multiple: false,
                        requeue: settlement == Settlement::Requeue,
                    })
                    .await?;
            }
        }
        Ok(())
    }
}
