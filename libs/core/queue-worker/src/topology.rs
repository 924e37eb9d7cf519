//! Broker topology: the primary queue and its dead-letter route.
//!
//! Declarations are idempotent. A declaration that conflicts with an existing
//! entity of different properties is a fatal startup error.

use crate::error::QueueError;
use lapin::{
    options::{ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions},
    types::{AMQPValue, FieldTable},
    Connection, ExchangeKind,
};
use tracing::info;

/// Queue argument naming the exchange that receives rejected messages
pub const DEAD_LETTER_EXCHANGE_ARG: &str = "x-dead-letter-exchange";

/// Names of the three broker entities the worker depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueTopology {
    primary_queue: String,
    dead_letter_exchange: String,
    dead_letter_queue: String,
}

impl QueueTopology {
    /// Create a topology, rejecting empty names
    pub fn new(
        primary_queue: impl Into<String>,
        dead_letter_exchange: impl Into<String>,
        dead_letter_queue: impl Into<String>,
    ) -> Result<Self, QueueError> {
        let topology = Self {
            primary_queue: primary_queue.into(),
            dead_letter_exchange: dead_letter_exchange.into(),
            dead_letter_queue: dead_letter_queue.into(),
        };

        for (label, name) in [
            ("primary queue", &topology.primary_queue),
            ("dead letter exchange", &topology.dead_letter_exchange),
            ("dead letter queue", &topology.dead_letter_queue),
        ] {
            if name.trim().is_empty() {
                return Err(QueueError::Config(format!("{} name must not be empty", label)));
            }
        }

        Ok(topology)
    }

    pub fn primary_queue(&self) -> &str {
        &self.primary_queue
    }

    pub fn dead_letter_exchange(&self) -> &str {
        &self.dead_letter_exchange
    }

    pub fn dead_letter_queue(&self) -> &str {
        &self.dead_letter_queue
    }

    /// Arguments for the primary queue declaration
    pub fn primary_queue_arguments(&self) -> FieldTable {
        let mut args = FieldTable::default();
        args.insert(
            DEAD_LETTER_EXCHANGE_ARG.into(),
            AMQPValue::LongString(self.dead_letter_exchange.clone().into()),
        );
        args
    }

    /// Declare the dead-letter exchange, the dead-letter queue, their binding,
    /// and the primary queue, on a dedicated channel.
    pub async fn ensure(&self, connection: &Connection) -> Result<(), QueueError> {
        let channel = connection.create_channel().await?;

        let durable = QueueDeclareOptions {
            durable: true,
            ..QueueDeclareOptions::default()
        };

        channel
            .exchange_declare(
                &self.dead_letter_exchange,
                ExchangeKind::Fanout,
                ExchangeDeclareOptions {
                    durable: true,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| self.topology_error("declare exchange", &self.dead_letter_exchange, e))?;

        channel
            .queue_declare(&self.dead_letter_queue, durable, FieldTable::default())
            .await
            .map_err(|e| self.topology_error("declare queue", &self.dead_letter_queue, e))?;

        channel
            .queue_bind(
                &self.dead_letter_queue,
                &self.dead_letter_exchange,
                "",
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| self.topology_error("bind queue", &self.dead_letter_queue, e))?;

        channel
            .queue_declare(&self.primary_queue, durable, self.primary_queue_arguments())
            .await
            .map_err(|e| self.topology_error("declare queue", &self.primary_queue, e))?;

        channel.close(200, "topology declared").await?;

        info!(
            queue = %self.primary_queue,
            dlx = %self.dead_letter_exchange,
            dlq = %self.dead_letter_queue,
            "Broker topology declared"
        );

        Ok(())
    }

    fn topology_error(&self, action: &str, name: &str, err: lapin::Error) -> QueueError {
        QueueError::Topology(format!("failed to {} '{}': {}", action, name, err))
    }
}
