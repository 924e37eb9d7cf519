//! AMQP (RabbitMQ) connector
//!
//! Provides broker configuration and connection with startup retry.
//! Readiness is reported by `queue_worker::BrokerStatus`.

mod config;
mod connector;

pub use config::AmqpConfig;
pub use connector::{connect, connect_with_retry};

// Re-export lapin types for convenience
pub use lapin::Connection;
