//! Queue Worker Framework
//!
//! A generic RabbitMQ worker framework for processing background jobs whose
//! retry count travels inside the message body.
//!
//! ## Features
//!
//! - **Bounded consumer**: `QueueWorker<J, H, P>` fans deliveries out to a fixed pool of tasks
//! - **Retry envelopes**: failed jobs are republished with an incremented retry count
//! - **Dead letter exchange**: terminal rejections are routed to a DLQ by the broker
//! - **Disposition classifier**: every outcome maps to exactly one queue action
//! - **Prometheus metrics**: Built-in observability
//! - **Health endpoints**: K8s-ready liveness and readiness probes
//!
//! ## Example
//!
//! ```ignore
//! use queue_worker::{AmqpPublisher, QueueTopology, QueueWorker, WorkerConfig};
//!
//! let topology = QueueTopology::new("notifications", "notifications.dlx", "notifications.dlq")?;
//! topology.ensure(&connection).await?;
//!
//! let config = WorkerConfig::new(topology.primary_queue());
//! let publisher = AmqpPublisher::new(connection.clone());
//! let worker = QueueWorker::new(handler, publisher, config);
//! worker.consume(&connection, shutdown_rx).await?;
//! ```

mod codec;
mod config;
mod delivery;
mod disposition;
mod error;
mod health;
mod job;
pub mod metrics;
mod publisher;
mod topology;
mod worker;

// Re-export main types
pub use codec::{decode, encode};
pub use config::{WorkerConfig, DEFAULT_MAX_RETRIES, DEFAULT_SHUTDOWN_GRACE};
pub use delivery::{AmqpDelivery, InboundDelivery, Settlement};
pub use disposition::{classify, Disposition, UnclassifiedPolicy};
pub use error::{ProcessingError, ProcessingOutcome, QueueError};
pub use health::{health_router, BrokerStatus, HealthState};
pub use job::{JobHandler, QueueJob};
pub use metrics::{init_metrics, WorkerMetrics};
pub use publisher::{AmqpPublisher, MessagePublisher};
pub use topology::QueueTopology;
pub use worker::QueueWorker;
