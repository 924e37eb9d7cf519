//! Notifications Domain
//!
//! Email and SMS notifications delivered asynchronously through a RabbitMQ queue.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │ NotificationService │  ← Wraps notifications in a RetryEnvelope and publishes
//! └──────────┬──────────┘
//!            │
//! ┌──────────▼──────────┐
//! │    Primary queue    │  ← Dead-letters terminal rejections to the DLX
//! └──────────┬──────────┘
//!            │
//! ┌──────────▼──────────┐
//! │     QueueWorker     │  ← Bounded consumer (queue-worker crate)
//! └──────────┬──────────┘
//!            │
//! ┌──────────▼──────────┐
//! │  ProcessorRegistry  │  ← Resolves email / sms processors by type
//! └──────────┬──────────┘
//!            │
//! ┌──────────▼──────────┐
//! │ Directory+Transport │  ← Postgres users table, Mandrill, Twilio
//! └─────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_notifications::{
//!     PgUserDirectory, ProcessorRegistry,
//!     providers::{MandrillTransport, TwilioTransport},
//! };
//!
//! let registry = ProcessorRegistry::with_default_processors(
//!     Arc::new(PgUserDirectory::new(db)),
//!     Arc::new(MandrillTransport::from_env()?),
//!     Arc::new(TwilioTransport::from_env()?),
//! );
//! let worker = QueueWorker::new(registry, publisher, config);
//! ```

pub mod directory;
pub mod envelope;
pub mod error;
pub mod models;
pub mod processor;
pub mod providers;
pub mod registry;
pub mod service;

// Re-export commonly used types
pub use directory::{PgUserDirectory, UserDirectory};
pub use envelope::RetryEnvelope;
pub use error::{NotificationError, NotificationResult};
pub use models::{Notification, NotificationType, UnknownTypeName};
pub use processor::{EmailProcessor, NotificationProcessor, RecipientResolver, SmsProcessor};
pub use providers::{EmailTransport, SmsTransport};
pub use registry::ProcessorRegistry;
pub use service::NotificationService;
