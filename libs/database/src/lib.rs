//! Connectors for the services the notifier depends on
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL support with SeaORM (user directory)
//! - `amqp` (default) - RabbitMQ support with lapin
//! - `config` - Load connector configuration with `core_config::FromEnv`
//!
//! # Examples
//!
//! ```ignore
//! use database::{amqp, postgres, common::RetryConfig};
//!
//! let db = postgres::connect_from_config_with_retry(
//!     postgres::PostgresConfig::from_env()?,
//!     Some(RetryConfig::startup()),
//! ).await?;
//!
//! let connection = amqp::connect_with_retry(
//!     &amqp::AmqpConfig::from_env()?,
//!     Some(RetryConfig::startup()),
//! ).await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "amqp")]
pub mod amqp;

pub use common::{DatabaseError, DatabaseResult};
