use lapin::{types::LongString, Connection, ConnectionProperties};
use tracing::info;

use super::AmqpConfig;
use crate::common::{retry_with_backoff, RetryConfig};

/// Open a connection to the broker
///
/// # Example
/// ```ignore
/// use database::amqp::{connect, AmqpConfig};
///
/// let connection = connect(&AmqpConfig::new("amqp://localhost:5672")).await?;
/// ```
pub async fn connect(config: &AmqpConfig) -> Result<Connection, lapin::Error> {
    let properties = ConnectionProperties::default()
        .with_connection_name(LongString::from(config.connection_name.as_str()));

    let connection = Connection::connect(&config.url, properties).await?;

    info!(url = %config.redacted_url(), "Connected to RabbitMQ");
    Ok(connection)
}

/// Connect to the broker, retrying with exponential backoff
///
/// `None` uses `RetryConfig::default()`.
pub async fn connect_with_retry(
    config: &AmqpConfig,
    retry_config: Option<RetryConfig>,
) -> Result<Connection, lapin::Error> {
    retry_with_backoff("rabbitmq", || connect(config), retry_config.unwrap_or_default()).await
}
