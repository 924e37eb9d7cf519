//! Notification Worker Service - Entry Point
//!
//! Background worker that delivers email and SMS notifications from RabbitMQ.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    notification_worker::run().await
}
