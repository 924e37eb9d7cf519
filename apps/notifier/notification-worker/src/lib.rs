//! Notification Worker Service
//!
//! A background worker that delivers email and SMS notifications from a RabbitMQ queue.
//!
//! ## Architecture
//!
//! ```text
//! RabbitMQ (RABBITMQ_NOTIFICATION_QUEUE_NAME)
//!   ↓ (prefetch = MAX_WORKERS)
//! QueueWorker<RetryEnvelope, ProcessorRegistry, AmqpPublisher>
//!   ↓ (resolves processor by notification type)
//! EmailProcessor / SmsProcessor
//!   ↓                      ↓
//! PostgreSQL users     Mandrill / Twilio
//!
//! failures  → republish with retryCount + 1
//! terminal  → reject → DLX_EXCHANGE_NAME → DLX_QUEUE_NAME
//! ```
//!
//! ## Features
//!
//! - Bounded concurrency with broker backpressure
//! - Retry count carried in the message body
//! - Dead letter exchange for poison messages
//! - Graceful shutdown with a drain grace period
//! - Health and metrics endpoints for Kubernetes probes

pub mod config;

use axum::Router;
use config::WorkerSettings;
use core_config::{Environment, FromEnv, server::ServerConfig};
use database::amqp::AmqpConfig;
use database::common::RetryConfig;
use database::postgres::{PostgresConfig, check_health, connect_from_config_with_retry};
use domain_notifications::providers::{
    MandrillConfig, MandrillTransport, TwilioConfig, TwilioTransport,
};
use domain_notifications::{PgUserDirectory, ProcessorRegistry, RetryEnvelope};
use eyre::{Result, WrapErr};
use queue_worker::{AmqpPublisher, HealthState, QueueWorker, health_router, metrics};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Start the health HTTP server
///
/// - Liveness probes: `/health`, `/healthz`
/// - Readiness probes: `/ready`, `/readyz`
/// - Prometheus metrics: `/metrics`
async fn start_health_server(health_state: HealthState, server: ServerConfig) -> Result<()> {
    let app: Router = health_router(health_state);

    let addr = server.address();
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind health server to {}", addr))?;

    info!(address = %addr, "Health server listening");

    axum::serve(listener, app)
        .await
        .wrap_err("Health server failed")?;

    Ok(())
}

/// Run the notification worker
///
/// 1. Sets up error reports and structured logging
/// 2. Loads every setting up front so misconfiguration fails before any connection
/// 3. Connects to PostgreSQL and RabbitMQ with startup retries
/// 4. Declares the queue topology
/// 5. Consumes until SIGINT/SIGTERM, then drains in-flight deliveries
///
/// # Errors
///
/// Returns an error if configuration is invalid, a connection cannot be
/// established, the topology cannot be declared, or the consumer fails.
pub async fn run() -> Result<()> {
    core_config::tracing::install_color_eyre();
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    metrics::init_metrics();

    let app_name = env!("CARGO_PKG_NAME");
    let app_version = env!("CARGO_PKG_VERSION");
    info!(name = %app_name, version = %app_version, environment = ?environment, "Starting notification worker");

    let settings = WorkerSettings::from_env().wrap_err("Failed to load worker configuration")?;
    let topology = settings
        .topology()
        .wrap_err("Invalid queue topology configuration")?;
    let server_config = ServerConfig::from_env().wrap_err("Failed to load health server configuration")?;
    let pg_config = PostgresConfig::from_env().wrap_err("Failed to load PostgreSQL configuration")?;
    let amqp_config = AmqpConfig::from_env().wrap_err("Failed to load RabbitMQ configuration")?;
    let mandrill_config = MandrillConfig::from_env().wrap_err("Failed to load Mandrill configuration")?;
    let twilio_config = TwilioConfig::from_env().wrap_err("Failed to load Twilio configuration")?;

    let worker_config = settings.worker_config();
    info!(
        queue = %worker_config.queue_name,
        dead_letter_exchange = %topology.dead_letter_exchange(),
        dead_letter_queue = %topology.dead_letter_queue(),
        max_concurrent_jobs = worker_config.max_concurrent_jobs,
        max_retries = worker_config.max_retries,
        shutdown_grace_secs = worker_config.shutdown_grace.as_secs(),
        unclassified_policy = %worker_config.unclassified_policy,
        "Worker configuration loaded"
    );

    info!("Connecting to PostgreSQL...");
    let db = connect_from_config_with_retry(pg_config, Some(RetryConfig::startup()))
        .await
        .wrap_err("Failed to connect to PostgreSQL")?;
    check_health(&db)
        .await
        .wrap_err("PostgreSQL is not answering queries")?;
    info!("Connected to PostgreSQL successfully");

    info!(url = %amqp_config.redacted_url(), "Connecting to RabbitMQ...");
    let connection = database::amqp::connect_with_retry(&amqp_config, Some(RetryConfig::startup()))
        .await
        .wrap_err("Failed to connect to RabbitMQ")?;
    let connection = Arc::new(connection);

    topology
        .ensure(&connection)
        .await
        .wrap_err("Failed to declare queue topology")?;

    let registry = ProcessorRegistry::with_default_processors(
        Arc::new(PgUserDirectory::new(db)),
        Arc::new(MandrillTransport::new(mandrill_config)),
        Arc::new(TwilioTransport::new(twilio_config)),
    );
    info!(types = ?registry.supported_types(), "Processor registry initialized");

    let publisher = AmqpPublisher::new(Arc::clone(&connection));
    let worker = QueueWorker::<RetryEnvelope, _, _>::new(registry, publisher, worker_config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            error!("Error waiting for shutdown signal: {}", e);
        }
        let _ = shutdown_tx.send(true);
    });

    let health_state = HealthState::new(
        connection.clone(),
        app_name,
        app_version,
        topology.primary_queue(),
    );

    tokio::spawn(async move {
        if let Err(e) = start_health_server(health_state, server_config).await {
            error!(error = %e, "Health server failed");
        }
    });

    info!("Starting notification consumer...");
    let result = worker.consume(&connection, shutdown_rx).await;

    if let Err(e) = connection.close(200, "worker shutdown").await {
        warn!(error = %e, "Failed to close RabbitMQ connection cleanly");
    }

    result.wrap_err("Notification consumer failed")?;

    info!("Notification worker stopped");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        },
    }

    Ok(())
}
