//! Health check handlers for queue workers.
//!
//! This module provides reusable Axum handlers for:
//! - Liveness probes (`/health`, `/healthz`)
//! - Readiness probes (`/ready`, `/readyz`)
//! - Prometheus metrics (`/metrics`)

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::metrics;

/// Reports whether the broker connection is usable.
pub trait BrokerStatus: Send + Sync {
    fn is_connected(&self) -> bool;
}

impl BrokerStatus for lapin::Connection {
    fn is_connected(&self) -> bool {
        self.status().connected()
    }
}

/// Shared state for health endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Broker connection for readiness checks.
    pub broker: Arc<dyn BrokerStatus>,
    /// Application name.
    pub app_name: String,
    /// Application version.
    pub app_version: String,
    /// Queue being consumed.
    pub queue_name: String,
}

impl HealthState {
    /// Create a new health state.
    pub fn new(
        broker: Arc<dyn BrokerStatus>,
        app_name: impl Into<String>,
        app_version: impl Into<String>,
        queue_name: impl Into<String>,
    ) -> Self {
        Self {
            broker,
            app_name: app_name.into(),
            app_version: app_version.into(),
            queue_name: queue_name.into(),
        }
    }
}

/// Health response for liveness probes.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status (always "healthy" if responding).
    pub status: String,
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
}

/// Liveness probe handler.
///
/// Always returns OK if the server is running.
pub async fn health_handler(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        name: state.app_name,
        version: state.app_version,
    })
}

/// Readiness probe handler.
///
/// Ready while the broker connection is open.
pub async fn ready_handler(
    State(state): State<HealthState>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    if state.broker.is_connected() {
        Ok((
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "queue": state.queue_name,
                "checks": { "rabbitmq": "ok" }
            })),
        ))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "queue": state.queue_name,
                "checks": { "rabbitmq": "disconnected" }
            })),
        ))
    }
}

/// Prometheus metrics endpoint handler.
pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::prometheus_handle() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            handle.render(),
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "Metrics not initialized".to_string(),
        )
            .into_response(),
    }
}

/// Create a standard health router.
///
/// - `/health`, `/healthz` - Liveness probe
/// - `/ready`, `/readyz` - Readiness probe
/// - `/metrics` - Prometheus metrics
pub fn health_router(state: HealthState) -> axum::Router {
    use axum::routing::get;

    axum::Router::new()
        .route("/health", get(health_handler))
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/readyz", get(ready_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
