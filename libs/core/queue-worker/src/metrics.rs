//! Prometheus metrics for queue workers
//!
//! Provides observability into delivery throughput and dispositions.

use metrics::{counter, gauge, histogram, Gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Duration;
use tracing::{info, warn};

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize Prometheus metrics
///
/// Call this once at startup. Subsequent calls are no-ops.
pub fn init_metrics() {
    if PROMETHEUS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROMETHEUS_HANDLE.set(handle).is_ok() {
                info!("Prometheus metrics initialized");
            }
        }
        Err(e) => warn!(error = %e, "Failed to install Prometheus recorder"),
    }
}

/// Get the Prometheus handle for rendering metrics
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Render metrics in Prometheus format
pub fn render_metrics() -> String {
    prometheus_handle()
        .map(|h| h.render())
        .unwrap_or_default()
}

/// Queue worker metrics helper
#[derive(Clone)]
pub struct WorkerMetrics {
    /// Queue name for labeling
    queue_name: String,
    /// Handler name for labeling
    handler_name: String,
}

impl WorkerMetrics {
    /// Create new WorkerMetrics
    pub fn new(queue_name: impl Into<String>, handler_name: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            handler_name: handler_name.into(),
        }
    }

    /// Record a delivery being received
    pub fn delivery_received(&self) {
        counter!(
            "queue_worker_deliveries_received_total",
            "queue" => self.queue_name.clone(),
            "handler" => self.handler_name.clone()
        )
        .increment(1);
    }

    /// Record the disposition applied to a delivery
    pub fn disposition(&self, disposition: &'static str, duration: Duration) {
        counter!(
            "queue_worker_dispositions_total",
            "queue" => self.queue_name.clone(),
            "handler" => self.handler_name.clone(),
            "disposition" => disposition
        )
        .increment(1);

        histogram!(
            "queue_worker_delivery_duration_seconds",
            "queue" => self.queue_name.clone(),
            "handler" => self.handler_name.clone()
        )
        .record(duration.as_secs_f64());
    }

    /// Record a processing failure by error kind
    pub fn processing_failed(&self, kind: &'static str) {
        counter!(
            "queue_worker_processing_errors_total",
            "queue" => self.queue_name.clone(),
            "handler" => self.handler_name.clone(),
            "kind" => kind
        )
        .increment(1);
    }

    /// Record a retry envelope being republished
    pub fn retry_published(&self) {
        counter!(
            "queue_worker_retries_published_total",
            "queue" => self.queue_name.clone(),
            "handler" => self.handler_name.clone()
        )
        .increment(1);
    }

    /// Record a settlement the broker refused
    pub fn settle_failed(&self) {
        counter!(
            "queue_worker_settle_errors_total",
            "queue" => self.queue_name.clone()
        )
        .increment(1);
    }

    /// Record a processing task being spawned
    pub fn task_started(&self) {
        self.in_flight_gauge().increment(1.0);
    }

    /// Record a processing task settling its delivery, detached tasks included
    pub fn task_finished(&self) {
        self.in_flight_gauge().decrement(1.0);
    }

    fn in_flight_gauge(&self) -> Gauge {
        gauge!(
            "queue_worker_in_flight",
            "queue" => self.queue_name.clone(),
            "handler" => self.handler_name.clone()
        )
    }
}
