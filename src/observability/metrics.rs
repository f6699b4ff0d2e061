//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Record per-endpoint request counts and latency
//! - Count method overrides applied to form posts
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `mvc_requests_total` (counter): requests by endpoint, method, status
//! - `mvc_request_duration_seconds` (histogram): latency by endpoint
//! - `mvc_method_overrides_total` (counter): overrides by target method
//! - `mvc_hook_short_circuits_total` (counter): before hooks that answered

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(endpoint: &str, method: &str, status: u16, start: Instant) {
    let labels = [
        ("endpoint", endpoint.to_string()),
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    ::metrics::counter!("mvc_requests_total", &labels).increment(1);
    ::metrics::histogram!("mvc_request_duration_seconds", "endpoint" => endpoint.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_method_override(method: &str) {
    ::metrics::counter!("mvc_method_overrides_total", "method" => method.to_string()).increment(1);
}

pub fn record_short_circuit(endpoint: &str) {
    ::metrics::counter!("mvc_hook_short_circuits_total", "endpoint" => endpoint.to_string()).increment(1);
}
