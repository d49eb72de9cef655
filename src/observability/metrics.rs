//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_proxy_requests_total` (counter): proxied requests by method, status
//! - `gateway_proxy_request_duration_seconds` (histogram): upstream round trip
//! - `gateway_gate_decisions_total` (counter): navigations by gate outcome
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - Status label is the status returned to the browser, not the upstream one

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one proxied request.
pub fn record_proxy_request(method: &str, status: u16, start: Instant) {
    counter!(
        "gateway_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "gateway_proxy_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one access gate outcome.
pub fn record_gate_decision(decision: &'static str) {
    counter!("gateway_gate_decisions_total", "decision" => decision).increment(1);
}
