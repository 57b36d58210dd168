//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route and status
//! - `gateway_request_duration_seconds` (histogram): time to response head
//! - `gateway_inference_duration_seconds` (histogram): backend call latency
//!   by outcome
//!
//! Recording is a no-op until a recorder is installed, so handlers and tests
//! can call these unconditionally.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a finished request.
pub fn record_request(route: &'static str, status: u16, start: Instant) {
    counter!("gateway_requests_total", "route" => route, "status" => status.to_string()).increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record one inference backend call.
pub fn record_inference(outcome: &'static str, start: Instant) {
    histogram!("gateway_inference_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
