//! Metrics collection and exposition.
//!
//! # Metrics
//! - `admission_decisions_total` (counter): requests by decision
//! - `handler_panics_total` (counter): contained handler panics
//! - `limiter_tracked_clients` (gauge): client registry size
//! - `in_flight_work` (gauge): requests plus background jobs in flight
//!
//! # Design Decisions
//! - Updates are atomic operations, cheap enough for the request path
//! - The exporter is optional; recording without it is a no-op

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics exporter started");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to start metrics exporter");
        }
    }
}

/// Record an admitted request.
pub fn record_admitted() {
    counter!("admission_decisions_total", "decision" => "admitted").increment(1);
}

/// Record a denied request.
pub fn record_denied() {
    counter!("admission_decisions_total", "decision" => "denied").increment(1);
}

/// Record a contained handler panic.
pub fn record_panic() {
    counter!("handler_panics_total").increment(1);
}

/// Record the current client registry size.
pub fn record_client_count(count: usize) {
    gauge!("limiter_tracked_clients").set(count as f64);
}

/// Record the current amount of in-flight work.
pub fn record_in_flight(count: usize) {
    gauge!("in_flight_work").set(count as f64);
}
