//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): relay calls by method and outcome
//! - `relay_request_duration_seconds` (histogram): end-to-end call latency
//! - `relay_registry_entries` (gauge): bodies currently held by the registry
//!
//! # Design Decisions
//! - Without an installed recorder every call here is a no-op
//! - Method label is normalized so callers cannot blow up cardinality

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!("relay_requests_total", "Relay calls by method and outcome");
    describe_histogram!(
        "relay_request_duration_seconds",
        "Relay call duration in seconds"
    );
    describe_gauge!("relay_registry_entries", "Bodies held by the response registry");

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Map a caller-supplied method onto a bounded label set.
pub fn method_label(method: &str) -> &'static str {
    match method {
        "GET" => "GET",
        "HEAD" => "HEAD",
        "POST" => "POST",
        "PUT" => "PUT",
        "PATCH" => "PATCH",
        "DELETE" => "DELETE",
        "OPTIONS" => "OPTIONS",
        "" => "none",
        _ => "other",
    }
}

/// Record a finished relay call.
pub fn record_relay(method: &'static str, outcome: &'static str, start: Instant) {
    counter!("relay_requests_total", "method" => method, "outcome" => outcome).increment(1);
    histogram!("relay_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_registry_size(size: usize) {
    gauge!("relay_registry_entries").set(size as f64);
}
