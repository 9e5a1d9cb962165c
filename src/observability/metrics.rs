//! Metrics collection and exposition.
//!
//! # Metrics
//! - `collector_outcomes_total` (counter): outcomes by sweep kind and status
//! - `collector_swept_amount_total` (counter): submitted amount by sweep kind,
//!   saturated to u64 smallest units
//! - `collector_rpc_failures_total` (counter): exhausted RPC calls by method
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;

use alloy::primitives::U256;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one account outcome.
pub fn record_outcome(kind: &'static str, status: &'static str) {
    ::metrics::counter!("collector_outcomes_total", "kind" => kind, "status" => status).increment(1);
}

/// Add a submitted amount.
pub fn record_swept(kind: &'static str, amount: U256) {
    let amount = u64::try_from(amount).unwrap_or(u64::MAX);
    ::metrics::counter!("collector_swept_amount_total", "kind" => kind).increment(amount);
}

/// Count an RPC call that failed on every provider.
pub fn record_rpc_failure(method: &'static str) {
    ::metrics::counter!("collector_rpc_failures_total", "method" => method).increment(1);
}
