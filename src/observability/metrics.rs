//! Metrics collection and exposition.
//!
//! # Metrics
//! - `batchtx_rows_total` (counter): processed rows by operation, outcome
//! - `batchtx_batch_duration_seconds` (histogram): wall time of one pass
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::batch::classify::Operation;

/// Start the Prometheus scrape endpoint. Needs a running Tokio runtime.
pub fn init_metrics(address: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(address)
        .install()?;
    tracing::info!(address = %address, "Metrics endpoint listening");
    Ok(())
}

pub fn record_row_outcome(operation: Operation, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    ::metrics::counter!(
        "batchtx_rows_total",
        "operation" => operation.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_batch_duration(operation: Operation, elapsed: Duration) {
    ::metrics::histogram!(
        "batchtx_batch_duration_seconds",
        "operation" => operation.as_str()
    )
    .record(elapsed.as_secs_f64());
}
