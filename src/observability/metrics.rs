//! Metrics collection and exposition.
//!
//! # Metrics
//! - `shell_mounts_total` (counter): successful loads
//! - `shell_unmounts_total` (counter): successful unloads
//! - `shell_mounted` (gauge): 1 while a UI tree is attached
//! - `shell_update_activations_total` (counter): activation attempts by result
//! - `shell_hard_reloads_total` (counter): hard reloads initiated
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_mount() {
    counter!("shell_mounts_total").increment(1);
    gauge!("shell_mounted").set(1.0);
}

pub fn record_unmount() {
    counter!("shell_unmounts_total").increment(1);
    gauge!("shell_mounted").set(0.0);
}

pub fn record_activation(success: bool) {
    let result = if success { "sent" } else { "failed" };
    counter!("shell_update_activations_total", "result" => result).increment(1);
}

pub fn record_hard_reload() {
    counter!("shell_hard_reloads_total").increment(1);
}
