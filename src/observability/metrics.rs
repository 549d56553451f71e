//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gm_connect_total` (counter): connect attempts by outcome
//! - `gm_send_total` (counter): greeting sends by outcome
//! - `gm_query_total` (counter): contract reads by query and outcome
//! - `gm_cooldown_locked` (gauge): 1 while the connected address is locked
//! - `gm_session_connected` (gauge): 1 while a session exists
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_connect(outcome: &'static str) {
    counter!("gm_connect_total", "outcome" => outcome).increment(1);
}

pub fn record_send(outcome: &'static str) {
    counter!("gm_send_total", "outcome" => outcome).increment(1);
}

pub fn record_query(query: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("gm_query_total", "query" => query, "outcome" => outcome).increment(1);
}

pub fn record_cooldown_locked(locked: bool) {
    gauge!("gm_cooldown_locked").set(if locked { 1.0 } else { 0.0 });
}

pub fn record_session_connected(connected: bool) {
    gauge!("gm_session_connected").set(if connected { 1.0 } else { 0.0 });
}
