//! Metrics collection and exposition.
//!
//! # Metrics
//! - `flash_messages_pushed_total` (counter): messages attached to responses
//! - `flash_messages_popped_total` (counter): messages decoded from requests
//! - `flash_decode_failures_total` (counter): tokens dropped as undecodable
//! - `flash_render_failures_total` (counter): renders replaced by empty output
//! - `flash_responses_total` (counter): responses by `kind` (html, passthrough)
//! - `flash_insertions_total` (counter): insertions by `marker`

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_pushed() {
    metrics::counter!("flash_messages_pushed_total").increment(1);
}

pub fn record_popped(count: usize) {
    metrics::counter!("flash_messages_popped_total").increment(count as u64);
}

pub fn record_decode_failure() {
    metrics::counter!("flash_decode_failures_total").increment(1);
}

pub fn record_render_failure() {
    metrics::counter!("flash_render_failures_total").increment(1);
}

pub fn record_response(kind: &'static str) {
    metrics::counter!("flash_responses_total", "kind" => kind).increment(1);
}

pub fn record_insertion(marker: &'static str) {
    metrics::counter!("flash_insertions_total", "marker" => marker).increment(1);
}
