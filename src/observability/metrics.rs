//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, upstream
//! - `proxy_request_duration_seconds` (histogram): latency by method, upstream
//! - `proxy_redirect_hops_total` (counter): redirect targets fetched
//! - `proxy_disguise_responses_total` (counter): disguise responses by action
//! - `proxy_token_requests_total` (counter): token requests relayed
//!
//! Recording without an installed recorder is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, upstream: &str, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "upstream" => upstream.to_string()
    )
    .increment(1);

    histogram!(
        "proxy_request_duration_seconds",
        "method" => method.to_string(),
        "upstream" => upstream.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_redirect_hop() {
    counter!("proxy_redirect_hops_total").increment(1);
}

pub fn record_disguise(action: &'static str) {
    counter!("proxy_disguise_responses_total", "action" => action).increment(1);
}

pub fn record_token_request() {
    counter!("proxy_token_requests_total").increment(1);
}
