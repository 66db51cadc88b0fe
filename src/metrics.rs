//! Prometheus metrics for request handling and the catalog cache.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::warn;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder once and return its handle.
///
/// Later calls (several routers in one test binary) reuse the first handle.
pub fn init() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Prometheus recorder not installed: {}", e);
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

pub fn record_request(endpoint: &'static str, status: u16) {
    counter!("cinemanello_requests_total", "endpoint" => endpoint, "status" => status.to_string())
        .increment(1);
}

pub fn record_duration(endpoint: &'static str, start: Instant) {
    histogram!("cinemanello_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cache_hit() {
    counter!("cinemanello_cache_hits_total").increment(1);
}

pub fn record_cache_miss() {
    counter!("cinemanello_cache_misses_total").increment(1);
}

pub fn record_upstream_error() {
    counter!("cinemanello_upstream_errors_total").increment(1);
}

pub fn set_snapshot_items(count: usize) {
    gauge!("cinemanello_snapshot_items").set(count as f64);
}
