//! Metrics collection and Prometheus export.
//!
//! Installs the Prometheus recorder and records analysis-specific metrics on
//! top of the HTTP metrics from `plant_core`.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder once per process. Later calls are no-ops.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => tracing::warn!("Failed to install Prometheus recorder: {}", e),
    }
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

/// Count a finished analysis by outcome (`healthy`, `diseased`, or an error kind).
pub fn record_analysis(model: &str, outcome: &str, latency: Duration) {
    let labels = [("model", model.to_string()), ("outcome", outcome.to_string())];
    counter!("plant_analyses_total", &labels).increment(1);
    histogram!("plant_vision_latency_seconds", &labels).record(latency.as_secs_f64());
}
