use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Call once, from `main`.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("failed to install Prometheus recorder: {}", e))
    })?;

    METRICS_HANDLE.set(handle).map_err(|_| {
        AppError::ConfigError(anyhow::anyhow!("metrics recorder already initialized"))
    })
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Count a proxy call by outcome (`responded`, `unreachable`).
pub fn record_proxy_outcome(outcome: &'static str) {
    counter!("proxy_requests_total", "outcome" => outcome).increment(1);
}

/// Count an assistant call by outcome (`structured`, `fallback`, `error`, ...).
pub fn record_assistant_outcome(outcome: &'static str) {
    counter!("assistant_requests_total", "outcome" => outcome).increment(1);
}
