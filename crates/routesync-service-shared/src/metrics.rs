//! Prometheus exporter and the path-search counters.
//!
//! HTTP-level series are recorded by [`crate::middleware::MetricsLayer`]; this
//! module owns the recorder and the search outcome series:
//!
//! - `routesync_paths_calculated_total{planner}`
//! - `routesync_path_search_failed_total{reason}`
//! - `routesync_paths_returned` histogram

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use thiserror::Error;

static RECORDER: OnceCell<PrometheusHandle> = OnceCell::new();

const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Where and whether the exporter is served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: DEFAULT_METRICS_PATH.to_string(),
        }
    }
}

impl MetricsConfig {
    /// Read `METRICS_ENABLED` and `METRICS_PATH`.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("METRICS_ENABLED").ok().as_deref(),
            std::env::var("METRICS_PATH").ok().as_deref(),
        )
    }

    fn from_vars(enabled: Option<&str>, path: Option<&str>) -> Self {
        let enabled = !enabled.is_some_and(|v| v.trim().eq_ignore_ascii_case("false"));
        // axum route paths must start with a slash.
        let path = path
            .map(str::trim)
            .filter(|p| p.starts_with('/') && p.len() > 1)
            .unwrap_or(DEFAULT_METRICS_PATH)
            .to_string();
        Self { enabled, path }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("metrics are disabled")]
    Disabled,
    #[error("metrics recorder already initialized")]
    AlreadyInitialized,
    #[error("failed to install metrics recorder: {0}")]
    InstallFailed(String),
}

/// Install the global Prometheus recorder. Call once at startup.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if RECORDER.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;
    RECORDER
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

/// Prometheus text exposition of everything recorded so far.
pub async fn metrics_handler() -> String {
    match RECORDER.get() {
        Some(handle) => handle.render(),
        None => "# metrics recorder not installed\n".to_string(),
    }
}

/// A search that produced at least one path. `planner` is `dijkstra` or `yen`.
pub fn record_paths_calculated(planner: &'static str) {
    metrics::counter!("routesync_paths_calculated_total", "planner" => planner).increment(1);
}

/// A request that ended without paths, labelled by why.
pub fn record_path_search_failed(reason: &str) {
    metrics::counter!(
        "routesync_path_search_failed_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

pub fn record_paths_returned(count: usize) {
    metrics::histogram!("routesync_paths_returned").record(count as f64);
}
