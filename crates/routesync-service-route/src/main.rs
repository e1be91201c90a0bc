//! RouteSync path finding HTTP service.
//!
//! # Endpoints
//!
//! - `POST /find_paths/` (and `/find_paths`) - Ranked multi-modal paths
//! - `GET /locations` - Known locations, optionally `?country=XX&search=text`
//! - `GET /test-cors` - Frontend connectivity check
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Kubernetes liveness probe
//! - `GET /health/ready` - Kubernetes readiness probe
//!
//! # Configuration
//!
//! - `ROUTESYNC_DATA_PATH` - CSV directory or SQLite file (default: /data/routesync)
//! - `SERVICE_PORT` - HTTP port (default: 8000)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `METRICS_ENABLED`, `METRICS_PATH` - Prometheus exporter
//! - `ROUTESYNC_NORMALIZATION`, `ROUTESYNC_MAX_SPUR_SEARCHES`,
//!   `ROUTESYNC_SEARCH_BUDGET_MS` - Search tuning

use std::env;
use std::net::SocketAddr;

use tracing::{error, info, warn};

use routesync_lib::dataset::DATA_PATH_ENV;
use routesync_service_route::router;
use routesync_service_shared::{
    AppState, LoggingConfig, MetricsConfig, SearchConfig, init_logging, init_metrics,
};

const DEFAULT_DATA_PATH: &str = "/data/routesync";
const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("route");
    init_logging(&logging_config);

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let data_path = env::var(DATA_PATH_ENV).unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());
    let port: u16 = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let search = SearchConfig::from_env();

    info!(
        data_path = %data_path,
        port,
        normalization = %search.normalization,
        max_spur_searches = search.limits.max_spur_searches,
        budget_ms = search.limits.time_budget.as_millis() as u64,
        "starting route service"
    );

    let state = AppState::load(&data_path, search.search_options()).map_err(|e| {
        error!(error = %e, path = %data_path, "failed to load application state");
        e
    })?;

    info!(
        locations = state.network().location_count(),
        segments = state.network().segment_count(),
        policy_rules = state.policies().rules().len(),
        "application state loaded"
    );

    let app = router(state, &metrics_config.path);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
