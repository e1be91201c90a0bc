//! Shared infrastructure for RouteSync HTTP services.
//!
//! This crate provides common functionality used by the service binaries:
//!
//! - [`AppState`]: Pre-loaded network and cargo policy catalog shared by handlers
//! - [`SearchConfig`]: Search settings read from the environment
//! - [`health`]: Health check handlers for Kubernetes liveness/readiness probes
//! - [`ProblemDetails`]: RFC 9457 Problem Details for consistent error responses
//! - [`ValidationProblem`]: 422 responses with field-level errors
//! - [`ServiceResponse`]: Wrapper for successful responses with content type
//! - [`metrics`]: Prometheus metrics infrastructure
//! - [`logging`]: Structured JSON logging setup
//! - [`middleware`]: Request tracking, metrics and CORS middleware
//! - [`FindPathsRequest`]: Wire request for `POST /find_paths/` with validation
//!
//! # Architecture
//!
//! The services follow a thin-handler pattern where all business logic resides
//! in `routesync-lib`. This crate provides only HTTP glue:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Parse request JSON                                       │
//! │  - Validate fields (422 on failure)                         │
//! │  - Call routesync-lib on the blocking pool                  │
//! │  - Format response                                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides test fixtures and mock state for handler
//! testing. Enable the `test-utils` feature to access it from dependent crates.

#![deny(warnings)]

mod config;
mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::SearchConfig;
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_path_search_failed, record_paths_calculated,
    record_paths_returned, MetricsConfig, MetricsError,
};
pub use middleware::{cors_layer, extract_or_generate_request_id, MetricsLayer, RequestId};
pub use problem::{
    from_lib_error, ApiError, FieldError, ProblemDetails, ValidationProblem,
    PROBLEM_INTERNAL_ERROR, PROBLEM_SERVICE_UNAVAILABLE, PROBLEM_UNKNOWN_LOCATION,
    PROBLEM_VALIDATION,
};
pub use request::{FindPathsRequest, Validate};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError};
