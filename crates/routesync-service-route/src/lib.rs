//! HTTP surface of the RouteSync path finding service.
//!
//! The binary in `main.rs` only wires configuration; the router and handlers
//! live here so integration tests can drive them in-process.

#![deny(warnings)]

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use routesync_lib::routing::select_planner;
use routesync_lib::{RoutePlan, plan_routes};
use routesync_service_shared::{
    ApiError, AppState, FindPathsRequest, MetricsLayer, ProblemDetails, RequestId,
    ServiceResponse, Validate, ValidationProblem, cors_layer, from_lib_error, health_live,
    health_ready, metrics_handler, record_path_search_failed, record_paths_calculated,
    record_paths_returned,
};

/// Build the service router.
///
/// `metrics_path` is where Prometheus text is served (normally `/metrics`).
pub fn router(state: AppState, metrics_path: &str) -> Router {
    Router::new()
        .route("/find_paths/", post(find_paths_handler))
        .route("/find_paths", post(find_paths_handler))
        .route("/locations", get(locations_handler))
        .route("/test-cors", get(test_cors_handler))
        .route(metrics_path, get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(cors_layer())
        .layer(MetricsLayer)
        .with_state(state)
}

/// Handle `POST /find_paths/`.
///
/// Validation failures are 422, unknown locations 404. "No path" outcomes are
/// a normal 200 body whose `paths` is `{"error": ...}`.
async fn find_paths_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<FindPathsRequest>, JsonRejection>,
) -> Result<ServiceResponse<RoutePlan>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        record_path_search_failed("validation_error");
        ApiError::from(ValidationProblem::malformed_body(
            rejection.body_text(),
            request_id.as_str(),
        ))
    })?;

    info!(
        request_id = %request_id,
        start = %request.start,
        goal = %request.goal,
        top_n = request.top_n,
        "handling find_paths request"
    );

    if let Err(problem) = request.validate(request_id.as_str()) {
        record_path_search_failed("validation_error");
        info!(request_id = %request_id, fields = ?problem.fields(), "rejected invalid request");
        return Err((*problem).into());
    }

    let route_request = request.to_route_request();
    let planner = select_planner(route_request.top_n, state.options().limits).name();

    let search_state = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        plan_routes(
            search_state.network(),
            search_state.policies(),
            &route_request,
            search_state.options(),
        )
    })
    .await
    .map_err(|e| {
        error!(request_id = %request_id, error = %e, "path search task failed");
        ApiError::from(ProblemDetails::internal_error(
            "path search did not complete",
            request_id.as_str(),
        ))
    })?;

    let plan = match result {
        Ok(plan) => plan,
        Err(e) => {
            let problem = from_lib_error(&e, request_id.as_str());
            let reason = match problem.status() {
                404 => "unknown_location",
                422 => "validation_error",
                _ => "internal_error",
            };
            record_path_search_failed(reason);
            warn!(request_id = %request_id, error = %e, reason, "find_paths request failed");
            return Err(problem);
        }
    };

    match plan.paths.no_path_reason() {
        Some(reason) => {
            record_path_search_failed(reason.as_str());
            info!(
                request_id = %request_id,
                reason = reason.as_str(),
                avoided = ?plan.avoided_countries,
                "no path satisfies the request"
            );
        }
        None => {
            let count = plan.paths.paths().len();
            record_paths_calculated(planner);
            record_paths_returned(count);
            info!(request_id = %request_id, planner, paths = count, "paths computed");
        }
    }

    Ok(ServiceResponse::new(plan))
}

#[derive(Debug, Default, Deserialize)]
struct LocationsQuery {
    country: Option<String>,
    search: Option<String>,
}

/// One entry of `GET /locations`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationSummary {
    pub name: String,
    pub country_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
struct LocationsResponse {
    locations: Vec<LocationSummary>,
}

/// Handle `GET /locations`, sorted by name.
async fn locations_handler(
    State(state): State<AppState>,
    Query(query): Query<LocationsQuery>,
) -> ServiceResponse<LocationsResponse> {
    let locations = state
        .network()
        .find_locations(query.country.as_deref(), query.search.as_deref())
        .into_iter()
        .map(|location| LocationSummary {
            name: location.name.clone(),
            country_code: location.country.to_string(),
            latitude: location.position.latitude,
            longitude: location.position.longitude,
        })
        .collect();

    ServiceResponse::new(LocationsResponse { locations })
}

#[derive(Debug, Serialize)]
struct CorsCheck {
    message: &'static str,
}

/// Frontend connectivity check.
async fn test_cors_handler() -> Json<CorsCheck> {
    Json(CorsCheck {
        message: "CORS is working",
    })
}
