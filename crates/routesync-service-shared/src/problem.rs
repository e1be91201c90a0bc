//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Provides structured error responses following the Problem Details standard.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>
//!
//! Field validation failures use [`ValidationProblem`], whose `detail` is a
//! list of field errors (`loc`, `msg`, `type`) rather than a single string, so
//! existing frontends can keep highlighting the offending input.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use routesync_lib::Error as LibError;

/// Problem type URI for unknown location names.
pub const PROBLEM_UNKNOWN_LOCATION: &str = "/problems/unknown-location";

/// Problem type URI for request validation failures.
pub const PROBLEM_VALIDATION: &str = "/problems/validation-error";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// Problem type URI for service unavailable (e.g., dataset missing).
pub const PROBLEM_SERVICE_UNAVAILABLE: &str = "/problems/service-unavailable";

const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// RFC 9457 Problem Details response structure.
///
/// # Example
///
/// ```
/// use routesync_service_shared::{ProblemDetails, PROBLEM_UNKNOWN_LOCATION};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_UNKNOWN_LOCATION,
///     "Unknown Location",
///     StatusCode::NOT_FOUND,
/// )
/// .with_detail("Location 'Shangai' not found. Did you mean: Shanghai?")
/// .with_request_id("req-12345");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// URI reference identifying the specific occurrence (e.g., request ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Content type for this response (always "application/problem+json").
    pub content_type: String,
}

impl ProblemDetails {
    /// Create a new ProblemDetails with required fields.
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            content_type: PROBLEM_CONTENT_TYPE.to_string(),
        }
    }

    /// Add a detailed explanation of this specific problem occurrence.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add the request identifier for tracing.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// Create a 404 Not Found problem for unknown locations.
    pub fn unknown_location(
        name: &str,
        suggestions: &[String],
        request_id: impl Into<String>,
    ) -> Self {
        let detail = if suggestions.is_empty() {
            format!("Location '{}' not found", name)
        } else {
            format!(
                "Location '{}' not found. Did you mean: {}?",
                name,
                suggestions.join(", ")
            )
        };

        Self::new(
            PROBLEM_UNKNOWN_LOCATION,
            "Unknown Location",
            StatusCode::NOT_FOUND,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// Create a 500 Internal Server Error problem.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// Create a 503 Service Unavailable problem.
    pub fn service_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_SERVICE_UNAVAILABLE,
            "Service Unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        problem_response(status, Json(&self).into_response())
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Location of the offending value, e.g. `["body", "top_n"]`.
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    /// A `value_error` on a body field.
    pub fn body_field(field: &str, msg: impl Into<String>) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.into(),
            kind: "value_error".to_string(),
        }
    }

    /// An error about the body as a whole (malformed JSON, wrong types).
    pub fn body(msg: impl Into<String>) -> Self {
        Self {
            loc: vec!["body".to_string()],
            msg: msg.into(),
            kind: "value_error".to_string(),
        }
    }
}

/// 422 Unprocessable Entity problem carrying every field failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationProblem {
    #[serde(rename = "type")]
    pub type_uri: String,
    pub title: String,
    pub status: u16,
    pub detail: Vec<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    pub content_type: String,
}

impl ValidationProblem {
    pub fn new(detail: Vec<FieldError>, request_id: impl Into<String>) -> Self {
        Self {
            type_uri: PROBLEM_VALIDATION.to_string(),
            title: "Validation Error".to_string(),
            status: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
            detail,
            instance: Some(request_id.into()),
            content_type: PROBLEM_CONTENT_TYPE.to_string(),
        }
    }

    /// Build from library validation errors; other variants are ignored.
    pub fn from_lib_errors<'a>(
        errors: impl IntoIterator<Item = &'a LibError>,
        request_id: impl Into<String>,
    ) -> Self {
        let detail = errors
            .into_iter()
            .filter_map(|error| match error {
                LibError::InvalidRequest { field, message } => {
                    Some(FieldError::body_field(field, message.clone()))
                }
                _ => None,
            })
            .collect();
        Self::new(detail, request_id)
    }

    /// 422 for a body that could not be parsed into the request type.
    pub fn malformed_body(message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(vec![FieldError::body(message)], request_id)
    }

    /// Names of the failing fields, in report order.
    pub fn fields(&self) -> Vec<&str> {
        self.detail
            .iter()
            .filter_map(|error| error.loc.get(1).map(String::as_str))
            .collect()
    }
}

impl std::fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.detail.iter().map(|e| e.msg.as_str()).collect();
        write!(f, "{}: {}", self.title, messages.join("; "))
    }
}

impl std::error::Error for ValidationProblem {}

impl IntoResponse for ValidationProblem {
    fn into_response(self) -> Response {
        problem_response(StatusCode::UNPROCESSABLE_ENTITY, Json(&self).into_response())
    }
}

fn problem_response(status: StatusCode, mut response: Response) -> Response {
    response.headers_mut().insert(
        axum::http::header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static(PROBLEM_CONTENT_TYPE),
    );
    *response.status_mut() = status;
    response
}

/// Any error a handler returns to the client.
#[derive(Debug, Clone)]
pub enum ApiError {
    Problem(ProblemDetails),
    Validation(ValidationProblem),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Problem(problem) => problem.status,
            ApiError::Validation(problem) => problem.status,
        }
    }
}

impl From<ProblemDetails> for ApiError {
    fn from(problem: ProblemDetails) -> Self {
        ApiError::Problem(problem)
    }
}

impl From<ValidationProblem> for ApiError {
    fn from(problem: ValidationProblem) -> Self {
        ApiError::Validation(problem)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Problem(problem) => problem.into_response(),
            ApiError::Validation(problem) => problem.into_response(),
        }
    }
}

/// Convert library errors to an HTTP problem.
///
/// The `request_id` must be provided separately since library errors don't have it.
/// No-path variants are normally reported inside a 200 body and only land
/// here if a caller chooses to treat them as failures.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ApiError {
    match error {
        LibError::UnknownLocation { name, suggestions } => {
            ProblemDetails::unknown_location(name, suggestions, request_id).into()
        }
        LibError::InvalidRequest { .. } => {
            ValidationProblem::from_lib_errors([error], request_id).into()
        }
        LibError::DatasetNotFound { path } => ProblemDetails::service_unavailable(
            format!("Dataset not available at {}", path.display()),
            request_id,
        )
        .into(),
        LibError::UnsupportedSchema => {
            ProblemDetails::internal_error("Unsupported dataset schema", request_id).into()
        }
        _ => ProblemDetails::internal_error(error.to_string(), request_id).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_details_new() {
        let problem = ProblemDetails::new(
            PROBLEM_UNKNOWN_LOCATION,
            "Unknown Location",
            StatusCode::NOT_FOUND,
        );
        assert_eq!(problem.type_uri, PROBLEM_UNKNOWN_LOCATION);
        assert_eq!(problem.title, "Unknown Location");
        assert_eq!(problem.status, 404);
        assert_eq!(problem.content_type, "application/problem+json");
    }

    #[test]
    fn test_problem_details_unknown_location_with_suggestions() {
        let suggestions = vec!["Shanghai".to_string(), "Shenzhen".to_string()];
        let problem = ProblemDetails::unknown_location("Shangai", &suggestions, "req-456");

        assert_eq!(problem.status, 404);
        let detail = problem.detail.as_deref().unwrap();
        assert!(detail.contains("Shangai"));
        assert!(detail.contains("Shanghai, Shenzhen"));
        assert_eq!(problem.instance.as_deref(), Some("req-456"));
    }

    #[test]
    fn test_problem_details_unknown_location_no_suggestions() {
        let problem = ProblemDetails::unknown_location("Atlantis", &[], "req-789");

        assert!(problem.detail.as_deref().unwrap().contains("Atlantis"));
        assert!(!problem.detail.as_deref().unwrap().contains("Did you mean"));
    }

    #[test]
    fn test_problem_details_serialization() {
        let problem = ProblemDetails::internal_error("Test error", "req-test");
        let json = serde_json::to_string(&problem).unwrap();

        assert!(json.contains("\"type\":\"/problems/internal-error\""));
        assert!(json.contains("\"title\":\"Internal Error\""));
        assert!(json.contains("\"status\":500"));
        assert!(json.contains("\"detail\":\"Test error\""));
        assert!(json.contains("\"instance\":\"req-test\""));
    }

    #[test]
    fn test_validation_problem_shape() {
        let problem = ValidationProblem::new(
            vec![FieldError::body_field("top_n", "top_n must be between 1 and 50")],
            "req-422",
        );
        let json = serde_json::to_value(&problem).unwrap();

        assert_eq!(json["status"], 422);
        assert_eq!(json["type"], PROBLEM_VALIDATION);
        assert_eq!(json["instance"], "req-422");
        assert_eq!(json["detail"][0]["loc"], serde_json::json!(["body", "top_n"]));
        assert_eq!(json["detail"][0]["type"], "value_error");
    }

    #[test]
    fn test_validation_problem_from_lib_errors_skips_other_variants() {
        let errors = [
            LibError::InvalidRequest {
                field: "start".to_string(),
                message: "start must not be empty".to_string(),
            },
            LibError::UnsupportedSchema,
            LibError::InvalidRequest {
                field: "top_n".to_string(),
                message: "top_n must be between 1 and 50".to_string(),
            },
        ];
        let problem = ValidationProblem::from_lib_errors(&errors, "req");
        assert_eq!(problem.fields(), vec!["start", "top_n"]);
    }

    #[test]
    fn test_from_lib_error_unknown_location() {
        let error = LibError::UnknownLocation {
            name: "Rotterdm".to_string(),
            suggestions: vec!["Rotterdam".to_string()],
        };
        let problem = from_lib_error(&error, "req-lib");

        assert_eq!(problem.status(), 404);
        match problem {
            ApiError::Problem(problem) => assert_eq!(problem.type_uri, PROBLEM_UNKNOWN_LOCATION),
            other => panic!("unexpected problem: {:?}", other),
        }
    }

    #[test]
    fn test_from_lib_error_invalid_request_is_422() {
        let error = LibError::InvalidRequest {
            field: "goal".to_string(),
            message: "start and goal must be different".to_string(),
        };
        let problem = from_lib_error(&error, "req-lib");
        assert_eq!(problem.status(), 422);
    }

    #[test]
    fn test_from_lib_error_dataset_not_found_is_503() {
        let error = LibError::DatasetNotFound {
            path: "/data/routesync".into(),
        };
        assert_eq!(from_lib_error(&error, "req").status(), 503);
    }
}
