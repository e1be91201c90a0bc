//! Response wrapper for successful HTTP responses.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Wrapper for successful responses with content type metadata.
///
/// The payload's fields are flattened into the top-level object, so existing
/// clients reading `avoided_countries` or `paths` see them where they expect.
///
/// # Example
///
/// ```
/// use routesync_service_shared::ServiceResponse;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct CorsCheck {
///     message: &'static str,
/// }
///
/// let response = ServiceResponse::new(CorsCheck { message: "CORS is working" });
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    /// The actual response payload.
    #[serde(flatten)]
    pub data: T,

    /// Content type for this response.
    pub content_type: String,
}

impl<T> ServiceResponse<T> {
    /// Create a new successful response with the default content type.
    pub fn new(data: T) -> Self {
        Self {
            data,
            content_type: "application/json".to_string(),
        }
    }

    /// Create a response with a custom content type.
    pub fn with_content_type(data: T, content_type: impl Into<String>) -> Self {
        Self {
            data,
            content_type: content_type.into(),
        }
    }
}

impl<T> From<T> for ServiceResponse<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Counts {
        locations: usize,
    }

    #[test]
    fn test_response_serialization() {
        let response = ServiceResponse::new(Counts { locations: 13 });
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("\"locations\":13"));
        assert!(json.contains("\"content_type\":\"application/json\""));
    }

    #[test]
    fn test_custom_content_type() {
        let response = ServiceResponse::with_content_type(Counts { locations: 1 }, "text/plain");
        assert_eq!(response.content_type, "text/plain");
    }

    #[test]
    fn test_response_from_trait() {
        let data = Counts { locations: 2 };
        let response: ServiceResponse<Counts> = data.clone().into();
        assert_eq!(response.data, data);
    }

    #[test]
    fn test_route_plan_fields_are_flattened() {
        let plan = routesync_lib::RoutePlan {
            avoided_countries: vec!["DE".to_string()],
            penalty_countries: Vec::new(),
            paths: routesync_lib::PathSet::Found(Vec::new()),
        };
        let json = serde_json::to_value(ServiceResponse::new(plan)).unwrap();

        assert_eq!(json["avoided_countries"], serde_json::json!(["DE"]));
        assert_eq!(json["paths"], serde_json::json!([]));
        assert!(json.get("data").is_none());
    }
}
