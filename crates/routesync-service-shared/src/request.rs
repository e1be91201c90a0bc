//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use routesync_lib::{CargoDetails, PolicyFlag, RouteRequest, TransportMode};

use crate::ValidationProblem;

/// Validation trait for request types.
///
/// Implementations should validate all fields and report every failure at
/// once so clients can fix them in a single round trip.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned problem.
    ///
    /// Returns a boxed problem to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ValidationProblem>>;
}

/// Body of `POST /find_paths/`.
///
/// Field names and defaults match what the RouteSync frontend sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindPathsRequest {
    /// Origin location name.
    pub start: String,

    /// Destination location name.
    pub goal: String,

    /// ISO 3166-1 alpha-2 codes the paths must never touch.
    #[serde(default)]
    pub avoid_countries: Vec<String>,

    /// Number of paths to return.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_weight")]
    pub time_weight: f64,

    #[serde(default = "default_weight")]
    pub price_weight: f64,

    #[serde(default = "default_modes")]
    pub allowed_modes: Vec<TransportMode>,

    #[serde(default)]
    pub prohibited_flag: PolicyFlag,

    #[serde(default)]
    pub restricted_flag: PolicyFlag,

    /// Free-text cargo description matched against policy keywords.
    #[serde(default)]
    pub description: String,

    #[serde(default = "default_cargo_type")]
    pub cargo_type: String,

    /// Shipment weight in kilograms.
    #[serde(default)]
    pub weight: f64,
}

fn default_top_n() -> usize {
    3
}

fn default_weight() -> f64 {
    0.5
}

fn default_modes() -> Vec<TransportMode> {
    TransportMode::ALL.to_vec()
}

fn default_cargo_type() -> String {
    "general".to_string()
}

impl FindPathsRequest {
    /// Convert into the library request.
    pub fn to_route_request(&self) -> RouteRequest {
        RouteRequest::new(self.start.clone(), self.goal.clone())
            .with_top_n(self.top_n)
            .with_weights(self.time_weight, self.price_weight)
            .with_avoid_countries(self.avoid_countries.iter().cloned())
            .with_allowed_modes(self.allowed_modes.iter().copied())
            .with_policy_flags(self.prohibited_flag, self.restricted_flag)
            .with_cargo(CargoDetails {
                description: self.description.clone(),
                cargo_type: self.cargo_type.clone(),
                weight: self.weight,
            })
    }
}

impl From<FindPathsRequest> for RouteRequest {
    fn from(value: FindPathsRequest) -> Self {
        value.to_route_request()
    }
}

impl Validate for FindPathsRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ValidationProblem>> {
        let errors = self.to_route_request().validation_errors();
        if errors.is_empty() {
            return Ok(());
        }
        Err(Box::new(ValidationProblem::from_lib_errors(
            &errors, request_id,
        )))
    }
}
