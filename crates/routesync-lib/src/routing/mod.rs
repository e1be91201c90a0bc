//! Route finding for RouteSync shipments.
//!
//! This module provides:
//! - [`RouteRequest`] - Origin, destination, constraints and weighting for one search
//! - [`SearchOptions`] - Process-wide scoring and effort settings
//! - [`RoutePlan`] - Ranked paths plus country-avoidance annotations
//! - [`plan_routes`] - Main entry point for computing paths
//!
//! # Strategy Pattern
//!
//! The actual graph search is delegated to a [`RoutePlanner`]. Single-path
//! requests run one Dijkstra; anything larger goes through Yen's algorithm.
//!
//! # Example
//!
//! ```ignore
//! use routesync_lib::{load_dataset, plan_routes, RouteRequest, SearchOptions};
//!
//! let dataset = load_dataset("docs/fixtures/network")?;
//! let request = RouteRequest::new("Shanghai", "Rotterdam").with_top_n(5);
//! let plan = plan_routes(&dataset.network, &dataset.policies, &request, &SearchOptions::default())?;
//! ```

mod aggregate;
mod planner;

pub use aggregate::{aggregate, compare_paths, RouteEdge, RoutePath};
pub use planner::{select_planner, DijkstraPlanner, RoutePlanner, YenPlanner};

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::cost::{CostModel, ScoringPolicy};
use crate::error::{Error, Result};
use crate::graph::SearchGraph;
use crate::network::{CountryCode, LocationId, Network, TransportMode};
use crate::path::SearchLimits;
use crate::policy::{CargoClassification, CargoPolicyCatalog, CountryPolicy, PolicyDecision, PolicyFlag};

/// Largest `top_n` a single request may ask for.
pub const MAX_TOP_N: usize = 50;

/// Allowed deviation of `time_weight + price_weight` from 1.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-5;

/// Cargo attributes used for policy lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CargoDetails {
    pub description: String,
    pub cargo_type: String,
    /// Shipment weight in kilograms.
    pub weight: f64,
}

impl Default for CargoDetails {
    fn default() -> Self {
        Self {
            description: String::new(),
            cargo_type: "general".to_string(),
            weight: 0.0,
        }
    }
}

/// High-level route finding request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub start: String,
    pub goal: String,
    /// ISO 3166-1 alpha-2 codes that paths must never touch.
    pub avoid_countries: Vec<String>,
    pub top_n: usize,
    pub time_weight: f64,
    pub price_weight: f64,
    pub allowed_modes: Vec<TransportMode>,
    pub prohibited_flag: PolicyFlag,
    pub restricted_flag: PolicyFlag,
    pub cargo: CargoDetails,
}

impl RouteRequest {
    /// Request with default weighting, all modes and no country constraints.
    pub fn new(start: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            goal: goal.into(),
            avoid_countries: Vec::new(),
            top_n: 3,
            time_weight: 0.5,
            price_weight: 0.5,
            allowed_modes: TransportMode::ALL.to_vec(),
            prohibited_flag: PolicyFlag::Ignore,
            restricted_flag: PolicyFlag::Ignore,
            cargo: CargoDetails::default(),
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_weights(mut self, time_weight: f64, price_weight: f64) -> Self {
        self.time_weight = time_weight;
        self.price_weight = price_weight;
        self
    }

    pub fn with_avoid_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.avoid_countries = countries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_allowed_modes(mut self, modes: impl IntoIterator<Item = TransportMode>) -> Self {
        self.allowed_modes = modes.into_iter().collect();
        self
    }

    pub fn with_policy_flags(mut self, prohibited: PolicyFlag, restricted: PolicyFlag) -> Self {
        self.prohibited_flag = prohibited;
        self.restricted_flag = restricted;
        self
    }

    pub fn with_cargo(mut self, cargo: CargoDetails) -> Self {
        self.cargo = cargo;
        self
    }

    /// Every validation failure, in field order.
    pub fn validation_errors(&self) -> Vec<Error> {
        let mut errors = Vec::new();

        if self.start.trim().is_empty() {
            errors.push(Error::invalid_request("start", "start must not be empty"));
        }
        if self.goal.trim().is_empty() {
            errors.push(Error::invalid_request("goal", "goal must not be empty"));
        }
        if !self.start.trim().is_empty()
            && self.start.trim().eq_ignore_ascii_case(self.goal.trim())
        {
            errors.push(Error::invalid_request(
                "goal",
                "start and goal must be different",
            ));
        }

        for (field, value) in [
            ("time_weight", self.time_weight),
            ("price_weight", self.price_weight),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                errors.push(Error::invalid_request(
                    field,
                    format!("{} must be between 0 and 1", field),
                ));
            }
        }
        let sum = self.time_weight + self.price_weight;
        if sum.is_finite() && (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            errors.push(Error::invalid_request(
                "price_weight",
                "time_weight and price_weight must sum to 1",
            ));
        }

        if self.top_n == 0 || self.top_n > MAX_TOP_N {
            errors.push(Error::invalid_request(
                "top_n",
                format!("top_n must be between 1 and {}", MAX_TOP_N),
            ));
        }

        if self.allowed_modes.is_empty() {
            errors.push(Error::invalid_request(
                "allowed_modes",
                "at least one transport mode must be allowed",
            ));
        }

        for code in &self.avoid_countries {
            if CountryCode::parse(code).is_err() {
                errors.push(Error::invalid_request(
                    "avoid_countries",
                    format!("'{}' is not a two-letter ISO country code", code),
                ));
            }
        }

        if !self.cargo.weight.is_finite() || self.cargo.weight < 0.0 {
            errors.push(Error::invalid_request(
                "weight",
                "weight must be a non-negative number",
            ));
        }

        errors
    }

    /// Validate the request, returning the first failure.
    pub fn validate(&self) -> Result<()> {
        match self.validation_errors().into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn country_policy(&self) -> Result<CountryPolicy> {
        let avoid_countries = self
            .avoid_countries
            .iter()
            .map(|code| CountryCode::parse(code))
            .collect::<Result<BTreeSet<_>>>()?;
        Ok(CountryPolicy {
            avoid_countries,
            prohibited_flag: self.prohibited_flag,
            restricted_flag: self.restricted_flag,
        })
    }
}

/// Process-wide search settings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchOptions {
    pub scoring: ScoringPolicy,
    pub limits: SearchLimits,
}

/// Why a request produced no paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoPathReason {
    NotFound,
    Policy,
    Budget,
}

impl NoPathReason {
    pub fn as_str(self) -> &'static str {
        match self {
            NoPathReason::NotFound => "not_found",
            NoPathReason::Policy => "policy",
            NoPathReason::Budget => "budget",
        }
    }

    fn of(error: &Error) -> Self {
        match error {
            Error::UnreachableDueToPolicy { .. } => NoPathReason::Policy,
            Error::SearchBudgetExceeded { .. } => NoPathReason::Budget,
            _ => NoPathReason::NotFound,
        }
    }
}

/// Either the ranked paths or a no-path message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PathSet {
    Found(Vec<RoutePath>),
    Error {
        error: String,
        #[serde(skip)]
        reason: NoPathReason,
    },
}

impl PathSet {
    pub fn paths(&self) -> &[RoutePath] {
        match self {
            PathSet::Found(paths) => paths,
            PathSet::Error { .. } => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PathSet::Found(_) => None,
            PathSet::Error { error, .. } => Some(error),
        }
    }

    pub fn no_path_reason(&self) -> Option<NoPathReason> {
        match self {
            PathSet::Found(_) => None,
            PathSet::Error { reason, .. } => Some(*reason),
        }
    }
}

/// Result of a route search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub avoided_countries: Vec<String>,
    pub penalty_countries: Vec<String>,
    pub paths: PathSet,
}

impl RoutePlan {
    fn found(decision: &PolicyDecision, paths: Vec<RoutePath>) -> Self {
        Self {
            avoided_countries: decision.avoided_countries(),
            penalty_countries: decision.penalty_countries(),
            paths: PathSet::Found(paths),
        }
    }

    fn no_path(decision: &PolicyDecision, error: &Error) -> Self {
        Self {
            avoided_countries: decision.avoided_countries(),
            penalty_countries: decision.penalty_countries(),
            paths: PathSet::Error {
                error: error.to_string(),
                reason: NoPathReason::of(error),
            },
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

/// Find and rank paths for `request`.
///
/// Validation failures and unknown locations are returned as errors. When no
/// path satisfies the constraints the plan still succeeds and carries the
/// message in [`RoutePlan::paths`].
///
/// Steps:
/// 1. Validates the request
/// 2. Resolves location names to IDs
/// 3. Builds the country policy decision
/// 4. Builds the constrained search graph
/// 5. Runs the selected planner
/// 6. Aggregates, ranks and truncates to `top_n`
pub fn plan_routes(
    network: &Network,
    catalog: &CargoPolicyCatalog,
    request: &RouteRequest,
    options: &SearchOptions,
) -> Result<RoutePlan> {
    // Step 1: Validate
    request.validate()?;

    // Step 2: Resolve location names
    let start_id = network.resolve(&request.start)?;
    let goal_id = network.resolve(&request.goal)?;
    if start_id == goal_id {
        return Err(Error::invalid_request(
            "goal",
            "start and goal must be different",
        ));
    }

    // Step 3: Country policy
    let policy = request.country_policy()?;
    let classification = if policy.uses_catalog() {
        catalog.classify(&request.cargo.cargo_type, &request.cargo.description)
    } else {
        CargoClassification::default()
    };
    let decision = policy.decide(&classification);
    debug!(
        avoided = ?decision.avoided_countries(),
        penalized = ?decision.penalty_countries(),
        "country policy resolved"
    );

    if let Err(error) = decision.check_endpoints(network, start_id, goal_id) {
        return Ok(RoutePlan::no_path(&decision, &error));
    }

    // Step 4: Constrained graph
    let cost = CostModel::new(
        network,
        &decision,
        options.scoring,
        request.time_weight,
        request.price_weight,
    );
    let modes: BTreeSet<TransportMode> = request.allowed_modes.iter().copied().collect();
    let graph = SearchGraph::build(network, &modes, &decision, &cost);

    // Step 5: Search
    let planner = select_planner(request.top_n, options.limits);
    let found = planner.find_paths(&graph, start_id, goal_id, request.top_n);
    debug!(
        planner = planner.name(),
        candidates = found.paths.len(),
        spur_searches = found.spur_searches,
        "path search finished"
    );

    if found.paths.is_empty() {
        let error = no_path_error(network, start_id, goal_id, &found);
        return Ok(RoutePlan::no_path(&decision, &error));
    }
    if found.budget_exhausted {
        warn!(
            start = %request.start,
            goal = %request.goal,
            returned = found.paths.len(),
            spur_searches = found.spur_searches,
            "search budget exhausted; returning partial results"
        );
    }

    // Step 6: Aggregate
    let paths = aggregate(network, &found.paths, request.top_n);
    Ok(RoutePlan::found(&decision, paths))
}

fn no_path_error(
    network: &Network,
    start: LocationId,
    goal: LocationId,
    found: &crate::path::KShortestPaths,
) -> Error {
    let start = network.location_name(start).unwrap_or_default().to_string();
    let goal = network.location_name(goal).unwrap_or_default().to_string();
    if found.budget_exhausted {
        Error::SearchBudgetExceeded {
            start,
            goal,
            explored: found.spur_searches,
        }
    } else {
        Error::RouteNotFound { start, goal }
    }
}
