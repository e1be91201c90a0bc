//! RouteSync library entry points.
//!
//! This crate loads the location network and cargo policy catalog, applies
//! country constraints, and searches for ranked multi-modal shipment paths.
//! Higher-level consumers (CLI, HTTP service) should only depend on the
//! functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod cost;
pub mod dataset;
pub mod db;
pub mod error;
pub mod graph;
pub mod network;
pub mod path;
pub mod policy;
pub mod routing;

pub use cost::{Normalization, ScoringPolicy};
pub use dataset::{default_dataset_path, load_dataset, resolve_dataset_path, Dataset};
pub use db::load_sqlite_dataset;
pub use error::{Error, Result};
pub use network::{CountryCode, Location, Network, NetworkBuilder, SegmentSpec, TransportMode};
pub use path::SearchLimits;
pub use policy::{CargoPolicyCatalog, CargoPolicyRule, PolicyFlag};
pub use routing::{
    plan_routes, CargoDetails, NoPathReason, PathSet, RouteEdge, RoutePath, RoutePlan,
    RouteRequest, SearchOptions, MAX_TOP_N,
};
