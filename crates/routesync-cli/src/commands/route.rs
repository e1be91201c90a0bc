//! Route command handler for computing ranked shipment paths.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;

use routesync_lib::{
    load_dataset, plan_routes, resolve_dataset_path, CargoDetails, Normalization, PolicyFlag,
    RouteRequest, SearchOptions, TransportMode,
};

use crate::output::{render_json, render_plan_text, OutputFormat};
use crate::terminal::ColorPalette;

/// Arguments for the route command.
#[derive(Debug, Clone, Args)]
pub struct RouteCommandArgs {
    /// Starting location name.
    #[arg(long = "from")]
    pub from: String,
    /// Destination location name.
    #[arg(long = "to")]
    pub to: String,
    /// ISO country code to avoid (repeatable).
    #[arg(long = "avoid", value_name = "COUNTRY")]
    pub avoid: Vec<String>,
    /// Allowed transport mode (repeatable). All modes when omitted.
    #[arg(long = "mode", value_name = "MODE")]
    pub modes: Vec<TransportMode>,
    /// Number of paths to return.
    #[arg(long = "top", default_value_t = 3)]
    pub top_n: usize,
    /// Weight of travel time in the score. Price receives the remainder.
    #[arg(long, default_value_t = 0.5)]
    pub time_weight: f64,
    /// How to treat countries where the cargo is prohibited.
    #[arg(long, default_value_t = PolicyFlag::default())]
    pub prohibited: PolicyFlag,
    /// How to treat countries where the cargo is restricted.
    #[arg(long, default_value_t = PolicyFlag::default())]
    pub restricted: PolicyFlag,
    /// Cargo category used for policy lookup.
    #[arg(long, default_value = "general")]
    pub cargo_type: String,
    /// Free-text cargo description used for policy lookup.
    #[arg(long, default_value = "")]
    pub description: String,
    /// Shipment weight in kilograms.
    #[arg(long, default_value_t = 0.0)]
    pub weight: f64,
    /// Score normalization: min-max or raw.
    #[arg(long, default_value_t = Normalization::default())]
    pub normalization: Normalization,
}

impl RouteCommandArgs {
    /// Convert CLI args to a library RouteRequest.
    pub fn to_request(&self) -> RouteRequest {
        let modes = if self.modes.is_empty() {
            TransportMode::ALL.to_vec()
        } else {
            self.modes.clone()
        };

        RouteRequest::new(self.from.clone(), self.to.clone())
            .with_top_n(self.top_n)
            .with_weights(self.time_weight, 1.0 - self.time_weight)
            .with_avoid_countries(self.avoid.iter().cloned())
            .with_allowed_modes(modes)
            .with_policy_flags(self.prohibited, self.restricted)
            .with_cargo(CargoDetails {
                description: self.description.clone(),
                cargo_type: self.cargo_type.clone(),
                weight: self.weight,
            })
    }

    pub fn search_options(&self) -> SearchOptions {
        let mut options = SearchOptions::default();
        options.scoring = options.scoring.with_normalization(self.normalization);
        options
    }
}

/// Handle the `route` subcommand.
///
/// A request with no satisfying path prints the message and fails so that
/// scripts can detect it from the exit status.
pub fn handle_route_command(
    target: Option<&Path>,
    format: OutputFormat,
    args: &RouteCommandArgs,
) -> Result<()> {
    let dataset_path =
        resolve_dataset_path(target).context("failed to resolve the RouteSync dataset path")?;
    let dataset = load_dataset(&dataset_path)
        .with_context(|| format!("failed to load dataset from {}", dataset_path.display()))?;

    let request = args.to_request();
    let plan = plan_routes(
        &dataset.network,
        &dataset.policies,
        &request,
        &args.search_options(),
    )?;

    match format {
        OutputFormat::Json => render_json(&plan)?,
        OutputFormat::Text => print!(
            "{}",
            render_plan_text(&args.from, &args.to, &plan, &ColorPalette::detect())
        ),
    }

    if let Some(message) = plan.paths.error() {
        bail!("{}", message);
    }
    Ok(())
}
