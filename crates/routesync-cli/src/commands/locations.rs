//! Locations command handler.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use routesync_lib::{load_dataset, resolve_dataset_path, Location};

use crate::output::{render_json, render_locations_text, OutputFormat};

/// JSON shape of one listed location, matching `GET /locations`.
#[derive(Debug, Serialize)]
struct LocationEntry<'a> {
    name: &'a str,
    country_code: &'a str,
    latitude: f64,
    longitude: f64,
}

impl<'a> From<&'a Location> for LocationEntry<'a> {
    fn from(location: &'a Location) -> Self {
        Self {
            name: &location.name,
            country_code: location.country.as_str(),
            latitude: location.position.latitude,
            longitude: location.position.longitude,
        }
    }
}

#[derive(Debug, Serialize)]
struct LocationsOutput<'a> {
    locations: Vec<LocationEntry<'a>>,
}

/// List known locations sorted by name, optionally filtered.
pub fn handle_locations_command(
    target: Option<&Path>,
    format: OutputFormat,
    country: Option<&str>,
    search: Option<&str>,
) -> Result<()> {
    let dataset_path =
        resolve_dataset_path(target).context("failed to resolve the RouteSync dataset path")?;
    let dataset = load_dataset(&dataset_path)
        .with_context(|| format!("failed to load dataset from {}", dataset_path.display()))?;

    let locations = dataset.network.find_locations(country, search);
    match format {
        OutputFormat::Json => render_json(&LocationsOutput {
            locations: locations.iter().map(|l| LocationEntry::from(*l)).collect(),
        })?,
        OutputFormat::Text => print!("{}", render_locations_text(&locations)),
    }
    Ok(())
}
