//! Output formatting for route plans and location listings.

use std::fmt::Write as _;
use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use routesync_lib::{Location, RoutePath, RoutePlan};

use crate::terminal::{format_amount, format_with_separators, ColorPalette};

/// How command results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// The same JSON body the HTTP service returns.
    Json,
}

/// Pretty-print `value` as JSON to stdout.
pub fn render_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value).map_err(io::Error::other)?;
    writeln!(handle)
}

/// Render a route plan as text.
pub fn render_plan_text(
    start: &str,
    goal: &str,
    plan: &RoutePlan,
    palette: &ColorPalette,
) -> String {
    let mut out = String::new();
    let paths = plan.paths.paths();

    match plan.paths.error() {
        Some(message) => {
            let _ = writeln!(out, "{}{}{}", palette.error, message, palette.reset);
        }
        None => {
            let _ = writeln!(
                out,
                "{}Paths from {} to {} ({} found){}",
                palette.bold,
                start,
                goal,
                paths.len(),
                palette.reset
            );
            for (rank, path) in paths.iter().enumerate() {
                out.push('\n');
                render_path(&mut out, rank + 1, path, palette);
            }
        }
    }

    if !plan.avoided_countries.is_empty() || !plan.penalty_countries.is_empty() {
        out.push('\n');
    }
    if !plan.avoided_countries.is_empty() {
        let _ = writeln!(
            out,
            "{}Avoided countries: {}{}",
            palette.warning,
            plan.avoided_countries.join(", "),
            palette.reset
        );
    }
    if !plan.penalty_countries.is_empty() {
        let _ = writeln!(
            out,
            "{}Penalised countries: {}{}",
            palette.warning,
            plan.penalty_countries.join(", "),
            palette.reset
        );
    }
    out
}

fn render_path(out: &mut String, rank: usize, path: &RoutePath, palette: &ColorPalette) {
    let _ = writeln!(
        out,
        "{}#{} {}{} {}(score {:.2}){}",
        palette.bold,
        rank,
        path.path.join(" -> "),
        palette.reset,
        palette.dim,
        path.score,
        palette.reset
    );
    for edge in &path.edges {
        let _ = writeln!(
            out,
            "    {}{:<4}{} {} -> {}  {:.1} h  {}  {} km  {:.1} kg CO2",
            palette.mode(edge.mode),
            edge.mode.as_str(),
            palette.reset,
            edge.from,
            edge.to,
            edge.time,
            format_amount(edge.price),
            format_with_separators(edge.distance.round() as u64),
            edge.co2
        );
    }
    let _ = writeln!(
        out,
        "  total: {:.1} h, price {}, {} km, {:.1} kg CO2",
        path.time_sum,
        format_amount(path.price_sum),
        format_with_separators(path.distance_sum.round() as u64),
        path.co2_sum
    );
}

/// Render a location listing as aligned text.
pub fn render_locations_text(locations: &[&Location]) -> String {
    let width = locations
        .iter()
        .map(|l| l.name.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for location in locations {
        let _ = writeln!(
            out,
            "{:<width$}  {}  {:>9.4} {:>10.4}",
            location.name,
            location.country,
            location.position.latitude,
            location.position.longitude,
            width = width
        );
    }
    let _ = writeln!(out, "{} locations", locations.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use routesync_lib::{
        plan_routes, CargoPolicyCatalog, Network, NetworkBuilder, RouteRequest, SearchOptions,
        SegmentSpec, TransportMode,
    };

    fn sample_network() -> Network {
        let mut builder = NetworkBuilder::new();
        builder.add_location("Hamburg", "DE", 53.55, 9.99).unwrap();
        builder.add_location("Rotterdam", "NL", 51.92, 4.48).unwrap();
        builder
            .add_segment(
                SegmentSpec::new("Hamburg", "Rotterdam", TransportMode::Land, 8.0, 1250.0)
                    .bidirectional(),
            )
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_render_plan_text_lists_paths() {
        let network = sample_network();
        let request = RouteRequest::new("Hamburg", "Rotterdam").with_top_n(1);
        let plan = plan_routes(
            &network,
            &CargoPolicyCatalog::default(),
            &request,
            &SearchOptions::default(),
        )
        .unwrap();

        let text = render_plan_text("Hamburg", "Rotterdam", &plan, &ColorPalette::plain());
        assert!(text.starts_with("Paths from Hamburg to Rotterdam (1 found)"));
        assert!(text.contains("#1 Hamburg -> Rotterdam"));
        assert!(text.contains("land Hamburg -> Rotterdam"));
        assert!(text.contains("price 1,250.00"));
        assert!(!text.contains("Avoided countries"));
    }

    #[test]
    fn test_render_plan_text_no_path_message() {
        let network = sample_network();
        let request = RouteRequest::new("Hamburg", "Rotterdam")
            .with_allowed_modes([TransportMode::Air]);
        let plan = plan_routes(
            &network,
            &CargoPolicyCatalog::default(),
            &request,
            &SearchOptions::default(),
        )
        .unwrap();

        let text = render_plan_text("Hamburg", "Rotterdam", &plan, &ColorPalette::plain());
        assert!(text.starts_with("No paths found between Hamburg and Rotterdam"));
    }

    #[test]
    fn test_render_locations_text() {
        let network = sample_network();
        let locations = network.find_locations(None, None);
        let text = render_locations_text(&locations);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Hamburg    DE"));
        assert_eq!(lines[2], "2 locations");
    }
}
