//! Path aggregation and ranking.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::network::{Network, TransportMode};
use crate::path::{compare_scores, CandidatePath};

/// One hop of a returned path with its raw metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEdge {
    pub from: String,
    pub to: String,
    pub mode: TransportMode,
    pub time: f64,
    pub price: f64,
    pub distance: f64,
    #[serde(rename = "CO2")]
    pub co2: f64,
}

/// A ranked path from start to goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePath {
    /// Location names in travel order.
    pub path: Vec<String>,
    pub edges: Vec<RouteEdge>,
    pub time_sum: f64,
    pub price_sum: f64,
    pub distance_sum: f64,
    #[serde(rename = "CO2_sum")]
    pub co2_sum: f64,
    /// Combined ranking score (lower is better).
    pub score: f64,
}

impl RoutePath {
    /// Attach names and raw metrics to a search candidate.
    pub fn from_candidate(network: &Network, candidate: &CandidatePath) -> Option<Self> {
        let path = candidate
            .nodes
            .iter()
            .map(|&id| network.location_name(id).map(str::to_string))
            .collect::<Option<Vec<_>>>()?;

        let mut edges = Vec::with_capacity(candidate.segments.len());
        for &id in &candidate.segments {
            let segment = network.segment(id)?;
            edges.push(RouteEdge {
                from: network.location_name(segment.from)?.to_string(),
                to: network.location_name(segment.to)?.to_string(),
                mode: segment.mode,
                time: segment.time_hours,
                price: segment.price,
                distance: segment.distance_km,
                co2: segment.co2_kg,
            });
        }

        let mut route = Self {
            path,
            edges,
            time_sum: 0.0,
            price_sum: 0.0,
            distance_sum: 0.0,
            co2_sum: 0.0,
            score: candidate.cost,
        };
        for edge in &route.edges {
            route.time_sum += edge.time;
            route.price_sum += edge.price;
            route.distance_sum += edge.distance;
            route.co2_sum += edge.co2;
        }
        Some(route)
    }

    pub fn hop_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of mode changes between consecutive edges.
    pub fn mode_transitions(&self) -> usize {
        self.edges
            .windows(2)
            .filter(|pair| pair[0].mode != pair[1].mode)
            .count()
    }
}

/// Ranking order: lower score, then fewer mode transitions, then node names.
pub fn compare_paths(a: &RoutePath, b: &RoutePath) -> Ordering {
    compare_scores(a.score, b.score)
        .then_with(|| a.mode_transitions().cmp(&b.mode_transitions()))
        .then_with(|| a.path.cmp(&b.path))
}

/// Turn search candidates into the final ranked, deduplicated list of at most `top_n` paths.
pub fn aggregate(network: &Network, candidates: &[CandidatePath], top_n: usize) -> Vec<RoutePath> {
    let mut paths: Vec<RoutePath> = candidates
        .iter()
        .filter_map(|candidate| RoutePath::from_candidate(network, candidate))
        .collect();
    paths.sort_by(compare_paths);

    let mut seen = HashSet::new();
    paths.retain(|route| seen.insert(route.path.clone()));
    paths.truncate(top_n);
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: &str, to: &str, mode: TransportMode) -> RouteEdge {
        RouteEdge {
            from: from.into(),
            to: to.into(),
            mode,
            time: 1.0,
            price: 1.0,
            distance: 1.0,
            co2: 1.0,
        }
    }

    fn route(path: &[&str], modes: &[TransportMode], score: f64) -> RoutePath {
        let edges = path
            .windows(2)
            .zip(modes)
            .map(|(pair, mode)| edge(pair[0], pair[1], *mode))
            .collect::<Vec<_>>();
        RoutePath {
            path: path.iter().map(|s| s.to_string()).collect(),
            time_sum: edges.len() as f64,
            price_sum: edges.len() as f64,
            distance_sum: edges.len() as f64,
            co2_sum: edges.len() as f64,
            edges,
            score,
        }
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let value = serde_json::to_value(route(&["A", "B"], &[TransportMode::Air], 1.5)).unwrap();
        assert_eq!(value["CO2_sum"], 1.0);
        assert_eq!(value["edges"][0]["CO2"], 1.0);
        assert_eq!(value["edges"][0]["mode"], "air");
        assert_eq!(value["score"], 1.5);
        assert!(value.get("co2_sum").is_none());
    }

    #[test]
    fn ordering_breaks_ties_by_transitions_then_names() {
        let mixed = route(
            &["A", "B", "D"],
            &[TransportMode::Land, TransportMode::Sea],
            2.0,
        );
        let uniform = route(
            &["A", "C", "D"],
            &[TransportMode::Sea, TransportMode::Sea],
            2.0,
        );
        let uniform_b = route(
            &["A", "B", "D"],
            &[TransportMode::Sea, TransportMode::Sea],
            2.0 + 1e-9,
        );
        let cheaper = route(&["A", "D"], &[TransportMode::Air], 1.0);

        let mut paths = vec![mixed, uniform, uniform_b, cheaper];
        paths.sort_by(compare_paths);
        let order: Vec<Vec<String>> = paths.iter().map(|p| p.path.clone()).collect();
        assert_eq!(order[0], vec!["A", "D"]);
        assert_eq!(order[1], vec!["A", "B", "D"]);
        assert_eq!(paths[1].mode_transitions(), 0);
        assert_eq!(order[2], vec!["A", "C", "D"]);
        assert_eq!(paths[3].mode_transitions(), 1);
    }
}
