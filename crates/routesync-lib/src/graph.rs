use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::cost::CostModel;
use crate::network::{LocationId, Network, SegmentId, TransportMode};
use crate::policy::PolicyDecision;

/// Edge within the constrained search graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchEdge {
    pub target: LocationId,
    pub segment: SegmentId,
    pub mode: TransportMode,
    pub cost: f64,
}

/// Per-request view of a [`Network`] with disallowed modes and excluded
/// countries removed and parallel segments collapsed to the cheapest one.
#[derive(Debug, Clone)]
pub struct SearchGraph<'a> {
    network: &'a Network,
    adjacency: Vec<Vec<SearchEdge>>,
}

impl<'a> SearchGraph<'a> {
    /// Build the view for one request.
    pub fn build(
        network: &'a Network,
        allowed_modes: &BTreeSet<TransportMode>,
        decision: &PolicyDecision,
        cost: &CostModel<'_>,
    ) -> Self {
        let mut adjacency: Vec<Vec<SearchEdge>> = vec![Vec::new(); network.location_count()];

        for location in network.locations() {
            if !decision.allows_location(network, location.id) {
                continue;
            }

            let edges = &mut adjacency[location.id];
            for segment in network.outgoing(location.id) {
                if !allowed_modes.contains(&segment.mode)
                    || !decision.allows_location(network, segment.to)
                {
                    continue;
                }

                let candidate = SearchEdge {
                    target: segment.to,
                    segment: segment.id,
                    mode: segment.mode,
                    cost: cost.segment_cost(segment),
                };
                match edges.iter_mut().find(|edge| edge.target == candidate.target) {
                    Some(existing) => {
                        if prefer(&candidate, existing) == Ordering::Less {
                            *existing = candidate;
                        }
                    }
                    None => edges.push(candidate),
                }
            }
            edges.sort_by_key(|edge| edge.target);
        }

        Self { network, adjacency }
    }

    pub fn network(&self) -> &'a Network {
        self.network
    }

    /// Return the outgoing edges of `node`, ordered by target.
    pub fn neighbours(&self, node: LocationId) -> &[SearchEdge] {
        self.adjacency
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The collapsed edge from `from` to `to`, if one survived filtering.
    pub fn edge(&self, from: LocationId, to: LocationId) -> Option<&SearchEdge> {
        let edges = self.neighbours(from);
        edges
            .binary_search_by_key(&to, |edge| edge.target)
            .ok()
            .map(|index| &edges[index])
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }
}

fn prefer(a: &SearchEdge, b: &SearchEdge) -> Ordering {
    a.cost
        .total_cmp(&b.cost)
        .then_with(|| a.mode.cmp(&b.mode))
        .then_with(|| a.segment.cmp(&b.segment))
}
