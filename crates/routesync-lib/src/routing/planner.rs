//! Path search strategies.
//!
//! [`plan_routes`](super::plan_routes) hands the constrained graph to a
//! [`RoutePlanner`]; [`select_planner`] picks the cheapest strategy able to
//! satisfy the requested number of paths.

use crate::graph::SearchGraph;
use crate::network::LocationId;
use crate::path::{k_shortest_paths, shortest_path, KShortestPaths, SearchLimits};

/// Trait for path search strategies.
pub trait RoutePlanner: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Find up to `k` loop-free paths, best first.
    fn find_paths(
        &self,
        graph: &SearchGraph<'_>,
        start: LocationId,
        goal: LocationId,
        k: usize,
    ) -> KShortestPaths;
}

/// Best single path: one Dijkstra run plus any equal-score alternatives
/// needed to apply the tie-break, bounded by [`SearchLimits`].
#[derive(Debug, Clone, Default)]
pub struct DijkstraPlanner {
    limits: SearchLimits,
}

impl DijkstraPlanner {
    pub fn new(limits: SearchLimits) -> Self {
        Self { limits }
    }
}

impl RoutePlanner for DijkstraPlanner {
    fn name(&self) -> &'static str {
        "dijkstra"
    }

    fn find_paths(
        &self,
        graph: &SearchGraph<'_>,
        start: LocationId,
        goal: LocationId,
        k: usize,
    ) -> KShortestPaths {
        if k == 0 {
            return KShortestPaths::default();
        }
        shortest_path(graph, start, goal, self.limits)
    }
}

/// Yen's k-shortest simple paths bounded by [`SearchLimits`].
#[derive(Debug, Clone, Default)]
pub struct YenPlanner {
    limits: SearchLimits,
}

impl YenPlanner {
    pub fn new(limits: SearchLimits) -> Self {
        Self { limits }
    }
}

impl RoutePlanner for YenPlanner {
    fn name(&self) -> &'static str {
        "yen"
    }

    fn find_paths(
        &self,
        graph: &SearchGraph<'_>,
        start: LocationId,
        goal: LocationId,
        k: usize,
    ) -> KShortestPaths {
        k_shortest_paths(graph, start, goal, k, self.limits)
    }
}

/// Select a planner for a request asking for `top_n` paths.
pub fn select_planner(top_n: usize, limits: SearchLimits) -> Box<dyn RoutePlanner> {
    if top_n <= 1 {
        Box::new(DijkstraPlanner::new(limits))
    } else {
        Box::new(YenPlanner::new(limits))
    }
}
