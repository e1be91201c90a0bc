//! Shortest-path search over a [`SearchGraph`].
//!
//! [`k_shortest_paths`] layers Yen's algorithm over a Dijkstra on the combined
//! edge cost to enumerate the best loop-free alternatives. Paths whose score
//! ties the last requested rank are enumerated too, so the tie-break decides
//! which of them survive rather than discovery order. [`shortest_path`] is the
//! `k = 1` case. Both respect [`SearchLimits`] so a single request cannot
//! monopolise a worker.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::graph::SearchGraph;
use crate::network::{LocationId, SegmentId, TransportMode};

/// Default cap on the number of spur searches per request.
pub const DEFAULT_MAX_SPUR_SEARCHES: usize = 10_000;

/// Default wall-clock budget per request.
pub const DEFAULT_SEARCH_BUDGET: Duration = Duration::from_secs(2);

/// How many heap pops Dijkstra performs between deadline checks.
const DEADLINE_CHECK_INTERVAL: usize = 1024;

/// Scores closer than this are treated as equal when ranking.
const SCORE_RESOLUTION: f64 = 1e-6;

/// Bounds on the effort spent by a single k-shortest search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_spur_searches: usize,
    pub time_budget: Duration,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_spur_searches: DEFAULT_MAX_SPUR_SEARCHES,
            time_budget: DEFAULT_SEARCH_BUDGET,
        }
    }
}

/// A loop-free path found by the search.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePath {
    pub nodes: Vec<LocationId>,
    pub segments: Vec<SegmentId>,
    pub modes: Vec<TransportMode>,
    pub cost: f64,
}

impl CandidatePath {
    /// Rebuild a candidate from its node sequence, summing edge costs in order.
    pub fn from_nodes(graph: &SearchGraph<'_>, nodes: Vec<LocationId>) -> Option<Self> {
        let mut segments = Vec::with_capacity(nodes.len().saturating_sub(1));
        let mut modes = Vec::with_capacity(segments.capacity());
        let mut cost = 0.0;
        for pair in nodes.windows(2) {
            let edge = graph.edge(pair[0], pair[1])?;
            segments.push(edge.segment);
            modes.push(edge.mode);
            cost += edge.cost;
        }
        Some(Self {
            nodes,
            segments,
            modes,
            cost,
        })
    }

    /// Number of times consecutive edges change mode.
    pub fn mode_transitions(&self) -> usize {
        self.modes.windows(2).filter(|pair| pair[0] != pair[1]).count()
    }
}

/// Ranking order: score, then fewer mode transitions, then node names.
pub fn compare_candidates(graph: &SearchGraph<'_>, a: &CandidatePath, b: &CandidatePath) -> Ordering {
    compare_scores(a.cost, b.cost)
        .then_with(|| a.mode_transitions().cmp(&b.mode_transitions()))
        .then_with(|| {
            let network = graph.network();
            let names = |path: &CandidatePath| {
                path.nodes
                    .iter()
                    .map(|&id| network.location_name(id).unwrap_or_default())
                    .collect::<Vec<_>>()
            };
            names(a).cmp(&names(b))
        })
}

/// Compare scores, treating values within [`SCORE_RESOLUTION`] as equal.
pub(crate) fn compare_scores(a: f64, b: f64) -> Ordering {
    score_key(a).total_cmp(&score_key(b))
}

fn score_key(score: f64) -> f64 {
    (score / SCORE_RESOLUTION).round()
}

/// Outcome of [`k_shortest_paths`].
#[derive(Debug, Clone, Default)]
pub struct KShortestPaths {
    /// Paths in ranking order.
    pub paths: Vec<CandidatePath>,
    /// Spur searches executed.
    pub spur_searches: usize,
    /// Whether the search stopped because a limit was hit.
    pub budget_exhausted: bool,
}

/// Tracks search effort against [`SearchLimits`].
#[derive(Debug)]
struct Budget {
    deadline: Option<Instant>,
    max_spur_searches: usize,
    spur_searches: usize,
    exhausted: bool,
}

impl Budget {
    fn new(limits: SearchLimits) -> Self {
        Self {
            deadline: Instant::now().checked_add(limits.time_budget),
            max_spur_searches: limits.max_spur_searches,
            spur_searches: 0,
            exhausted: false,
        }
    }

    fn check_deadline(&mut self) -> bool {
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            self.exhausted = true;
        }
        !self.exhausted
    }

    fn begin_spur(&mut self) -> bool {
        if self.spur_searches >= self.max_spur_searches {
            self.exhausted = true;
        }
        if !self.check_deadline() {
            return false;
        }
        self.spur_searches += 1;
        true
    }
}

/// Nodes and edges hidden from a Dijkstra run.
#[derive(Debug, Default)]
struct Blocked {
    nodes: HashSet<LocationId>,
    edges: HashSet<(LocationId, LocationId)>,
}

/// Find the best-ranked path between `start` and `goal`.
///
/// Equivalent to [`k_shortest_paths`] with `k = 1`: alternatives tying the
/// first Dijkstra result are explored before the winner is chosen.
pub fn shortest_path(
    graph: &SearchGraph<'_>,
    start: LocationId,
    goal: LocationId,
    limits: SearchLimits,
) -> KShortestPaths {
    k_shortest_paths(graph, start, goal, 1, limits)
}

/// Enumerate up to `k` loop-free paths from `start` to `goal` in ranking order.
pub fn k_shortest_paths(
    graph: &SearchGraph<'_>,
    start: LocationId,
    goal: LocationId,
    k: usize,
    limits: SearchLimits,
) -> KShortestPaths {
    let mut budget = Budget::new(limits);
    let mut result = KShortestPaths::default();
    if k == 0 || start == goal {
        return result;
    }

    let first = dijkstra(graph, start, goal, &Blocked::default(), &mut budget)
        .and_then(|nodes| CandidatePath::from_nodes(graph, nodes));
    let Some(first) = first else {
        result.budget_exhausted = budget.exhausted;
        return result;
    };

    let mut accepted: Vec<CandidatePath> = vec![first];
    let mut candidates: Vec<CandidatePath> = Vec::new();
    let mut seen: HashSet<Vec<LocationId>> = HashSet::new();
    seen.insert(accepted[0].nodes.clone());

    'outer: loop {
        let previous = accepted[accepted.len() - 1].nodes.clone();

        for spur_index in 0..previous.len() - 1 {
            if !budget.begin_spur() {
                break 'outer;
            }

            let spur_node = previous[spur_index];
            let root = &previous[..=spur_index];

            let mut blocked = Blocked::default();
            for path in &accepted {
                if path.nodes.len() > spur_index + 1 && path.nodes[..=spur_index] == *root {
                    blocked
                        .edges
                        .insert((path.nodes[spur_index], path.nodes[spur_index + 1]));
                }
            }
            blocked.nodes.extend(root[..spur_index].iter().copied());

            let Some(spur) = dijkstra(graph, spur_node, goal, &blocked, &mut budget) else {
                if budget.exhausted {
                    break 'outer;
                }
                continue;
            };

            let mut nodes = root[..spur_index].to_vec();
            nodes.extend(spur);
            if seen.contains(&nodes) {
                continue;
            }
            if let Some(candidate) = CandidatePath::from_nodes(graph, nodes) {
                debug!(
                    spur_index,
                    cost = candidate.cost,
                    hops = candidate.segments.len(),
                    "candidate path discovered"
                );
                seen.insert(candidate.nodes.clone());
                candidates.push(candidate);
            }
        }

        let best = candidates
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| compare_candidates(graph, a, b))
            .map(|(index, _)| index);
        let Some(index) = best else {
            break;
        };
        // Past rank k only paths tying the k-th score can still make the cut.
        if accepted.len() >= k
            && compare_scores(candidates[index].cost, accepted[k - 1].cost) != Ordering::Equal
        {
            break;
        }
        accepted.push(candidates.swap_remove(index));
    }

    if budget.exhausted && accepted.len() < k {
        candidates.sort_by(|a, b| compare_candidates(graph, a, b));
        let remaining = k - accepted.len();
        accepted.extend(candidates.into_iter().take(remaining));
    }

    accepted.sort_by(|a, b| compare_candidates(graph, a, b));
    accepted.truncate(k);
    result.paths = accepted;
    result.spur_searches = budget.spur_searches;
    result.budget_exhausted = budget.exhausted;
    result
}

fn dijkstra(
    graph: &SearchGraph<'_>,
    start: LocationId,
    goal: LocationId,
    blocked: &Blocked,
    budget: &mut Budget,
) -> Option<Vec<LocationId>> {
    if blocked.nodes.contains(&start) {
        return None;
    }

    let mut distances: HashMap<LocationId, f64> = HashMap::new();
    let mut parents: HashMap<LocationId, Option<LocationId>> = HashMap::new();
    let mut queue = BinaryHeap::new();
    let mut pops = 0usize;

    distances.insert(start, 0.0);
    parents.insert(start, None);
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        pops += 1;
        if pops % DEADLINE_CHECK_INTERVAL == 0 && !budget.check_deadline() {
            return None;
        }

        let current_cost = match distances.get(&entry.node) {
            Some(cost) if *cost < entry.cost.0 => continue,
            Some(cost) => *cost,
            None => continue,
        };

        if entry.node == goal {
            return Some(reconstruct_path(&parents, start, goal));
        }

        for edge in graph.neighbours(entry.node) {
            let next = edge.target;
            if blocked.nodes.contains(&next) || blocked.edges.contains(&(entry.node, next)) {
                continue;
            }

            let next_cost = current_cost + edge.cost;
            if next_cost < *distances.get(&next).unwrap_or(&f64::INFINITY) {
                distances.insert(next, next_cost);
                parents.insert(next, Some(entry.node));
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    None
}

fn reconstruct_path(
    parents: &HashMap<LocationId, Option<LocationId>>,
    start: LocationId,
    goal: LocationId,
) -> Vec<LocationId> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents.get(&node).copied().flatten();
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: LocationId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: LocationId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
