//! Shortest-path search over a [`RoadGraph`].
//!
//! [`shortest_path`] runs Dijkstra's algorithm under any non-negative
//! [`EdgeWeight`]. [`k_shortest_paths`] layers Yen's algorithm on top of it to
//! enumerate loopless alternatives.
//!
//! # Determinism
//!
//! Labels compare as `(cost, hop count)`. When two predecessors produce the
//! same label the one with the smaller [`NodeId`] wins, and the queue pops by
//! `(cost, hops, node id)`. Every label a node can receive comes from an
//! already-settled node, so the final predecessor tree depends only on the
//! graph and the metric: repeated queries return identical routes.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::{Edge, NodeId, RoadGraph};

/// Speed assumed for edges without a posted limit.
pub const DEFAULT_SPEED_KPH: f64 = 30.0;

/// How often (in settled nodes) a search polls its cancellation flag.
const CANCEL_CHECK_INTERVAL: usize = 1024;

/// Per-edge cost function. Costs must be finite and non-negative.
pub trait EdgeWeight: Send + Sync {
    fn cost(&self, edge: &Edge) -> f64;
}

impl<F> EdgeWeight for F
where
    F: Fn(&Edge) -> f64 + Send + Sync,
{
    fn cost(&self, edge: &Edge) -> f64 {
        self(edge)
    }
}

/// Built-in cost metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WeightMetric {
    /// Physical length in metres.
    #[default]
    Length,
    /// Free-flow travel time in seconds at the posted speed limit.
    TravelTime,
    /// Every edge costs one.
    Hops,
}

impl WeightMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            WeightMetric::Length => "length",
            WeightMetric::TravelTime => "travel-time",
            WeightMetric::Hops => "hops",
        }
    }
}

impl std::fmt::Display for WeightMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EdgeWeight for WeightMetric {
    fn cost(&self, edge: &Edge) -> f64 {
        match self {
            WeightMetric::Length => edge.length,
            WeightMetric::TravelTime => {
                let speed_mps = edge.maxspeed_kph.unwrap_or(DEFAULT_SPEED_KPH) / 3.6;
                edge.length / speed_mps
            }
            WeightMetric::Hops => 1.0,
        }
    }
}

/// Cooperative cancellation handle for in-flight searches.
///
/// Clones share the same flag, so a caller can keep one clone and hand the
/// other to the search.
#[derive(Debug, Clone, Default)]
pub struct SearchControl {
    cancelled: Arc<AtomicBool>,
}

impl SearchControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every search holding this handle to stop.
    pub fn cancel(&self) {
        self.cancelled.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(AtomicOrdering::Relaxed)
    }
}

/// Ordered sequence of nodes joined by edges, with its total cost.
///
/// A route always holds at least one node; a single-node route describes an
/// origin that coincides with its destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    nodes: Vec<NodeId>,
    cost: f64,
}

impl Route {
    fn single(node: NodeId) -> Self {
        Self {
            nodes: vec![node],
            cost: 0.0,
        }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Total cost under the metric the route was computed with.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Number of edges traversed.
    pub fn hop_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn source(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn target(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }
}

/// Nodes and edges a search must not use.
#[derive(Debug, Default, Clone)]
struct SearchMask {
    banned_nodes: HashSet<NodeId>,
    banned_edges: HashSet<(NodeId, NodeId)>,
}

impl SearchMask {
    fn allows(&self, edge: &Edge) -> bool {
        !self.banned_nodes.contains(&edge.target)
            && !self.banned_edges.contains(&(edge.source, edge.target))
    }
}

/// Find the least-cost route from `source` to `target`.
pub fn shortest_path(
    graph: &RoadGraph,
    source: NodeId,
    target: NodeId,
    weight: &dyn EdgeWeight,
) -> Result<Route> {
    shortest_path_with(graph, source, target, weight, &SearchControl::default())
}

/// [`shortest_path`] with a cancellation handle.
pub fn shortest_path_with(
    graph: &RoadGraph,
    source: NodeId,
    target: NodeId,
    weight: &dyn EdgeWeight,
    control: &SearchControl,
) -> Result<Route> {
    ensure_known(graph, source)?;
    ensure_known(graph, target)?;

    dijkstra(graph, source, target, weight, &SearchMask::default(), control)?.ok_or(
        Error::NoPathFound {
            source_node: source,
            target_node: target,
        },
    )
}

/// Enumerate up to `k` loopless routes in order of increasing cost (Yen's algorithm).
///
/// Routes are ordered by `(cost, hops, node sequence)`. Fewer than `k`
/// routes are returned when the graph does not hold that many distinct
/// loopless paths.
pub fn k_shortest_paths(
    graph: &RoadGraph,
    source: NodeId,
    target: NodeId,
    k: usize,
    weight: &dyn EdgeWeight,
    control: &SearchControl,
) -> Result<Vec<Route>> {
    if k == 0 {
        return Err(Error::invalid_request("at least one route must be requested"));
    }

    let first = shortest_path_with(graph, source, target, weight, control)?;
    if source == target {
        return Ok(vec![first]);
    }

    let mut accepted = vec![first];
    let mut candidates: Vec<Route> = Vec::new();

    while accepted.len() < k {
        let previous = accepted[accepted.len() - 1].nodes.clone();

        for i in 0..previous.len() - 1 {
            if control.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let spur = previous[i];
            let root = &previous[..=i];

            let mut mask = SearchMask::default();
            for route in &accepted {
                if route.nodes.len() > i + 1 && route.nodes[..=i] == *root {
                    mask.banned_edges.insert((route.nodes[i], route.nodes[i + 1]));
                }
            }
            mask.banned_nodes.extend(root[..i].iter().copied());

            let Some(spur_route) = dijkstra(graph, spur, target, weight, &mask, control)? else {
                continue;
            };

            let mut nodes = root[..i].to_vec();
            nodes.extend_from_slice(&spur_route.nodes);

            let known = accepted
                .iter()
                .chain(candidates.iter())
                .any(|route| route.nodes == nodes);
            if known {
                continue;
            }

            let cost = path_cost(graph, &nodes, weight);
            candidates.push(Route { nodes, cost });
        }

        let Some(best) = candidates
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| compare_routes(a, b))
            .map(|(idx, _)| idx)
        else {
            break;
        };
        accepted.push(candidates.swap_remove(best));
    }

    Ok(accepted)
}

fn ensure_known(graph: &RoadGraph, node: NodeId) -> Result<()> {
    if graph.contains(node) {
        Ok(())
    } else {
        Err(Error::invalid_request(format!(
            "node {node} is not part of the road graph"
        )))
    }
}

fn compare_routes(a: &Route, b: &Route) -> Ordering {
    a.cost
        .total_cmp(&b.cost)
        .then_with(|| a.nodes.len().cmp(&b.nodes.len()))
        .then_with(|| a.nodes.cmp(&b.nodes))
}

/// Sum of the cheapest parallel edge between each consecutive pair.
fn path_cost(graph: &RoadGraph, nodes: &[NodeId], weight: &dyn EdgeWeight) -> f64 {
    nodes
        .windows(2)
        .map(|pair| {
            graph
                .edges_between(pair[0], pair[1])
                .map(|edge| weight.cost(edge))
                .fold(f64::INFINITY, f64::min)
        })
        .sum()
}

#[derive(Debug, Clone, Copy)]
struct Label {
    cost: f64,
    hops: usize,
    parent: Option<NodeId>,
}

fn dijkstra(
    graph: &RoadGraph,
    source: NodeId,
    target: NodeId,
    weight: &dyn EdgeWeight,
    mask: &SearchMask,
    control: &SearchControl,
) -> Result<Option<Route>> {
    if source == target {
        return Ok(Some(Route::single(source)));
    }

    let mut labels: HashMap<NodeId, Label> = HashMap::new();
    let mut settled: HashSet<NodeId> = HashSet::new();
    let mut queue = BinaryHeap::new();

    labels.insert(
        source,
        Label {
            cost: 0.0,
            hops: 0,
            parent: None,
        },
    );
    queue.push(QueueEntry::new(source, 0.0, 0));

    while let Some(entry) = queue.pop() {
        if !settled.insert(entry.node) {
            continue;
        }
        if settled.len() % CANCEL_CHECK_INTERVAL == 0 && control.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if entry.node == target {
            let cost = entry.cost.0;
            return Ok(Some(Route {
                nodes: reconstruct_path(&labels, target),
                cost,
            }));
        }

        for edge in graph.neighbours(entry.node) {
            let next = edge.target;
            if settled.contains(&next) || !mask.allows(edge) {
                continue;
            }

            let edge_cost = weight.cost(edge);
            if !edge_cost.is_finite() || edge_cost < 0.0 {
                return Err(Error::InvalidEdge {
                    source_node: edge.source,
                    target_node: edge.target,
                    field: "cost",
                    value: edge_cost,
                });
            }

            let candidate = Label {
                cost: entry.cost.0 + edge_cost,
                hops: entry.hops + 1,
                parent: Some(entry.node),
            };

            match labels.get_mut(&next) {
                None => {
                    labels.insert(next, candidate);
                    queue.push(QueueEntry::new(next, candidate.cost, candidate.hops));
                }
                Some(current) => match compare_labels(&candidate, current) {
                    Ordering::Less => {
                        let improved = candidate.cost < current.cost || candidate.hops < current.hops;
                        *current = candidate;
                        if improved {
                            queue.push(QueueEntry::new(next, candidate.cost, candidate.hops));
                        }
                    }
                    Ordering::Equal | Ordering::Greater => {}
                },
            }
        }
    }

    Ok(None)
}

fn compare_labels(a: &Label, b: &Label) -> Ordering {
    a.cost
        .total_cmp(&b.cost)
        .then_with(|| a.hops.cmp(&b.hops))
        .then_with(|| a.parent.cmp(&b.parent))
}

fn reconstruct_path(labels: &HashMap<NodeId, Label>, target: NodeId) -> Vec<NodeId> {
    let mut path = Vec::new();
    let mut current = Some(target);
    while let Some(node) = current {
        path.push(node);
        current = labels.get(&node).and_then(|label| label.parent);
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
    node: NodeId,
    cost: FloatOrd,
    hops: usize,
}

impl QueueEntry {
    fn new(node: NodeId, cost: f64, hops: usize) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            hops,
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by (cost, hops, id).
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.hops.cmp(&self.hops))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
