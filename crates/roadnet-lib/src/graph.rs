use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::{self, Coordinate};

/// Numeric identifier for a road-graph node (OSM node ids fit in an `i64`).
pub type NodeId = i64;

/// Intersection or shape point of the road network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// Directed, weighted road segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    /// Physical length in metres.
    pub length: f64,
    /// Posted speed limit, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxspeed_kph: Option<f64>,
    /// Street name, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Edge {
    /// Edge with only the mandatory attributes.
    pub fn new(source: NodeId, target: NodeId, length: f64) -> Self {
        Self {
            source,
            target,
            length,
            maxspeed_kph: None,
            name: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.length.is_finite() || self.length < 0.0 {
            return Err(Error::InvalidEdge {
                source_node: self.source,
                target_node: self.target,
                field: "length",
                value: self.length,
            });
        }
        if let Some(speed) = self.maxspeed_kph {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(Error::InvalidEdge {
                    source_node: self.source,
                    target_node: self.target,
                    field: "maxspeed_kph",
                    value: speed,
                });
            }
        }
        Ok(())
    }
}

/// Immutable road network used by the resolvers and the path search.
///
/// Nodes are kept sorted by identifier so every enumeration is deterministic;
/// outgoing edges keep the order in which they were added. There is no
/// mutation API: share the graph behind an `Arc` once it is built.
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    adjacency: Vec<Vec<Edge>>,
    edge_count: usize,
}

impl RoadGraph {
    /// Start building a graph.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// Lookup a node by identifier.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Outgoing edges of `id`; empty for unknown nodes.
    pub fn neighbours(&self, id: NodeId) -> &[Edge] {
        self.index
            .get(&id)
            .map(|&idx| self.adjacency[idx].as_slice())
            .unwrap_or(&[])
    }

    /// All edges leading from `source` directly to `target` (parallel ways included).
    pub fn edges_between(&self, source: NodeId, target: NodeId) -> impl Iterator<Item = &Edge> {
        self.neighbours(source)
            .iter()
            .filter(move |edge| edge.target == target)
    }

    /// Nodes in ascending identifier order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Every edge, grouped by source node in ascending identifier order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.adjacency.iter().flatten()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Validating builder for [`RoadGraph`].
///
/// Problems are reported by [`GraphBuilder::build`], so additions can be
/// chained freely.
#[derive(Debug, Default, Clone)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: NodeId, lat: f64, lon: f64) -> &mut Self {
        self.nodes.push(Node { id, lat, lon });
        self
    }

    /// Add a single directed edge.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, length: f64) -> &mut Self {
        self.edges.push(Edge::new(source, target, length));
        self
    }

    /// Add a road segment; two-way roads become a pair of opposing edges.
    pub fn add_road(
        &mut self,
        source: NodeId,
        target: NodeId,
        length: f64,
        oneway: bool,
    ) -> &mut Self {
        self.add_edge(source, target, length);
        if !oneway {
            self.add_edge(target, source, length);
        }
        self
    }

    /// Add a fully specified directed edge.
    pub fn push_edge(&mut self, edge: Edge) -> &mut Self {
        self.edges.push(edge);
        self
    }

    /// Validate the collected nodes and edges and freeze them into a graph.
    pub fn build(self) -> Result<RoadGraph> {
        let GraphBuilder { mut nodes, edges } = self;

        nodes.sort_by_key(|node| node.id);
        for pair in nodes.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(Error::DuplicateNode { id: pair[0].id });
            }
        }
        for node in &nodes {
            geo::validate(node.lat, node.lon)?;
        }

        let index: HashMap<NodeId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id, idx))
            .collect();

        let mut adjacency: Vec<Vec<Edge>> = vec![Vec::new(); nodes.len()];
        let edge_count = edges.len();
        for edge in edges {
            edge.validate()?;
            let Some(&source_idx) = index.get(&edge.source) else {
                return Err(Error::UnknownNode { id: edge.source });
            };
            if !index.contains_key(&edge.target) {
                return Err(Error::UnknownNode { id: edge.target });
            }
            adjacency[source_idx].push(edge);
        }

        debug!(nodes = nodes.len(), edges = edge_count, "built road graph");

        Ok(RoadGraph {
            nodes,
            index,
            adjacency,
            edge_count,
        })
    }
}
