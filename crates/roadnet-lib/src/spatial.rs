//! Nearest-node resolution for arbitrary query coordinates.
//!
//! Two interchangeable resolvers implement [`NearestNode`]:
//!
//! - [`LinearScan`] checks every node. It is the reference implementation and
//!   its O(n) scan is the dominant per-query cost on large graphs.
//! - [`SpatialIndex`] stores every node on the unit sphere in a KD-tree
//!   (k=3). Straight-line chord distance between points on the sphere grows
//!   monotonically with great-circle distance, so the nearest chord neighbour
//!   is also the nearest haversine neighbour and queries run in O(log n)
//!   average time.
//!
//! # Distance and ties
//!
//! Both resolvers rank candidates by haversine distance in metres, quantised
//! to whole millimetres, and break ties on the smallest [`NodeId`]. Quantising
//! makes "equidistant" a well-defined notion despite floating-point noise, and
//! both resolvers therefore return the same node for every query.

use std::collections::HashMap;
use std::sync::Arc;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::{self, Coordinate, EARTH_RADIUS_M};
use crate::graph::{NodeId, RoadGraph};

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Distance searched beyond the best candidate so every node that can share
/// its millimetre bucket is ranked.
const TIE_MARGIN_M: f64 = 0.002;

/// Maps an arbitrary coordinate to the closest graph node.
pub trait NearestNode: Send + Sync {
    /// Return the node closest to `(lat, lon)`.
    ///
    /// Fails with [`Error::InvalidCoordinate`] for non-finite or out-of-range
    /// input and with [`Error::EmptyGraph`] when there is nothing to resolve
    /// against.
    fn nearest_node(&self, lat: f64, lon: f64) -> Result<NodeId>;
}

/// Ranking key shared by every resolver: millimetre distance, then id.
fn rank_key(distance_m: f64, id: NodeId) -> (u64, NodeId) {
    ((distance_m * 1000.0).round() as u64, id)
}

/// Brute-force resolver scanning every node of the graph.
#[derive(Debug, Clone)]
pub struct LinearScan {
    graph: Arc<RoadGraph>,
}

impl LinearScan {
    pub fn new(graph: Arc<RoadGraph>) -> Self {
        Self { graph }
    }
}

impl NearestNode for LinearScan {
    fn nearest_node(&self, lat: f64, lon: f64) -> Result<NodeId> {
        geo::validate(lat, lon)?;
        let query = Coordinate::new(lat, lon);

        self.graph
            .nodes()
            .iter()
            .map(|node| rank_key(query.distance_m(&node.coordinate()), node.id))
            .min()
            .map(|(_, id)| id)
            .ok_or(Error::EmptyGraph)
    }
}

/// KD-tree spatial index over the graph's nodes.
///
/// Nodes sharing a position occupy one tree slot, so any number of
/// co-located nodes fits within a single bucket.
pub struct SpatialIndex {
    /// Item type is an index into `slots`.
    tree: KdTree<f64, usize, 3, BUCKET_SIZE, u32>,
    slots: Vec<Slot>,
    node_count: usize,
}

/// One distinct position and every node on it, ids ascending.
#[derive(Debug, Clone)]
struct Slot {
    coordinate: Coordinate,
    ids: Vec<NodeId>,
}

impl SpatialIndex {
    /// Index every node of `graph`.
    pub fn build(graph: &RoadGraph) -> Self {
        let mut slots: Vec<Slot> = Vec::new();
        let mut by_point: HashMap<[u64; 3], usize> = HashMap::new();
        let mut tree: KdTree<f64, usize, 3, BUCKET_SIZE, u32> = KdTree::new();

        for node in graph.nodes() {
            let coordinate = node.coordinate();
            let point = coordinate.unit_vector();
            let key = point.map(f64::to_bits);
            match by_point.get(&key) {
                Some(&slot) => slots[slot].ids.push(node.id),
                None => {
                    let slot = slots.len();
                    by_point.insert(key, slot);
                    slots.push(Slot {
                        coordinate,
                        ids: vec![node.id],
                    });
                    tree.add(&point, slot);
                }
            }
        }
        for slot in &mut slots {
            slot.ids.sort_unstable();
        }

        let node_count = graph.node_count();
        debug!(node_count, slot_count = slots.len(), "built spatial index");

        Self {
            tree,
            slots,
            node_count,
        }
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.node_count
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Find up to `k` nodes closest to a point.
    ///
    /// Returns `(NodeId, metres)` pairs ordered by distance, then id. Nodes
    /// tied with the k-th candidate are ranked by id before truncation.
    pub fn nearest(&self, lat: f64, lon: f64, k: usize) -> Result<Vec<(NodeId, f64)>> {
        geo::validate(lat, lon)?;
        if self.slots.is_empty() {
            return Err(Error::EmptyGraph);
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let query = Coordinate::new(lat, lon);
        let point = query.unit_vector();

        // Every slot holds at least one node, so k slots cover k nodes.
        let kth_distance = self
            .ranked(
                &query,
                self.tree
                    .nearest_n::<SquaredEuclidean>(&point, k)
                    .into_iter()
                    .map(|neighbour| neighbour.item),
            )
            .into_iter()
            .take(k)
            .last()
            .map_or(0.0, |(_, distance)| distance);

        let limit = chord_for_arc(kth_distance + TIE_MARGIN_M);
        let mut results = self.ranked(
            &query,
            self.tree
                .within_unsorted::<SquaredEuclidean>(&point, limit * limit * (1.0 + 1e-9))
                .into_iter()
                .map(|neighbour| neighbour.item),
        );
        results.truncate(k);
        Ok(results)
    }

    /// Expand slots into `(id, metres)` pairs sorted by the shared rank key.
    fn ranked(
        &self,
        query: &Coordinate,
        slots: impl Iterator<Item = usize>,
    ) -> Vec<(NodeId, f64)> {
        let mut results: Vec<(NodeId, f64)> = slots
            .flat_map(|slot| {
                let slot = &self.slots[slot];
                let distance = query.distance_m(&slot.coordinate);
                slot.ids.iter().map(move |&id| (id, distance))
            })
            .collect();
        results.sort_by_key(|&(id, distance)| rank_key(distance, id));
        results
    }
}

impl NearestNode for SpatialIndex {
    fn nearest_node(&self, lat: f64, lon: f64) -> Result<NodeId> {
        geo::validate(lat, lon)?;
        if self.slots.is_empty() {
            return Err(Error::EmptyGraph);
        }

        let query = Coordinate::new(lat, lon);
        let point = query.unit_vector();
        let best = self.tree.nearest_one::<SquaredEuclidean>(&point);
        let best_coordinate = self.slots[best.item].coordinate;

        let limit = chord_for_arc(query.distance_m(&best_coordinate) + TIE_MARGIN_M);
        self.tree
            .within_unsorted::<SquaredEuclidean>(&point, limit * limit * (1.0 + 1e-9))
            .into_iter()
            .map(|neighbour| {
                let slot = &self.slots[neighbour.item];
                rank_key(query.distance_m(&slot.coordinate), slot.ids[0])
            })
            .min()
            .map(|(_, id)| id)
            .ok_or(Error::EmptyGraph)
    }
}

/// Unit-sphere chord length spanning a great-circle arc of `arc_m` metres.
fn chord_for_arc(arc_m: f64) -> f64 {
    let half_angle = (arc_m / (2.0 * EARTH_RADIUS_M)).min(std::f64::consts::FRAC_PI_2);
    2.0 * half_angle.sin()
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("node_count", &self.node_count)
            .field("slot_count", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    fn grid() -> RoadGraph {
        let mut builder = GraphBuilder::new();
        builder
            .add_node(1, 12.90, 77.50)
            .add_node(2, 12.91, 77.51)
            .add_node(3, 12.92, 77.52)
            .add_node(4, 12.93, 77.53);
        builder.build().unwrap()
    }

    #[test]
    fn linear_scan_finds_closest_node() {
        let scan = LinearScan::new(Arc::new(grid()));
        assert_eq!(scan.nearest_node(12.901, 77.501).unwrap(), 1);
        assert_eq!(scan.nearest_node(12.929, 77.529).unwrap(), 4);
    }

    #[test]
    fn index_matches_linear_scan() {
        let graph = Arc::new(grid());
        let scan = LinearScan::new(Arc::clone(&graph));
        let index = SpatialIndex::build(&graph);
        for (lat, lon) in [(12.0, 77.0), (12.915, 77.515), (13.5, 78.0), (12.9249, 77.5251)] {
            assert_eq!(
                index.nearest_node(lat, lon).unwrap(),
                scan.nearest_node(lat, lon).unwrap(),
                "disagreement at ({lat}, {lon})"
            );
        }
    }

    #[test]
    fn ties_pick_smallest_id() {
        let mut builder = GraphBuilder::new();
        builder
            .add_node(9, 10.0, 10.0)
            .add_node(5, 10.0, 10.0)
            .add_node(7, 10.0, 10.0);
        let graph = Arc::new(builder.build().unwrap());

        let index = SpatialIndex::build(&graph);
        assert_eq!(index.nearest_node(10.0, 10.0).unwrap(), 5);
        assert_eq!(LinearScan::new(graph).nearest_node(10.0, 10.0).unwrap(), 5);
    }

    #[test]
    fn symmetric_ties_pick_smallest_id() {
        let mut builder = GraphBuilder::new();
        builder.add_node(42, 0.0, 0.001).add_node(17, 0.0, -0.001);
        let graph = Arc::new(builder.build().unwrap());

        assert_eq!(SpatialIndex::build(&graph).nearest_node(0.0, 0.0).unwrap(), 17);
        assert_eq!(LinearScan::new(graph).nearest_node(0.0, 0.0).unwrap(), 17);
    }

    #[test]
    fn empty_graph_is_an_error() {
        let graph = Arc::new(RoadGraph::default());
        assert!(matches!(
            SpatialIndex::build(&graph).nearest_node(0.0, 0.0),
            Err(Error::EmptyGraph)
        ));
        assert!(matches!(
            LinearScan::new(graph).nearest_node(0.0, 0.0),
            Err(Error::EmptyGraph)
        ));
    }

    #[test]
    fn invalid_coordinates_are_rejected_before_lookup() {
        let index = SpatialIndex::build(&grid());
        assert!(matches!(
            index.nearest_node(f64::NAN, 77.5),
            Err(Error::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            index.nearest_node(12.9, 181.0),
            Err(Error::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn co_located_nodes_share_one_slot() {
        let mut builder = GraphBuilder::new();
        for id in (1..=40).rev() {
            builder.add_node(id * 10, 12.9, 77.5);
        }
        builder.add_node(3, 12.95, 77.55);
        let graph = builder.build().unwrap();

        let index = SpatialIndex::build(&graph);
        assert_eq!(index.len(), 41);
        assert_eq!(index.slots.len(), 2);
        assert_eq!(index.nearest_node(12.9, 77.5).unwrap(), 10);
        assert_eq!(index.nearest_node(12.95, 77.55).unwrap(), 3);
    }

    #[test]
    fn k_nearest_breaks_ties_on_id() {
        let mut builder = GraphBuilder::new();
        for id in [9, 3, 7, 5, 1] {
            builder.add_node(id, 10.0, 10.0);
        }
        builder.add_node(2, 10.001, 10.0);
        let index = SpatialIndex::build(&builder.build().unwrap());

        let ids: Vec<_> = index
            .nearest(10.0, 10.0, 2)
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec![1, 3]);

        let ids: Vec<_> = index
            .nearest(10.0, 10.0, 6)
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec![1, 3, 5, 7, 9, 2]);
    }

    #[test]
    fn k_nearest_is_sorted_by_distance() {
        let index = SpatialIndex::build(&grid());
        let results = index.nearest(12.90, 77.50, 3).unwrap();
        let ids: Vec<_> = results.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(results[0].1, 0.0);
        assert!(results[1].1 < results[2].1);
    }
}
