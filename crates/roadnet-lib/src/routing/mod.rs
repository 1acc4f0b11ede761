//! Route planning orchestration.
//!
//! This module provides:
//! - [`RouteStrategy`] - how multiple routes between one endpoint pair are produced
//! - [`RouteRequest`] - origin/destination coordinates plus route count and metric
//! - [`RoutePlan`] - resolved endpoints and the computed routes
//! - [`RouteEngine`] - shared graph + resolver handed to request handlers
//! - [`plan_routes`] - main entry point for computing routes
//!
//! # Strategy Pattern
//!
//! Multi-route generation goes through the [`RoutePlanner`] trait. The default
//! [`RepeatPlanner`] returns the single deterministic shortest path
//! `num_routes` times. [`KShortestPlanner`] is an opt-in behaviour change that
//! returns distinct alternatives instead; callers must ask for it explicitly.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use roadnet_lib::{load_graph, Coordinate, RouteEngine, RouteRequest};
//!
//! let graph = load_graph("road_graph.json")?;
//! let engine = RouteEngine::new(Arc::new(graph));
//! let request = RouteRequest::new(Coordinate::new(12.90, 77.50), Coordinate::new(12.93, 77.53));
//! let plan = engine.plan(&request)?;
//! println!("{} nodes", plan.routes()[0].nodes().len());
//! ```

mod planner;

pub use planner::{select_planner, KShortestPlanner, RepeatPlanner, RoutePlanner};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::{self, Coordinate};
use crate::graph::{NodeId, RoadGraph};
use crate::output::to_coordinates;
use crate::path::{Route, SearchControl, WeightMetric};
use crate::spatial::{NearestNode, SpatialIndex};

/// Upper bound on routes computed for a single request.
pub const MAX_ROUTES: i64 = 10;

/// How `num_routes > 1` is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RouteStrategy {
    /// Repeat the single deterministic shortest path.
    #[default]
    Repeat,
    /// Distinct loopless alternatives ordered by cost (Yen's algorithm).
    KShortest,
}

impl fmt::Display for RouteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteStrategy::Repeat => "repeat",
            RouteStrategy::KShortest => "k-shortest",
        };
        f.write_str(value)
    }
}

/// High-level route planning request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    /// Number of routes to return; must be within `1..=MAX_ROUTES`.
    pub num_routes: i64,
    pub strategy: RouteStrategy,
    pub metric: WeightMetric,
}

impl RouteRequest {
    /// Single shortest-by-length route between two coordinates.
    pub fn new(origin: Coordinate, destination: Coordinate) -> Self {
        Self {
            origin,
            destination,
            num_routes: 1,
            strategy: RouteStrategy::default(),
            metric: WeightMetric::default(),
        }
    }

    pub fn with_num_routes(mut self, num_routes: i64) -> Self {
        self.num_routes = num_routes;
        self
    }

    pub fn with_strategy(mut self, strategy: RouteStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_metric(mut self, metric: WeightMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Check coordinate ranges and the route count.
    pub fn validate(&self) -> Result<usize> {
        if self.num_routes < 1 {
            return Err(Error::invalid_request(format!(
                "num_routes must be at least 1, got {}",
                self.num_routes
            )));
        }
        if self.num_routes > MAX_ROUTES {
            return Err(Error::invalid_request(format!(
                "num_routes cannot exceed {MAX_ROUTES}, got {}",
                self.num_routes
            )));
        }
        geo::validate(self.origin.lat, self.origin.lon)?;
        geo::validate(self.destination.lat, self.destination.lon)?;
        Ok(self.num_routes as usize)
    }
}

/// Planned routes returned by the library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub origin_node: NodeId,
    pub destination_node: NodeId,
    pub strategy: RouteStrategy,
    pub metric: WeightMetric,
    routes: Vec<Route>,
}

impl RoutePlan {
    /// Routes in request order; never empty.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Coordinate sequence of every route, index-aligned with [`RoutePlan::routes`].
    pub fn coordinates(&self, graph: &RoadGraph) -> Vec<Vec<Coordinate>> {
        self.routes
            .iter()
            .map(|route| to_coordinates(graph, route))
            .collect()
    }
}

/// Compute routes for a request against a graph and a nearest-node resolver.
///
/// This is the main entry point for route planning. It:
/// 1. Validates the route count and both coordinates
/// 2. Resolves origin and destination to graph nodes
/// 3. Selects the planner for the requested strategy
/// 4. Runs the search under the requested metric
pub fn plan_routes(
    graph: &RoadGraph,
    resolver: &dyn NearestNode,
    request: &RouteRequest,
    control: &SearchControl,
) -> Result<RoutePlan> {
    let count = request.validate()?;

    let origin_node = resolver.nearest_node(request.origin.lat, request.origin.lon)?;
    let destination_node =
        resolver.nearest_node(request.destination.lat, request.destination.lon)?;
    debug!(
        origin_node,
        destination_node,
        strategy = %request.strategy,
        metric = %request.metric,
        "resolved route endpoints"
    );

    let planner = select_planner(request.strategy);
    let routes = planner.find_routes(
        graph,
        origin_node,
        destination_node,
        count,
        &request.metric,
        control,
    )?;

    Ok(RoutePlan {
        origin_node,
        destination_node,
        strategy: request.strategy,
        metric: request.metric,
        routes,
    })
}

/// Frozen road graph plus the resolver built over it.
///
/// Cheap to clone; share one instance across every request handler.
#[derive(Clone)]
pub struct RouteEngine {
    graph: Arc<RoadGraph>,
    resolver: Arc<dyn NearestNode>,
}

impl RouteEngine {
    /// Build an engine backed by a KD-tree resolver.
    pub fn new(graph: Arc<RoadGraph>) -> Self {
        let resolver: Arc<dyn NearestNode> = Arc::new(SpatialIndex::build(&graph));
        Self { graph, resolver }
    }

    /// Build an engine from a graph that may not have been supplied.
    pub fn from_shared(graph: Option<Arc<RoadGraph>>) -> Result<Self> {
        graph.map(Self::new).ok_or_else(|| Error::GraphUnavailable {
            reason: "no road graph was supplied to the route engine".to_string(),
        })
    }

    /// Build an engine with a caller-provided resolver.
    pub fn with_resolver(graph: Arc<RoadGraph>, resolver: Arc<dyn NearestNode>) -> Self {
        Self { graph, resolver }
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    pub fn resolver(&self) -> &dyn NearestNode {
        self.resolver.as_ref()
    }

    /// Resolve a coordinate to the closest graph node.
    pub fn nearest_node(&self, lat: f64, lon: f64) -> Result<NodeId> {
        self.resolver.nearest_node(lat, lon)
    }

    /// Plan routes without a cancellation handle.
    pub fn plan(&self, request: &RouteRequest) -> Result<RoutePlan> {
        self.plan_with(request, &SearchControl::default())
    }

    /// Plan routes; the search stops early if `control` is cancelled.
    pub fn plan_with(&self, request: &RouteRequest, control: &SearchControl) -> Result<RoutePlan> {
        plan_routes(&self.graph, self.resolver.as_ref(), request, control)
    }
}

impl fmt::Debug for RouteEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEngine")
            .field("node_count", &self.graph.node_count())
            .field("edge_count", &self.graph.edge_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_asks_for_one_length_route() {
        let request = RouteRequest::new(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0));
        assert_eq!(request.num_routes, 1);
        assert_eq!(request.strategy, RouteStrategy::Repeat);
        assert_eq!(request.metric, WeightMetric::Length);
        assert_eq!(request.validate().unwrap(), 1);
    }

    #[test]
    fn non_positive_route_counts_are_invalid() {
        for count in [0, -1, -100] {
            let request = RouteRequest::new(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0))
                .with_num_routes(count);
            assert!(matches!(request.validate(), Err(Error::InvalidRequest { .. })));
        }
    }

    #[test]
    fn route_count_is_capped() {
        let request = RouteRequest::new(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0))
            .with_num_routes(MAX_ROUTES + 1);
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("cannot exceed"));
    }

    #[test]
    fn missing_graph_is_unavailable() {
        assert!(matches!(
            RouteEngine::from_shared(None),
            Err(Error::GraphUnavailable { .. })
        ));
    }

    #[test]
    fn strategy_serialization() {
        let json = serde_json::to_string(&RouteStrategy::KShortest).unwrap();
        assert_eq!(json, "\"k-shortest\"");
        let repeat: RouteStrategy = serde_json::from_str("\"repeat\"").unwrap();
        assert_eq!(repeat, RouteStrategy::Repeat);
    }
}
