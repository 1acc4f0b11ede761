//! Multi-route planning strategies.
//!
//! The `RoutePlanner` trait lets the orchestrator in [`super::plan_routes`]
//! produce `num_routes` results without knowing how they are generated.

use crate::error::Result;
use crate::graph::{NodeId, RoadGraph};
use crate::path::{k_shortest_paths, shortest_path_with, EdgeWeight, Route, SearchControl};

use super::RouteStrategy;

/// Strategy for producing a fixed number of routes between two nodes.
pub trait RoutePlanner: Send + Sync {
    /// The strategy identifier for this planner.
    fn strategy(&self) -> RouteStrategy;

    /// Produce exactly `count` routes from `source` to `target`.
    fn find_routes(
        &self,
        graph: &RoadGraph,
        source: NodeId,
        target: NodeId,
        count: usize,
        weight: &dyn EdgeWeight,
        control: &SearchControl,
    ) -> Result<Vec<Route>>;
}

/// Baseline planner: every requested route is the same deterministic
/// shortest path.
///
/// The search result does not change between repetitions, so it is computed
/// once and cloned.
#[derive(Debug, Clone, Default)]
pub struct RepeatPlanner;

impl RoutePlanner for RepeatPlanner {
    fn strategy(&self) -> RouteStrategy {
        RouteStrategy::Repeat
    }

    fn find_routes(
        &self,
        graph: &RoadGraph,
        source: NodeId,
        target: NodeId,
        count: usize,
        weight: &dyn EdgeWeight,
        control: &SearchControl,
    ) -> Result<Vec<Route>> {
        let route = shortest_path_with(graph, source, target, weight, control)?;
        Ok(vec![route; count])
    }
}

/// Opt-in planner returning distinct loopless alternatives (Yen's algorithm).
///
/// When the graph holds fewer than `count` distinct paths the last one found
/// is repeated, so callers always receive `count` routes.
#[derive(Debug, Clone, Default)]
pub struct KShortestPlanner;

impl RoutePlanner for KShortestPlanner {
    fn strategy(&self) -> RouteStrategy {
        RouteStrategy::KShortest
    }

    fn find_routes(
        &self,
        graph: &RoadGraph,
        source: NodeId,
        target: NodeId,
        count: usize,
        weight: &dyn EdgeWeight,
        control: &SearchControl,
    ) -> Result<Vec<Route>> {
        let mut routes = k_shortest_paths(graph, source, target, count, weight, control)?;
        if let Some(last) = routes.last().cloned() {
            if routes.len() < count {
                tracing::debug!(
                    distinct = routes.len(),
                    requested = count,
                    "fewer distinct routes than requested; repeating the last one"
                );
                routes.resize(count, last);
            }
        }
        Ok(routes)
    }
}

/// Select the planner for a strategy.
pub fn select_planner(strategy: RouteStrategy) -> Box<dyn RoutePlanner> {
    match strategy {
        RouteStrategy::Repeat => Box::new(RepeatPlanner),
        RouteStrategy::KShortest => Box::new(KShortestPlanner),
    }
}
