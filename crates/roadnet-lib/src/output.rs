use std::fmt::Write;

use serde::Serialize;

use crate::geo::Coordinate;
use crate::graph::{NodeId, RoadGraph};
use crate::path::{Route, WeightMetric};
use crate::routing::RoutePlan;

/// Convert a route's node sequence into coordinates.
///
/// `route` must come from a search over `graph`. Debug builds panic on a node
/// the graph does not know; release builds skip it.
pub fn to_coordinates(graph: &RoadGraph, route: &Route) -> Vec<Coordinate> {
    route
        .nodes()
        .iter()
        .filter_map(|&id| {
            let node = graph.node(id);
            debug_assert!(node.is_some(), "route node {id} is not part of the graph");
            node.map(|node| node.coordinate())
        })
        .collect()
}

/// Per-route statistics reported next to the coordinate lists.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub index: usize,
    pub nodes: usize,
    pub hops: usize,
    /// Total cost under `metric` (metres, seconds or edge count).
    pub cost: f64,
    pub metric: WeightMetric,
    pub start: NodeId,
    pub goal: NodeId,
}

impl RouteSummary {
    pub fn from_route(index: usize, route: &Route, metric: WeightMetric) -> Self {
        Self {
            index,
            nodes: route.nodes().len(),
            hops: route.hop_count(),
            cost: route.cost(),
            metric,
            start: route.source(),
            goal: route.target(),
        }
    }
}

/// Assembled result of a planning request: one coordinate list per route.
///
/// `coordinates` is always an outer list, even when a single route was asked for.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteOutput {
    pub coordinates: Vec<Vec<Coordinate>>,
    pub routes: Vec<RouteSummary>,
}

impl RouteOutput {
    /// Assemble coordinates and summaries for every route of `plan`.
    pub fn from_plan(graph: &RoadGraph, plan: &RoutePlan) -> Self {
        let routes = plan
            .routes()
            .iter()
            .enumerate()
            .map(|(index, route)| RouteSummary::from_route(index, route, plan.metric))
            .collect();

        Self {
            coordinates: plan.coordinates(graph),
            routes,
        }
    }

    /// Human-readable rendering used by the CLI.
    pub fn render_text(&self) -> String {
        let mut buffer = String::new();
        for (summary, coordinates) in self.routes.iter().zip(&self.coordinates) {
            let _ = writeln!(
                buffer,
                "Route {}: {} -> {} ({} hops, cost {:.1} {})",
                summary.index + 1,
                summary.start,
                summary.goal,
                summary.hops,
                summary.cost,
                unit(summary.metric)
            );
            for (step, coordinate) in coordinates.iter().enumerate() {
                let _ = writeln!(
                    buffer,
                    "{:>4}: {:.6}, {:.6}",
                    step, coordinate.lat, coordinate.lon
                );
            }
        }
        buffer
    }
}

fn unit(metric: WeightMetric) -> &'static str {
    match metric {
        WeightMetric::Length => "m",
        WeightMetric::TravelTime => "s",
        WeightMetric::Hops => "hops",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::path::shortest_path;

    fn line() -> RoadGraph {
        let mut builder = GraphBuilder::new();
        builder
            .add_node(1, 12.90, 77.50)
            .add_node(2, 12.91, 77.51)
            .add_road(1, 2, 1.0, false);
        builder.build().unwrap()
    }

    #[test]
    fn coordinates_follow_node_order() {
        let graph = line();
        let route = shortest_path(&graph, 2, 1, &WeightMetric::Length).unwrap();
        assert_eq!(
            to_coordinates(&graph, &route),
            vec![Coordinate::new(12.91, 77.51), Coordinate::new(12.90, 77.50)]
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not part of the graph")]
    fn route_from_another_graph_is_rejected() {
        let mut builder = GraphBuilder::new();
        builder
            .add_node(7, 12.95, 77.55)
            .add_node(8, 12.96, 77.56)
            .add_road(7, 8, 1.0, false);
        let other = builder.build().unwrap();
        let route = shortest_path(&other, 7, 8, &WeightMetric::Length).unwrap();

        to_coordinates(&line(), &route);
    }

    #[test]
    fn summary_reports_hops_and_cost() {
        let graph = line();
        let route = shortest_path(&graph, 1, 2, &WeightMetric::Length).unwrap();
        let summary = RouteSummary::from_route(0, &route, WeightMetric::Length);
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.hops, 1);
        assert_eq!(summary.cost, 1.0);
        assert_eq!((summary.start, summary.goal), (1, 2));
    }

    #[test]
    fn text_rendering_lists_every_step() {
        let output = RouteOutput {
            coordinates: vec![vec![Coordinate::new(1.0, 2.0), Coordinate::new(3.0, 4.0)]],
            routes: vec![RouteSummary {
                index: 0,
                nodes: 2,
                hops: 1,
                cost: 12.5,
                metric: WeightMetric::Length,
                start: 7,
                goal: 9,
            }],
        };
        let text = output.render_text();
        assert!(text.starts_with("Route 1: 7 -> 9 (1 hops, cost 12.5 m)"));
        assert!(text.contains("   1: 3.000000, 4.000000"));
    }
}
