//! Road-network routing library entry points.
//!
//! This crate loads a road graph into memory, resolves coordinates to their
//! nearest graph node, runs shortest-path searches, and assembles the
//! resulting node paths into coordinate sequences. Higher-level consumers
//! (CLI, HTTP service) should only depend on the items exported here instead
//! of reimplementing behavior.
//!

#![deny(warnings)]

pub mod dataset;
pub mod error;
pub mod geo;
pub mod graph;
pub mod output;
pub mod path;
pub mod routing;
pub mod snapshot;
pub mod spatial;

pub use dataset::{load_graph, parse_graph, write_graph, GraphDocument, DEFAULT_GRAPH_PATH};
pub use error::{Error, ErrorKind, Result};
pub use geo::{haversine_m, Coordinate, EARTH_RADIUS_M};
pub use graph::{Edge, GraphBuilder, Node, NodeId, RoadGraph};
pub use output::{to_coordinates, RouteOutput, RouteSummary};
pub use path::{
    k_shortest_paths, shortest_path, shortest_path_with, EdgeWeight, Route, SearchControl,
    WeightMetric, DEFAULT_SPEED_KPH,
};
pub use routing::{
    plan_routes, select_planner, RouteEngine, RoutePlan, RoutePlanner, RouteRequest,
    RouteStrategy, MAX_ROUTES,
};
pub use snapshot::{load_or_build, load_snapshot, save_snapshot, snapshot_path_for, GraphSource};
pub use spatial::{LinearScan, NearestNode, SpatialIndex};
