//! Test utilities for route handler testing.
//!
//! This module provides fixtures and helpers for testing HTTP handlers
//! against the checked-in sample road graph.

use std::path::PathBuf;
use std::sync::OnceLock;

use roadnet_lib::load_graph;

use crate::state::AppState;

/// Path to the fixture road graph.
pub const TEST_FIXTURE_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../docs/fixtures/bengaluru_sample.json"
);

static TEST_STATE: OnceLock<AppState> = OnceLock::new();

/// Shared test AppState built from the fixture graph.
///
/// The graph is parsed once; later calls clone the cached state.
///
/// # Panics
///
/// Panics if the fixture cannot be loaded. This indicates a test
/// configuration issue.
pub fn test_state() -> AppState {
    TEST_STATE
        .get_or_init(|| {
            let path = fixture_graph_path();
            let graph = load_graph(&path)
                .unwrap_or_else(|e| panic!("failed to load test fixture from {:?}: {}", path, e));
            AppState::from_graph(graph)
        })
        .clone()
}

pub fn fixture_graph_path() -> PathBuf {
    PathBuf::from(TEST_FIXTURE_PATH)
}

/// Nodes of the fixture graph as `(id, [lat, lon])`.
pub mod fixture_nodes {
    pub const A: (i64, [f64; 2]) = (1, [12.90, 77.50]);
    pub const B: (i64, [f64; 2]) = (2, [12.91, 77.51]);
    pub const C: (i64, [f64; 2]) = (3, [12.92, 77.52]);
    pub const D: (i64, [f64; 2]) = (4, [12.93, 77.53]);
    /// No roads reach this node.
    pub const ISOLATED: (i64, [f64; 2]) = (5, [12.80, 77.40]);
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    format!("test-{}", uuid::Uuid::now_v7())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_path_exists() {
        let path = fixture_graph_path();
        assert!(path.exists(), "fixture graph not found at {:?}", path);
    }

    #[test]
    fn test_state_loads_successfully() {
        let state = test_state();
        assert_eq!(state.node_count(), 5);
        assert_eq!(state.edge_count(), 8);
    }

    #[test]
    fn test_fixture_nodes_match_graph() {
        let state = test_state();
        let engine = state.engine().unwrap();
        for (id, [lat, lon]) in [
            fixture_nodes::A,
            fixture_nodes::B,
            fixture_nodes::C,
            fixture_nodes::D,
            fixture_nodes::ISOLATED,
        ] {
            assert_eq!(engine.nearest_node(lat, lon).unwrap(), id);
        }
    }

    #[test]
    fn test_request_id_unique() {
        assert_ne!(test_request_id(), test_request_id());
    }
}
