//! Application state for the route service.
//!
//! This module provides the shared state structure that axum handlers use to
//! reach the loaded road graph and its route engine.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use roadnet_lib::{load_or_build, Error as LibError, GraphSource, RoadGraph, RouteEngine};

/// Default time budget for a single route calculation.
pub const DEFAULT_ROUTE_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Neither the graph document nor its snapshot exists.
    GraphNotFound(String),

    /// The graph exists but could not be read or validated.
    GraphLoad(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GraphNotFound(path) => write!(f, "road graph not found: {}", path),
            Self::GraphLoad(e) => write!(f, "failed to load road graph: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::GraphLoad(e) => Some(e),
            Self::GraphNotFound(_) => None,
        }
    }
}

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::post, extract::State};
/// use roadnet_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let engine = state.engine()?;
///     // ... plan routes
/// }
///
/// let state = AppState::load("road_graph.json", "road_graph.json.snapshot.bin").unwrap();
/// let app = Router::new()
///     .route("/calculate-route", post(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    engine: Option<RouteEngine>,
    unavailable_reason: String,
    source: Option<GraphSource>,
    route_timeout: Duration,
}

impl AppState {
    /// Load application state from a graph document, reusing its snapshot when possible.
    pub fn load(
        graph_path: impl AsRef<Path>,
        snapshot_path: impl AsRef<Path>,
    ) -> Result<Self, AppStateError> {
        let graph_path = graph_path.as_ref();
        let snapshot_path = snapshot_path.as_ref();

        tracing::info!(
            graph = %graph_path.display(),
            snapshot = %snapshot_path.display(),
            "loading road graph"
        );
        let (graph, source) = load_or_build(graph_path, snapshot_path).map_err(|e| match e {
            LibError::GraphUnavailable { .. } => {
                AppStateError::GraphNotFound(graph_path.display().to_string())
            }
            other => AppStateError::GraphLoad(other),
        })?;
        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            source = ?source,
            "road graph loaded successfully"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                engine: Some(RouteEngine::new(Arc::new(graph))),
                unavailable_reason: String::new(),
                source: Some(source),
                route_timeout: DEFAULT_ROUTE_TIMEOUT,
            }),
        })
    }

    /// Create application state from a pre-built graph.
    ///
    /// This is useful for testing or when the graph was built elsewhere.
    pub fn from_graph(graph: RoadGraph) -> Self {
        Self::from_engine(RouteEngine::new(Arc::new(graph)))
    }

    /// Create application state around an existing engine.
    pub fn from_engine(engine: RouteEngine) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                engine: Some(engine),
                unavailable_reason: String::new(),
                source: None,
                route_timeout: DEFAULT_ROUTE_TIMEOUT,
            }),
        }
    }

    /// State without a road graph; every route request fails as unavailable.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                engine: None,
                unavailable_reason: reason.into(),
                source: None,
                route_timeout: DEFAULT_ROUTE_TIMEOUT,
            }),
        }
    }

    /// Override the per-request time budget.
    pub fn with_route_timeout(self, route_timeout: Duration) -> Self {
        let inner = &self.inner;
        Self {
            inner: Arc::new(AppStateInner {
                engine: inner.engine.clone(),
                unavailable_reason: inner.unavailable_reason.clone(),
                source: inner.source,
                route_timeout,
            }),
        }
    }

    /// Access the route engine.
    pub fn engine(&self) -> Result<&RouteEngine, LibError> {
        self.inner
            .engine
            .as_ref()
            .ok_or_else(|| LibError::GraphUnavailable {
                reason: self.inner.unavailable_reason.clone(),
            })
    }

    pub fn route_timeout(&self) -> Duration {
        self.inner.route_timeout
    }

    /// Where the graph was loaded from, when it came from disk.
    pub fn graph_source(&self) -> Option<GraphSource> {
        self.inner.source
    }

    /// Number of nodes in the loaded graph (zero when unavailable).
    pub fn node_count(&self) -> usize {
        self.inner
            .engine
            .as_ref()
            .map_or(0, |engine| engine.graph().node_count())
    }

    /// Number of directed edges in the loaded graph (zero when unavailable).
    pub fn edge_count(&self) -> usize {
        self.inner
            .engine
            .as_ref()
            .map_or(0, |engine| engine.graph().edge_count())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("node_count", &self.node_count())
            .field("edge_count", &self.edge_count())
            .field("route_timeout", &self.inner.route_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadnet_lib::{ErrorKind, GraphBuilder};

    fn two_node_graph() -> RoadGraph {
        let mut builder = GraphBuilder::new();
        builder
            .add_node(1, 12.90, 77.50)
            .add_node(2, 12.91, 77.51)
            .add_road(1, 2, 1.0, false);
        builder.build().unwrap()
    }

    #[test]
    fn test_app_state_from_graph() {
        let state = AppState::from_graph(two_node_graph());

        assert_eq!(state.node_count(), 2);
        assert_eq!(state.edge_count(), 2);
        assert!(state.engine().is_ok());
        assert_eq!(state.route_timeout(), DEFAULT_ROUTE_TIMEOUT);
        assert!(state.graph_source().is_none());
    }

    #[test]
    fn test_app_state_clone() {
        let state1 = AppState::from_graph(two_node_graph());
        let state2 = state1.clone();

        // Both should point to the same inner data
        assert!(Arc::ptr_eq(&state1.inner, &state2.inner));
    }

    #[test]
    fn test_app_state_debug() {
        let state = AppState::from_graph(two_node_graph());
        let debug = format!("{:?}", state);

        assert!(debug.contains("AppState"));
        assert!(debug.contains("node_count"));
        assert!(debug.contains("route_timeout"));
    }

    #[test]
    fn test_unavailable_state_reports_graph_unavailable() {
        let state = AppState::unavailable("graph still loading");
        let err = state.engine().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::GraphUnavailable);
        assert!(err.to_string().contains("graph still loading"));
        assert_eq!(state.node_count(), 0);
    }

    #[test]
    fn test_with_route_timeout() {
        let state =
            AppState::from_graph(two_node_graph()).with_route_timeout(Duration::from_millis(5));
        assert_eq!(state.route_timeout(), Duration::from_millis(5));
        assert_eq!(state.node_count(), 2);
    }

    #[test]
    fn test_app_state_error_display() {
        let err = AppStateError::GraphNotFound("/path/to/graph.json".to_string());
        assert!(err.to_string().contains("/path/to/graph.json"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_app_state_load_nonexistent() {
        let result = AppState::load(
            "/nonexistent/road_graph.json",
            "/nonexistent/road_graph.json.snapshot.bin",
        );

        match result.unwrap_err() {
            AppStateError::GraphNotFound(path) => assert!(path.contains("nonexistent")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
