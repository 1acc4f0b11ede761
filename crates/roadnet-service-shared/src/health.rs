//! Health check handlers for Kubernetes probes.
//!
//! Provides `/health/live` and `/health/ready` endpoints that return JSON
//! status responses for liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    pub version: String,

    /// Nodes in the loaded road graph (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_loaded: Option<usize>,

    /// Directed edges in the loaded road graph (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges_loaded: Option<usize>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            nodes_loaded: None,
            edges_loaded: None,
        }
    }

    pub fn ready(service: &str, version: &str, nodes: usize, edges: usize) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            nodes_loaded: Some(nodes),
            edges_loaded: Some(edges),
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            service: service.to_string(),
            version: version.to_string(),
            nodes_loaded: None,
            edges_loaded: None,
        }
    }
}

/// Liveness probe handler.
///
/// Returns 200 OK whenever the process is serving requests.
///
/// ```text
/// GET /health/live
/// {"status":"ok","service":"roadnet-service-shared","version":"0.1.0"}
/// ```
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler.
///
/// Returns 200 OK once a non-empty road graph is loaded, 503 otherwise.
///
/// ```text
/// GET /health/ready
/// {"status":"ok","service":"roadnet-service-shared","version":"0.1.0","nodes_loaded":5,"edges_loaded":8}
/// ```
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let status = match state.engine() {
        Err(_) => HealthStatus::not_ready(service, version, "road graph unavailable"),
        Ok(engine) if engine.graph().is_empty() => {
            HealthStatus::not_ready(service, version, "road graph has no nodes")
        }
        Ok(engine) => {
            let graph = engine.graph();
            let status = HealthStatus::ready(service, version, graph.node_count(), graph.edge_count());
            return (StatusCode::OK, Json(status)).into_response();
        }
    };
    (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response()
}
