//! Prometheus metrics for the route service.
//!
//! This module provides:
//! - [`MetricsConfig`]: Configuration for the metrics system
//! - [`init_metrics`]: Initialize the Prometheus metrics recorder
//! - [`metrics_handler`]: Axum handler for `/metrics` endpoint
//! - Business metric helpers for route calculations
//!
//! # Example
//!
//! ```no_run
//! use roadnet_service_shared::metrics::{MetricsConfig, init_metrics, metrics_handler};
//! use axum::{Router, routing::get};
//!
//! let config = MetricsConfig::default();
//! init_metrics(&config).expect("failed to initialize metrics");
//!
//! let app: Router = Router::new()
//!     .route(&config.path, get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Configuration for the metrics system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Path of the exposition endpoint (e.g. "/metrics").
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Create configuration from environment variables.
    ///
    /// - `METRICS_ENABLED`: "true" or "false" (default: true)
    /// - `METRICS_PATH`: Path for metrics endpoint (default: "/metrics")
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("METRICS_ENABLED").ok().as_deref(),
            std::env::var("METRICS_PATH").ok(),
        )
    }

    fn from_values(enabled: Option<&str>, path: Option<String>) -> Self {
        let enabled = enabled.map_or(true, |v| !v.trim().eq_ignore_ascii_case("false"));
        let path = path
            .filter(|p| p.starts_with('/'))
            .unwrap_or_else(|| "/metrics".to_string());
        Self { enabled, path }
    }
}

/// Install the Prometheus recorder.
///
/// Must be called once at start-up before any metric is recorded; later
/// calls fail with [`MetricsError::AlreadyInitialized`].
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

/// Returns `None` if [`init_metrics`] has not been called.
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Axum handler returning Prometheus exposition text.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

/// Errors that can occur during metrics initialization.
#[derive(Debug, Clone)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => {
                write!(f, "failed to install metrics recorder: {}", e)
            }
        }
    }
}

impl std::error::Error for MetricsError {}

// =============================================================================
// Business Metrics Helpers
// =============================================================================

/// Increment `roadnet_routes_calculated_total` by the number of routes returned.
///
/// * `strategy` - "repeat" or "k-shortest"
/// * `metric` - "length", "travel-time" or "hops"
pub fn record_route_calculated(routes: usize, strategy: &str, metric: &str) {
    metrics::counter!(
        "roadnet_routes_calculated_total",
        "strategy" => strategy.to_string(),
        "metric" => metric.to_string()
    )
    .increment(routes as u64);
}

/// Increment `roadnet_routes_failed_total`.
///
/// * `reason` - snake_case error kind (e.g. "no_path_found", "invalid_request")
pub fn record_route_failed(reason: &str) {
    metrics::counter!(
        "roadnet_routes_failed_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record the node count of a returned route in `roadnet_route_nodes`.
pub fn record_route_nodes(nodes: usize, strategy: &str) {
    metrics::histogram!(
        "roadnet_route_nodes",
        "strategy" => strategy.to_string()
    )
    .record(nodes as f64);
}
