//! Shared infrastructure for the road routing HTTP service.
//!
//! This crate provides the HTTP glue around `roadnet-lib`:
//!
//! - [`AppState`]: Loaded road graph and route engine shared by all handlers
//! - [`health`]: Health check handlers for Kubernetes liveness/readiness probes
//! - [`ErrorBody`]: Uniform `{error, details}` failure bodies
//! - [`ServiceResponse`]: Wrapper for successful responses with content type
//! - [`metrics`]: Prometheus metrics infrastructure
//! - [`logging`]: Structured JSON logging setup
//! - [`middleware`]: Request id propagation and HTTP metrics
//! - [`ServiceConfig`]: Environment-driven service settings
//! - Request types with validation
//!
//! # Architecture
//!
//! The service follows a thin-handler pattern where all routing logic resides
//! in `roadnet-lib`:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Parse request JSON                                       │
//! │  - Validate parameters                                      │
//! │  - Call RouteEngine on a blocking thread                    │
//! │  - Format response                                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides the fixture-backed state for handler
//! testing. Enable the `test-utils` feature to access it from dependent crates.

#![deny(warnings)]

mod config;
mod error_body;
mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ServiceConfig, DEFAULT_PORT};
pub use error_body::{from_lib_error, ErrorBody, ROUTE_FAILURE};
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_route_calculated, record_route_failed,
    record_route_nodes, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use request::{CalculateRouteRequest, Validate};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError, DEFAULT_ROUTE_TIMEOUT};
