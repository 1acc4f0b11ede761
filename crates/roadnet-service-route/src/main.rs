//! Road routing HTTP service binary.
//!
//! # Configuration
//!
//! - `PORT` - HTTP port (default: 8080)
//! - `ROADNET_GRAPH_PATH` - road graph JSON document (default: /data/road_graph.json)
//! - `ROADNET_SNAPSHOT_PATH` - binary snapshot cache (default: `<graph>.snapshot.bin`)
//! - `ROUTE_TIMEOUT_MS` - per-request search budget (default: 10000)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `METRICS_ENABLED` / `METRICS_PATH` - Prometheus endpoint

use std::net::SocketAddr;

use tracing::{error, info, warn};

use roadnet_service_route::router;
use roadnet_service_shared::{
    init_logging, init_metrics, AppState, LoggingConfig, MetricsConfig, ServiceConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("route");
    init_logging(&logging_config);

    let metrics_config = MetricsConfig::from_env();
    if metrics_config.enabled {
        if let Err(e) = init_metrics(&metrics_config) {
            warn!(error = %e, "failed to initialize metrics, continuing without metrics");
        }
    }

    let config = ServiceConfig::from_env();
    info!(
        graph_path = %config.graph_path.display(),
        snapshot_path = %config.snapshot_path.display(),
        port = config.port,
        route_timeout_ms = config.route_timeout.as_millis() as u64,
        "starting route service"
    );

    let graph_path = config.graph_path.clone();
    let snapshot_path = config.snapshot_path.clone();
    let state = tokio::task::spawn_blocking(move || AppState::load(&graph_path, &snapshot_path))
        .await?
        .map_err(|e| {
            error!(error = %e, "failed to load application state");
            e
        })?
        .with_route_timeout(config.route_timeout);

    info!(
        nodes = state.node_count(),
        edges = state.edge_count(),
        source = ?state.graph_source(),
        "application state loaded"
    );

    let app = router(state, &metrics_config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
