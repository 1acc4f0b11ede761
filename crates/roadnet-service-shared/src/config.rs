//! Service configuration read from the environment.
//!
//! - `PORT`: HTTP port (default: 8080)
//! - `ROADNET_GRAPH_PATH`: road graph document (default: `/data/road_graph.json`)
//! - `ROADNET_SNAPSHOT_PATH`: binary snapshot cache (default: `<graph path>.snapshot.bin`)
//! - `ROUTE_TIMEOUT_MS`: time budget per route request (default: 10000)

use std::path::PathBuf;
use std::time::Duration;

use roadnet_lib::{snapshot_path_for, DEFAULT_GRAPH_PATH};

use crate::state::DEFAULT_ROUTE_TIMEOUT;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    pub graph_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub route_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    ///
    /// Unparseable values fall back to their defaults with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT);

        let graph_path = lookup("ROADNET_GRAPH_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_GRAPH_PATH));

        let snapshot_path = lookup("ROADNET_SNAPSHOT_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| snapshot_path_for(&graph_path));

        let timeout_ms = parse_or(
            "ROUTE_TIMEOUT_MS",
            lookup("ROUTE_TIMEOUT_MS"),
            DEFAULT_ROUTE_TIMEOUT.as_millis() as u64,
        );

        Self {
            port,
            graph_path,
            snapshot_path,
            route_timeout: Duration::from_millis(timeout_ms.max(1)),
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparseable setting");
            default
        }),
    }
}
