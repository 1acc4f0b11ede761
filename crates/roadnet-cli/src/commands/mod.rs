//! CLI subcommand handlers.
//!
//! Each handler loads what it needs through [`GraphOptions`] and returns the
//! rendered output; `main.rs` only parses arguments and prints.

pub mod info;
pub mod nearest;
pub mod route;
pub mod snapshot;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use roadnet_lib::{
    load_graph, load_or_build, snapshot_path_for, GraphSource, RoadGraph, DEFAULT_GRAPH_PATH,
};

use crate::output::OutputFormat;
use crate::terminal::ColorPalette;

pub const GRAPH_PATH_ENV: &str = "ROADNET_GRAPH_PATH";
pub const SNAPSHOT_PATH_ENV: &str = "ROADNET_SNAPSHOT_PATH";

/// Where the road graph comes from.
#[derive(Debug, Clone, Default, Args)]
pub struct GraphOptions {
    /// Road graph JSON document [env: ROADNET_GRAPH_PATH] [default: /data/road_graph.json]
    #[arg(long, global = true)]
    pub graph: Option<PathBuf>,

    /// Binary snapshot cache [env: ROADNET_SNAPSHOT_PATH] [default: <graph>.snapshot.bin]
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Always parse the JSON document and never read or write a snapshot.
    #[arg(long, global = true)]
    pub no_snapshot: bool,
}

impl GraphOptions {
    pub fn graph_path(&self) -> PathBuf {
        self.graph
            .clone()
            .or_else(|| std::env::var_os(GRAPH_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_GRAPH_PATH))
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot
            .clone()
            .or_else(|| std::env::var_os(SNAPSHOT_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| snapshot_path_for(&self.graph_path()))
    }

    /// Load the graph, going through the snapshot cache unless disabled.
    pub fn load(&self) -> Result<(RoadGraph, GraphSource)> {
        let graph_path = self.graph_path();
        if self.no_snapshot {
            let graph = load_graph(&graph_path).with_context(|| {
                format!("failed to load road graph from {}", graph_path.display())
            })?;
            return Ok((graph, GraphSource::Document));
        }

        let snapshot_path = self.snapshot_path();
        load_or_build(&graph_path, &snapshot_path).with_context(|| {
            format!("failed to load road graph from {}", graph_path.display())
        })
    }
}

/// Settings shared by every handler.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub graph: GraphOptions,
    pub format: OutputFormat,
    pub palette: ColorPalette,
}

impl CommandContext {
    pub fn new(graph: GraphOptions, format: OutputFormat, palette: ColorPalette) -> Self {
        Self {
            graph,
            format,
            palette,
        }
    }
}
