//! `snapshot` subcommand: rebuild the binary cache from the JSON document.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use roadnet_lib::{load_graph, save_snapshot};

use crate::commands::CommandContext;
use crate::output::{render_info_text, to_json, GraphInfo};

#[derive(Debug, Clone, Args)]
pub struct SnapshotArgs {
    /// Write the snapshot here instead of the configured snapshot path.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn handle_snapshot(ctx: &CommandContext, args: &SnapshotArgs) -> Result<String> {
    let graph_path = ctx.graph.graph_path();
    let graph = load_graph(&graph_path)
        .with_context(|| format!("failed to load road graph from {}", graph_path.display()))?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| ctx.graph.snapshot_path());
    save_snapshot(&graph, &output)
        .with_context(|| format!("failed to write snapshot to {}", output.display()))?;

    let info = GraphInfo {
        graph: graph_path.display().to_string(),
        snapshot: Some(output.display().to_string()),
        source: "document",
        nodes: graph.node_count(),
        edges: graph.edge_count(),
    };

    if ctx.format.is_json() {
        to_json(&info)
    } else {
        Ok(render_info_text(&info, &ctx.palette))
    }
}
