//! `info` subcommand.

use anyhow::Result;

use crate::commands::CommandContext;
use crate::output::{render_info_text, source_label, to_json, GraphInfo};

pub fn handle_info(ctx: &CommandContext) -> Result<String> {
    let (graph, source) = ctx.graph.load()?;

    let snapshot = (!ctx.graph.no_snapshot)
        .then(|| ctx.graph.snapshot_path().display().to_string());
    let info = GraphInfo {
        graph: ctx.graph.graph_path().display().to_string(),
        snapshot,
        source: source_label(source),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
    };

    if ctx.format.is_json() {
        to_json(&info)
    } else {
        Ok(render_info_text(&info, &ctx.palette))
    }
}
