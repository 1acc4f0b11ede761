//! `nearest` subcommand.

use anyhow::{Context, Result};
use clap::Args;

use roadnet_lib::SpatialIndex;

use crate::commands::CommandContext;
use crate::output::{render_nearest_text, to_json, NearestRow};

#[derive(Debug, Clone, Args)]
pub struct NearestArgs {
    #[arg(allow_hyphen_values = true)]
    pub lat: f64,

    #[arg(allow_hyphen_values = true)]
    pub lon: f64,

    /// Number of candidates to list.
    #[arg(short, long, default_value_t = 1)]
    pub k: usize,
}

pub fn handle_nearest(ctx: &CommandContext, args: &NearestArgs) -> Result<String> {
    let (graph, _) = ctx.graph.load()?;
    let index = SpatialIndex::build(&graph);

    let rows = index
        .nearest(args.lat, args.lon, args.k)
        .with_context(|| format!("failed to query nodes near ({}, {})", args.lat, args.lon))?
        .into_iter()
        .enumerate()
        .filter_map(|(rank, (id, distance_m))| {
            graph.node(id).map(|node| NearestRow {
                rank: rank + 1,
                id,
                lat: node.lat,
                lon: node.lon,
                distance_m,
            })
        })
        .collect::<Vec<_>>();

    if ctx.format.is_json() {
        to_json(&rows)
    } else {
        Ok(render_nearest_text(&rows, &ctx.palette))
    }
}
