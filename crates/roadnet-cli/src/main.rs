use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use roadnet_cli::commands::{
    info::handle_info,
    nearest::{handle_nearest, NearestArgs},
    route::{handle_route, RouteArgs},
    snapshot::{handle_snapshot, SnapshotArgs},
    CommandContext, GraphOptions,
};
use roadnet_cli::output::{render_footer, OutputFormat};
use roadnet_cli::terminal::ColorPalette;

#[derive(Parser, Debug)]
#[command(author, version, about = "Road graph routing utilities")]
struct Cli {
    #[command(flatten)]
    graph: GraphOptions,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Disable ANSI colors in text output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute routes between two coordinates.
    Route(RouteArgs),
    /// List the graph nodes closest to a coordinate.
    Nearest(NearestArgs),
    /// Rebuild the binary snapshot from the JSON document.
    Snapshot(SnapshotArgs),
    /// Report node and edge counts of the loaded graph.
    Info,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let started = Instant::now();

    let palette = if cli.no_color {
        ColorPalette::plain()
    } else {
        ColorPalette::detect()
    };
    let ctx = CommandContext::new(cli.graph, cli.format, palette);

    let rendered = match &cli.command {
        Command::Route(args) => handle_route(&ctx, args)?,
        Command::Nearest(args) => handle_nearest(&ctx, args)?,
        Command::Snapshot(args) => handle_snapshot(&ctx, args)?,
        Command::Info => handle_info(&ctx)?,
    };

    if ctx.format.is_json() {
        println!("{rendered}");
    } else {
        print!("{rendered}");
        println!("\n{}", render_footer(started.elapsed(), &ctx.palette));
    }
    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
