//! Output formatting for CLI results.
//!
//! Every command produces a serializable value; `--format json` prints it
//! as pretty JSON and `--format text` renders it for a terminal.

use std::fmt::Write as _;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use roadnet_lib::{GraphSource, NodeId, RouteOutput};

use crate::terminal::{format_with_separators, ColorPalette};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

/// Pretty JSON rendering shared by every command.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize output")
}

/// One candidate returned by the `nearest` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestRow {
    pub rank: usize,
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
    pub distance_m: f64,
}

/// Summary printed by the `info` and `snapshot` commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphInfo {
    pub graph: String,
    pub snapshot: Option<String>,
    pub source: &'static str,
    pub nodes: usize,
    pub edges: usize,
}

pub fn source_label(source: GraphSource) -> &'static str {
    match source {
        GraphSource::Snapshot => "snapshot",
        GraphSource::Document => "document",
    }
}

pub fn render_route_text(output: &RouteOutput, palette: &ColorPalette) -> String {
    let mut buffer = String::new();
    for line in output.render_text().lines() {
        if line.starts_with("Route ") {
            let _ = writeln!(buffer, "{}{}{}", palette.white_bold, line, palette.reset);
        } else {
            let _ = writeln!(buffer, "{}", line);
        }
    }
    buffer
}

pub fn render_nearest_text(rows: &[NearestRow], palette: &ColorPalette) -> String {
    let mut buffer = String::new();
    let _ = writeln!(
        buffer,
        "{}Nearest nodes:{}",
        palette.white_bold, palette.reset
    );
    for row in rows {
        let _ = writeln!(
            buffer,
            "{:>3}. {}{}{} ({:.6}, {:.6}) {}{:.1} m{}",
            row.rank,
            palette.cyan,
            row.id,
            palette.reset,
            row.lat,
            row.lon,
            palette.green,
            row.distance_m,
            palette.reset
        );
    }
    buffer
}

pub fn render_info_text(info: &GraphInfo, palette: &ColorPalette) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{}Road graph{}", palette.white_bold, palette.reset);
    let _ = writeln!(buffer, "  Path: {}", info.graph);
    if let Some(snapshot) = &info.snapshot {
        let _ = writeln!(buffer, "  Snapshot: {}", snapshot);
    }
    let _ = writeln!(buffer, "  Loaded from: {}", info.source);
    let _ = writeln!(
        buffer,
        "  Nodes: {}{}{}",
        palette.green,
        format_with_separators(info.nodes as u64),
        palette.reset
    );
    let _ = writeln!(
        buffer,
        "  Edges: {}{}{}",
        palette.green,
        format_with_separators(info.edges as u64),
        palette.reset
    );
    buffer
}

/// Elapsed-time footer for text output.
pub fn render_footer(elapsed: Duration, palette: &ColorPalette) -> String {
    let elapsed_ms = elapsed.as_millis();
    let time_str = if elapsed_ms < 1000 {
        format!("{}ms", elapsed_ms)
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    };
    format!("{}Completed in {}{}", palette.gray, time_str, palette.reset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> GraphInfo {
        GraphInfo {
            graph: "/data/road_graph.json".to_string(),
            snapshot: None,
            source: "document",
            nodes: 12_345,
            edges: 4,
        }
    }

    #[test]
    fn info_text_uses_separators() {
        let text = render_info_text(&info(), &ColorPalette::plain());
        assert!(text.contains("Nodes: 12,345"));
        assert!(text.contains("Loaded from: document"));
        assert!(!text.contains("Snapshot:"));
    }

    #[test]
    fn nearest_text_lists_rows_in_order() {
        let rows = vec![
            NearestRow {
                rank: 1,
                id: 7,
                lat: 12.9,
                lon: 77.5,
                distance_m: 3.0,
            },
            NearestRow {
                rank: 2,
                id: 9,
                lat: 12.91,
                lon: 77.51,
                distance_m: 1500.0,
            },
        ];
        let text = render_nearest_text(&rows, &ColorPalette::plain());
        let first = text.find("7 (12.900000, 77.500000) 3.0 m").unwrap();
        let second = text.find("9 (12.910000, 77.510000) 1500.0 m").unwrap();
        assert!(first < second);
    }

    #[test]
    fn footer_switches_to_seconds() {
        let plain = ColorPalette::plain();
        assert_eq!(
            render_footer(Duration::from_millis(250), &plain),
            "Completed in 250ms"
        );
        assert_eq!(
            render_footer(Duration::from_millis(1500), &plain),
            "Completed in 1.50s"
        );
    }

    #[test]
    fn json_output_is_pretty() {
        let json = to_json(&info()).unwrap();
        assert!(json.contains("\n  \"nodes\": 12345"));
    }

    #[test]
    fn source_labels() {
        assert_eq!(source_label(GraphSource::Snapshot), "snapshot");
        assert_eq!(source_label(GraphSource::Document), "document");
    }
}
