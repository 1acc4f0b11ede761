//! JSON road-graph documents.
//!
//! A document lists nodes and road segments:
//!
//! ```json
//! {
//!   "nodes": [{"id": 1, "lat": 12.90, "lon": 77.50}],
//!   "edges": [{"source": 1, "target": 2, "length": 1.0, "oneway": false}]
//! }
//! ```
//!
//! Segments are two-way unless `oneway` is `true`; a two-way segment becomes
//! a pair of opposing directed edges in the built [`RoadGraph`].

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::graph::{Edge, GraphBuilder, NodeId, RoadGraph};

/// Default location of the road graph document inside the service container.
pub const DEFAULT_GRAPH_PATH: &str = "/data/road_graph.json";

/// Serialized road graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: NodeId,
    pub target: NodeId,
    pub length: f64,
    #[serde(default)]
    pub oneway: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxspeed_kph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl GraphDocument {
    /// Validate the document and build the graph it describes.
    pub fn into_graph(self) -> Result<RoadGraph> {
        let mut builder = GraphBuilder::new();
        for node in &self.nodes {
            builder.add_node(node.id, node.lat, node.lon);
        }
        for record in self.edges {
            let edge = Edge {
                source: record.source,
                target: record.target,
                length: record.length,
                maxspeed_kph: record.maxspeed_kph,
                name: record.name,
            };
            if !record.oneway {
                builder.push_edge(Edge {
                    source: edge.target,
                    target: edge.source,
                    ..edge.clone()
                });
            }
            builder.push_edge(edge);
        }
        builder.build()
    }

    /// Describe an existing graph; every directed edge is written as one-way.
    pub fn from_graph(graph: &RoadGraph) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| NodeRecord {
                id: node.id,
                lat: node.lat,
                lon: node.lon,
            })
            .collect();
        let edges = graph
            .edges()
            .map(|edge| EdgeRecord {
                source: edge.source,
                target: edge.target,
                length: edge.length,
                oneway: true,
                maxspeed_kph: edge.maxspeed_kph,
                name: edge.name.clone(),
            })
            .collect();
        Self { nodes, edges }
    }
}

/// Parse a road graph document held in memory.
///
/// `origin` only labels parse errors.
pub fn parse_graph(contents: &str, origin: &Path) -> Result<RoadGraph> {
    let document: GraphDocument =
        serde_json::from_str(contents).map_err(|source| Error::GraphParse {
            path: origin.to_path_buf(),
            source,
        })?;
    document.into_graph()
}

/// Read and build the road graph stored at `path`.
///
/// A missing file is reported as [`Error::GraphUnavailable`].
pub fn load_graph(path: &Path) -> Result<RoadGraph> {
    let contents = fs::read_to_string(path).map_err(|err| match err.kind() {
        IoErrorKind::NotFound => Error::GraphUnavailable {
            reason: format!("road graph file {} does not exist", path.display()),
        },
        _ => Error::Io(err),
    })?;

    let graph = parse_graph(&contents, path)?;
    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded road graph document"
    );
    Ok(graph)
}

/// Write `graph` as a JSON document.
pub fn write_graph(graph: &RoadGraph, path: &Path) -> Result<()> {
    let document = GraphDocument::from_graph(graph);
    let json = serde_json::to_vec_pretty(&document).map_err(|source| Error::GraphParse {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_graph_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/bengaluru_sample.json")
    }

    const SAMPLE: &str = r#"{
        "nodes": [
            {"id": 1, "lat": 12.90, "lon": 77.50},
            {"id": 2, "lat": 12.91, "lon": 77.51},
            {"id": 3, "lat": 12.92, "lon": 77.52}
        ],
        "edges": [
            {"source": 1, "target": 2, "length": 1.0},
            {"source": 2, "target": 3, "length": 2.5, "oneway": true, "maxspeed_kph": 50, "name": "Outer Ring Road"}
        ]
    }"#;

    #[test]
    fn two_way_segments_expand_to_edge_pairs() {
        let graph = parse_graph(SAMPLE, Path::new("sample.json")).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.edges_between(2, 1).count(), 1);
        assert_eq!(graph.edges_between(3, 2).count(), 0);

        let named = graph.edges_between(2, 3).next().unwrap();
        assert_eq!(named.maxspeed_kph, Some(50.0));
        assert_eq!(named.name.as_deref(), Some("Outer Ring Road"));
    }

    #[test]
    fn malformed_documents_report_the_path() {
        let err = parse_graph("{\"nodes\": 5}", Path::new("broken.json")).unwrap_err();
        assert!(matches!(err, Error::GraphParse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn missing_file_is_graph_unavailable() {
        let err = load_graph(Path::new("/nonexistent/road_graph.json")).unwrap_err();
        assert!(matches!(err, Error::GraphUnavailable { .. }));
    }

    #[test]
    fn document_describes_built_graph() {
        let graph = parse_graph(SAMPLE, Path::new("sample.json")).unwrap();
        let document = GraphDocument::from_graph(&graph);
        assert_eq!(document.nodes.len(), 3);
        assert_eq!(document.edges.len(), 3);
        assert!(document.edges.iter().all(|edge| edge.oneway));

        let rebuilt = document.into_graph().unwrap();
        assert_eq!(rebuilt.edge_count(), graph.edge_count());
    }

    #[test]
    fn fixture_graph_loads() {
        let graph = load_graph(&fixture_graph_path()).unwrap();
        assert!(graph.contains(1));
        assert!(!graph.is_empty());
    }
}
