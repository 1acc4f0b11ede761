//! Binary road-graph snapshots.
//!
//! Parsing a large JSON document dominates service start-up, so the built
//! graph is cached next to it and reused on the next start.
//!
//! # Serialization Format
//!
//! ```text
//! Header (16 bytes):
//!   - Magic: b"RNGS" (4 bytes)
//!   - Version: u8 (1 byte)
//!   - Flags: u8 (1 byte) - bit 0: has street names, bit 1: has speed limits
//!   - Node count: u32 (4 bytes)
//!   - Edge count: u32 (4 bytes)
//!   - Reserved: 2 bytes
//!
//! Body:
//!   - postcard-serialized SnapshotBody
//!   - zstd compressed
//!
//! Footer (32 bytes):
//!   - SHA-256 checksum of compressed body
//! ```

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::dataset::load_graph;
use crate::error::{Error, Result};
use crate::graph::{Edge, GraphBuilder, NodeId, RoadGraph};

const SNAPSHOT_MAGIC: &[u8; 4] = b"RNGS";

const SNAPSHOT_VERSION: u8 = 1;

const FLAG_HAS_NAMES: u8 = 0x01;

const FLAG_HAS_SPEEDS: u8 = 0x02;

const HEADER_SIZE: usize = 16;

/// SHA-256.
const CHECKSUM_SIZE: usize = 32;

const COMPRESSION_LEVEL: i32 = 3;

/// postcard is not self-describing, so the body uses plain records without
/// skipped optional fields.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotBody {
    nodes: Vec<(NodeId, f64, f64)>,
    edges: Vec<SnapshotEdge>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEdge {
    source: NodeId,
    target: NodeId,
    length: f64,
    maxspeed_kph: Option<f64>,
    name: Option<String>,
}

/// Where a graph returned by [`load_or_build`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphSource {
    Snapshot,
    Document,
}

/// Default snapshot location for a graph document: `<document>.snapshot.bin`.
pub fn snapshot_path_for(graph_path: &Path) -> PathBuf {
    let mut path = graph_path.as_os_str().to_owned();
    path.push(".snapshot.bin");
    PathBuf::from(path)
}

/// Serialize `graph` to `path`.
pub fn save_snapshot(graph: &RoadGraph, path: &Path) -> Result<()> {
    let body = SnapshotBody {
        nodes: graph
            .nodes()
            .iter()
            .map(|node| (node.id, node.lat, node.lon))
            .collect(),
        edges: graph
            .edges()
            .map(|edge| SnapshotEdge {
                source: edge.source,
                target: edge.target,
                length: edge.length,
                maxspeed_kph: edge.maxspeed_kph,
                name: edge.name.clone(),
            })
            .collect(),
    };

    let serialized = postcard::to_allocvec(&body).map_err(|e| Error::SnapshotSerialize {
        message: format!("postcard serialization failed: {e}"),
    })?;
    let compressed = zstd::encode_all(serialized.as_slice(), COMPRESSION_LEVEL).map_err(|e| {
        Error::SnapshotSerialize {
            message: format!("zstd compression failed: {e}"),
        }
    })?;
    let checksum = Sha256::digest(&compressed);

    let node_count = u32::try_from(body.nodes.len()).map_err(|_| Error::SnapshotSerialize {
        message: format!("too many nodes for snapshot: {}", body.nodes.len()),
    })?;
    let edge_count = u32::try_from(body.edges.len()).map_err(|_| Error::SnapshotSerialize {
        message: format!("too many edges for snapshot: {}", body.edges.len()),
    })?;

    let mut flags = 0;
    if body.edges.iter().any(|edge| edge.name.is_some()) {
        flags |= FLAG_HAS_NAMES;
    }
    if body.edges.iter().any(|edge| edge.maxspeed_kph.is_some()) {
        flags |= FLAG_HAS_SPEEDS;
    }

    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(SNAPSHOT_MAGIC);
    header[4] = SNAPSHOT_VERSION;
    header[5] = flags;
    header[6..10].copy_from_slice(&node_count.to_le_bytes());
    header[10..14].copy_from_slice(&edge_count.to_le_bytes());

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&header)?;
    writer.write_all(&compressed)?;
    writer.write_all(&checksum)?;
    writer.flush()?;

    info!(
        path = %path.display(),
        nodes = node_count,
        edges = edge_count,
        file_size = HEADER_SIZE + compressed.len() + CHECKSUM_SIZE,
        "graph snapshot saved"
    );
    Ok(())
}

/// Load a graph snapshot, verifying its header and checksum.
pub fn load_snapshot(path: &Path) -> Result<RoadGraph> {
    debug!(path = %path.display(), "loading graph snapshot");
    let load_error = |message: String| Error::SnapshotLoad {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path).map_err(|e| load_error(format!("failed to open file: {e}")))?;
    let file_len = file.metadata()?.len() as usize;
    let body_len = file_len
        .checked_sub(HEADER_SIZE + CHECKSUM_SIZE)
        .ok_or_else(|| load_error(format!("file too short ({file_len} bytes)")))?;
    let mut reader = BufReader::new(file);

    let mut header = [0u8; HEADER_SIZE];
    reader
        .read_exact(&mut header)
        .map_err(|e| load_error(format!("failed to read header: {e}")))?;
    if &header[0..4] != SNAPSHOT_MAGIC {
        return Err(load_error("invalid magic bytes".to_string()));
    }
    let version = header[4];
    if version != SNAPSHOT_VERSION {
        return Err(load_error(format!(
            "unsupported version {version} (expected {SNAPSHOT_VERSION})"
        )));
    }
    let node_count = u32::from_le_bytes([header[6], header[7], header[8], header[9]]) as usize;
    let edge_count = u32::from_le_bytes([header[10], header[11], header[12], header[13]]) as usize;

    let mut compressed = vec![0u8; body_len];
    reader
        .read_exact(&mut compressed)
        .map_err(|e| load_error(format!("failed to read compressed data: {e}")))?;
    let mut stored_checksum = [0u8; CHECKSUM_SIZE];
    reader
        .read_exact(&mut stored_checksum)
        .map_err(|e| load_error(format!("failed to read checksum: {e}")))?;

    if Sha256::digest(&compressed).as_slice() != stored_checksum {
        return Err(load_error(
            "checksum mismatch - file may be corrupted".to_string(),
        ));
    }

    let decompressed = zstd::decode_all(compressed.as_slice())
        .map_err(|e| load_error(format!("zstd decompression failed: {e}")))?;
    let body: SnapshotBody = postcard::from_bytes(&decompressed)
        .map_err(|e| load_error(format!("postcard deserialization failed: {e}")))?;

    if body.nodes.len() != node_count || body.edges.len() != edge_count {
        return Err(load_error(format!(
            "header declares {node_count} nodes and {edge_count} edges, body holds {} and {}",
            body.nodes.len(),
            body.edges.len()
        )));
    }

    let mut builder = GraphBuilder::new();
    for (id, lat, lon) in body.nodes {
        builder.add_node(id, lat, lon);
    }
    for edge in body.edges {
        builder.push_edge(Edge {
            source: edge.source,
            target: edge.target,
            length: edge.length,
            maxspeed_kph: edge.maxspeed_kph,
            name: edge.name,
        });
    }
    let graph = builder.build()?;

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded graph snapshot"
    );
    Ok(graph)
}

/// Load a graph from its snapshot when one is usable, otherwise from the
/// JSON document, writing a fresh snapshot afterwards.
///
/// A snapshot older than its document is treated as stale. Failing to write
/// the snapshot is logged and does not fail the load.
pub fn load_or_build(graph_path: &Path, snapshot_path: &Path) -> Result<(RoadGraph, GraphSource)> {
    if snapshot_path.exists() && !is_stale(snapshot_path, graph_path) {
        match load_snapshot(snapshot_path) {
            Ok(graph) => return Ok((graph, GraphSource::Snapshot)),
            Err(error) => warn!(
                path = %snapshot_path.display(),
                error = %error,
                "failed to load graph snapshot, will rebuild"
            ),
        }
    }

    let graph = load_graph(graph_path)?;
    if let Err(error) = save_snapshot(&graph, snapshot_path) {
        warn!(
            path = %snapshot_path.display(),
            error = %error,
            "failed to write graph snapshot"
        );
    }
    Ok((graph, GraphSource::Document))
}

fn is_stale(snapshot_path: &Path, graph_path: &Path) -> bool {
    let modified = |path: &Path| fs::metadata(path).and_then(|meta| meta.modified()).ok();
    match (modified(snapshot_path), modified(graph_path)) {
        (Some(snapshot), Some(document)) => snapshot < document,
        _ => false,
    }
}
