mod common;

use std::fs;

use common::{fixture_graph, fixture_path};
use roadnet_lib::{
    load_or_build, load_snapshot, save_snapshot, snapshot_path_for, Error, GraphSource,
};

#[test]
fn load_or_build_writes_then_reuses_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let graph_path = dir.path().join("road_graph.json");
    fs::copy(fixture_path(), &graph_path).unwrap();
    let snapshot_path = snapshot_path_for(&graph_path);

    let (first, source) = load_or_build(&graph_path, &snapshot_path).unwrap();
    assert_eq!(source, GraphSource::Document);
    assert!(snapshot_path.exists());

    let (second, source) = load_or_build(&graph_path, &snapshot_path).unwrap();
    assert_eq!(source, GraphSource::Snapshot);
    assert_eq!(second.nodes(), first.nodes());
    assert_eq!(second.edge_count(), first.edge_count());
}

#[test]
fn snapshot_alone_is_enough() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot_path = dir.path().join("graph.bin");
    save_snapshot(&fixture_graph(), &snapshot_path).unwrap();

    let (graph, source) =
        load_or_build(&dir.path().join("missing.json"), &snapshot_path).unwrap();
    assert_eq!(source, GraphSource::Snapshot);
    assert_eq!(graph.node_count(), 5);
}

#[test]
fn corrupted_snapshot_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.bin");
    save_snapshot(&fixture_graph(), &path).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    bytes[20] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();

    let err = load_snapshot(&path).unwrap_err();
    assert!(matches!(err, Error::SnapshotLoad { .. }));
    assert!(err.to_string().contains("checksum mismatch"));
}

#[test]
fn corrupted_snapshot_falls_back_to_document() {
    let dir = tempfile::tempdir().unwrap();
    let graph_path = dir.path().join("road_graph.json");
    fs::copy(fixture_path(), &graph_path).unwrap();
    let snapshot_path = snapshot_path_for(&graph_path);
    fs::write(&snapshot_path, b"not a snapshot at all, just some bytes padding it out").unwrap();

    let (graph, source) = load_or_build(&graph_path, &snapshot_path).unwrap();
    assert_eq!(source, GraphSource::Document);
    assert_eq!(graph.node_count(), 5);
    assert!(load_snapshot(&snapshot_path).is_ok());
}

#[test]
fn nothing_to_load_is_graph_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let graph_path = dir.path().join("road_graph.json");
    let err = load_or_build(&graph_path, &snapshot_path_for(&graph_path)).unwrap_err();
    assert!(matches!(err, Error::GraphUnavailable { .. }));
}
