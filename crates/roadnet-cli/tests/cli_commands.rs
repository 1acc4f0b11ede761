use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::{tempdir, TempDir};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures/bengaluru_sample.json")
        .canonicalize()
        .expect("fixture graph present")
}

fn cli() -> Command {
    cargo_bin_cmd!("roadnet-cli")
}

/// Command reading the fixture with its snapshot kept in a temp dir.
fn prepare_command() -> (Command, TempDir) {
    let temp_dir = tempdir().expect("create temp dir");
    let mut cmd = cli();
    cmd.env("RUST_LOG", "error")
        .env("NO_COLOR", "1")
        .env_remove("ROADNET_GRAPH_PATH")
        .env_remove("ROADNET_SNAPSHOT_PATH")
        .arg("--graph")
        .arg(fixture_path())
        .arg("--snapshot")
        .arg(temp_dir.path().join("graph.snapshot.bin"));
    (cmd, temp_dir)
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("run cli");
    assert!(
        output.status.success(),
        "cli failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn route_prints_text_steps() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["route", "--from", "12.90,77.50", "--to", "12.93,77.53"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Route 1: 1 -> 4 (3 hops, cost 3.0 m)",
        ))
        .stdout(predicate::str::contains("   3: 12.930000, 77.530000"))
        .stdout(predicate::str::contains("Completed in"));
}

#[test]
fn route_json_matches_service_shape() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args([
        "--format",
        "json",
        "route",
        "--from",
        "12.90,77.50",
        "--to",
        "12.93,77.53",
        "--num-routes",
        "2",
        "--strategy",
        "k-shortest",
    ]);

    let body = json_stdout(&mut cmd);
    assert_eq!(
        body["coordinates"],
        serde_json::json!([
            [[12.90, 77.50], [12.91, 77.51], [12.92, 77.52], [12.93, 77.53]],
            [[12.90, 77.50], [12.93, 77.53]]
        ])
    );
    assert_eq!(body["routes"][1]["cost"], 10.0);
}

#[test]
fn route_with_hops_metric_takes_direct_road() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args([
        "route",
        "--from",
        "12.90,77.50",
        "--to",
        "12.93,77.53",
        "--metric",
        "hops",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("(1 hops, cost 1.0 hops)"));
}

#[test]
fn unreachable_destination_fails() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["route", "--from", "12.90,77.50", "--to", "12.80,77.40"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to calculate route"))
        .stderr(predicate::str::contains("no path found between node 1 and node 5"));
}

#[test]
fn invalid_route_count_fails() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args([
        "route",
        "--from",
        "12.90,77.50",
        "--to",
        "12.93,77.53",
        "--num-routes",
        "0",
    ]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("num_routes"));
}

#[test]
fn malformed_coordinate_is_rejected_by_parser() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["route", "--from", "12.90", "--to", "12.93,77.53"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("expected `lat,lon`"));
}

#[test]
fn nearest_lists_candidates_by_distance() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["--format", "json", "nearest", "12.911", "77.511", "-k", "2"]);

    let rows = json_stdout(&mut cmd);
    let rows = rows.as_array().expect("array of rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], 2);
    assert_eq!(rows[0]["rank"], 1);
    assert!(rows[0]["distance_m"].as_f64().unwrap() < rows[1]["distance_m"].as_f64().unwrap());
}

#[test]
fn info_reports_counts_and_writes_snapshot() {
    let (mut cmd, temp) = prepare_command();
    cmd.args(["--format", "json", "info"]);

    let info = json_stdout(&mut cmd);
    assert_eq!(info["nodes"], 5);
    assert_eq!(info["edges"], 8);
    assert_eq!(info["source"], "document");
    assert!(temp.path().join("graph.snapshot.bin").exists());

    let mut second = cli();
    second
        .env("RUST_LOG", "error")
        .arg("--graph")
        .arg(fixture_path())
        .arg("--snapshot")
        .arg(temp.path().join("graph.snapshot.bin"))
        .args(["--format", "json", "info"]);
    let info = json_stdout(&mut second);
    assert_eq!(info["source"], "snapshot");
}

#[test]
fn info_without_snapshot_reads_document_only() {
    let temp_dir = tempdir().expect("create temp dir");
    let graph = temp_dir.path().join("city.json");
    fs::copy(fixture_path(), &graph).expect("copy fixture");

    cli()
        .env("RUST_LOG", "error")
        .env("NO_COLOR", "1")
        .arg("--graph")
        .arg(&graph)
        .args(["--no-snapshot", "info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded from: document"))
        .stdout(predicate::str::contains("Nodes: 5"));

    assert!(!temp_dir.path().join("city.json.snapshot.bin").exists());
}

#[test]
fn snapshot_command_writes_requested_file() {
    let (mut cmd, temp) = prepare_command();
    let output = temp.path().join("nested/out.bin");
    cmd.arg("snapshot").arg("--output").arg(&output);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Edges: 8"));

    let bytes = fs::read(&output).expect("snapshot written");
    assert_eq!(&bytes[0..4], b"RNGS");
}

#[test]
fn missing_graph_reports_path() {
    let temp_dir = tempdir().expect("create temp dir");
    let missing = temp_dir.path().join("absent.json");

    cli()
        .env("RUST_LOG", "error")
        .arg("--graph")
        .arg(&missing)
        .arg("info")
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.json"));
}

#[test]
fn graph_path_comes_from_environment() {
    let temp_dir = tempdir().expect("create temp dir");
    cli()
        .env("RUST_LOG", "error")
        .env("NO_COLOR", "1")
        .env("ROADNET_GRAPH_PATH", fixture_path())
        .env(
            "ROADNET_SNAPSHOT_PATH",
            temp_dir.path().join("env.snapshot.bin"),
        )
        .args(["--format", "json", "info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"nodes\": 5"));

    assert!(temp_dir.path().join("env.snapshot.bin").exists());
}
