#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use roadnet_lib::{load_graph, RoadGraph, RouteEngine};

pub const A: i64 = 1;
pub const B: i64 = 2;
pub const C: i64 = 3;
pub const D: i64 = 4;
pub const ISOLATED: i64 = 5;

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn fixture_path() -> PathBuf {
    fixtures_dir().join("bengaluru_sample.json")
}

pub fn fixture_graph() -> RoadGraph {
    load_graph(&fixture_path()).expect("fixture graph loads")
}

pub fn fixture_engine() -> RouteEngine {
    RouteEngine::new(Arc::new(fixture_graph()))
}
