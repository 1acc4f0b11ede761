use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use roadnet_lib::{
    Coordinate, GraphBuilder, LinearScan, NearestNode, RoadGraph, RouteEngine, RouteRequest,
    RouteStrategy, SpatialIndex,
};
use std::hint::black_box;
use std::sync::Arc;

/// Side length of the synthetic street grid.
const GRID: i64 = 100;

fn node_id(row: i64, col: i64) -> i64 {
    row * GRID + col
}

/// Manhattan-style grid with roughly 110 m blocks.
static GRAPH: Lazy<Arc<RoadGraph>> = Lazy::new(|| {
    let mut builder = GraphBuilder::new();
    for row in 0..GRID {
        for col in 0..GRID {
            builder.add_node(
                node_id(row, col),
                12.90 + row as f64 * 0.001,
                77.50 + col as f64 * 0.001,
            );
        }
    }
    for row in 0..GRID {
        for col in 0..GRID {
            let length = 110.0 + ((row * 31 + col * 17) % 13) as f64;
            if col + 1 < GRID {
                builder.add_road(node_id(row, col), node_id(row, col + 1), length, false);
            }
            if row + 1 < GRID {
                builder.add_road(node_id(row, col), node_id(row + 1, col), length, false);
            }
        }
    }
    Arc::new(builder.build().expect("grid builds"))
});

static ENGINE: Lazy<RouteEngine> = Lazy::new(|| RouteEngine::new(Arc::clone(&GRAPH)));

fn corner_to_corner() -> RouteRequest {
    RouteRequest::new(
        Coordinate::new(12.9001, 77.5001),
        Coordinate::new(12.90 + (GRID - 1) as f64 * 0.001, 77.50 + (GRID - 1) as f64 * 0.001),
    )
}

fn benchmark_pathfinding(c: &mut Criterion) {
    let engine = &*ENGINE;

    c.bench_function("dijkstra_grid_corner_to_corner", |b| {
        let request = corner_to_corner();
        b.iter(|| {
            let plan = engine.plan(&request).expect("route exists");
            black_box(plan.routes()[0].hop_count())
        });
    });

    c.bench_function("yen_grid_k3", |b| {
        let request = corner_to_corner()
            .with_num_routes(3)
            .with_strategy(RouteStrategy::KShortest);
        b.iter(|| {
            let plan = engine.plan(&request).expect("route exists");
            black_box(plan.routes().len())
        });
    });
}

fn benchmark_resolvers(c: &mut Criterion) {
    let index = SpatialIndex::build(&GRAPH);
    let scan = LinearScan::new(Arc::clone(&GRAPH));

    c.bench_function("nearest_kdtree", |b| {
        b.iter(|| black_box(index.nearest_node(12.9512, 77.5487).expect("resolves")))
    });

    c.bench_function("nearest_linear_scan", |b| {
        b.iter(|| black_box(scan.nearest_node(12.9512, 77.5487).expect("resolves")))
    });
}

criterion_group!(benches, benchmark_pathfinding, benchmark_resolvers);
criterion_main!(benches);
