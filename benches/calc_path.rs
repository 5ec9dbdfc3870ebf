//! Measure routing corner to corner across a generated graph, with and
//! without per-agent edge noise
//!

use std::collections::HashSet;

use bevy::prelude::*;
use bevy_waypoint_graph_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Build the graph once before benchmarking
fn prepare_graph(half: f32) -> NavGraph {
	let mut world = PlaneWorld::new(0.0);
	world.add_box(Vec3::new(-half, 0.0, -half), Vec3::new(half, 4.0, -half + 1.0));
	world.add_box(Vec3::new(-half, 0.0, half - 1.0), Vec3::new(half, 4.0, half));
	world.add_box(Vec3::new(-half, 0.0, -half), Vec3::new(-half + 1.0, 4.0, half));
	world.add_box(Vec3::new(half - 1.0, 0.0, -half), Vec3::new(half, 4.0, half));
	let settings = NavSettings::default();
	let mut graph = GraphGenerator::new(&world, &settings).generate(&[Vec3::ZERO]);
	GraphPruner::new(&world, &settings).prune(&mut graph);
	graph
}

/// Route corner to corner
fn calc(graph: &NavGraph, half: f32, noise_seed: u32) {
	let start = Vec3::new(-half + 3.0, 0.0, -half + 3.0);
	let end = Vec3::new(half - 3.0, 0.0, half - 3.0);
	let _ = graph.find_path(start, end, &HashSet::new(), noise_seed);
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(100);
	let half = 40.0;
	let graph = prepare_graph(half);
	group.bench_function("calc_path", |b| {
		b.iter(|| calc(black_box(&graph), black_box(half), black_box(0)))
	});
	group.bench_function("calc_path_noisy", |b| {
		b.iter(|| calc(black_box(&graph), black_box(half), black_box(7)))
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
