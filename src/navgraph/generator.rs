//! Builds the node set by flood filling outward from seed positions over a
//! regular planar grid. Every candidate must prove valid footing (a ground
//! hit with a standable normal) and an unobstructed approach from the node
//! proposing it before it is accepted
//!

use std::collections::{HashSet, VecDeque};

use crate::prelude::*;
use bevy::prelude::*;

/// The 8 planar expansion directions, 4 cardinal then 4 diagonal
const EXPANSION_DIRECTIONS: [(f32, f32); 8] = [
	(1.0, 0.0),
	(-1.0, 0.0),
	(0.0, 1.0),
	(0.0, -1.0),
	(1.0, 1.0),
	(1.0, -1.0),
	(-1.0, 1.0),
	(-1.0, -1.0),
];

/// Generates a [NavGraph] from seed positions by breadth-first flood fill,
/// validating every candidate and edge against a [StaticWorld]
pub struct GraphGenerator<'a> {
	/// Collision queries over static level geometry
	world: &'a dyn StaticWorld,
	/// Tuning values for sampling and validation
	settings: &'a NavSettings,
}

impl<'a> GraphGenerator<'a> {
	/// Create a new instance of [GraphGenerator] over a collision world
	pub fn new(world: &'a dyn StaticWorld, settings: &'a NavSettings) -> Self {
		GraphGenerator { world, settings }
	}
	/// Flood fill from the seed positions (typically spawn points) and
	/// return the resulting graph with its edges built and spatial index
	/// ready. With no seeds supplied the fill starts from the origin. An
	/// empty result means the level offers no walkable geometry
	pub fn generate(&self, seeds: &[Vec3]) -> NavGraph {
		let mut graph = NavGraph::new(self.settings.get_cell_scale());
		let mut visited: HashSet<IVec3> = HashSet::new();
		let mut queue: VecDeque<Vec3> = VecDeque::new();
		// no seeds means the origin is the only starting point available
		let fallback = [Vec3::ZERO];
		let seeds = if seeds.is_empty() { &fallback } else { seeds };
		for seed in seeds.iter() {
			let snapped = self.snap_to_grid(*seed);
			if let Some(ground) = self.find_footing(snapped) {
				if visited.insert(quantize(ground)) {
					queue.push_back(ground);
				}
			}
		}
		let cap = self.settings.get_max_fill_iterations();
		let mut iterations = 0;
		while let Some(position) = queue.pop_front() {
			iterations += 1;
			if iterations > cap {
				warn!(
					"Navigation flood fill hit its iteration cap of {}, the graph is partial",
					cap
				);
				break;
			}
			graph.add_node(position);
			for (dx, dz) in EXPANSION_DIRECTIONS.iter() {
				let step = self.settings.get_grid_step();
				let candidate = self.snap_to_grid(Vec3::new(
					position.x + dx * step,
					position.y,
					position.z + dz * step,
				));
				let Some(ground) = self.find_footing(candidate) else {
					continue;
				};
				if visited.contains(&quantize(ground)) {
					continue;
				}
				// reject candidates walled off from the proposing node
				let lift = Vec3::Y * self.settings.get_segment_clearance();
				if self.world.segment_blocked(position + lift, ground + lift) {
					continue;
				}
				visited.insert(quantize(ground));
				queue.push_back(ground);
			}
		}
		graph.rebuild_spatial();
		self.build_edges(&mut graph);
		info!(
			"Generated navigation graph with {} nodes from {} seed(s)",
			graph.node_count(),
			seeds.len()
		);
		graph
	}
	/// Snap the horizontal axes of a position to the sampling grid
	fn snap_to_grid(&self, position: Vec3) -> Vec3 {
		let step = self.settings.get_grid_step();
		Vec3::new(
			(position.x / step).round() * step,
			position.y,
			(position.z / step).round() * step,
		)
	}
	/// Probe downward over a candidate and return the ground-snapped point
	/// when the candidate has standable footing. Rejects pits (no ground
	/// within the search range) and steep slopes (insufficiently upward
	/// normals)
	fn find_footing(&self, candidate: Vec3) -> Option<Vec3> {
		let origin = candidate + Vec3::Y * self.settings.get_ground_search_up();
		let max_drop = self.settings.get_ground_search_up() + self.settings.get_ground_search_down();
		let hit = self.world.ground_hit(origin, max_drop)?;
		if hit.normal.y < self.settings.get_min_ground_normal_y() {
			return None;
		}
		Some(hit.point)
	}
	/// Link every pair of nodes within the connection radius whose elevated
	/// connecting segment is clear. The spatial index bounds the candidate
	/// neighbourhood of each node
	pub(crate) fn build_edges(&self, graph: &mut NavGraph) {
		let lift = Vec3::Y * self.settings.get_segment_clearance();
		let radius = self.settings.get_connection_radius();
		for index in 0..graph.node_count() {
			let id = NodeId::new(index);
			let position = graph.nodes()[index].position();
			let near = graph.spatial().within(position, radius);
			for other in near {
				// each unordered pair is tested once
				if other.index() <= index {
					continue;
				}
				let other_position = graph.nodes()[other.index()].position();
				if !self
					.world
					.segment_blocked(position + lift, other_position + lift)
				{
					graph.link(id, other);
				}
			}
		}
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	/// A 12 x 12 walled room centred on the origin, walls well above the
	/// ground probe start height so the fill cannot hop onto them
	fn walled_room() -> PlaneWorld {
		let mut world = PlaneWorld::new(0.0);
		world.add_box(Vec3::new(-7.0, 0.0, -7.0), Vec3::new(7.0, 4.0, -6.0));
		world.add_box(Vec3::new(-7.0, 0.0, 6.0), Vec3::new(7.0, 4.0, 7.0));
		world.add_box(Vec3::new(-7.0, 0.0, -7.0), Vec3::new(-6.0, 4.0, 7.0));
		world.add_box(Vec3::new(6.0, 0.0, -7.0), Vec3::new(7.0, 4.0, 7.0));
		world
	}
	#[test]
	fn fill_stays_inside_walls() {
		let world = walled_room();
		let settings = NavSettings::default();
		let generator = GraphGenerator::new(&world, &settings);
		let graph = generator.generate(&[Vec3::ZERO]);
		assert!(!graph.is_empty());
		for node in graph.nodes() {
			let p = node.position();
			assert!(p.x.abs() < 6.0, "node escaped the room at {}", p);
			assert!(p.z.abs() < 6.0, "node escaped the room at {}", p);
		}
	}
	#[test]
	fn adjacency_is_symmetric() {
		let world = walled_room();
		let settings = NavSettings::default();
		let generator = GraphGenerator::new(&world, &settings);
		let graph = generator.generate(&[Vec3::ZERO]);
		for (index, node) in graph.nodes().iter().enumerate() {
			for neighbour in node.neighbours() {
				let back = graph.get(*neighbour).unwrap().neighbours();
				assert!(back.contains(&NodeId::new(index)));
			}
		}
	}
	#[test]
	fn nodes_are_ground_snapped() {
		let world = walled_room();
		let settings = NavSettings::default();
		let generator = GraphGenerator::new(&world, &settings);
		// seed floating above the floor still lands on it
		let graph = generator.generate(&[Vec3::new(0.0, 1.5, 0.0)]);
		for node in graph.nodes() {
			assert!(node.position().y.abs() < 1e-4);
		}
	}
	#[test]
	fn iteration_cap_yields_partial_graph() {
		// unbounded plane, the cap is the only stop condition
		let world = PlaneWorld::new(0.0);
		let settings = NavSettings::default().with_max_fill_iterations(25);
		let generator = GraphGenerator::new(&world, &settings);
		let graph = generator.generate(&[Vec3::ZERO]);
		assert!(!graph.is_empty());
		assert!(graph.node_count() <= 25);
	}
	#[test]
	fn void_seed_generates_empty_graph() {
		// ground is far below the search range everywhere
		let world = PlaneWorld::new(-100.0);
		let settings = NavSettings::default();
		let generator = GraphGenerator::new(&world, &settings);
		let graph = generator.generate(&[Vec3::ZERO]);
		assert!(graph.is_empty());
	}
	#[test]
	fn no_seeds_falls_back_to_origin() {
		let world = walled_room();
		let settings = NavSettings::default();
		let generator = GraphGenerator::new(&world, &settings);
		let graph = generator.generate(&[]);
		assert!(!graph.is_empty());
	}
	#[test]
	fn blocked_pair_never_links() {
		// two nodes a unit apart with a full height wall between them
		let mut world = PlaneWorld::new(0.0);
		world.add_box(Vec3::new(0.45, 0.0, -2.0), Vec3::new(0.55, 3.0, 2.0));
		let settings = NavSettings::default();
		let generator = GraphGenerator::new(&world, &settings);
		let mut graph = NavGraph::default();
		let a = graph.add_node(Vec3::new(0.0, 0.0, 0.0));
		let b = graph.add_node(Vec3::new(1.0, 0.0, 0.0));
		graph.rebuild_spatial();
		generator.build_edges(&mut graph);
		assert_eq!(0, graph.degree(a));
		assert_eq!(0, graph.degree(b));
	}
	#[test]
	fn clear_pair_links() {
		let world = PlaneWorld::new(0.0);
		let settings = NavSettings::default();
		let generator = GraphGenerator::new(&world, &settings);
		let mut graph = NavGraph::default();
		let a = graph.add_node(Vec3::new(0.0, 0.0, 0.0));
		let b = graph.add_node(Vec3::new(1.0, 0.0, 0.0));
		graph.rebuild_spatial();
		generator.build_edges(&mut graph);
		assert_eq!(vec![b], graph.get(a).unwrap().neighbours().to_vec());
	}
	#[test]
	fn pair_outside_radius_never_links() {
		let world = PlaneWorld::new(0.0);
		let settings = NavSettings::default();
		let generator = GraphGenerator::new(&world, &settings);
		let mut graph = NavGraph::default();
		let a = graph.add_node(Vec3::new(0.0, 0.0, 0.0));
		let _b = graph.add_node(Vec3::new(5.0, 0.0, 0.0));
		graph.rebuild_spatial();
		generator.build_edges(&mut graph);
		assert_eq!(0, graph.degree(a));
	}
}
