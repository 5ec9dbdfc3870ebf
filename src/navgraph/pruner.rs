//! Post-processes a generated or loaded graph against topological defects
//! that strand agents: dead ends with no onward routing, corner traps that
//! wedge agents against geometry and small disconnected islands
//!

use std::collections::{HashSet, VecDeque};

use crate::prelude::*;
use bevy::prelude::*;

/// The 4 cardinal trap probe directions
const PROBE_DIRECTIONS: [Vec3; 4] = [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z];

/// Repairs a [NavGraph] in place. Passes run in a fixed order, each assumes
/// the graph produced by the previous one
pub struct GraphPruner<'a> {
	/// Collision queries over static level geometry, used by trap detection
	world: &'a dyn StaticWorld,
	/// Tuning values for probes and island thresholds
	settings: &'a NavSettings,
}

impl<'a> GraphPruner<'a> {
	/// Create a new instance of [GraphPruner] over a collision world
	pub fn new(world: &'a dyn StaticWorld, settings: &'a NavSettings) -> Self {
		GraphPruner { world, settings }
	}
	/// Run all pruning passes. Never fails, a graph legitimately reduced to
	/// zero nodes means the level has no viable walkable geometry and
	/// callers treat it as "no navigation available"
	pub fn prune(&self, graph: &mut NavGraph) {
		let before = graph.node_count();
		self.remove_dead_ends(graph);
		self.remove_corner_traps(graph);
		// trap removal can expose fresh dead ends one hop upstream, sweep
		// again so the minimum degree invariant holds for what islands see
		self.remove_dead_ends(graph);
		self.prune_islands(graph);
		info!(
			"Pruned navigation graph from {} to {} nodes",
			before,
			graph.node_count()
		);
	}
	/// Remove nodes with at most one neighbour, sweeping repeatedly until a
	/// full sweep removes nothing since each removal can expose a new dead
	/// end one hop upstream
	fn remove_dead_ends(&self, graph: &mut NavGraph) {
		loop {
			let doomed: HashSet<NodeId> = (0..graph.node_count())
				.map(NodeId::new)
				.filter(|id| graph.degree(*id) <= 1)
				.collect();
			if doomed.is_empty() {
				break;
			}
			graph.remove_nodes(&doomed);
		}
	}
	/// Remove nodes nearly enclosed by walls. 4 short cardinal probes are
	/// cast from slightly above each node and a probe counts as blocked when
	/// it strikes a near-vertical surface, 3 or more blocked condemns the
	/// node. The probe count, length and thresholds are tuned empirically,
	/// changing them changes generated graph shape
	fn remove_corner_traps(&self, graph: &mut NavGraph) {
		let mut doomed: HashSet<NodeId> = HashSet::new();
		for (index, node) in graph.nodes().iter().enumerate() {
			let origin = node.position() + Vec3::Y * self.settings.get_trap_probe_height();
			let blocked = PROBE_DIRECTIONS
				.iter()
				.filter(|direction| {
					let target = origin + **direction * self.settings.get_trap_probe_distance();
					match self.world.segment_hit(origin, target) {
						Some(hit) => hit.normal.y.abs() < self.settings.get_wall_normal_y_max(),
						None => false,
					}
				})
				.count();
			if blocked >= self.settings.get_trap_blocked_min() {
				doomed.insert(NodeId::new(index));
			}
		}
		graph.remove_nodes(&doomed);
	}
	/// Discard disconnected components below the minimum viable size. The
	/// largest component is kept unconditionally and larger secondary
	/// components are retained as distinct playable areas not yet bridged
	fn prune_islands(&self, graph: &mut NavGraph) {
		let components = connected_components(graph);
		if components.len() <= 1 {
			return;
		}
		let largest = components
			.iter()
			.enumerate()
			.max_by_key(|(_, c)| c.len())
			.map(|(index, _)| index)
			.unwrap_or(0);
		let mut doomed: HashSet<NodeId> = HashSet::new();
		for (index, component) in components.iter().enumerate() {
			if index != largest && component.len() < self.settings.get_min_island_size() {
				doomed.extend(component.iter().copied());
			}
		}
		graph.remove_nodes(&doomed);
	}
}

/// Connected components of the graph via breadth-first traversal over the
/// adjacency
pub fn connected_components(graph: &NavGraph) -> Vec<Vec<NodeId>> {
	let mut seen = vec![false; graph.node_count()];
	let mut components = Vec::new();
	for start in 0..graph.node_count() {
		if seen[start] {
			continue;
		}
		seen[start] = true;
		let mut component = Vec::new();
		let mut queue = VecDeque::from([NodeId::new(start)]);
		while let Some(id) = queue.pop_front() {
			component.push(id);
			for neighbour in graph.nodes()[id.index()].neighbours() {
				if !seen[neighbour.index()] {
					seen[neighbour.index()] = true;
					queue.push_back(*neighbour);
				}
			}
		}
		components.push(component);
	}
	components
}
