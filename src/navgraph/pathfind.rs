//! A* search over the node graph answering per-agent route queries. Agents
//! with distinct noise seeds see deterministically perturbed edge costs and
//! so prefer measurably different routes through shared terrain, avoiding
//! single-file convergence
//!

use std::collections::HashSet;

use crate::prelude::*;
use bevy::prelude::*;

/// Transient working state of a single search. Allocated per call and
/// indexed in parallel to the node table so nothing search-related ever
/// lives on the nodes themselves, which keeps concurrent read-only searches
/// over a shared graph sound
struct SearchScratch {
	/// Cost of the best known route from the start node
	g: Vec<f32>,
	/// Heuristic cost to the goal, Euclidean distance
	h: Vec<f32>,
	/// Sum of `g` and `h`, the open queue sorts ascending on this
	f: Vec<f32>,
	/// Back-pointer along the best known route
	parent: Vec<Option<NodeId>>,
	/// Whether a node has been expanded and needs no revisiting
	closed: Vec<bool>,
}

impl SearchScratch {
	/// Fresh state for a graph of `count` nodes, every `g` at infinity and
	/// no parents assigned
	fn new(count: usize) -> Self {
		SearchScratch {
			g: vec![f32::INFINITY; count],
			h: vec![0.0; count],
			f: vec![f32::INFINITY; count],
			parent: vec![None; count],
			closed: vec![false; count],
		}
	}
}

impl NavGraph {
	/// Shortest route from `start` to `end` as an ordered list of waypoints.
	///
	/// The search snaps both endpoints to their nearest nodes internally but
	/// the returned path begins at the literal `start` and terminates at the
	/// literal `end` so agents never visibly snap onto the grid. `excluded`
	/// node ids are skipped entirely, callers use this to route around a
	/// node an agent recently failed to traverse. A `noise_seed` above zero
	/// perturbs every edge cost by a deterministic per-seed multiplier.
	///
	/// An empty result means no route exists, a normal outcome whenever the
	/// endpoints lie in different connected components or the graph is empty
	pub fn find_path(
		&self,
		start: Vec3,
		end: Vec3,
		excluded: &HashSet<NodeId>,
		noise_seed: u32,
	) -> Vec<Vec3> {
		let Some(start_id) = self.closest_node(start) else {
			return Vec::new();
		};
		let Some(end_id) = self.closest_node(end) else {
			return Vec::new();
		};
		// both endpoints resolve to one node, no traversal required
		if start_id == end_id {
			return vec![end];
		}
		let goal_position = self.nodes()[end_id.index()].position();
		let mut scratch = SearchScratch::new(self.node_count());
		scratch.g[start_id.index()] = 0.0;
		scratch.h[start_id.index()] = self.nodes()[start_id.index()]
			.position()
			.distance(goal_position);
		scratch.f[start_id.index()] = scratch.h[start_id.index()];
		let mut open: Vec<NodeId> = vec![start_id];
		while !open.is_empty() {
			// keep the cheapest estimated route at the front each iteration
			open.sort_by(|a, b| scratch.f[a.index()].total_cmp(&scratch.f[b.index()]));
			let current = open.remove(0);
			if current == end_id {
				return self.assemble_path(&scratch, start, end, start_id, end_id);
			}
			scratch.closed[current.index()] = true;
			let current_position = self.nodes()[current.index()].position();
			for neighbour in self.nodes()[current.index()].neighbours() {
				if scratch.closed[neighbour.index()] || excluded.contains(neighbour) {
					continue;
				}
				let neighbour_position = self.nodes()[neighbour.index()].position();
				let mut cost = current_position.distance(neighbour_position);
				if noise_seed > 0 {
					cost *= 1.0 + edge_noise(current, *neighbour, noise_seed) * NOISE_WEIGHT;
				}
				let tentative = scratch.g[current.index()] + cost;
				if tentative < scratch.g[neighbour.index()] {
					scratch.g[neighbour.index()] = tentative;
					scratch.h[neighbour.index()] = neighbour_position.distance(goal_position);
					scratch.f[neighbour.index()] =
						tentative + scratch.h[neighbour.index()];
					scratch.parent[neighbour.index()] = Some(current);
					if !open.contains(neighbour) {
						open.push(*neighbour);
					}
				}
			}
		}
		// open set exhausted without reaching the goal node
		Vec::new()
	}
	/// Walk the parent chain back from the goal node and emit the waypoint
	/// list. The goal node's grid position is dropped in favour of the
	/// literal `end` so arrival never snaps visibly
	fn assemble_path(
		&self,
		scratch: &SearchScratch,
		start: Vec3,
		end: Vec3,
		start_id: NodeId,
		end_id: NodeId,
	) -> Vec<Vec3> {
		let mut chain = vec![end_id];
		let mut cursor = end_id;
		while cursor != start_id {
			let Some(previous) = scratch.parent[cursor.index()] else {
				break;
			};
			chain.push(previous);
			cursor = previous;
		}
		chain.reverse();
		let mut path = vec![start];
		for id in chain.iter().take(chain.len() - 1) {
			path.push(self.nodes()[id.index()].position());
		}
		path.push(end);
		path
	}
}
