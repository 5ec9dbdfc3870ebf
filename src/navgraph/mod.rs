//! The waypoint navigation graph: arbitrary static level geometry is
//! sampled into a set of ground-validated nodes joined by raycast-validated
//! edges, which agents then path over
//!
//! Data flows through the modules in a fixed order. The [generator] (or the
//! [persistence] codec, on load) populates the node set, the embedded
//! [spatial] index is rebuilt, the [pruner] removes topological defects that
//! would strand agents (dead ends, corner traps, unreachable islands) and
//! the [pathfind] search answers per-agent route queries over the result.
//! Once built for a level the graph is treated as immutable, agents only
//! ever read from it
//!
//! Definitions:
//!
//! * Node - a single accepted, ground-snapped waypoint
//! * Edge - exists between two nodes iff they lie within the connection
//!   radius and an elevated segment between them is unobstructed; undirected,
//!   stored once in each endpoint's adjacency, weighted by Euclidean distance
//! * Dead end - a node with at most one neighbour, unable to offer onward
//!   routing
//! * Corner trap - a node nearly enclosed by near-vertical geometry, likely
//!   to wedge an agent
//! * Island - a connected component disconnected from the main playable area
//!

pub mod collision;
pub mod generator;
pub mod pathfind;
pub mod persistence;
pub mod pruner;
pub mod spatial;
pub mod utilities;

use crate::prelude::*;
use bevy::prelude::*;

/// Dense zero-based identifier of a node, unique within a build of the
/// graph. Ids are reassigned after any pruning pass so they stay contiguous
/// in `[0, N)`, they are indices into the graph's node table
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct NodeId(usize);

impl NodeId {
	/// Create a new instance of [NodeId]
	pub fn new(index: usize) -> Self {
		NodeId(index)
	}
	/// Position of this id in the node table
	pub fn index(&self) -> usize {
		self.0
	}
}

/// A single waypoint of the graph
#[derive(Clone, Debug)]
pub struct NavNode {
	/// Ground-snapped location of the waypoint
	position: Vec3,
	/// Ids of nodes sharing an edge with this one. Undirected, the other
	/// endpoint lists this node in turn
	neighbours: Vec<NodeId>,
}

impl NavNode {
	/// Location of the waypoint
	pub fn position(&self) -> Vec3 {
		self.position
	}
	/// Ids of nodes sharing an edge with this one
	pub fn neighbours(&self) -> &[NodeId] {
		&self.neighbours
	}
}

/// The navigation graph of a level: a flat node table with index-based
/// adjacency plus a spatial index over node positions. Mutated only during
/// generation, pruning and loading, read-only during gameplay
#[derive(Component, Clone, Default)]
pub struct NavGraph {
	/// Node table, a [NodeId] indexes directly into it
	nodes: Vec<NavNode>,
	/// Proximity index over node positions, rebuilt on any topology change
	spatial: SpatialGrid,
}

impl NavGraph {
	/// Create an empty graph whose spatial index uses the given cell scale
	pub fn new(cell_scale: f32) -> Self {
		NavGraph {
			nodes: Vec::new(),
			spatial: SpatialGrid::new(cell_scale),
		}
	}
	/// Number of nodes
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}
	/// Whether the graph holds no nodes, a valid steady state meaning "no
	/// navigation available"
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
	/// All nodes in id order
	pub fn nodes(&self) -> &[NavNode] {
		&self.nodes
	}
	/// Look up a node, [None] for an out of range id
	pub fn get(&self, id: NodeId) -> Option<&NavNode> {
		self.nodes.get(id.index())
	}
	/// The proximity index over node positions
	pub fn spatial(&self) -> &SpatialGrid {
		&self.spatial
	}
	/// Nearest node to a position, [None] on an empty graph
	pub fn closest_node(&self, position: Vec3) -> Option<NodeId> {
		self.spatial.nearest(position)
	}
	/// Number of neighbours of a node
	pub fn degree(&self, id: NodeId) -> usize {
		self.nodes[id.index()].neighbours.len()
	}
	/// Append a node with no edges, returning its id assigned in discovery
	/// order. The spatial index is stale until [NavGraph::rebuild_spatial]
	pub fn add_node(&mut self, position: Vec3) -> NodeId {
		let id = NodeId::new(self.nodes.len());
		self.nodes.push(NavNode {
			position,
			neighbours: Vec::new(),
		});
		id
	}
	/// Create the undirected edge `a <-> b`. Self-edges and duplicates are
	/// ignored so symmetry holds after every call
	pub fn link(&mut self, a: NodeId, b: NodeId) {
		if a == b {
			return;
		}
		if !self.nodes[a.index()].neighbours.contains(&b) {
			self.nodes[a.index()].neighbours.push(b);
		}
		if !self.nodes[b.index()].neighbours.contains(&a) {
			self.nodes[b.index()].neighbours.push(a);
		}
	}
	/// Remove the undirected edge `a <-> b` from both adjacency lists
	pub fn unlink(&mut self, a: NodeId, b: NodeId) {
		self.nodes[a.index()].neighbours.retain(|n| *n != b);
		self.nodes[b.index()].neighbours.retain(|n| *n != a);
	}
	/// Recompute the spatial index from the current node positions
	pub fn rebuild_spatial(&mut self) {
		let positions: Vec<Vec3> = self.nodes.iter().map(|n| n.position).collect();
		self.spatial.rebuild(&positions);
	}
	/// Remove a set of nodes in bulk. Survivors keep their relative order and
	/// are reassigned dense ids in `[0, N)`, edges touching removed nodes are
	/// dropped from both ends and the spatial index is rebuilt
	pub(crate) fn remove_nodes(&mut self, doomed: &std::collections::HashSet<NodeId>) {
		if doomed.is_empty() {
			return;
		}
		let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
		let mut survivors: Vec<NavNode> = Vec::with_capacity(self.nodes.len() - doomed.len());
		for (index, node) in self.nodes.iter().enumerate() {
			if !doomed.contains(&NodeId::new(index)) {
				remap[index] = Some(NodeId::new(survivors.len()));
				survivors.push(node.clone());
			}
		}
		for node in survivors.iter_mut() {
			node.neighbours = node
				.neighbours
				.iter()
				.filter_map(|n| remap[n.index()])
				.collect();
		}
		self.nodes = survivors;
		self.rebuild_spatial();
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;
	#[test]
	fn link_is_symmetric() {
		let mut graph = NavGraph::default();
		let a = graph.add_node(Vec3::ZERO);
		let b = graph.add_node(Vec3::X);
		graph.link(a, b);
		assert_eq!(vec![b], graph.get(a).unwrap().neighbours().to_vec());
		assert_eq!(vec![a], graph.get(b).unwrap().neighbours().to_vec());
	}
	#[test]
	fn link_ignores_self_edge() {
		let mut graph = NavGraph::default();
		let a = graph.add_node(Vec3::ZERO);
		graph.link(a, a);
		assert_eq!(0, graph.degree(a));
	}
	#[test]
	fn link_ignores_duplicate_edge() {
		let mut graph = NavGraph::default();
		let a = graph.add_node(Vec3::ZERO);
		let b = graph.add_node(Vec3::X);
		graph.link(a, b);
		graph.link(b, a);
		assert_eq!(1, graph.degree(a));
		assert_eq!(1, graph.degree(b));
	}
	#[test]
	fn unlink_clears_both_ends() {
		let mut graph = NavGraph::default();
		let a = graph.add_node(Vec3::ZERO);
		let b = graph.add_node(Vec3::X);
		graph.link(a, b);
		graph.unlink(a, b);
		assert_eq!(0, graph.degree(a));
		assert_eq!(0, graph.degree(b));
	}
	#[test]
	fn remove_nodes_keeps_ids_dense_and_remaps_edges() {
		// line of four nodes, drop the middle two
		let mut graph = NavGraph::default();
		let a = graph.add_node(Vec3::new(0.0, 0.0, 0.0));
		let b = graph.add_node(Vec3::new(1.0, 0.0, 0.0));
		let c = graph.add_node(Vec3::new(2.0, 0.0, 0.0));
		let d = graph.add_node(Vec3::new(3.0, 0.0, 0.0));
		graph.link(a, b);
		graph.link(b, c);
		graph.link(c, d);
		graph.link(a, d);
		let doomed: HashSet<NodeId> = [b, c].into_iter().collect();
		graph.remove_nodes(&doomed);
		assert_eq!(2, graph.node_count());
		let survivor_a = graph.get(NodeId::new(0)).unwrap();
		let survivor_d = graph.get(NodeId::new(1)).unwrap();
		assert_eq!(Vec3::new(0.0, 0.0, 0.0), survivor_a.position());
		assert_eq!(Vec3::new(3.0, 0.0, 0.0), survivor_d.position());
		// the a <-> d edge survives under the new ids
		assert_eq!(vec![NodeId::new(1)], survivor_a.neighbours().to_vec());
		assert_eq!(vec![NodeId::new(0)], survivor_d.neighbours().to_vec());
	}
	#[test]
	fn remove_nodes_rebuilds_spatial_index() {
		let mut graph = NavGraph::default();
		let a = graph.add_node(Vec3::ZERO);
		let _b = graph.add_node(Vec3::new(10.0, 0.0, 0.0));
		graph.rebuild_spatial();
		let doomed: HashSet<NodeId> = [a].into_iter().collect();
		graph.remove_nodes(&doomed);
		let result = graph.closest_node(Vec3::ZERO).unwrap();
		assert_eq!(NodeId::new(0), result);
	}
}
