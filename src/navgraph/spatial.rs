//! Buckets graph nodes into fixed-size 3D cells for cheap proximity
//! queries. The index is rebuilt whenever graph topology changes, it holds
//! no authority over the node set itself
//!

use std::collections::HashMap;

use crate::prelude::*;
use bevy::prelude::*;

/// Spatial hash over node positions. Cell keys are the floored, scaled
/// `x/y/z` of a position
#[derive(Clone)]
pub struct SpatialGrid {
	/// Scale factor applied to positions before flooring into a cell key
	cell_scale: f32,
	/// Node ids bucketed by cell
	cells: HashMap<IVec3, Vec<NodeId>>,
	/// Node positions indexed by node id, the linear nearest-node scan runs
	/// over this
	positions: Vec<Vec3>,
}

impl Default for SpatialGrid {
	fn default() -> Self {
		SpatialGrid::new(SPATIAL_CELL_SCALE)
	}
}

impl SpatialGrid {
	/// Create an empty grid with the given cell scale factor
	pub fn new(cell_scale: f32) -> Self {
		SpatialGrid {
			cell_scale,
			cells: HashMap::new(),
			positions: Vec::new(),
		}
	}
	/// Cell key of a position
	fn key(&self, position: Vec3) -> IVec3 {
		(position * self.cell_scale).floor().as_ivec3()
	}
	/// Discard and rebuild all buckets from the current node positions
	pub fn rebuild(&mut self, positions: &[Vec3]) {
		self.cells.clear();
		self.positions.clear();
		self.positions.extend_from_slice(positions);
		for (index, position) in positions.iter().enumerate() {
			self.cells
				.entry(self.key(*position))
				.or_default()
				.push(NodeId::new(index));
		}
	}
	/// Number of indexed nodes
	pub fn len(&self) -> usize {
		self.positions.len()
	}
	/// Whether the index is empty
	pub fn is_empty(&self) -> bool {
		self.positions.is_empty()
	}
	/// Nearest node to a position, [None] on an empty graph. Resolved by a
	/// linear scan over all nodes, ties broken purely by minimum squared
	/// distance, which keeps results identical to any cell-bounded variant
	pub fn nearest(&self, position: Vec3) -> Option<NodeId> {
		let mut best: Option<(NodeId, f32)> = None;
		for (index, node_position) in self.positions.iter().enumerate() {
			let dsq = node_position.distance_squared(position);
			if best.is_none_or(|(_, b)| dsq < b) {
				best = Some((NodeId::new(index), dsq));
			}
		}
		best.map(|(id, _)| id)
	}
	/// All nodes within `radius` of a position, gathered from the cell
	/// neighbourhood covering the query sphere
	pub fn within(&self, position: Vec3, radius: f32) -> Vec<NodeId> {
		let min = self.key(position - Vec3::splat(radius));
		let max = self.key(position + Vec3::splat(radius));
		let radius_sq = radius * radius;
		let mut found = Vec::new();
		for x in min.x..=max.x {
			for y in min.y..=max.y {
				for z in min.z..=max.z {
					let Some(bucket) = self.cells.get(&IVec3::new(x, y, z)) else {
						continue;
					};
					for id in bucket.iter() {
						let dsq = self.positions[id.index()].distance_squared(position);
						if dsq <= radius_sq {
							found.push(*id);
						}
					}
				}
			}
		}
		found
	}
}
