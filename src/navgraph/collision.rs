//! The collision query port. Graph generation and pruning never simulate
//! physics themselves, they only ask two questions of the static world:
//! does a straight segment between two points hit anything, and where is the
//! ground below a point. Implement [StaticWorld] over your physics engine of
//! choice and hand it to the plugin through a [StaticWorldHandle]
//!

use std::sync::Arc;

use bevy::prelude::*;

/// The nearest intersection of a query with static world geometry
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
	/// Point of intersection
	pub point: Vec3,
	/// Unit surface normal at the intersection
	pub normal: Vec3,
}

/// Synchronous collision queries against static level geometry. Dynamic
/// actors must not occlude these queries or candidate edges will spuriously
/// fail validation
pub trait StaticWorld {
	/// Find the nearest intersection of the segment `from -> to` with static
	/// geometry, [None] when the segment is clear
	fn segment_hit(&self, from: Vec3, to: Vec3) -> Option<SurfaceHit>;
	/// Whether anything obstructs the segment `from -> to`
	fn segment_blocked(&self, from: Vec3, to: Vec3) -> bool {
		self.segment_hit(from, to).is_some()
	}
	/// Cast straight down from `origin` and return the nearest ground hit
	/// within `max_drop`, [None] over a pit or void
	fn ground_hit(&self, origin: Vec3, max_drop: f32) -> Option<SurfaceHit> {
		self.segment_hit(origin, origin - Vec3::Y * max_drop)
	}
}

/// Shares a [StaticWorld] implementation with the plugin systems
#[derive(Resource, Clone)]
pub struct StaticWorldHandle(Arc<dyn StaticWorld + Send + Sync>);

impl StaticWorldHandle {
	/// Wrap a collision implementation for use as a resource
	pub fn new(world: impl StaticWorld + Send + Sync + 'static) -> Self {
		StaticWorldHandle(Arc::new(world))
	}
	/// Access the wrapped collision queries
	pub fn get(&self) -> &(dyn StaticWorld + Send + Sync) {
		&*self.0
	}
}

/// A minimal [StaticWorld] over an infinite horizontal ground plane plus
/// axis-aligned box obstacles. Useful for tests, benches and as a reference
/// for integrators wiring in a real physics engine
#[derive(Default, Clone)]
pub struct PlaneWorld {
	/// Height of the ground plane
	ground_height: f32,
	/// Solid axis-aligned boxes as `(min, max)` corners
	boxes: Vec<(Vec3, Vec3)>,
}

impl PlaneWorld {
	/// Create a world whose ground plane sits at `ground_height`
	pub fn new(ground_height: f32) -> Self {
		PlaneWorld {
			ground_height,
			boxes: Vec::new(),
		}
	}
	/// Add a solid axis-aligned box spanning `min` to `max`
	pub fn add_box(&mut self, min: Vec3, max: Vec3) {
		self.boxes.push((min.min(max), min.max(max)));
	}
	/// Slab test for a segment against one box, returning the entry fraction
	/// along the segment and the normal of the face crossed
	fn segment_vs_box(from: Vec3, to: Vec3, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
		let dir = to - from;
		let mut t_enter = 0.0_f32;
		let mut t_exit = 1.0_f32;
		let mut normal = Vec3::ZERO;
		for axis in 0..3 {
			let d = dir[axis];
			if d.abs() < f32::EPSILON {
				if from[axis] < min[axis] || from[axis] > max[axis] {
					return None;
				}
				continue;
			}
			let mut t0 = (min[axis] - from[axis]) / d;
			let mut t1 = (max[axis] - from[axis]) / d;
			if t0 > t1 {
				std::mem::swap(&mut t0, &mut t1);
			}
			if t0 > t_enter {
				t_enter = t0;
				let mut face = Vec3::ZERO;
				face[axis] = -d.signum();
				normal = face;
			}
			t_exit = t_exit.min(t1);
			if t_enter > t_exit {
				return None;
			}
		}
		// a segment starting inside the box counts as an immediate hit
		if normal == Vec3::ZERO {
			normal = Vec3::Y;
		}
		Some((t_enter, normal))
	}
}

impl StaticWorld for PlaneWorld {
	fn segment_hit(&self, from: Vec3, to: Vec3) -> Option<SurfaceHit> {
		let mut best: Option<(f32, Vec3)> = None;
		for (min, max) in self.boxes.iter() {
			if let Some((t, normal)) = Self::segment_vs_box(from, to, *min, *max) {
				if best.is_none_or(|(bt, _)| t < bt) {
					best = Some((t, normal));
				}
			}
		}
		// the ground plane only obstructs segments that cross it from above
		let dir = to - from;
		if from.y > self.ground_height && to.y < self.ground_height {
			let t = (self.ground_height - from.y) / dir.y;
			if best.is_none_or(|(bt, _)| t < bt) {
				best = Some((t, Vec3::Y));
			}
		}
		best.map(|(t, normal)| SurfaceHit {
			point: from + dir * t,
			normal,
		})
	}
}
