//! Tuning constants and small helpers shared by graph generation, pruning
//! and pathfinding
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Planar distance between neighbouring candidate positions during flood
/// fill, also the snapping resolution of the horizontal axes
pub const GRID_STEP: f32 = 1.5;
/// Maximum distance between two nodes for an edge to be considered. Slightly
/// larger than the diagonal step (`GRID_STEP * sqrt(2)`) so diagonal
/// neighbours link up
pub const CONNECTION_RADIUS: f32 = 2.2;
/// Upper bound on flood fill expansion, a guard against runaway growth over
/// pathological geometry. Hitting it yields a partial graph, not an error
pub const MAX_FILL_ITERATIONS: usize = 20_000;
/// Height above a candidate position from which the downward ground probe
/// starts
pub const GROUND_SEARCH_UP: f32 = 2.0;
/// How far below the probe origin the ground may be before a candidate is
/// treated as hanging over a pit or void
pub const GROUND_SEARCH_DOWN: f32 = 4.0;
/// Minimum `y` of a ground hit normal for the surface to count as standable,
/// anything lower is a steep slope
pub const MIN_GROUND_NORMAL_Y: f32 = 0.7;
/// Vertical lift applied to both ends of a node-to-node obstruction query so
/// the segment clears ground clutter
pub const SEGMENT_CLEARANCE: f32 = 0.3;
/// Length of the 4 cardinal probes used by corner-trap detection
pub const TRAP_PROBE_DISTANCE: f32 = 1.5;
/// Height above a node from which trap probes are cast
pub const TRAP_PROBE_HEIGHT: f32 = 0.5;
/// A trap probe only counts as blocked when the struck surface is close to
/// vertical, `|normal.y|` at or above this is floor or ceiling clutter
pub const WALL_NORMAL_Y_MAX: f32 = 0.35;
/// Number of blocked trap probes (out of 4) that condemns a node
pub const TRAP_BLOCKED_MIN: usize = 3;
/// Disconnected components smaller than this are discarded during island
/// pruning, larger secondary components are kept as distinct playable areas
pub const MIN_ISLAND_SIZE: usize = 5;
/// Scale factor applied to positions before flooring into spatial grid cell
/// keys. `0.25` buckets nodes into 4 unit cells
pub const SPATIAL_CELL_SCALE: f32 = 0.25;
/// Strength of per-agent edge cost perturbation, an edge costs up to
/// `1 + NOISE_WEIGHT` times its true length for a noisy agent
pub const NOISE_WEIGHT: f32 = 0.8;

/// Quantize a position to integer tenths for visited-set deduplication
/// during flood fill. Two candidates within 0.05 of each other on every axis
/// collapse to the same key
pub fn quantize(position: Vec3) -> IVec3 {
	(position * 10.0).round().as_ivec3()
}

/// Deterministic pseudo-random value in `[0, 1)` for an edge and an agent
/// seed. The node pair is ordered before mixing so both traversal directions
/// of an edge yield the same value
pub fn edge_noise(a: NodeId, b: NodeId, seed: u32) -> f32 {
	let (lo, hi) = if a.index() <= b.index() {
		(a.index() as u64, b.index() as u64)
	} else {
		(b.index() as u64, a.index() as u64)
	};
	// splitmix64 style finaliser over the combined ids and seed
	let mut x = lo
		.wrapping_mul(0x9E37_79B9_7F4A_7C15)
		.wrapping_add(hi.wrapping_mul(0xBF58_476D_1CE4_E5B9))
		.wrapping_add((seed as u64).wrapping_mul(0x94D0_49BB_1331_11EB));
	x ^= x >> 30;
	x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
	x ^= x >> 27;
	x = x.wrapping_mul(0x94D0_49BB_1331_11EB);
	x ^= x >> 31;
	// take the top 24 bits for a clean f32 mantissa fit
	(x >> 40) as f32 / (1u32 << 24) as f32
}
