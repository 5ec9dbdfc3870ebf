//! Spawnable grouping of the navigation components an entity (typically one
//! per loaded level) carries
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Tuning values for graph generation, pruning and spatial indexing. The
/// defaults are the empirically settled values, the probe-based ones in
/// particular shape the generated graph and should be changed with care
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Component, Clone, Copy, Debug, PartialEq, Reflect)]
pub struct NavSettings {
	/// Planar sampling resolution of the flood fill
	grid_step: f32,
	/// Maximum node separation for an edge to be considered
	connection_radius: f32,
	/// Flood fill expansion bound, hitting it yields a partial graph
	max_fill_iterations: usize,
	/// Height above a candidate the ground probe starts from
	ground_search_up: f32,
	/// Depth below a candidate the ground probe may reach
	ground_search_down: f32,
	/// Minimum upward `y` of a standable ground normal
	min_ground_normal_y: f32,
	/// Lift applied to obstruction query endpoints to clear ground clutter
	segment_clearance: f32,
	/// Length of corner-trap probes
	trap_probe_distance: f32,
	/// Height above a node corner-trap probes are cast from
	trap_probe_height: f32,
	/// Upper bound on `|normal.y|` for a struck surface to count as a wall
	wall_normal_y_max: f32,
	/// Blocked probes (of 4) that condemn a node as a corner trap
	trap_blocked_min: usize,
	/// Smallest disconnected component worth keeping
	min_island_size: usize,
	/// Scale factor of the spatial index cells
	cell_scale: f32,
}

impl Default for NavSettings {
	fn default() -> Self {
		NavSettings {
			grid_step: GRID_STEP,
			connection_radius: CONNECTION_RADIUS,
			max_fill_iterations: MAX_FILL_ITERATIONS,
			ground_search_up: GROUND_SEARCH_UP,
			ground_search_down: GROUND_SEARCH_DOWN,
			min_ground_normal_y: MIN_GROUND_NORMAL_Y,
			segment_clearance: SEGMENT_CLEARANCE,
			trap_probe_distance: TRAP_PROBE_DISTANCE,
			trap_probe_height: TRAP_PROBE_HEIGHT,
			wall_normal_y_max: WALL_NORMAL_Y_MAX,
			trap_blocked_min: TRAP_BLOCKED_MIN,
			min_island_size: MIN_ISLAND_SIZE,
			cell_scale: SPATIAL_CELL_SCALE,
		}
	}
}

impl NavSettings {
	/// Create a new instance of [NavSettings] with the default tuning
	pub fn new() -> Self {
		NavSettings::default()
	}
	/// Override the planar sampling resolution
	pub fn with_grid_step(mut self, grid_step: f32) -> Self {
		self.grid_step = grid_step;
		self
	}
	/// Override the maximum node separation for edges
	pub fn with_connection_radius(mut self, connection_radius: f32) -> Self {
		self.connection_radius = connection_radius;
		self
	}
	/// Override the flood fill expansion bound
	pub fn with_max_fill_iterations(mut self, max_fill_iterations: usize) -> Self {
		self.max_fill_iterations = max_fill_iterations;
		self
	}
	/// Override the smallest disconnected component worth keeping
	pub fn with_min_island_size(mut self, min_island_size: usize) -> Self {
		self.min_island_size = min_island_size;
		self
	}
	/// Override the spatial index cell scale
	pub fn with_cell_scale(mut self, cell_scale: f32) -> Self {
		self.cell_scale = cell_scale;
		self
	}
	/// Planar sampling resolution of the flood fill
	pub fn get_grid_step(&self) -> f32 {
		self.grid_step
	}
	/// Maximum node separation for an edge to be considered
	pub fn get_connection_radius(&self) -> f32 {
		self.connection_radius
	}
	/// Flood fill expansion bound
	pub fn get_max_fill_iterations(&self) -> usize {
		self.max_fill_iterations
	}
	/// Height above a candidate the ground probe starts from
	pub fn get_ground_search_up(&self) -> f32 {
		self.ground_search_up
	}
	/// Depth below a candidate the ground probe may reach
	pub fn get_ground_search_down(&self) -> f32 {
		self.ground_search_down
	}
	/// Minimum upward `y` of a standable ground normal
	pub fn get_min_ground_normal_y(&self) -> f32 {
		self.min_ground_normal_y
	}
	/// Lift applied to obstruction query endpoints
	pub fn get_segment_clearance(&self) -> f32 {
		self.segment_clearance
	}
	/// Length of corner-trap probes
	pub fn get_trap_probe_distance(&self) -> f32 {
		self.trap_probe_distance
	}
	/// Height above a node corner-trap probes are cast from
	pub fn get_trap_probe_height(&self) -> f32 {
		self.trap_probe_height
	}
	/// Upper bound on `|normal.y|` for a struck surface to count as a wall
	pub fn get_wall_normal_y_max(&self) -> f32 {
		self.wall_normal_y_max
	}
	/// Blocked probes that condemn a node as a corner trap
	pub fn get_trap_blocked_min(&self) -> usize {
		self.trap_blocked_min
	}
	/// Smallest disconnected component worth keeping
	pub fn get_min_island_size(&self) -> usize {
		self.min_island_size
	}
	/// Scale factor of the spatial index cells
	pub fn get_cell_scale(&self) -> f32 {
		self.cell_scale
	}
	/// From a `ron` file generate the [NavSettings]
	#[cfg(feature = "ron")]
	pub fn from_ron(path: String) -> Self {
		let file = std::fs::File::open(path).expect("Failed opening NavSettings file");
		let settings: NavSettings = match ron::de::from_reader(file) {
			Ok(settings) => settings,
			Err(e) => panic!("Failed deserializing NavSettings: {}", e),
		};
		settings
	}
}

/// Everything a level entity needs for waypoint navigation
#[derive(Bundle, Default)]
pub struct WaypointGraphBundle {
	/// Tuning values the build systems read
	settings: NavSettings,
	/// The navigation graph, empty until built or loaded
	graph: NavGraph,
}

impl WaypointGraphBundle {
	/// Create a new instance of [WaypointGraphBundle] with an empty graph,
	/// to be populated later through a build or load event
	pub fn new(settings: NavSettings) -> Self {
		let graph = NavGraph::new(settings.get_cell_scale());
		WaypointGraphBundle { settings, graph }
	}
	/// Create a new instance of [WaypointGraphBundle] by generating and
	/// pruning a graph immediately, blocking until complete
	pub fn build(settings: NavSettings, world: &dyn StaticWorld, seeds: &[Vec3]) -> Self {
		let mut graph = GraphGenerator::new(world, &settings).generate(seeds);
		GraphPruner::new(world, &settings).prune(&mut graph);
		WaypointGraphBundle { settings, graph }
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn default_settings_carry_the_tuned_values() {
		let settings = NavSettings::default();
		assert_eq!(GRID_STEP, settings.get_grid_step());
		assert_eq!(TRAP_BLOCKED_MIN, settings.get_trap_blocked_min());
		assert_eq!(MIN_ISLAND_SIZE, settings.get_min_island_size());
	}
	#[test]
	fn builder_overrides_apply() {
		let settings = NavSettings::new()
			.with_grid_step(2.0)
			.with_min_island_size(9);
		assert_eq!(2.0, settings.get_grid_step());
		assert_eq!(9, settings.get_min_island_size());
		// untouched values keep their defaults
		assert_eq!(CONNECTION_RADIUS, settings.get_connection_radius());
	}
	#[test]
	fn built_bundle_holds_a_pruned_graph() {
		let mut world = PlaneWorld::new(0.0);
		world.add_box(Vec3::new(-10.0, 0.0, -10.0), Vec3::new(10.0, 4.0, -9.0));
		world.add_box(Vec3::new(-10.0, 0.0, 9.0), Vec3::new(10.0, 4.0, 10.0));
		world.add_box(Vec3::new(-10.0, 0.0, -10.0), Vec3::new(-9.0, 4.0, 10.0));
		world.add_box(Vec3::new(9.0, 0.0, -10.0), Vec3::new(10.0, 4.0, 10.0));
		let bundle = WaypointGraphBundle::build(NavSettings::default(), &world, &[Vec3::ZERO]);
		assert!(!bundle.graph.is_empty());
		for id in 0..bundle.graph.node_count() {
			assert!(bundle.graph.degree(NodeId::new(id)) >= 2);
		}
	}
}
