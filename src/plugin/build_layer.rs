//! Logic relating to building and loading a [NavGraph], the level-load time
//! writers of the graph. Both block until complete, the graph is immutable
//! between these events
//!

use crate::prelude::*;
use bevy::prelude::*;

/// A request to generate the navigation graph of the current level from
/// scratch, discarding whatever graph the level entity holds
#[derive(Event)]
pub struct EventBuildGraph {
	/// Flood fill starting points, typically spawn locations. Empty means
	/// fall back to the origin
	seeds: Vec<Vec3>,
}

impl EventBuildGraph {
	/// Create a new instance of [EventBuildGraph]
	pub fn new(seeds: Vec<Vec3>) -> Self {
		EventBuildGraph { seeds }
	}
	/// Flood fill starting points
	pub fn get_seeds(&self) -> &[Vec3] {
		&self.seeds
	}
}

/// A request to restore a previously serialized navigation graph. A graph
/// that fails to parse is discarded whole and generation runs from the
/// fallback seeds instead
#[derive(Event)]
pub struct EventLoadGraph {
	/// Serialized graph text
	data: String,
	/// Seeds for the generation fallback on a failed load
	fallback_seeds: Vec<Vec3>,
}

impl EventLoadGraph {
	/// Create a new instance of [EventLoadGraph]
	pub fn new(data: String, fallback_seeds: Vec<Vec3>) -> Self {
		EventLoadGraph {
			data,
			fallback_seeds,
		}
	}
	/// Serialized graph text
	pub fn get_data(&self) -> &str {
		&self.data
	}
	/// Seeds for the generation fallback
	pub fn get_fallback_seeds(&self) -> &[Vec3] {
		&self.fallback_seeds
	}
}

/// Process [EventBuildGraph] by flood filling and pruning a fresh graph for
/// every level entity
#[cfg(not(tarpaulin_include))]
pub fn build_graph(
	mut events: EventReader<EventBuildGraph>,
	world: Res<StaticWorldHandle>,
	mut graph_q: Query<(&mut NavGraph, &NavSettings)>,
) {
	for event in events.read() {
		for (mut graph, settings) in graph_q.iter_mut() {
			let mut built = GraphGenerator::new(world.get(), settings).generate(event.get_seeds());
			GraphPruner::new(world.get(), settings).prune(&mut built);
			*graph = built;
		}
	}
}

/// Process [EventLoadGraph] by restoring a serialized graph, pruning it
/// against the current level geometry and falling back to generation when
/// the data is corrupt
#[cfg(not(tarpaulin_include))]
pub fn load_graph(
	mut events: EventReader<EventLoadGraph>,
	world: Res<StaticWorldHandle>,
	mut graph_q: Query<(&mut NavGraph, &NavSettings)>,
) {
	for event in events.read() {
		for (mut graph, settings) in graph_q.iter_mut() {
			let mut restored = match NavGraph::from_text(event.get_data()) {
				Ok(restored) => {
					info!("Loaded navigation graph with {} nodes", restored.node_count());
					restored
				}
				Err(e) => {
					error!(
						"Discarding saved navigation graph ({}), regenerating instead",
						e
					);
					GraphGenerator::new(world.get(), settings)
						.generate(event.get_fallback_seeds())
				}
			};
			GraphPruner::new(world.get(), settings).prune(&mut restored);
			*graph = restored;
		}
	}
}
