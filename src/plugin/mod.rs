//! Defines the Bevy [Plugin] wiring graph building, loading and path
//! queries into an app schedule
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod build_layer;
pub mod path_layer;

/// Graph mutation always settles before any path query reads it
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum OrderingSet {
	/// Generation and loading, the only writers of [NavGraph]
	Build,
	/// Path query answering, read-only over [NavGraph]
	Search,
}

/// Event and system registration for waypoint graph navigation. Apps must
/// also insert a [StaticWorldHandle] resource wrapping their collision
/// queries before sending any build event
pub struct WaypointGraphPlugin;

impl Plugin for WaypointGraphPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.register_type::<NodeId>()
			.register_type::<NavSettings>()
			.add_event::<build_layer::EventBuildGraph>()
			.add_event::<build_layer::EventLoadGraph>()
			.add_event::<path_layer::EventPathRequest>()
			.add_event::<path_layer::EventPathComputed>()
			.configure_sets(Update, (OrderingSet::Build, OrderingSet::Search).chain())
			.add_systems(
				Update,
				(
					(build_layer::build_graph, build_layer::load_graph)
						.chain()
						.in_set(OrderingSet::Build),
					path_layer::process_path_requests.in_set(OrderingSet::Search),
				),
			);
	}
}
