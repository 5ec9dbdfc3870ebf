//! Logic relating to answering per-agent path queries over the built
//! [NavGraph]. Requests arrive as events, once per agent per repath
//! interval, and are answered within the same update
//!

use std::collections::HashSet;

use crate::prelude::*;
use bevy::prelude::*;

/// A request for a route from one position to another on behalf of an agent
#[derive(Event)]
pub struct EventPathRequest {
	/// The agent asking for the route
	agent: Entity,
	/// Where the route should begin, typically the agent's position
	start: Vec3,
	/// Where the route should end
	end: Vec3,
	/// Nodes the agent refuses to traverse, typically because it recently
	/// became stuck at one of them
	excluded: HashSet<NodeId>,
	/// Per-agent route diversification seed, zero disables perturbation
	noise_seed: u32,
}

impl EventPathRequest {
	/// Create a new instance of [EventPathRequest]
	pub fn new(
		agent: Entity,
		start: Vec3,
		end: Vec3,
		excluded: HashSet<NodeId>,
		noise_seed: u32,
	) -> Self {
		EventPathRequest {
			agent,
			start,
			end,
			excluded,
			noise_seed,
		}
	}
	/// The agent asking for the route
	pub fn get_agent(&self) -> Entity {
		self.agent
	}
	/// Where the route should begin
	pub fn get_start(&self) -> Vec3 {
		self.start
	}
	/// Where the route should end
	pub fn get_end(&self) -> Vec3 {
		self.end
	}
	/// Nodes the agent refuses to traverse
	pub fn get_excluded(&self) -> &HashSet<NodeId> {
		&self.excluded
	}
	/// Per-agent route diversification seed
	pub fn get_noise_seed(&self) -> u32 {
		self.noise_seed
	}
}

/// An answered route. An empty path means no route exists and the agent
/// should fall back to local movement
#[derive(Event)]
pub struct EventPathComputed {
	/// The agent the route belongs to
	agent: Entity,
	/// Ordered waypoints from the literal requested start to the literal
	/// requested end, or empty when no route exists
	path: Vec<Vec3>,
}

impl EventPathComputed {
	/// Create a new instance of [EventPathComputed]
	pub fn new(agent: Entity, path: Vec<Vec3>) -> Self {
		EventPathComputed { agent, path }
	}
	/// The agent the route belongs to
	pub fn get_agent(&self) -> Entity {
		self.agent
	}
	/// Ordered waypoints of the route
	pub fn get_path(&self) -> &[Vec3] {
		&self.path
	}
}

/// Process [EventPathRequest] into [EventPathComputed] against the level's
/// graph. Purely read-only over the graph so any number of agents can ask
/// per update
#[cfg(not(tarpaulin_include))]
pub fn process_path_requests(
	mut requests: EventReader<EventPathRequest>,
	mut computed: EventWriter<EventPathComputed>,
	graph_q: Query<&NavGraph>,
) {
	for request in requests.read() {
		for graph in graph_q.iter() {
			let path = graph.find_path(
				request.get_start(),
				request.get_end(),
				request.get_excluded(),
				request.get_noise_seed(),
			);
			if path.is_empty() {
				debug!(
					"No route from {} to {} for agent {:?}",
					request.get_start(),
					request.get_end(),
					request.get_agent()
				);
			}
			computed.write(EventPathComputed::new(request.get_agent(), path));
		}
	}
}
