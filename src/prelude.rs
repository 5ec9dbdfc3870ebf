//! `use bevy_waypoint_graph_plugin::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::navgraph::{
	collision::*, generator::*, pathfind::*, persistence::*, pruner::*, spatial::*, utilities::*,
	*,
};

#[doc(hidden)]
pub use crate::{
	bundle::*,
	plugin::{build_layer::*, path_layer::*, *},
};
