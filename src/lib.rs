//! This is a plugin for Bevy game engine to generate, prune and query waypoint navigation graphs over static level geometry
//!

pub mod navgraph;
pub mod bundle;
pub mod plugin;

pub mod prelude;
