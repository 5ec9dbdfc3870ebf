//! Flat text serialization of the graph, one record per node carrying its
//! id, rounded position and neighbour ids. A private save format, not a
//! cross-system wire protocol. Malformed input fails the whole load so a
//! corrupt file can never produce a partial graph, callers fall back to
//! generation instead
//!

use std::collections::HashMap;
use std::fmt;

use crate::prelude::*;
use bevy::prelude::*;

/// Why a serialized graph was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFileError {
	/// A record does not have the expected `id|x|y|z|neighbours` shape
	MalformedRecord {
		/// One-based line number of the offending record
		line: usize,
	},
	/// A numeric field failed to parse
	InvalidNumber {
		/// One-based line number of the offending record
		line: usize,
	},
	/// Two records claim the same node id
	DuplicateId {
		/// The repeated id
		id: usize,
	},
	/// Node ids do not form a dense `[0, N)` range
	MissingId {
		/// The absent id
		id: usize,
	},
	/// A record references a neighbour id no record defines
	DanglingNeighbour {
		/// The record owning the reference
		id: usize,
		/// The undefined neighbour id
		neighbour: usize,
	},
}

impl fmt::Display for GraphFileError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			GraphFileError::MalformedRecord { line } => {
				write!(f, "malformed graph record on line {}", line)
			}
			GraphFileError::InvalidNumber { line } => {
				write!(f, "unparsable number in graph record on line {}", line)
			}
			GraphFileError::DuplicateId { id } => {
				write!(f, "node id {} appears more than once", id)
			}
			GraphFileError::MissingId { id } => {
				write!(f, "node ids are not contiguous, id {} is absent", id)
			}
			GraphFileError::DanglingNeighbour { id, neighbour } => {
				write!(
					f,
					"node {} references undefined neighbour {}",
					id, neighbour
				)
			}
		}
	}
}

impl std::error::Error for GraphFileError {}

impl NavGraph {
	/// Serialize the graph to its flat text form, one `id|x|y|z|neighbours`
	/// record per line with positions rounded to 2 decimal places
	pub fn to_text(&self) -> String {
		let mut out = String::new();
		for (index, node) in self.nodes().iter().enumerate() {
			let p = node.position();
			let neighbours = node
				.neighbours()
				.iter()
				.map(|n| n.index().to_string())
				.collect::<Vec<String>>()
				.join(",");
			out.push_str(&format!(
				"{}|{:.2}|{:.2}|{:.2}|{}\n",
				index, p.x, p.y, p.z, neighbours
			));
		}
		out
	}
	/// Reconstruct a graph from its flat text form. Records may appear in
	/// any order, neighbour references are resolved once every node has
	/// parsed and the spatial index is rebuilt afterwards. Any defect fails
	/// the whole load
	pub fn from_text(text: &str) -> Result<NavGraph, GraphFileError> {
		let mut records: HashMap<usize, (Vec3, Vec<usize>)> = HashMap::new();
		for (line_index, raw) in text.lines().enumerate() {
			let line = line_index + 1;
			let record = raw.trim();
			if record.is_empty() {
				continue;
			}
			let fields: Vec<&str> = record.split('|').collect();
			if fields.len() != 5 {
				return Err(GraphFileError::MalformedRecord { line });
			}
			let id: usize = fields[0]
				.parse()
				.map_err(|_| GraphFileError::InvalidNumber { line })?;
			let mut position = Vec3::ZERO;
			for (axis, field) in fields[1..4].iter().enumerate() {
				position[axis] = field
					.parse()
					.map_err(|_| GraphFileError::InvalidNumber { line })?;
			}
			let neighbours = if fields[4].is_empty() {
				Vec::new()
			} else {
				fields[4]
					.split(',')
					.map(|f| {
						f.parse()
							.map_err(|_| GraphFileError::InvalidNumber { line })
					})
					.collect::<Result<Vec<usize>, GraphFileError>>()?
			};
			if records.insert(id, (position, neighbours)).is_some() {
				return Err(GraphFileError::DuplicateId { id });
			}
		}
		let count = records.len();
		let mut graph = NavGraph::default();
		for id in 0..count {
			let Some((position, _)) = records.get(&id) else {
				return Err(GraphFileError::MissingId { id });
			};
			graph.add_node(*position);
		}
		for (id, (_, neighbours)) in records.iter() {
			for neighbour in neighbours.iter() {
				if *neighbour >= count {
					return Err(GraphFileError::DanglingNeighbour {
						id: *id,
						neighbour: *neighbour,
					});
				}
				graph.link(NodeId::new(*id), NodeId::new(*neighbour));
			}
		}
		graph.rebuild_spatial();
		Ok(graph)
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	/// A small diamond graph with one detached node
	fn diamond() -> NavGraph {
		let mut graph = NavGraph::default();
		let a = graph.add_node(Vec3::new(0.0, 0.0, 0.0));
		let b = graph.add_node(Vec3::new(1.505, 0.0, 1.5));
		let c = graph.add_node(Vec3::new(1.5, 0.25, -1.5));
		let d = graph.add_node(Vec3::new(3.0, 0.0, 0.0));
		let _loner = graph.add_node(Vec3::new(9.0, 0.0, 9.0));
		graph.link(a, b);
		graph.link(a, c);
		graph.link(b, d);
		graph.link(c, d);
		graph.rebuild_spatial();
		graph
	}
	#[test]
	fn round_trip_preserves_structure() {
		let graph = diamond();
		let restored = NavGraph::from_text(&graph.to_text()).unwrap();
		assert_eq!(graph.node_count(), restored.node_count());
		for (index, node) in graph.nodes().iter().enumerate() {
			let twin = &restored.nodes()[index];
			// positions survive at 2 decimal places
			assert!(node.position().distance(twin.position()) < 0.01);
			let mut expected = node.neighbours().to_vec();
			let mut found = twin.neighbours().to_vec();
			expected.sort();
			found.sort();
			assert_eq!(expected, found);
		}
	}
	#[test]
	fn round_trip_rebuilds_spatial_index() {
		let graph = diamond();
		let restored = NavGraph::from_text(&graph.to_text()).unwrap();
		let result = restored.closest_node(Vec3::new(9.2, 0.0, 8.9)).unwrap();
		assert_eq!(NodeId::new(4), result);
	}
	#[test]
	fn empty_text_loads_an_empty_graph() {
		let restored = NavGraph::from_text("").unwrap();
		assert!(restored.is_empty());
	}
	#[test]
	fn records_in_any_order_resolve() {
		let text = "1|1.00|0.00|0.00|0\n0|0.00|0.00|0.00|1\n";
		let restored = NavGraph::from_text(text).unwrap();
		assert_eq!(2, restored.node_count());
		assert_eq!(1, restored.degree(NodeId::new(0)));
	}
	#[test]
	fn asymmetric_input_is_symmetrized() {
		// only one endpoint lists the edge, linking restores the invariant
		let text = "0|0.00|0.00|0.00|1\n1|1.00|0.00|0.00|\n";
		let restored = NavGraph::from_text(text).unwrap();
		assert_eq!(1, restored.degree(NodeId::new(1)));
	}
	#[test]
	fn wrong_field_count_is_rejected() {
		let result = NavGraph::from_text("0|0.00|0.00|0.00\n");
		let actual = Err(GraphFileError::MalformedRecord { line: 1 });
		assert_eq!(actual, result.map(|_| ()));
	}
	#[test]
	fn unparsable_position_is_rejected() {
		let result = NavGraph::from_text("0|zero|0.00|0.00|\n");
		let actual = Err(GraphFileError::InvalidNumber { line: 1 });
		assert_eq!(actual, result.map(|_| ()));
	}
	#[test]
	fn duplicate_id_is_rejected() {
		let result = NavGraph::from_text("0|0.00|0.00|0.00|\n0|1.00|0.00|0.00|\n");
		let actual = Err(GraphFileError::DuplicateId { id: 0 });
		assert_eq!(actual, result.map(|_| ()));
	}
	#[test]
	fn gap_in_ids_is_rejected() {
		let result = NavGraph::from_text("0|0.00|0.00|0.00|\n2|1.00|0.00|0.00|\n");
		let actual = Err(GraphFileError::MissingId { id: 1 });
		assert_eq!(actual, result.map(|_| ()));
	}
	#[test]
	fn dangling_neighbour_is_rejected() {
		let result = NavGraph::from_text("0|0.00|0.00|0.00|7\n");
		let actual = Err(GraphFileError::DanglingNeighbour {
			id: 0,
			neighbour: 7,
		});
		assert_eq!(actual, result.map(|_| ()));
	}
}
