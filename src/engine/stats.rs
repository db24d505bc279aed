//! Whole-graph statistics and shortest paths.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use super::error::{GraphError, Result};
use super::snapshot::Snapshot;

/// Summary numbers for the network information panel.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
	/// Nodes.
	pub node_count: usize,
	/// Edges.
	pub edge_count: usize,
	/// Undirected connected components; isolated nodes count once each.
	pub connected_components: usize,
	/// Rounded to two decimals.
	pub average_degree: f64,
}

impl GraphStats {
	/// Average degree with two decimals.
	pub fn average_degree_display(&self) -> String {
		format!("{:.2}", self.average_degree)
	}

	/// Rows for a structured-data presentation.
	pub fn rows(&self) -> Vec<(String, String)> {
		vec![
			("Total Nodes".into(), self.node_count.to_string()),
			("Total Edges".into(), self.edge_count.to_string()),
			(
				"Connected Components".into(),
				self.connected_components.to_string(),
			),
			("Average Degree".into(), self.average_degree_display()),
		]
	}
}

/// Counts, components and average degree of `snapshot`.
pub fn compute_stats(snapshot: &Snapshot) -> GraphStats {
	let mut visited: HashSet<&str> = HashSet::new();
	let mut components = 0;
	for start in snapshot.nodes() {
		if visited.contains(start.id()) {
			continue;
		}
		components += 1;
		let mut queue = VecDeque::from([start.id()]);
		while let Some(current) = queue.pop_front() {
			if !visited.insert(current) {
				continue;
			}
			for neighbor in snapshot.neighbors_of(current).unwrap_or_default() {
				if !visited.contains(neighbor) {
					queue.push_back(neighbor);
				}
			}
		}
	}

	let node_count = snapshot.node_count();
	let total_degree: usize = snapshot
		.nodes()
		.map(|n| snapshot.degree(n.id()).unwrap_or(0))
		.sum();
	let average_degree = if node_count == 0 {
		0.0
	} else {
		(total_degree as f64 / node_count as f64 * 100.0).round() / 100.0
	};

	GraphStats {
		node_count,
		edge_count: snapshot.edge_count(),
		connected_components: components,
		average_degree,
	}
}

/// Unweighted shortest path over the undirected adjacency.
///
/// Returns alternating node and edge ids from `source` to `target`, or an
/// empty list when `target` is unreachable. Both ids must name nodes.
pub fn shortest_path(snapshot: &Snapshot, source: &str, target: &str) -> Result<Vec<String>> {
	for id in [source, target] {
		if !snapshot.element_by_id(id)?.is_node() {
			return Err(GraphError::not_found(id));
		}
	}

	// node -> (previous node, edge used)
	let mut came_from: HashMap<&str, (&str, &str)> = HashMap::new();
	let mut visited: HashSet<&str> = HashSet::from([source]);
	let mut queue = VecDeque::from([source]);
	while let Some(current) = queue.pop_front() {
		if current == target {
			break;
		}
		for edge in snapshot.incident_edges(current)? {
			let Some((a, b)) = edge.endpoints() else {
				continue;
			};
			let next = if a == current { b } else { a };
			if visited.insert(next) {
				came_from.insert(next, (current, edge.id()));
				queue.push_back(next);
			}
		}
	}

	if !visited.contains(target) {
		return Ok(Vec::new());
	}
	let mut path = vec![target.to_string()];
	let mut cursor = target;
	while let Some(&(previous, edge)) = came_from.get(cursor) {
		path.push(edge.to_string());
		path.push(previous.to_string());
		cursor = previous;
	}
	path.reverse();
	Ok(path)
}
