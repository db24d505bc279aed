//! Text search over element fields.

use log::debug;

use super::snapshot::{Element, IdSet, Snapshot};

const NODE_FIELDS: &[&str] = &["label", "name", "identifier", "description"];
const EDGE_FIELDS: &[&str] = &["label", "name", "type", "identifier", "description"];

/// Ids whose searchable fields contain the query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchSet {
	/// Matching node ids.
	pub nodes: IdSet,
	/// Matching edge ids.
	pub edges: IdSet,
}

impl MatchSet {
	/// No matches in either group.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}

	/// Total matches.
	pub fn len(&self) -> usize {
		self.nodes.len() + self.edges.len()
	}

	/// Union of both groups.
	pub fn all(&self) -> IdSet {
		self.nodes.union(&self.edges).cloned().collect()
	}
}

/// Trimmed, lowercased query, or `None` when nothing should be filtered.
pub fn normalize_query(query: &str) -> Option<String> {
	let query = query.trim();
	(!query.is_empty()).then(|| query.to_lowercase())
}

fn element_matches(element: &Element, needle: &str) -> bool {
	let fields = if element.is_node() {
		NODE_FIELDS
	} else {
		EDGE_FIELDS
	};
	fields.iter().any(|field| {
		element
			.field_text(field)
			.is_some_and(|text| text.to_lowercase().contains(needle))
	})
}

/// Case-insensitive substring search over the recognised fields.
///
/// An empty or whitespace-only query yields an empty set, which callers read
/// as "no filtering" rather than "zero matches".
pub fn find_matches(snapshot: &Snapshot, query: &str) -> MatchSet {
	let Some(needle) = normalize_query(query) else {
		return MatchSet::default();
	};
	let mut matches = MatchSet::default();
	for element in snapshot.elements() {
		if !element_matches(element, &needle) {
			continue;
		}
		let bucket = if element.is_node() {
			&mut matches.nodes
		} else {
			&mut matches.edges
		};
		bucket.insert(element.id().to_string());
	}
	debug!(
		"search {needle:?}: {} nodes, {} edges",
		matches.nodes.len(),
		matches.edges.len()
	);
	matches
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::snapshot::RawElement;

	fn snapshot() -> Snapshot {
		Snapshot::from_raw(vec![
			RawElement::node("1", "Railway Activities").with_field("identifier", "Ac_80_50"),
			RawElement::node("2", "Bridges").with_field("description", "steel structures"),
			RawElement::node("3", "Tunnels").with_field("type", "railway"),
			RawElement::edge("e1", "1", "2", "depends on").with_field("type", "dependency"),
		])
		.unwrap()
	}

	fn ids(set: &IdSet) -> Vec<&str> {
		let mut v: Vec<&str> = set.iter().map(String::as_str).collect();
		v.sort();
		v
	}

	#[test]
	fn empty_query_matches_nothing() {
		assert!(find_matches(&snapshot(), "").is_empty());
		assert!(find_matches(&snapshot(), "   \t").is_empty());
	}

	#[test]
	fn case_insensitive_substring() {
		let m = find_matches(&snapshot(), "RAILWAY");
		assert_eq!(ids(&m.nodes), vec!["1"]);
		assert!(m.edges.is_empty());
	}

	#[test]
	fn node_type_field_is_not_searched() {
		let m = find_matches(&snapshot(), "tunnels");
		assert_eq!(ids(&m.nodes), vec!["3"]);
		assert!(find_matches(&snapshot(), "railway").nodes.len() == 1);
	}

	#[test]
	fn edge_type_field_is_searched() {
		let m = find_matches(&snapshot(), "dependency");
		assert_eq!(ids(&m.edges), vec!["e1"]);
	}

	#[test]
	fn description_and_identifier_match() {
		assert_eq!(ids(&find_matches(&snapshot(), "steel").nodes), vec!["2"]);
		assert_eq!(ids(&find_matches(&snapshot(), "ac_80").nodes), vec!["1"]);
	}

	#[test]
	fn query_is_trimmed() {
		assert_eq!(ids(&find_matches(&snapshot(), "  bridges ").nodes), vec!["2"]);
	}
}
