//! One-hop neighbourhood expansion.

use super::snapshot::{IdSet, Snapshot};

/// 1-hop closure of `ids`.
///
/// Nodes bring in their incident edges and the nodes at the other end; edges
/// bring in both endpoints. The input is always part of the result, including
/// ids the snapshot does not know.
pub fn expand(snapshot: &Snapshot, ids: &IdSet) -> IdSet {
	let mut closure = ids.clone();
	for id in ids {
		let Some(element) = snapshot.get(id) else {
			continue;
		};
		match element.endpoints() {
			Some((source, target)) => {
				closure.insert(source.to_string());
				closure.insert(target.to_string());
			}
			None => {
				for edge in snapshot.incident_edges(id).unwrap_or_default() {
					closure.insert(edge.id().to_string());
					if let Some((source, target)) = edge.endpoints() {
						closure.insert(source.to_string());
						closure.insert(target.to_string());
					}
				}
			}
		}
	}
	closure
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::snapshot::RawElement;

	fn chain() -> Snapshot {
		Snapshot::from_raw(vec![
			RawElement::node("A", "A"),
			RawElement::node("B", "B"),
			RawElement::node("C", "C"),
			RawElement::node("D", "D"),
			RawElement::edge("ab", "A", "B", "x"),
			RawElement::edge("bc", "B", "C", "x"),
			RawElement::edge("cd", "C", "D", "x"),
		])
		.unwrap()
	}

	fn set(ids: &[&str]) -> IdSet {
		ids.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn node_brings_edges_and_neighbors() {
		assert_eq!(expand(&chain(), &set(&["A"])), set(&["A", "ab", "B"]));
		assert_eq!(
			expand(&chain(), &set(&["B"])),
			set(&["A", "ab", "B", "bc", "C"])
		);
	}

	#[test]
	fn edge_brings_endpoints_only() {
		assert_eq!(expand(&chain(), &set(&["bc"])), set(&["bc", "B", "C"]));
	}

	#[test]
	fn inflationary_even_for_unknown_ids() {
		let input = set(&["nope", "D"]);
		assert!(expand(&chain(), &input).is_superset(&input));
		assert!(expand(&chain(), &IdSet::new()).is_empty());
	}

	#[test]
	fn re_expanding_grows_by_one_hop() {
		let once = expand(&chain(), &set(&["A"]));
		let twice = expand(&chain(), &once);
		assert!(twice.is_superset(&once));
		assert!(twice.contains("bc"));
		assert!(!twice.contains("D"));
	}
}
