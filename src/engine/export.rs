//! Serializing the live graph.

use serde::Serialize;

use super::error::Result;
use super::layout::Positions;
use super::snapshot::{RawElement, Snapshot};

/// The "serialize current graph" capability.
pub trait Exporter {
	/// Encode the snapshot with current positions.
	fn serialize(&self, snapshot: &Snapshot, positions: &Positions) -> Result<Vec<u8>>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportMetadata {
	node_count: usize,
	edge_count: usize,
}

#[derive(Serialize)]
struct ExportDocument {
	elements: Vec<RawElement>,
	metadata: ExportMetadata,
}

/// Pretty-printed `{"elements": [...], "metadata": {...}}`, reloadable by `load`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
	fn serialize(&self, snapshot: &Snapshot, positions: &Positions) -> Result<Vec<u8>> {
		let elements = snapshot
			.elements()
			.iter()
			.map(|element| {
				let mut raw = element.to_raw();
				if let Some(position) = positions.get(element.id()) {
					raw.position = Some(*position);
				}
				raw
			})
			.collect();
		let document = ExportDocument {
			elements,
			metadata: ExportMetadata {
				node_count: snapshot.node_count(),
				edge_count: snapshot.edge_count(),
			},
		};
		Ok(serde_json::to_vec_pretty(&document)?)
	}
}
