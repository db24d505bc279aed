//! Immutable graph snapshot: validated elements plus the undirected adjacency
//! every other engine component reads from.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{GraphError, Result};

/// Set of element ids (nodes and edges share one id space).
pub type IdSet = HashSet<String>;

/// Node or edge, as in the Cytoscape `group` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementGroup {
	/// `"nodes"`
	#[serde(rename = "nodes")]
	Node,
	/// `"edges"`
	#[serde(rename = "edges")]
	Edge,
}

/// Point in graph coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	/// Horizontal.
	pub x: f64,
	/// Vertical.
	pub y: f64,
}

impl Position {
	/// Point at `(x, y)`.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// One element as it arrives from the outside world, before validation.
///
/// Mirrors the Cytoscape element JSON: `{"group": "nodes", "data": {...}}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawElement {
	/// Explicit group; inferred from `source`/`target` when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub group: Option<ElementGroup>,
	/// Arbitrary fields, `id` required.
	#[serde(default)]
	pub data: Map<String, Value>,
	/// Preset position.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub position: Option<Position>,
}

impl RawElement {
	/// Node with an id and label.
	pub fn node(id: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			group: Some(ElementGroup::Node),
			..Self::default()
		}
		.with_field("id", id.into())
		.with_field("label", label.into())
	}

	/// Edge from `source` to `target`; `label` doubles as its type.
	pub fn edge(
		id: impl Into<String>,
		source: impl Into<String>,
		target: impl Into<String>,
		label: impl Into<String>,
	) -> Self {
		Self {
			group: Some(ElementGroup::Edge),
			..Self::default()
		}
		.with_field("id", id.into())
		.with_field("source", source.into())
		.with_field("target", target.into())
		.with_field("label", label.into())
	}

	/// Set a data field.
	pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
		self.data.insert(key.to_string(), value.into());
		self
	}

	/// Set a preset position.
	pub fn with_position(mut self, position: Position) -> Self {
		self.position = Some(position);
		self
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawGraph {
	Wrapped { elements: Vec<RawElement> },
	Bare(Vec<RawElement>),
}

/// Parse `{"elements": [...]}` or a bare element array.
pub fn parse_elements(json: &str) -> Result<Vec<RawElement>> {
	let graph: RawGraph = serde_json::from_str(json)?;
	Ok(match graph {
		RawGraph::Wrapped { elements } => elements,
		RawGraph::Bare(elements) => elements,
	})
}

/// Node, or edge with its endpoints.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
	/// A node.
	Node,
	/// An edge.
	Edge {
		/// Source node id.
		source: String,
		/// Target node id.
		target: String,
	},
}

/// A validated node or edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
	id: String,
	kind: ElementKind,
	data: Map<String, Value>,
	position: Option<Position>,
}

/// Render a scalar data value as searchable text.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

impl Element {
	fn from_raw(raw: RawElement) -> Result<Self> {
		let id = raw
			.data
			.get("id")
			.and_then(scalar_text)
			.ok_or_else(|| GraphError::malformed("element without an id"))?;
		let endpoint = |key: &str| raw.data.get(key).and_then(scalar_text);
		let group = raw.group.unwrap_or_else(|| {
			if endpoint("source").is_some() && endpoint("target").is_some() {
				ElementGroup::Edge
			} else {
				ElementGroup::Node
			}
		});
		let kind = match group {
			ElementGroup::Node => ElementKind::Node,
			ElementGroup::Edge => match (endpoint("source"), endpoint("target")) {
				(Some(source), Some(target)) => ElementKind::Edge { source, target },
				_ => {
					return Err(GraphError::malformed(format!(
						"edge {id} is missing a source or target"
					)));
				}
			},
		};
		Ok(Self {
			id,
			kind,
			data: raw.data,
			position: raw.position,
		})
	}

	/// Unique id.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Node or edge with endpoints.
	pub fn kind(&self) -> &ElementKind {
		&self.kind
	}

	/// Node or edge.
	pub fn group(&self) -> ElementGroup {
		match self.kind {
			ElementKind::Node => ElementGroup::Node,
			ElementKind::Edge { .. } => ElementGroup::Edge,
		}
	}

	/// True for nodes.
	pub fn is_node(&self) -> bool {
		self.group() == ElementGroup::Node
	}

	/// True for edges.
	pub fn is_edge(&self) -> bool {
		self.group() == ElementGroup::Edge
	}

	/// All data fields.
	pub fn data(&self) -> &Map<String, Value> {
		&self.data
	}

	/// Text of a scalar field, `None` when absent or structured.
	pub fn field_text(&self, name: &str) -> Option<String> {
		self.data.get(name).and_then(scalar_text)
	}

	/// The `label` field.
	pub fn label(&self) -> Option<String> {
		self.field_text("label").filter(|l| !l.is_empty())
	}

	/// Label shown on the canvas; edges fall back to their type, everything to the id.
	pub fn display_label(&self) -> String {
		self.label()
			.or_else(|| {
				self.is_edge()
					.then(|| self.field_text("type"))
					.flatten()
			})
			.unwrap_or_else(|| self.id.clone())
	}

	/// `(source, target)` of an edge.
	pub fn endpoints(&self) -> Option<(&str, &str)> {
		match &self.kind {
			ElementKind::Node => None,
			ElementKind::Edge { source, target } => Some((source, target)),
		}
	}

	/// Preset position, if any.
	pub fn position(&self) -> Option<Position> {
		self.position
	}

	/// Back to the wire shape.
	pub fn to_raw(&self) -> RawElement {
		RawElement {
			group: Some(self.group()),
			data: self.data.clone(),
			position: self.position,
		}
	}
}

/// Ordered, validated element list captured at one point in time.
///
/// Ids are unique and every edge endpoint resolves to a node of the same
/// snapshot. Edges are undirected for adjacency purposes.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
	elements: Vec<Element>,
	index: HashMap<String, usize>,
	// node id -> incident edge indices, in edge order; self-loops appear twice
	incident: HashMap<String, Vec<usize>>,
}

impl Snapshot {
	/// Validate `raw`: unique ids, edges between existing nodes.
	pub fn from_raw(raw: Vec<RawElement>) -> Result<Self> {
		let elements = raw
			.into_iter()
			.map(Element::from_raw)
			.collect::<Result<Vec<_>>>()?;
		Self::from_elements(elements)
	}

	/// Parse and validate; see [`parse_elements`].
	pub fn from_json(json: &str) -> Result<Self> {
		Self::from_raw(parse_elements(json)?)
	}

	fn from_elements(elements: Vec<Element>) -> Result<Self> {
		let mut index = HashMap::with_capacity(elements.len());
		for (i, element) in elements.iter().enumerate() {
			if index.insert(element.id.clone(), i).is_some() {
				return Err(GraphError::malformed(format!(
					"duplicate element id {}",
					element.id
				)));
			}
		}

		let mut incident: HashMap<String, Vec<usize>> = elements
			.iter()
			.filter(|e| e.is_node())
			.map(|e| (e.id.clone(), Vec::new()))
			.collect();

		for (i, element) in elements.iter().enumerate() {
			let Some((source, target)) = element.endpoints() else {
				continue;
			};
			for endpoint in [source, target] {
				match incident.get_mut(endpoint) {
					Some(edges) => edges.push(i),
					None => {
						return Err(GraphError::malformed(format!(
							"edge {} references missing node {endpoint}",
							element.id
						)));
					}
				}
			}
		}

		Ok(Self {
			elements,
			index,
			incident,
		})
	}

	/// Element count.
	pub fn len(&self) -> usize {
		self.elements.len()
	}

	/// No elements.
	pub fn is_empty(&self) -> bool {
		self.elements.is_empty()
	}

	/// Elements in input order.
	pub fn elements(&self) -> &[Element] {
		&self.elements
	}

	/// Nodes in input order.
	pub fn nodes(&self) -> impl Iterator<Item = &Element> {
		self.elements.iter().filter(|e| e.is_node())
	}

	/// Edges in input order.
	pub fn edges(&self) -> impl Iterator<Item = &Element> {
		self.elements.iter().filter(|e| e.is_edge())
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.incident.len()
	}

	/// Number of edges.
	pub fn edge_count(&self) -> usize {
		self.elements.len() - self.incident.len()
	}

	/// Element by id.
	pub fn get(&self, id: &str) -> Option<&Element> {
		self.index.get(id).map(|&i| &self.elements[i])
	}

	/// Whether `id` is present.
	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// Element by id, `NotFound` when absent.
	pub fn element_by_id(&self, id: &str) -> Result<&Element> {
		self.get(id).ok_or_else(|| GraphError::not_found(id))
	}

	/// Every id in input order.
	pub fn ids(&self) -> impl Iterator<Item = &str> {
		self.elements.iter().map(|e| e.id.as_str())
	}

	fn incident_indices(&self, node_id: &str) -> Result<&[usize]> {
		self.incident
			.get(node_id)
			.map(Vec::as_slice)
			.ok_or_else(|| GraphError::not_found(node_id))
	}

	/// Edges touching `node_id`, either direction.
	pub fn incident_edges(&self, node_id: &str) -> Result<Vec<&Element>> {
		let mut seen = HashSet::new();
		Ok(self
			.incident_indices(node_id)?
			.iter()
			.filter(|&&i| seen.insert(i))
			.map(|&i| &self.elements[i])
			.collect())
	}

	/// Incident-edge count; a self-loop counts twice.
	pub fn degree(&self, node_id: &str) -> Result<usize> {
		Ok(self.incident_indices(node_id)?.len())
	}

	/// Adjacent node ids in edge order, without duplicates.
	pub fn neighbors_of(&self, node_id: &str) -> Result<Vec<&str>> {
		let mut seen = HashSet::new();
		let mut neighbors = Vec::new();
		for &i in self.incident_indices(node_id)? {
			let Some((source, target)) = self.elements[i].endpoints() else {
				continue;
			};
			let other = if source == node_id { target } else { source };
			if seen.insert(other) {
				neighbors.push(other);
			}
		}
		Ok(neighbors)
	}

	/// Every element in wire shape.
	pub fn to_raw(&self) -> Vec<RawElement> {
		self.elements.iter().map(Element::to_raw).collect()
	}

	/// New snapshot with `raw` appended; `self` is left untouched on failure.
	pub fn with_element(&self, raw: RawElement) -> Result<Self> {
		let mut elements = self.elements.clone();
		elements.push(Element::from_raw(raw)?);
		Self::from_elements(elements)
	}

	/// New snapshot without `id`; removing a node also drops its incident edges.
	///
	/// Returns the snapshot and every removed id.
	pub fn without_element(&self, id: &str) -> Result<(Self, Vec<String>)> {
		let element = self.element_by_id(id)?;
		let mut removed: IdSet = IdSet::from([element.id.clone()]);
		if element.is_node() {
			removed.extend(self.incident_edges(id)?.iter().map(|e| e.id.clone()));
		}
		let (gone, kept): (Vec<Element>, Vec<Element>) = self
			.elements
			.iter()
			.cloned()
			.partition(|e| removed.contains(&e.id));
		let snapshot = Self::from_elements(kept)?;
		Ok((snapshot, gone.into_iter().map(|e| e.id).collect()))
	}
}
