//! Annotation composer.
//!
//! Two independent axes are recomputed from scratch on every trigger:
//!
//! - focus: search, selection and path highlight decide `Connected`,
//!   `Faded`, `SearchMatch`, `Highlighted` and `selected`;
//! - visibility: element-type filter, edge-type filter and label mode decide
//!   `FilteredOut` and `label_visible`.
//!
//! Neither axis reads the other's output.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::neighborhood::expand;
use super::search::{find_matches, normalize_query};
use super::snapshot::{Element, ElementGroup, IdSet, Snapshot};

/// Which element group stays un-greyed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementTypeFilter {
	/// No filtering.
	#[default]
	All,
	/// Edges are filtered out.
	#[serde(rename = "nodes")]
	NodesOnly,
	/// Nodes are filtered out.
	#[serde(rename = "edges")]
	EdgesOnly,
}

/// Edge filter by displayed type name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeTypeFilter {
	/// Every edge passes.
	#[default]
	All,
	/// Edges whose display label contains the name pass.
	Type(String),
}

/// Which labels are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMode {
	/// Node and edge labels.
	#[default]
	All,
	/// Node labels only.
	#[serde(rename = "nodes")]
	NodesOnly,
	/// Edge labels only.
	#[serde(rename = "edges")]
	EdgesOnly,
	/// No labels.
	None,
}

/// Unrecognised filter or mode name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode {0:?}")]
pub struct UnknownMode(pub String);

impl FromStr for ElementTypeFilter {
	type Err = UnknownMode;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"all" | "" => Ok(Self::All),
			"nodes" => Ok(Self::NodesOnly),
			"edges" => Ok(Self::EdgesOnly),
			_ => Err(UnknownMode(s.to_string())),
		}
	}
}

impl FromStr for LabelMode {
	type Err = UnknownMode;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"all" | "" => Ok(Self::All),
			"nodes" => Ok(Self::NodesOnly),
			"edges" => Ok(Self::EdgesOnly),
			"none" => Ok(Self::None),
			_ => Err(UnknownMode(s.to_string())),
		}
	}
}

impl EdgeTypeFilter {
	/// `"all"` (any case) or an empty string means no edge-type filtering.
	pub fn parse(value: &str) -> Self {
		let value = value.trim();
		if value.is_empty() || value.eq_ignore_ascii_case("all") {
			Self::All
		} else {
			Self::Type(value.to_string())
		}
	}
}

impl LabelMode {
	fn shows(self, group: ElementGroup) -> bool {
		match self {
			Self::All => true,
			Self::NodesOnly => group == ElementGroup::Node,
			Self::EdgesOnly => group == ElementGroup::Edge,
			Self::None => false,
		}
	}
}

/// Combined user input driving annotations. Replaced wholesale per action.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterContext {
	/// Raw search input; blank means no search.
	pub search_term: String,
	/// Ids the user tapped or selected.
	pub selected: IdSet,
	/// Ids on a highlighted path.
	pub highlighted: IdSet,
	/// Element-type filter.
	pub element_type: ElementTypeFilter,
	/// Edge-type filter.
	pub edge_type: EdgeTypeFilter,
	/// Label visibility.
	pub label_mode: LabelMode,
}

impl FilterContext {
	/// True when the search term is not blank.
	pub fn search_active(&self) -> bool {
		normalize_query(&self.search_term).is_some()
	}
}

/// Boolean annotation flags, for querying.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
	/// Inside the current spotlight.
	Connected,
	/// Outside the current spotlight.
	Faded,
	/// Direct search hit.
	SearchMatch,
	/// Greyed by a type filter.
	FilteredOut,
	/// On a highlighted path.
	Highlighted,
}

/// Composed visual state of one element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Annotation {
	/// See [`Tag::Connected`].
	pub connected: bool,
	/// See [`Tag::Faded`].
	pub faded: bool,
	/// See [`Tag::SearchMatch`].
	pub search_match: bool,
	/// See [`Tag::FilteredOut`].
	pub filtered_out: bool,
	/// See [`Tag::Highlighted`].
	pub highlighted: bool,
	/// Label is drawn.
	pub label_visible: bool,
	/// Part of the effective selection.
	pub selected: bool,
}

impl Annotation {
	/// Whether `tag` is set.
	pub fn has(&self, tag: Tag) -> bool {
		match tag {
			Tag::Connected => self.connected,
			Tag::Faded => self.faded,
			Tag::SearchMatch => self.search_match,
			Tag::FilteredOut => self.filtered_out,
			Tag::Highlighted => self.highlighted,
		}
	}

	/// Set tags, in declaration order.
	pub fn tags(&self) -> Vec<Tag> {
		[
			Tag::Connected,
			Tag::Faded,
			Tag::SearchMatch,
			Tag::FilteredOut,
			Tag::Highlighted,
		]
		.into_iter()
		.filter(|tag| self.has(*tag))
		.collect()
	}

	fn reset_focus(&mut self) {
		self.connected = false;
		self.faded = false;
		self.search_match = false;
		self.highlighted = false;
		self.selected = false;
	}

	fn reset_visibility(&mut self) {
		self.filtered_out = false;
		self.label_visible = false;
	}
}

/// What the search rule concluded, for user feedback.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SearchOutcome {
	/// Blank search term.
	#[default]
	Inactive,
	/// A search ran and matched nothing.
	NoMatches,
	/// Number of direct hits per group.
	Matches {
		/// Matching nodes.
		nodes: usize,
		/// Matching edges.
		edges: usize,
	},
}

/// Annotations for every element of one snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotationState {
	entries: HashMap<String, Annotation>,
	search: SearchOutcome,
}

impl AnnotationState {
	/// Annotation of `id`.
	pub fn get(&self, id: &str) -> Option<&Annotation> {
		self.entries.get(id)
	}

	/// All `(id, annotation)` pairs, unordered.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Annotation)> {
		self.entries.iter().map(|(id, a)| (id.as_str(), a))
	}

	/// Number of annotated elements.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// True for an empty snapshot.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Result of the search rule.
	pub fn search(&self) -> &SearchOutcome {
		&self.search
	}

	/// Ids carrying `tag`.
	pub fn with_tag(&self, tag: Tag) -> IdSet {
		self.iter()
			.filter(|(_, a)| a.has(tag))
			.map(|(id, _)| id.to_string())
			.collect()
	}

	/// Ids in the effective selection.
	pub fn selected(&self) -> IdSet {
		self.iter()
			.filter(|(_, a)| a.selected)
			.map(|(id, _)| id.to_string())
			.collect()
	}

	fn each_mut(&mut self, mut f: impl FnMut(&str, &mut Annotation)) {
		for (id, annotation) in self.entries.iter_mut() {
			f(id, annotation);
		}
	}
}

/// Recompute the full annotation state for `snapshot` under `ctx`.
pub fn compose(snapshot: &Snapshot, ctx: &FilterContext) -> AnnotationState {
	let mut state = AnnotationState {
		entries: snapshot
			.ids()
			.map(|id| (id.to_string(), Annotation::default()))
			.collect(),
		search: SearchOutcome::Inactive,
	};
	apply_focus(snapshot, ctx, &mut state);
	apply_visibility(snapshot, ctx, &mut state);
	state
}

/// Connected inside the expansion, Faded outside it.
fn spotlight(state: &mut AnnotationState, expansion: &IdSet) {
	state.each_mut(|id, a| {
		if expansion.contains(id) {
			a.connected = true;
		} else {
			a.faded = true;
		}
	});
}

fn apply_focus(snapshot: &Snapshot, ctx: &FilterContext, state: &mut AnnotationState) {
	state.each_mut(|_, a| a.reset_focus());

	if ctx.search_active() {
		// selection highlighting is suppressed while a search is active
		let matches = find_matches(snapshot, &ctx.search_term);
		if matches.is_empty() {
			state.each_mut(|_, a| a.faded = true);
			state.search = SearchOutcome::NoMatches;
		} else {
			let hits = matches.all();
			spotlight(state, &expand(snapshot, &hits));
			state.each_mut(|id, a| {
				if hits.contains(id) {
					a.search_match = true;
					a.selected = true;
				}
			});
			state.search = SearchOutcome::Matches {
				nodes: matches.nodes.len(),
				edges: matches.edges.len(),
			};
		}
	} else {
		let selected: IdSet = ctx
			.selected
			.iter()
			.filter(|id| snapshot.contains(id))
			.cloned()
			.collect();
		if !selected.is_empty() {
			spotlight(state, &expand(snapshot, &selected));
			state.each_mut(|id, a| a.selected = selected.contains(id));
		}
	}

	let highlighted: IdSet = ctx
		.highlighted
		.iter()
		.filter(|id| snapshot.contains(id))
		.cloned()
		.collect();
	if highlighted.is_empty() {
		return;
	}
	let owns_fade = !ctx.search_active() && state.selected().is_empty();
	state.each_mut(|id, a| {
		if highlighted.contains(id) {
			a.highlighted = true;
		} else if owns_fade {
			a.faded = true;
		}
	});
}

fn edge_passes(element: &Element, filter: &EdgeTypeFilter) -> bool {
	match filter {
		EdgeTypeFilter::All => true,
		// matched against the rendered label, not an exact type field
		EdgeTypeFilter::Type(name) => element.display_label().contains(name.as_str()),
	}
}

fn apply_visibility(snapshot: &Snapshot, ctx: &FilterContext, state: &mut AnnotationState) {
	state.each_mut(|_, a| a.reset_visibility());

	for element in snapshot.elements() {
		let Some(a) = state.entries.get_mut(element.id()) else {
			continue;
		};
		let group = element.group();
		a.filtered_out = match (ctx.element_type, group) {
			(ElementTypeFilter::NodesOnly, ElementGroup::Edge) => true,
			(ElementTypeFilter::EdgesOnly, ElementGroup::Node) => true,
			_ => false,
		};
		if group == ElementGroup::Edge && !edge_passes(element, &ctx.edge_type) {
			a.filtered_out = true;
		}
		a.label_visible = ctx.label_mode.shows(group);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::snapshot::RawElement;

	fn graph() -> Snapshot {
		Snapshot::from_raw(vec![
			RawElement::node("A", "A"),
			RawElement::node("B", "B"),
			RawElement::node("C", "C"),
			RawElement::edge("ab", "A", "B", "depends on"),
			RawElement::edge("bc", "B", "C", "feeds"),
		])
		.unwrap()
	}

	fn ids(list: &[&str]) -> IdSet {
		list.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn idle_context_leaves_everything_plain() {
		let state = compose(&graph(), &FilterContext::default());
		assert_eq!(state.len(), 5);
		for (_, a) in state.iter() {
			assert!(a.tags().is_empty());
			assert!(a.label_visible);
			assert!(!a.selected);
		}
		assert_eq!(state.search(), &SearchOutcome::Inactive);
	}

	#[test]
	fn search_overrides_selection() {
		let ctx = FilterContext {
			search_term: "feeds".into(),
			selected: ids(&["A"]),
			..FilterContext::default()
		};
		let state = compose(&graph(), &ctx);
		assert_eq!(state.with_tag(Tag::SearchMatch), ids(&["bc"]));
		assert_eq!(state.with_tag(Tag::Connected), ids(&["bc", "B", "C"]));
		assert_eq!(state.with_tag(Tag::Faded), ids(&["A", "ab"]));
		assert_eq!(state.selected(), ids(&["bc"]));
	}

	#[test]
	fn edge_selection_spotlights_endpoints() {
		let ctx = FilterContext {
			selected: ids(&["ab"]),
			..FilterContext::default()
		};
		let state = compose(&graph(), &ctx);
		assert_eq!(state.with_tag(Tag::Connected), ids(&["ab", "A", "B"]));
		assert_eq!(state.with_tag(Tag::Faded), ids(&["bc", "C"]));
	}

	#[test]
	fn stale_selection_ids_are_ignored() {
		let ctx = FilterContext {
			selected: ids(&["gone"]),
			..FilterContext::default()
		};
		assert!(compose(&graph(), &ctx).with_tag(Tag::Faded).is_empty());
	}

	#[test]
	fn filtered_out_and_faded_coexist() {
		let ctx = FilterContext {
			selected: ids(&["A"]),
			element_type: ElementTypeFilter::NodesOnly,
			..FilterContext::default()
		};
		let state = compose(&graph(), &ctx);
		let bc = state.get("bc").unwrap();
		assert!(bc.faded && bc.filtered_out);
		assert!(!state.get("A").unwrap().filtered_out);
	}

	#[test]
	fn edge_type_filter_uses_label_substring() {
		let ctx = FilterContext {
			edge_type: EdgeTypeFilter::parse("depends"),
			..FilterContext::default()
		};
		let state = compose(&graph(), &ctx);
		assert_eq!(state.with_tag(Tag::FilteredOut), ids(&["bc"]));
	}

	#[test]
	fn label_mode_is_orthogonal() {
		let ctx = FilterContext {
			search_term: "zzz".into(),
			label_mode: LabelMode::EdgesOnly,
			..FilterContext::default()
		};
		let state = compose(&graph(), &ctx);
		assert!(state.get("ab").unwrap().label_visible);
		assert!(!state.get("A").unwrap().label_visible);
		assert_eq!(state.with_tag(Tag::Faded).len(), 5);
	}

	#[test]
	fn highlight_fades_the_rest_when_nothing_else_focuses() {
		let ctx = FilterContext {
			highlighted: ids(&["A", "ab", "B"]),
			..FilterContext::default()
		};
		let state = compose(&graph(), &ctx);
		assert_eq!(state.with_tag(Tag::Highlighted), ids(&["A", "ab", "B"]));
		assert_eq!(state.with_tag(Tag::Faded), ids(&["bc", "C"]));
		assert!(state.with_tag(Tag::Connected).is_empty());
	}

	#[test]
	fn mode_names_parse() {
		assert_eq!("nodes".parse::<ElementTypeFilter>(), Ok(ElementTypeFilter::NodesOnly));
		assert_eq!("None".parse::<LabelMode>(), Ok(LabelMode::None));
		assert!("sideways".parse::<LabelMode>().is_err());
		assert_eq!(EdgeTypeFilter::parse("All"), EdgeTypeFilter::All);
	}
}
