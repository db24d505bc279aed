//! Owner of the single live graph instance and the current filter context.
//!
//! Phases: `Empty -> Building -> LayingOut -> Interactive`. A load whose id
//! set matches the live snapshot never leaves the current phase; it only
//! recomputes annotations. Layout completion is an explicit call carrying the
//! job it answers, and jobs from an older generation are discarded.

use std::rc::Rc;

use log::{debug, error, info, warn};
use serde_json::Value;

use super::annotations::{
	AnnotationState, EdgeTypeFilter, ElementTypeFilter, FilterContext, LabelMode, SearchOutcome,
	compose,
};
use super::config::EngineConfig;
use super::diff::needs_full_rebuild;
use super::error::{GraphError, Result};
use super::export::Exporter;
use super::layout::{LayoutAlgorithm, LayoutEngine, LayoutJob, Positions};
use super::present::{LogPresenter, MenuAction, MenuTarget, Presenter, Rows, Severity, ViewCommand};
use super::snapshot::{Element, IdSet, Position, RawElement, Snapshot, parse_elements};
use super::stats::{GraphStats, compute_stats, shortest_path};

/// Lifecycle of the live instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderPhase {
	/// Nothing loaded.
	Empty,
	/// Instance is being constructed.
	Building,
	/// Waiting for a layout job to complete.
	LayingOut,
	/// Positioned and accepting input.
	Interactive,
}

/// The rendered graph: snapshot, positions, fade-in progress and annotations.
#[derive(Debug)]
pub struct GraphInstance {
	generation: u64,
	snapshot: Rc<Snapshot>,
	positions: Positions,
	node_opacity: f64,
	edge_opacity: f64,
	// elapsed milliseconds while fading in
	fade: Option<f64>,
	annotations: AnnotationState,
}

impl GraphInstance {
	/// Bumped on every rebuild and relayout.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Rendered snapshot.
	pub fn snapshot(&self) -> &Snapshot {
		&self.snapshot
	}

	/// Node positions.
	pub fn positions(&self) -> &Positions {
		&self.positions
	}

	/// Position of one node.
	pub fn position(&self, id: &str) -> Option<Position> {
		self.positions.get(id).copied()
	}

	/// Node opacity, below 1.0 while fading in.
	pub fn node_opacity(&self) -> f64 {
		self.node_opacity
	}

	/// Edge opacity, below 1.0 while fading in.
	pub fn edge_opacity(&self) -> f64 {
		self.edge_opacity
	}

	/// Fade-in still running.
	pub fn is_fading_in(&self) -> bool {
		self.fade.is_some()
	}

	/// Current annotations.
	pub fn annotations(&self) -> &AnnotationState {
		&self.annotations
	}

	fn begin_fade_in(&mut self) {
		if self.node_opacity < 1.0 || self.edge_opacity < 1.0 {
			self.fade = Some(0.0);
		}
	}
}

/// Result of [`RenderOrchestrator::load`].
#[derive(Debug)]
pub enum LoadOutcome {
	/// A new instance was built; run the job and report back.
	Rebuilt(LayoutJob),
	/// Same id set as the live instance; annotations were reapplied.
	Unchanged,
}

/// Result of [`RenderOrchestrator::finish_layout`].
#[derive(Debug)]
pub enum LayoutCompletion {
	/// Positions applied; the instance is interactive.
	Applied,
	/// The job belongs to a replaced instance and was ignored.
	Stale,
	/// The algorithm was unavailable; run this fallback job instead.
	Retry(LayoutJob),
	/// Layout failed outright; the instance went interactive unpositioned.
	Abandoned,
}

/// Owns the live instance, the filter context and the presenter.
pub struct RenderOrchestrator {
	config: EngineConfig,
	phase: RenderPhase,
	instance: Option<GraphInstance>,
	context: FilterContext,
	generation: u64,
	presenter: Box<dyn Presenter>,
}

impl Default for RenderOrchestrator {
	fn default() -> Self {
		Self::new(EngineConfig::default())
	}
}

impl RenderOrchestrator {
	/// Orchestrator that reports through [`LogPresenter`].
	pub fn new(config: EngineConfig) -> Self {
		Self::with_presenter(config, Box::new(LogPresenter))
	}

	/// Orchestrator with a custom presenter.
	pub fn with_presenter(config: EngineConfig, presenter: Box<dyn Presenter>) -> Self {
		Self {
			config,
			phase: RenderPhase::Empty,
			instance: None,
			context: FilterContext::default(),
			generation: 0,
			presenter,
		}
	}

	/// Active config.
	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	/// Current phase.
	pub fn phase(&self) -> RenderPhase {
		self.phase
	}

	/// Live instance, if any.
	pub fn instance(&self) -> Option<&GraphInstance> {
		self.instance.as_ref()
	}

	/// Current filter context.
	pub fn context(&self) -> &FilterContext {
		&self.context
	}

	/// Snapshot of the live instance.
	pub fn snapshot(&self) -> Option<&Snapshot> {
		self.instance.as_ref().map(|i| i.snapshot.as_ref())
	}

	/// Annotations of the live instance.
	pub fn annotations(&self) -> Option<&AnnotationState> {
		self.instance.as_ref().map(|i| &i.annotations)
	}

	/// Viewport used for new layout jobs.
	pub fn set_viewport(&mut self, width: f64, height: f64) {
		self.config = self.config.clone().with_viewport(width, height);
	}

	fn live(&self) -> Result<&GraphInstance> {
		self.instance.as_ref().ok_or(GraphError::NoGraph)
	}

	fn live_mut(&mut self) -> Result<&mut GraphInstance> {
		self.instance.as_mut().ok_or(GraphError::NoGraph)
	}

	/// Requested algorithm, falling back to `fcose` for unknown names.
	pub fn resolve_algorithm(&self, requested: Option<&str>) -> LayoutAlgorithm {
		let Some(name) = requested else {
			return self.config.default_layout;
		};
		name.parse().unwrap_or_else(|err: GraphError| {
			warn!("{err}, falling back to fcose");
			LayoutAlgorithm::Fcose
		})
	}

	fn refresh(&mut self) {
		if let Some(instance) = self.instance.as_mut() {
			instance.annotations = compose(&instance.snapshot, &self.context);
		}
	}

	fn replace_context(&mut self, context: FilterContext) {
		self.context = context;
		self.refresh();
	}

	fn job(&self, instance: &GraphInstance, algorithm: LayoutAlgorithm) -> LayoutJob {
		LayoutJob {
			generation: instance.generation,
			algorithm,
			snapshot: Rc::clone(&instance.snapshot),
			params: self.config.layout.clone(),
			viewport: self.config.viewport,
		}
	}

	/// Install a new snapshot, rebuilding only when the id set changed.
	///
	/// Validation happens before any state is touched, so a malformed input
	/// leaves the live instance exactly as it was.
	pub fn load(&mut self, raw: Vec<RawElement>, algorithm: Option<&str>) -> Result<LoadOutcome> {
		let next = Snapshot::from_raw(raw)?;
		let algorithm = self.resolve_algorithm(algorithm);

		if !needs_full_rebuild(self.snapshot(), &next) {
			info!("graph structure unchanged, reapplying annotations");
			self.refresh();
			return Ok(LoadOutcome::Unchanged);
		}

		self.phase = RenderPhase::Building;
		if let Some(old) = self.instance.take() {
			debug!("destroying graph generation {}", old.generation);
		}
		self.generation += 1;

		let (cx, cy) = self.config.viewport.center();
		let positions = next
			.nodes()
			.map(|n| (n.id().to_string(), Position::new(cx, cy)))
			.collect();
		let snapshot = Rc::new(next);
		self.context = FilterContext {
			selected: IdSet::new(),
			highlighted: IdSet::new(),
			..self.context.clone()
		};
		let instance = GraphInstance {
			generation: self.generation,
			annotations: compose(&snapshot, &self.context),
			snapshot,
			positions,
			node_opacity: 0.0,
			edge_opacity: 0.0,
			fade: None,
		};
		let job = self.job(&instance, algorithm);
		info!(
			"built graph generation {} ({} nodes, {} edges), laying out with {algorithm}",
			instance.generation,
			instance.snapshot.node_count(),
			instance.snapshot.edge_count()
		);
		self.instance = Some(instance);
		self.phase = RenderPhase::LayingOut;
		Ok(LoadOutcome::Rebuilt(job))
	}

	/// `load` from raw JSON; parse failures are malformed input.
	pub fn load_json(&mut self, json: &str, algorithm: Option<&str>) -> Result<LoadOutcome> {
		self.load(parse_elements(json)?, algorithm)
	}

	/// Re-run layout on the live instance without rebuilding it.
	pub fn relayout(&mut self, algorithm: Option<&str>) -> Result<LayoutJob> {
		let algorithm = self.resolve_algorithm(algorithm);
		self.generation += 1;
		let generation = self.generation;
		let instance = self.live_mut()?;
		instance.generation = generation;
		let job = self.job(self.live()?, algorithm);
		self.phase = RenderPhase::LayingOut;
		Ok(job)
	}

	/// Report the result of a layout job.
	pub fn finish_layout(&mut self, job: &LayoutJob, result: Result<Positions>) -> LayoutCompletion {
		let current = self.instance.as_ref().map(|i| i.generation);
		if current != Some(job.generation) || self.phase != RenderPhase::LayingOut {
			debug!(
				"ignoring stale layout for generation {} (live {current:?})",
				job.generation
			);
			return LayoutCompletion::Stale;
		}
		let Some(instance) = self.instance.as_mut() else {
			return LayoutCompletion::Stale;
		};

		let completion = match result {
			Ok(positions) => {
				for (id, position) in positions {
					if instance.snapshot.get(&id).is_some_and(Element::is_node) {
						instance.positions.insert(id, position);
					}
				}
				info!("layout {} finished for generation {}", job.algorithm, job.generation);
				LayoutCompletion::Applied
			}
			Err(GraphError::LayoutUnavailable(name)) if job.algorithm != LayoutAlgorithm::Fcose => {
				warn!("layout {name} unavailable, falling back to fcose");
				return LayoutCompletion::Retry(job.with_algorithm(LayoutAlgorithm::Fcose));
			}
			Err(err) => {
				error!("layout {} failed: {err}", job.algorithm);
				LayoutCompletion::Abandoned
			}
		};
		instance.begin_fade_in();
		self.phase = RenderPhase::Interactive;
		completion
	}

	/// Run `job` through `engine`, following fallbacks, until it settles.
	pub async fn drive_layout<E: LayoutEngine>(&mut self, job: LayoutJob, engine: &E) -> LayoutCompletion {
		let mut job = job;
		loop {
			let result = engine.compute_positions(&job).await;
			match self.finish_layout(&job, result) {
				LayoutCompletion::Retry(next) => job = next,
				done => return done,
			}
		}
	}

	/// `load` followed by the layout it asks for.
	pub async fn load_and_layout<E: LayoutEngine>(
		&mut self,
		raw: Vec<RawElement>,
		algorithm: Option<&str>,
		engine: &E,
	) -> Result<LoadOutcome> {
		let outcome = self.load(raw, algorithm)?;
		if let LoadOutcome::Rebuilt(job) = &outcome {
			self.drive_layout(job.clone(), engine).await;
		}
		Ok(outcome)
	}

	/// Advance the fade-in animation by `dt_ms` milliseconds.
	pub fn tick(&mut self, dt_ms: f64) {
		let fade = self.config.fade.clone();
		let Some(instance) = self.instance.as_mut() else {
			return;
		};
		let Some(elapsed) = instance.fade.as_mut() else {
			return;
		};
		*elapsed += dt_ms;
		let progress = |duration: f64| {
			if duration <= 0.0 {
				1.0
			} else {
				(*elapsed / duration).min(1.0)
			}
		};
		instance.node_opacity = progress(fade.node_ms);
		instance.edge_opacity = progress(fade.edge_ms);
		if instance.node_opacity >= 1.0 && instance.edge_opacity >= 1.0 {
			instance.fade = None;
		}
	}

	/// Tear the instance down, handing it to the caller.
	pub fn teardown(&mut self) -> Option<GraphInstance> {
		self.phase = RenderPhase::Empty;
		self.instance.take()
	}

	/// Apply a search term and report the match count.
	pub fn search(&mut self, term: &str) {
		self.replace_context(FilterContext {
			search_term: term.to_string(),
			selected: IdSet::new(),
			highlighted: IdSet::new(),
			..self.context.clone()
		});
		let Some(annotations) = self.annotations() else {
			return;
		};
		let message = match annotations.search() {
			SearchOutcome::Inactive => return,
			SearchOutcome::NoMatches => (
				format!("No elements found matching \"{term}\""),
				Severity::Warning,
			),
			SearchOutcome::Matches { nodes, edges } => (
				format!("Found {} matching elements for \"{term}\"", nodes + edges),
				Severity::Success,
			),
		};
		self.presenter.present_message(&message.0, message.1);
	}

	/// Replace the selection. Unknown ids reject the whole call.
	pub fn select<I, S>(&mut self, ids: I) -> Result<()>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let snapshot = self.live()?.snapshot.as_ref();
		let mut selected = IdSet::new();
		for id in ids {
			let id = id.into();
			snapshot.element_by_id(&id)?;
			selected.insert(id);
		}
		self.replace_context(FilterContext {
			selected,
			..self.context.clone()
		});
		Ok(())
	}

	/// Drop selection and path highlight; an active search stays applied.
	pub fn clear_highlighting(&mut self) {
		self.replace_context(FilterContext {
			selected: IdSet::new(),
			highlighted: IdSet::new(),
			..self.context.clone()
		});
	}

	/// Replace the element-type filter.
	pub fn set_element_type_filter(&mut self, mode: ElementTypeFilter) {
		self.replace_context(FilterContext {
			element_type: mode,
			..self.context.clone()
		});
	}

	/// `"All"` clears the filter; anything else is matched against edge labels.
	pub fn set_edge_type_filter(&mut self, type_name_or_all: &str) {
		self.replace_context(FilterContext {
			edge_type: EdgeTypeFilter::parse(type_name_or_all),
			..self.context.clone()
		});
	}

	/// Replace the label mode.
	pub fn set_label_mode(&mut self, mode: LabelMode) {
		self.replace_context(FilterContext {
			label_mode: mode,
			..self.context.clone()
		});
	}

	/// Stats of the live snapshot; zeros when empty.
	pub fn stats(&self) -> GraphStats {
		self.snapshot().map(compute_stats).unwrap_or_default()
	}

	/// See [`shortest_path`].
	pub fn shortest_path(&self, source: &str, target: &str) -> Result<Vec<String>> {
		shortest_path(&self.live()?.snapshot, source, target)
	}

	/// Highlight the shortest path between two nodes.
	pub fn highlight_path(&mut self, source: &str, target: &str) -> Result<Vec<String>> {
		let path = self.shortest_path(source, target)?;
		if path.is_empty() {
			self.presenter.present_message(
				&format!("No path between \"{source}\" and \"{target}\""),
				Severity::Warning,
			);
		}
		self.replace_context(FilterContext {
			highlighted: path.iter().cloned().collect(),
			..self.context.clone()
		});
		Ok(path)
	}

	fn highlight_edge(&mut self, id: &str) -> Result<()> {
		let edge = self.live()?.snapshot.element_by_id(id)?;
		let mut highlighted = IdSet::from([id.to_string()]);
		if let Some((source, target)) = edge.endpoints() {
			highlighted.insert(source.to_string());
			highlighted.insert(target.to_string());
		}
		self.replace_context(FilterContext {
			highlighted,
			..self.context.clone()
		});
		Ok(())
	}

	/// Add one element; new nodes start at the viewport centre unless positioned.
	pub fn add_element(&mut self, raw: RawElement) -> Result<()> {
		let (cx, cy) = self.config.viewport.center();
		let instance = self.live_mut()?;
		let position = raw.position.unwrap_or(Position::new(cx, cy));
		let snapshot = instance.snapshot.with_element(raw)?;
		let added = snapshot.elements().last().map(|e| (e.id().to_string(), e.is_node()));
		if let Some((id, true)) = added {
			instance.positions.insert(id, position);
		}
		instance.snapshot = Rc::new(snapshot);
		self.refresh();
		Ok(())
	}

	/// Remove an element; returns every removed id (a node takes its edges along).
	pub fn remove_element(&mut self, id: &str) -> Result<Vec<String>> {
		let instance = self.live_mut()?;
		let (snapshot, removed) = instance.snapshot.without_element(id)?;
		for gone in &removed {
			instance.positions.remove(gone);
		}
		instance.snapshot = Rc::new(snapshot);
		let keep = |ids: &IdSet| -> IdSet {
			ids.iter()
				.filter(|id| !removed.contains(id))
				.cloned()
				.collect()
		};
		let context = FilterContext {
			selected: keep(&self.context.selected),
			highlighted: keep(&self.context.highlighted),
			..self.context.clone()
		};
		debug!("removed {} elements", removed.len());
		self.replace_context(context);
		Ok(removed)
	}

	/// Set a node's position.
	pub fn move_node(&mut self, id: &str, position: Position) -> Result<()> {
		let instance = self.live_mut()?;
		if !instance.snapshot.element_by_id(id)?.is_node() {
			return Err(GraphError::not_found(id));
		}
		instance.positions.insert(id.to_string(), position);
		Ok(())
	}

	/// Replace data fields in place when the id set is unchanged.
	pub fn patch_fields(&mut self, raw: Vec<RawElement>) -> Result<()> {
		let next = Snapshot::from_raw(raw)?;
		let instance = self.live_mut()?;
		if needs_full_rebuild(Some(instance.snapshot.as_ref()), &next) {
			return Err(GraphError::RebuildRequired);
		}
		instance.snapshot = Rc::new(next);
		self.refresh();
		Ok(())
	}

	/// Key/value rows of an element's data; edges omit their endpoints.
	pub fn element_rows(&self, id: &str) -> Result<Rows> {
		let element = self.live()?.snapshot.element_by_id(id)?;
		Ok(element
			.data()
			.iter()
			.filter(|(key, _)| element.is_node() || !matches!(key.as_str(), "source" | "target"))
			.map(|(key, value)| {
				let text = match value {
					Value::String(s) => s.clone(),
					other => other.to_string(),
				};
				(key.clone(), text)
			})
			.collect())
	}

	/// Serialize the live graph with current positions.
	pub fn export<E: Exporter>(&self, exporter: &E) -> Result<Vec<u8>> {
		let instance = self.live()?;
		exporter.serialize(&instance.snapshot, &instance.positions)
	}

	/// Actions offered for `target`.
	pub fn context_menu(&self, target: &MenuTarget) -> &'static [MenuAction] {
		MenuAction::for_target(target)
	}

	/// Hand the menu for `target` to the presenter.
	pub fn open_context_menu(&self, target: &MenuTarget, position: Position) {
		self.presenter
			.present_context_menu(position, target, self.context_menu(target));
	}

	fn label_of(&self, id: &str) -> Result<String> {
		Ok(self.live()?.snapshot.element_by_id(id)?.display_label())
	}

	/// Execute a context-menu action opened at `position`.
	pub fn run_action(
		&mut self,
		target: &MenuTarget,
		action: MenuAction,
		position: Position,
	) -> Result<Option<ViewCommand>> {
		let id = match target {
			MenuTarget::Element { id, .. } => id.as_str(),
			MenuTarget::Background => "",
		};
		let needs_element = !matches!(
			action,
			MenuAction::AddNode
				| MenuAction::ResetView
				| MenuAction::ClearSelections
				| MenuAction::ShowNetworkInfo
		);
		if needs_element && id.is_empty() {
			return Err(GraphError::not_found("<background>"));
		}

		match action {
			MenuAction::ShowId => {
				self.live()?.snapshot.element_by_id(id)?;
				self.presenter
					.present_structured_data("Node ID", &[("ID".into(), id.to_string())]);
			}
			MenuAction::ShowLabel => {
				let label = self
					.live()?
					.snapshot
					.element_by_id(id)?
					.label()
					.unwrap_or_else(|| "No label".to_string());
				self.presenter
					.present_structured_data("Node Label", &[("Label".into(), label)]);
			}
			MenuAction::ShowProperties => {
				let rows = self.element_rows(id)?;
				self.presenter.present_structured_data("Node Properties", &rows);
			}
			MenuAction::ShowNeighbors => {
				let snapshot = self.live()?.snapshot.as_ref();
				let rows: Rows = snapshot
					.neighbors_of(id)?
					.into_iter()
					.map(|n| (n.to_string(), self.label_of(n).unwrap_or_default()))
					.collect();
				self.presenter.present_structured_data(
					&format!("Node Neighbors ({})", rows.len()),
					&rows,
				);
			}
			MenuAction::CenterOn => {
				self.live()?.snapshot.element_by_id(id)?;
				return Ok(Some(ViewCommand::CenterOn {
					id: id.to_string(),
					zoom: 2.0,
				}));
			}
			MenuAction::DeleteNode | MenuAction::DeleteEdge => {
				self.remove_element(id)?;
			}
			MenuAction::ShowEdgeInfo => {
				let snapshot = self.live()?.snapshot.as_ref();
				let (source, target) = snapshot
					.element_by_id(id)?
					.endpoints()
					.ok_or_else(|| GraphError::not_found(id))?;
				let mut rows = vec![
					("Source".to_string(), self.label_of(source)?),
					("Target".to_string(), self.label_of(target)?),
				];
				rows.extend(self.element_rows(id)?);
				self.presenter.present_structured_data("Edge Information", &rows);
			}
			MenuAction::HighlightPath => {
				self.highlight_edge(id)?;
				return Ok(Some(ViewCommand::CenterOn {
					id: id.to_string(),
					zoom: 1.5,
				}));
			}
			MenuAction::AddNode => {
				let snapshot = self.live()?.snapshot.as_ref();
				let mut n = snapshot.len() + 1;
				while snapshot.contains(&format!("node-{n}")) {
					n += 1;
				}
				let node = RawElement::node(format!("node-{n}"), "New Node").with_position(position);
				self.add_element(node)?;
			}
			MenuAction::ResetView => {
				return Ok(Some(ViewCommand::Fit {
					padding: self.config.layout.padding,
				}));
			}
			MenuAction::ClearSelections => self.clear_highlighting(),
			MenuAction::ShowNetworkInfo => {
				let rows = self.stats().rows();
				self.presenter
					.present_structured_data("Network Information", &rows);
			}
		}
		Ok(None)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::annotations::Tag;
	use crate::engine::layout::ForceLayout;

	fn chain() -> Vec<RawElement> {
		vec![
			RawElement::node("A", "A"),
			RawElement::node("B", "B"),
			RawElement::node("C", "C"),
			RawElement::edge("ab", "A", "B", "feeds"),
			RawElement::edge("bc", "B", "C", "feeds"),
		]
	}

	fn interactive() -> RenderOrchestrator {
		let mut orchestrator = RenderOrchestrator::default();
		let LoadOutcome::Rebuilt(job) = orchestrator.load(chain(), Some("grid")).unwrap() else {
			panic!("first load must rebuild");
		};
		let result = ForceLayout.run(&job);
		assert!(matches!(
			orchestrator.finish_layout(&job, result),
			LayoutCompletion::Applied
		));
		orchestrator
	}

	#[test]
	fn build_starts_centred_and_transparent() {
		let mut orchestrator = RenderOrchestrator::default();
		assert_eq!(orchestrator.phase(), RenderPhase::Empty);
		orchestrator.load(chain(), None).unwrap();
		assert_eq!(orchestrator.phase(), RenderPhase::LayingOut);
		let instance = orchestrator.instance().unwrap();
		assert_eq!(instance.node_opacity(), 0.0);
		assert_eq!(instance.position("A"), Some(Position::new(400.0, 300.0)));
		assert_eq!(instance.position("ab"), None);
	}

	#[test]
	fn fade_in_runs_after_layout() {
		let mut orchestrator = interactive();
		assert_eq!(orchestrator.phase(), RenderPhase::Interactive);
		orchestrator.tick(400.0);
		let instance = orchestrator.instance().unwrap();
		assert_eq!(instance.node_opacity(), 0.5);
		assert_eq!(instance.edge_opacity(), 0.4);
		orchestrator.tick(600.0);
		let instance = orchestrator.instance().unwrap();
		assert_eq!(instance.node_opacity(), 1.0);
		assert!(!instance.is_fading_in());
	}

	#[test]
	fn malformed_load_keeps_previous_instance() {
		let mut orchestrator = interactive();
		let err = orchestrator
			.load(vec![RawElement::edge("e", "X", "Y", "x")], None)
			.unwrap_err();
		assert!(err.is_malformed());
		assert_eq!(orchestrator.phase(), RenderPhase::Interactive);
		assert_eq!(orchestrator.snapshot().unwrap().len(), 5);
		assert!(orchestrator.load_json("{oops", None).unwrap_err().is_malformed());
	}

	#[test]
	fn unknown_algorithm_resolves_to_fcose() {
		let orchestrator = RenderOrchestrator::default();
		assert_eq!(orchestrator.resolve_algorithm(Some("spiral")), LayoutAlgorithm::Fcose);
		assert_eq!(orchestrator.resolve_algorithm(Some("Grid")), LayoutAlgorithm::Grid);
	}

	#[test]
	fn select_rejects_unknown_ids_without_changing_context() {
		let mut orchestrator = interactive();
		orchestrator.select(["A"]).unwrap();
		assert!(orchestrator.select(["A", "nope"]).is_err());
		assert_eq!(orchestrator.context().selected, IdSet::from(["A".to_string()]));
	}

	#[test]
	fn remove_prunes_selection() {
		let mut orchestrator = interactive();
		orchestrator.select(["bc"]).unwrap();
		let mut removed = orchestrator.remove_element("C").unwrap();
		removed.sort();
		assert_eq!(removed, vec!["C", "bc"]);
		assert!(orchestrator.context().selected.is_empty());
		let annotations = orchestrator.annotations().unwrap();
		assert!(annotations.with_tag(Tag::Faded).is_empty());
		assert_eq!(orchestrator.phase(), RenderPhase::Interactive);
	}

	#[test]
	fn add_node_from_background_menu() {
		let mut orchestrator = interactive();
		let at = Position::new(10.0, 20.0);
		orchestrator
			.run_action(&MenuTarget::Background, MenuAction::AddNode, at)
			.unwrap();
		let snapshot = orchestrator.snapshot().unwrap();
		assert_eq!(snapshot.node_count(), 4);
		assert_eq!(orchestrator.instance().unwrap().position("node-6"), Some(at));
	}

	#[test]
	fn element_actions_need_an_element() {
		let mut orchestrator = interactive();
		let err = orchestrator
			.run_action(&MenuTarget::Background, MenuAction::ShowId, Position::default())
			.unwrap_err();
		assert!(matches!(err, GraphError::NotFound { .. }));
	}

	#[test]
	fn patch_requires_same_ids() {
		let mut orchestrator = interactive();
		let mut renamed = chain();
		renamed[0] = RawElement::node("A", "Renamed");
		orchestrator.patch_fields(renamed).unwrap();
		assert_eq!(orchestrator.snapshot().unwrap().get("A").unwrap().display_label(), "Renamed");
		assert!(matches!(
			orchestrator.patch_fields(chain()[..3].to_vec()),
			Err(GraphError::RebuildRequired)
		));
	}

	#[test]
	fn operations_without_graph() {
		let mut orchestrator = RenderOrchestrator::default();
		assert!(matches!(orchestrator.select(["A"]), Err(GraphError::NoGraph)));
		assert!(matches!(orchestrator.shortest_path("A", "B"), Err(GraphError::NoGraph)));
		assert_eq!(orchestrator.stats(), GraphStats::default());
		orchestrator.search("anything");
		assert_eq!(orchestrator.context().search_term, "anything");
	}
}
