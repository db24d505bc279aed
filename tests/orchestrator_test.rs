use std::cell::RefCell;
use std::future::{Future, ready};
use std::rc::Rc;

use annotated_graph_canvas::engine::{
	ElementGroup, ElementTypeFilter, EngineConfig, ForceLayout, GraphError, JsonExporter,
	LabelMode, LayoutAlgorithm, LayoutCompletion, LayoutEngine, LayoutJob, LoadOutcome, MenuAction,
	MenuTarget, Position, Positions, Presenter, RawElement, RenderOrchestrator, RenderPhase,
	Severity, Tag, ViewCommand, parse_elements,
};
use pretty_assertions::assert_eq;

#[derive(Clone, Debug, PartialEq)]
enum Shown {
	Message(String, Severity),
	Data(String, Vec<(String, String)>),
	Menu(Vec<MenuAction>),
}

/// Presenter that records everything into a shared log.
#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<Shown>>>);

impl Recorder {
	fn take(&self) -> Vec<Shown> {
		std::mem::take(&mut self.0.borrow_mut())
	}
}

impl Presenter for Recorder {
	fn present_message(&self, text: &str, severity: Severity) {
		self.0.borrow_mut().push(Shown::Message(text.to_string(), severity));
	}

	fn present_structured_data(&self, title: &str, rows: &[(String, String)]) {
		self.0.borrow_mut().push(Shown::Data(title.to_string(), rows.to_vec()));
	}

	fn present_context_menu(&self, _position: Position, _target: &MenuTarget, actions: &[MenuAction]) {
		self.0.borrow_mut().push(Shown::Menu(actions.to_vec()));
	}
}

/// Layout engine that records which algorithms it was asked for.
#[derive(Default)]
struct CountingEngine {
	calls: RefCell<Vec<LayoutAlgorithm>>,
}

impl LayoutEngine for CountingEngine {
	fn compute_positions(&self, job: &LayoutJob) -> impl Future<Output = Result<Positions, GraphError>> {
		self.calls.borrow_mut().push(job.algorithm);
		ready(ForceLayout.run(job))
	}
}

/// Layout engine that can run nothing.
#[derive(Default)]
struct BrokenEngine {
	calls: RefCell<Vec<LayoutAlgorithm>>,
}

impl LayoutEngine for BrokenEngine {
	fn compute_positions(&self, job: &LayoutJob) -> impl Future<Output = Result<Positions, GraphError>> {
		self.calls.borrow_mut().push(job.algorithm);
		ready(Err(GraphError::LayoutUnavailable(job.algorithm.to_string())))
	}
}

fn abc() -> Vec<RawElement> {
	vec![
		RawElement::node("A", "A").with_field("description", "first"),
		RawElement::node("B", "B"),
		RawElement::node("C", "C"),
		RawElement::edge("ab", "A", "B", "feeds"),
		RawElement::edge("bc", "B", "C", "feeds"),
	]
}

fn orchestrator() -> (RenderOrchestrator, Recorder) {
	let recorder = Recorder::default();
	let orchestrator = RenderOrchestrator::with_presenter(EngineConfig::default(), Box::new(recorder.clone()));
	(orchestrator, recorder)
}

fn ready_graph() -> (RenderOrchestrator, Recorder) {
	let (mut orchestrator, recorder) = orchestrator();
	pollster::block_on(orchestrator.load_and_layout(abc(), Some("grid"), &ForceLayout)).unwrap();
	(orchestrator, recorder)
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn load_lays_out_and_fades_in() {
	let engine = CountingEngine::default();
	let (mut orchestrator, _) = orchestrator();
	let outcome = pollster::block_on(orchestrator.load_and_layout(abc(), None, &engine)).unwrap();
	assert!(matches!(outcome, LoadOutcome::Rebuilt(_)));
	assert_eq!(orchestrator.phase(), RenderPhase::Interactive);
	assert_eq!(*engine.calls.borrow(), vec![LayoutAlgorithm::Fcose]);

	let instance = orchestrator.instance().unwrap();
	assert!(instance.is_fading_in());
	assert_eq!(instance.positions().len(), 3);

	orchestrator.tick(1000.0);
	let instance = orchestrator.instance().unwrap();
	assert_eq!((instance.node_opacity(), instance.edge_opacity()), (1.0, 1.0));
}

#[test]
fn identical_reload_skips_layout() {
	let engine = CountingEngine::default();
	let (mut orchestrator, _) = orchestrator();
	pollster::block_on(orchestrator.load_and_layout(abc(), Some("grid"), &engine)).unwrap();
	let generation = orchestrator.instance().unwrap().generation();

	let outcome = pollster::block_on(orchestrator.load_and_layout(abc(), Some("grid"), &engine)).unwrap();
	assert!(matches!(outcome, LoadOutcome::Unchanged));
	assert_eq!(engine.calls.borrow().len(), 1);
	assert_eq!(orchestrator.instance().unwrap().generation(), generation);
	assert_eq!(orchestrator.phase(), RenderPhase::Interactive);
}

#[test]
fn stale_layout_completion_is_ignored() {
	let (mut orchestrator, _) = orchestrator();
	let LoadOutcome::Rebuilt(first) = orchestrator.load(abc(), Some("grid")).unwrap() else {
		panic!("expected rebuild");
	};
	let LoadOutcome::Rebuilt(second) = orchestrator.load(abc()[..2].to_vec(), Some("grid")).unwrap() else {
		panic!("expected rebuild");
	};

	let stale = ForceLayout.run(&first);
	assert!(matches!(orchestrator.finish_layout(&first, stale), LayoutCompletion::Stale));
	assert_eq!(orchestrator.phase(), RenderPhase::LayingOut);
	assert_eq!(orchestrator.instance().unwrap().position("C"), None);

	let fresh = ForceLayout.run(&second);
	assert!(matches!(orchestrator.finish_layout(&second, fresh), LayoutCompletion::Applied));
	assert_eq!(orchestrator.phase(), RenderPhase::Interactive);
}

#[test]
fn unavailable_layout_falls_back_to_fcose() {
	let engine = CountingEngine::default();
	let (mut orchestrator, _) = orchestrator();
	pollster::block_on(orchestrator.load_and_layout(abc(), Some("dagre"), &engine)).unwrap();
	assert_eq!(
		*engine.calls.borrow(),
		vec![LayoutAlgorithm::Dagre, LayoutAlgorithm::Fcose]
	);
	assert_eq!(orchestrator.phase(), RenderPhase::Interactive);
}

#[test]
fn unknown_layout_name_uses_fcose() {
	let engine = CountingEngine::default();
	let (mut orchestrator, _) = orchestrator();
	pollster::block_on(orchestrator.load_and_layout(abc(), Some("hexagonal"), &engine)).unwrap();
	assert_eq!(*engine.calls.borrow(), vec![LayoutAlgorithm::Fcose]);
}

#[test]
fn malformed_load_leaves_graph_untouched() {
	let (mut orchestrator, _) = ready_graph();
	let before = orchestrator.snapshot().unwrap().clone();

	let duplicate = vec![RawElement::node("A", "A"), RawElement::node("A", "again")];
	assert!(orchestrator.load(duplicate, None).unwrap_err().is_malformed());
	let dangling = vec![RawElement::node("A", "A"), RawElement::edge("ax", "A", "X", "feeds")];
	assert!(orchestrator.load(dangling, None).unwrap_err().is_malformed());
	assert!(orchestrator.load_json("[{\"data\":", None).unwrap_err().is_malformed());

	assert_eq!(orchestrator.snapshot().unwrap().to_raw(), before.to_raw());
	assert_eq!(orchestrator.phase(), RenderPhase::Interactive);
}

#[test]
fn failed_edits_leave_graph_untouched() {
	let (mut orchestrator, _) = ready_graph();
	let snapshot = orchestrator.snapshot().unwrap().to_raw();
	let positions = orchestrator.instance().unwrap().positions().clone();

	let duplicate = RawElement::node("A", "again").with_position(Position::new(5.0, 5.0));
	assert!(orchestrator.add_element(duplicate).unwrap_err().is_malformed());
	let dangling = RawElement::edge("cx", "C", "X", "feeds");
	assert!(orchestrator.add_element(dangling).unwrap_err().is_malformed());
	let mut patch = abc();
	patch.push(RawElement::node("B", "twice"));
	assert!(orchestrator.patch_fields(patch).unwrap_err().is_malformed());

	assert_eq!(orchestrator.snapshot().unwrap().to_raw(), snapshot);
	assert_eq!(orchestrator.instance().unwrap().positions(), &positions);
	assert_eq!(orchestrator.phase(), RenderPhase::Interactive);
}

#[test]
fn failed_fallback_still_goes_interactive() {
	let engine = BrokenEngine::default();
	let (mut orchestrator, _) = orchestrator();
	let LoadOutcome::Rebuilt(job) = orchestrator.load(abc(), Some("dagre")).unwrap() else {
		panic!("expected rebuild");
	};
	let completion = pollster::block_on(orchestrator.drive_layout(job, &engine));
	assert!(matches!(completion, LayoutCompletion::Abandoned));
	assert_eq!(
		*engine.calls.borrow(),
		vec![LayoutAlgorithm::Dagre, LayoutAlgorithm::Fcose]
	);
	assert_eq!(orchestrator.phase(), RenderPhase::Interactive);
	assert_eq!(orchestrator.snapshot().unwrap().len(), 5);
}

#[test]
fn teardown_returns_to_empty() {
	let (mut orchestrator, _) = ready_graph();
	assert!(orchestrator.teardown().is_some());
	assert_eq!(orchestrator.phase(), RenderPhase::Empty);
	assert!(orchestrator.snapshot().is_none());
}

// ============================================================================
// Triggers
// ============================================================================

#[test]
fn search_reports_matches_and_clears_selection() {
	let (mut orchestrator, recorder) = ready_graph();
	orchestrator.select(["C"]).unwrap();

	orchestrator.search("  FIRST ");
	assert!(orchestrator.context().selected.is_empty());
	let annotations = orchestrator.annotations().unwrap();
	assert_eq!(annotations.selected().len(), 1);
	assert!(annotations.get("A").unwrap().has(Tag::SearchMatch));
	assert_eq!(
		recorder.take(),
		vec![Shown::Message(
			"Found 1 matching elements for \"  FIRST \"".into(),
			Severity::Success
		)]
	);

	orchestrator.search("nothing here");
	assert_eq!(
		recorder.take(),
		vec![Shown::Message(
			"No elements found matching \"nothing here\"".into(),
			Severity::Warning
		)]
	);
}

#[test]
fn triggers_stay_interactive() {
	let (mut orchestrator, _) = ready_graph();
	orchestrator.select(["A"]).unwrap();
	orchestrator.set_element_type_filter(ElementTypeFilter::EdgesOnly);
	orchestrator.set_edge_type_filter("feeds");
	orchestrator.set_label_mode(LabelMode::None);
	orchestrator.add_element(RawElement::node("D", "D")).unwrap();
	orchestrator.remove_element("D").unwrap();
	assert_eq!(orchestrator.phase(), RenderPhase::Interactive);

	let annotations = orchestrator.annotations().unwrap();
	assert!(annotations.get("A").unwrap().has(Tag::FilteredOut));
	assert!(annotations.get("bc").unwrap().has(Tag::Faded));
	assert!(annotations.iter().all(|(_, a)| !a.label_visible));
}

#[test]
fn filters_apply_while_laying_out() {
	let (mut orchestrator, _) = orchestrator();
	orchestrator.load(abc(), None).unwrap();
	orchestrator.set_element_type_filter(ElementTypeFilter::NodesOnly);
	assert_eq!(orchestrator.phase(), RenderPhase::LayingOut);
	let annotations = orchestrator.annotations().unwrap();
	assert!(annotations.get("ab").unwrap().has(Tag::FilteredOut));
}

#[test]
fn shortest_path_and_highlight() {
	let (mut orchestrator, recorder) = ready_graph();
	assert_eq!(orchestrator.shortest_path("A", "C").unwrap(), vec!["A", "ab", "B", "bc", "C"]);
	assert!(matches!(
		orchestrator.shortest_path("A", "nope"),
		Err(GraphError::NotFound { .. })
	));

	orchestrator.highlight_path("C", "A").unwrap();
	let annotations = orchestrator.annotations().unwrap();
	assert_eq!(annotations.with_tag(Tag::Highlighted).len(), 5);

	orchestrator.add_element(RawElement::node("island", "Island")).unwrap();
	assert!(orchestrator.highlight_path("A", "island").unwrap().is_empty());
	assert_eq!(recorder.take().len(), 1);

	orchestrator.clear_highlighting();
	assert!(orchestrator.annotations().unwrap().with_tag(Tag::Highlighted).is_empty());
}

#[test]
fn stats_track_edits() {
	let (mut orchestrator, _) = ready_graph();
	let stats = orchestrator.stats();
	assert_eq!((stats.node_count, stats.edge_count, stats.connected_components), (3, 2, 1));
	assert_eq!(stats.average_degree_display(), "1.33");

	orchestrator.remove_element("B").unwrap();
	let stats = orchestrator.stats();
	assert_eq!((stats.node_count, stats.edge_count, stats.connected_components), (2, 0, 2));
}

// ============================================================================
// Context menu and export
// ============================================================================

#[test]
fn node_menu_actions() {
	let (mut orchestrator, recorder) = ready_graph();
	let target = MenuTarget::Element {
		id: "B".into(),
		group: ElementGroup::Node,
	};
	orchestrator.open_context_menu(&target, Position::default());
	assert_eq!(
		recorder.take(),
		vec![Shown::Menu(vec![
			MenuAction::ShowId,
			MenuAction::ShowLabel,
			MenuAction::ShowProperties,
			MenuAction::ShowNeighbors,
			MenuAction::CenterOn,
			MenuAction::DeleteNode,
		])]
	);

	orchestrator
		.run_action(&target, MenuAction::ShowNeighbors, Position::default())
		.unwrap();
	assert_eq!(
		recorder.take(),
		vec![Shown::Data(
			"Node Neighbors (2)".into(),
			vec![("A".into(), "A".into()), ("C".into(), "C".into())]
		)]
	);

	let command = orchestrator
		.run_action(&target, MenuAction::CenterOn, Position::default())
		.unwrap();
	assert_eq!(command, Some(ViewCommand::CenterOn { id: "B".into(), zoom: 2.0 }));

	orchestrator
		.run_action(&target, MenuAction::DeleteNode, Position::default())
		.unwrap();
	assert_eq!(orchestrator.snapshot().unwrap().len(), 2);
}

#[test]
fn edge_info_lists_endpoints_then_fields() {
	let (mut orchestrator, recorder) = ready_graph();
	let target = MenuTarget::Element {
		id: "ab".into(),
		group: ElementGroup::Edge,
	};
	orchestrator
		.run_action(&target, MenuAction::ShowEdgeInfo, Position::default())
		.unwrap();
	assert_eq!(
		recorder.take(),
		vec![Shown::Data(
			"Edge Information".into(),
			vec![
				("Source".into(), "A".into()),
				("Target".into(), "B".into()),
				("id".into(), "ab".into()),
				("label".into(), "feeds".into()),
			]
		)]
	);
}

#[test]
fn background_menu_actions() {
	let (mut orchestrator, recorder) = ready_graph();
	let fit = orchestrator
		.run_action(&MenuTarget::Background, MenuAction::ResetView, Position::default())
		.unwrap();
	assert_eq!(fit, Some(ViewCommand::Fit { padding: 30.0 }));

	orchestrator
		.run_action(&MenuTarget::Background, MenuAction::ShowNetworkInfo, Position::default())
		.unwrap();
	let shown = recorder.take();
	let Some(Shown::Data(title, rows)) = shown.first() else {
		panic!("expected structured data, got {shown:?}");
	};
	assert_eq!(title, "Network Information");
	assert_eq!(rows[2], ("Connected Components".into(), "1".into()));
}

#[test]
fn export_round_trips_through_load() {
	let (orchestrator, _) = ready_graph();
	let bytes = orchestrator.export(&JsonExporter).unwrap();
	let json = String::from_utf8(bytes).unwrap();

	let raw = parse_elements(&json).unwrap();
	assert_eq!(raw.len(), 5);
	assert!(raw.iter().filter(|r| r.group == Some(ElementGroup::Node)).all(|r| r.position.is_some()));

	let (mut reloaded, _) = orchestrator_with(&json);
	assert_eq!(reloaded.snapshot().unwrap().node_count(), 3);
	assert!(matches!(reloaded.load_json(&json, None), Ok(LoadOutcome::Unchanged)));
}

fn orchestrator_with(json: &str) -> (RenderOrchestrator, Recorder) {
	let (mut orchestrator, recorder) = orchestrator();
	orchestrator.load_json(json, None).unwrap();
	(orchestrator, recorder)
}
