use log::{debug, warn};

use crate::engine::{
	ElementGroup, EngineConfig, ForceLayout, GraphInstance, LayoutCompletion, LayoutJob, LayoutRun,
	LoadOutcome, MenuTarget, Position, Presenter, RawElement, RenderOrchestrator, ViewCommand,
};

pub const NODE_RADIUS: f64 = 8.0;
pub const HIT_RADIUS: f64 = 12.0;
const EDGE_HIT_DISTANCE: f64 = 4.0;

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

pub struct CanvasState {
	pub orchestrator: RenderOrchestrator,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	layout: Option<(LayoutJob, LayoutRun)>,
}

impl CanvasState {
	pub fn new(presenter: Box<dyn Presenter>, width: f64, height: f64) -> Self {
		let config = EngineConfig::default().with_viewport(width, height);
		Self {
			orchestrator: RenderOrchestrator::with_presenter(config, presenter),
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
			layout: None,
		}
	}

	pub fn instance(&self) -> Option<&GraphInstance> {
		self.orchestrator.instance()
	}

	pub fn load(&mut self, raw: Vec<RawElement>, algorithm: &str) {
		match self.orchestrator.load(raw, Some(algorithm)) {
			Ok(LoadOutcome::Rebuilt(job)) => {
				self.transform = ViewTransform::default();
				self.start_layout(job);
			}
			Ok(LoadOutcome::Unchanged) => {}
			Err(err) => warn!("graph load rejected: {err}"),
		}
	}

	pub fn relayout(&mut self, algorithm: &str) {
		match self.orchestrator.relayout(Some(algorithm)) {
			Ok(job) => self.start_layout(job),
			Err(err) => warn!("relayout skipped: {err}"),
		}
	}

	fn start_layout(&mut self, job: LayoutJob) {
		let mut job = job;
		loop {
			match ForceLayout.start(&job) {
				Ok(run) => {
					self.layout = Some((job, run));
					return;
				}
				Err(err) => match self.orchestrator.finish_layout(&job, Err(err)) {
					LayoutCompletion::Retry(next) => job = next,
					_ => {
						self.layout = None;
						return;
					}
				},
			}
		}
	}

	/// Advance the running layout and the fade-in by one frame.
	pub fn tick(&mut self, dt_ms: f64) {
		let budget = self.orchestrator.config().layout.iterations_per_frame;
		let finished = self
			.layout
			.as_mut()
			.and_then(|(job, run)| run.step(budget).map(|positions| (job.clone(), positions)));
		if let Some((job, positions)) = finished {
			self.layout = None;
			if let LayoutCompletion::Retry(next) = self.orchestrator.finish_layout(&job, Ok(positions)) {
				self.start_layout(next);
			}
		}
		self.orchestrator.tick(dt_ms);
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Position {
		Position::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost visible element under a screen point; nodes win over edges.
	pub fn element_at(&self, sx: f64, sy: f64) -> Option<MenuTarget> {
		let instance = self.instance()?;
		let p = self.screen_to_graph(sx, sy);
		let annotations = instance.annotations();
		let visible = |id: &str| annotations.get(id).is_some_and(|a| !a.filtered_out);

		let node = instance
			.snapshot()
			.nodes()
			.filter(|node| {
				visible(node.id())
					&& instance
						.position(node.id())
						.is_some_and(|n| (n.x - p.x).hypot(n.y - p.y) < HIT_RADIUS)
			})
			.last();
		let hit = node.or_else(|| {
			instance.snapshot().edges().find(|edge| {
				let Some((source, target)) = edge.endpoints() else {
					return false;
				};
				match (instance.position(source), instance.position(target)) {
					(Some(a), Some(b)) => {
						visible(edge.id())
							&& segment_distance(p, a, b) < EDGE_HIT_DISTANCE / self.transform.k.min(1.0)
					}
					_ => false,
				}
			})
		})?;
		Some(MenuTarget::Element {
			id: hit.id().to_string(),
			group: hit.group(),
		})
	}

	/// Primary-button press at a screen point.
	///
	/// An element is selected (nodes also start a drag); the background clears
	/// selection and path highlight and starts a pan.
	pub fn press(&mut self, x: f64, y: f64) {
		match self.element_at(x, y) {
			Some(MenuTarget::Element { id, group }) => {
				if let Err(err) = self.orchestrator.select([id.clone()]) {
					debug!("selection ignored: {err}");
				}
				if group == ElementGroup::Node {
					let node_start = self.instance().and_then(|i| i.position(&id)).unwrap_or_default();
					self.drag = DragState {
						node: Some(id),
						start_x: x,
						start_y: y,
						node_start,
					};
				}
			}
			_ => {
				self.orchestrator.clear_highlighting();
				self.pan = PanState {
					active: true,
					start_x: x,
					start_y: y,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
				};
			}
		}
	}

	pub fn apply(&mut self, command: ViewCommand) {
		match command {
			ViewCommand::CenterOn { id, zoom } => {
				let Some(p) = self.instance().and_then(|i| i.position(&id)) else {
					return;
				};
				self.transform.k = zoom;
				self.transform.x = self.width / 2.0 - p.x * zoom;
				self.transform.y = self.height / 2.0 - p.y * zoom;
			}
			ViewCommand::Fit { padding } => self.fit(padding),
		}
	}

	/// Zoom and pan so every node fits inside the canvas minus `padding`.
	pub fn fit(&mut self, padding: f64) {
		let Some(instance) = self.instance() else {
			return;
		};
		let mut bounds: Option<(f64, f64, f64, f64)> = None;
		for p in instance.positions().values() {
			bounds = Some(match bounds {
				None => (p.x, p.y, p.x, p.y),
				Some((x0, y0, x1, y1)) => (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
			});
		}
		let Some((x0, y0, x1, y1)) = bounds else {
			self.transform = ViewTransform::default();
			return;
		};
		let (w, h) = ((x1 - x0).max(1.0), (y1 - y0).max(1.0));
		let k = ((self.width - 2.0 * padding) / w)
			.min((self.height - 2.0 * padding) / h)
			.clamp(0.1, 10.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - (x0 + x1) / 2.0 * k,
			y: self.height / 2.0 - (y0 + y1) / 2.0 * k,
			k,
		};
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.orchestrator.set_viewport(width, height);
	}
}

fn segment_distance(p: Position, a: Position, b: Position) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len2 = dx * dx + dy * dy;
	if len2 == 0.0 {
		return (p.x - a.x).hypot(p.y - a.y);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
	(p.x - (a.x + t * dx)).hypot(p.y - (a.y + t * dy))
}
