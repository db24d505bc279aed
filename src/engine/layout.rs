//! Layout collaborator boundary and the built-in implementation.
//!
//! A layout run is a first-class job: it carries the generation of the graph
//! instance that asked for it, and its completion is reported back to the
//! orchestrator explicitly. Force-directed runs can be stepped a few
//! iterations per animation frame.

use std::collections::{HashMap, HashSet, VecDeque};
use std::f64::consts::PI;
use std::fmt;
use std::future::{Future, ready};
use std::rc::Rc;
use std::str::FromStr;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;
use serde::Deserialize;

use super::config::{LayoutParams, Viewport};
use super::error::{GraphError, Result};
use super::snapshot::{Position, Snapshot};

const STEP_DT: f32 = 0.016;

/// Layout names the UI can offer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutAlgorithm {
	/// Force-directed; the fallback for everything else.
	#[default]
	Fcose,
	/// Hierarchical. Not built in.
	Dagre,
	/// BFS levels from the first node of each component.
	Breadthfirst,
	/// Single ring.
	Circle,
	/// Force-directed with lighter repulsion.
	Cola,
	/// Rings by degree, highest in the centre.
	Concentric,
	/// Force-directed with stronger damping.
	Cose,
	/// Square grid.
	Grid,
	/// Layered. Not built in.
	Klay,
	/// Deterministic scatter.
	Random,
}

impl LayoutAlgorithm {
	/// Every algorithm, default first.
	pub const ALL: [LayoutAlgorithm; 10] = [
		Self::Fcose,
		Self::Dagre,
		Self::Breadthfirst,
		Self::Circle,
		Self::Cola,
		Self::Concentric,
		Self::Cose,
		Self::Grid,
		Self::Klay,
		Self::Random,
	];

	/// Lowercase name as used in configs and the UI.
	pub fn name(self) -> &'static str {
		match self {
			Self::Fcose => "fcose",
			Self::Dagre => "dagre",
			Self::Breadthfirst => "breadthfirst",
			Self::Circle => "circle",
			Self::Cola => "cola",
			Self::Concentric => "concentric",
			Self::Cose => "cose",
			Self::Grid => "grid",
			Self::Klay => "klay",
			Self::Random => "random",
		}
	}
}

impl fmt::Display for LayoutAlgorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for LayoutAlgorithm {
	type Err = GraphError;

	fn from_str(s: &str) -> Result<Self> {
		let wanted = s.trim().to_lowercase();
		Self::ALL
			.into_iter()
			.find(|a| a.name() == wanted)
			.ok_or_else(|| GraphError::LayoutUnavailable(s.to_string()))
	}
}

/// Node id to position.
pub type Positions = HashMap<String, Position>;

/// One request to the layout collaborator.
#[derive(Clone, Debug)]
pub struct LayoutJob {
	/// Instance generation the result belongs to.
	pub generation: u64,
	/// Requested algorithm.
	pub algorithm: LayoutAlgorithm,
	/// Graph to lay out.
	pub snapshot: Rc<Snapshot>,
	/// Tuning.
	pub params: LayoutParams,
	/// Target area.
	pub viewport: Viewport,
}

impl LayoutJob {
	/// Same job targeting another algorithm, used for the fallback retry.
	pub fn with_algorithm(&self, algorithm: LayoutAlgorithm) -> Self {
		Self {
			algorithm,
			..self.clone()
		}
	}
}

/// The "compute positions" capability.
pub trait LayoutEngine {
	/// Positions for every node of the job's snapshot, or `LayoutUnavailable`.
	fn compute_positions(&self, job: &LayoutJob) -> impl Future<Output = Result<Positions>>;
}

#[derive(Clone, Debug, Default)]
struct LayoutNode {
	id: String,
}

enum RunState {
	Simulating {
		graph: ForceGraph<LayoutNode, ()>,
		remaining: usize,
		viewport: Viewport,
	},
	Finished(Option<Positions>),
}

/// In-progress layout.
pub struct LayoutRun {
	state: RunState,
}

impl LayoutRun {
	fn finished(positions: Positions) -> Self {
		Self {
			state: RunState::Finished(Some(positions)),
		}
	}

	/// Advance by up to `budget` simulation steps; yields positions exactly once.
	pub fn step(&mut self, budget: usize) -> Option<Positions> {
		let positions = match &mut self.state {
			RunState::Finished(positions) => return positions.take(),
			RunState::Simulating {
				graph,
				remaining,
				viewport,
			} => {
				let steps = budget.max(1).min(*remaining);
				for _ in 0..steps {
					graph.update(STEP_DT);
				}
				*remaining -= steps;
				if *remaining > 0 {
					return None;
				}
				let mut positions = Positions::new();
				graph.visit_nodes(|node| {
					positions.insert(
						node.data.user_data.id.clone(),
						Position::new(node.x() as f64, node.y() as f64),
					);
				});
				recenter(&mut positions, *viewport);
				positions
			}
		};
		self.state = RunState::Finished(None);
		Some(positions)
	}

	/// True once positions have been produced.
	pub fn is_finished(&self) -> bool {
		matches!(self.state, RunState::Finished(_))
	}
}

/// Built-in layout collaborator.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForceLayout;

impl ForceLayout {
	/// Begin a run. Geometric layouts finish immediately.
	pub fn start(&self, job: &LayoutJob) -> Result<LayoutRun> {
		debug!(
			"layout {} for generation {} ({} nodes)",
			job.algorithm,
			job.generation,
			job.snapshot.node_count()
		);
		let snapshot = job.snapshot.as_ref();
		let positions = match job.algorithm {
			LayoutAlgorithm::Fcose | LayoutAlgorithm::Cose | LayoutAlgorithm::Cola => {
				return Ok(simulate(job));
			}
			LayoutAlgorithm::Dagre | LayoutAlgorithm::Klay => {
				return Err(GraphError::LayoutUnavailable(job.algorithm.to_string()));
			}
			LayoutAlgorithm::Grid => grid(snapshot, &job.params, job.viewport),
			LayoutAlgorithm::Circle => circle(snapshot, &job.params, job.viewport),
			LayoutAlgorithm::Concentric => concentric(snapshot, &job.params, job.viewport),
			LayoutAlgorithm::Breadthfirst => breadthfirst(snapshot, &job.params, job.viewport),
			LayoutAlgorithm::Random => random(snapshot, &job.params, job.viewport),
		};
		Ok(LayoutRun::finished(positions))
	}

	/// Run a job to completion.
	pub fn run(&self, job: &LayoutJob) -> Result<Positions> {
		let mut run = self.start(job)?;
		loop {
			if let Some(positions) = run.step(job.params.iterations.max(1)) {
				return Ok(positions);
			}
		}
	}
}

impl LayoutEngine for ForceLayout {
	fn compute_positions(&self, job: &LayoutJob) -> impl Future<Output = Result<Positions>> {
		ready(self.run(job))
	}
}

/// Deterministic pseudo-random number in `[0, 1)`.
pub(crate) fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

fn simulation_parameters(algorithm: LayoutAlgorithm, params: &LayoutParams) -> SimulationParameters {
	let scale = (params.ideal_edge_length / 100.0) as f32;
	let (force_charge, force_spring, damping_factor) = match algorithm {
		LayoutAlgorithm::Cola => (120.0, 0.08, 0.85),
		LayoutAlgorithm::Cose => (150.0, 0.05, 0.9),
		_ => (200.0, 0.05, 0.88),
	};
	SimulationParameters {
		force_charge: force_charge * scale,
		force_spring,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor,
	}
}

fn simulate(job: &LayoutJob) -> LayoutRun {
	let snapshot = job.snapshot.as_ref();
	let mut graph = ForceGraph::new(simulation_parameters(job.algorithm, &job.params));
	let (cx, cy) = job.viewport.center();
	let count = snapshot.node_count().max(1) as f64;
	let mut id_to_idx = HashMap::new();

	for (i, node) in snapshot.nodes().enumerate() {
		let jitter = if job.params.randomize {
			rand_simple(i) * 0.5
		} else {
			0.0
		};
		let angle = (i as f64 + jitter) * 2.0 * PI / count;
		let idx = graph.add_node(NodeData {
			x: (cx + 100.0 * angle.cos()) as f32,
			y: (cy + 100.0 * angle.sin()) as f32,
			mass: 10.0,
			is_anchor: false,
			user_data: LayoutNode {
				id: node.id().to_string(),
			},
		});
		id_to_idx.insert(node.id(), idx);
	}

	for edge in snapshot.edges() {
		let Some((source, target)) = edge.endpoints() else {
			continue;
		};
		if source == target {
			continue;
		}
		if let (Some(&src), Some(&tgt)) = (id_to_idx.get(source), id_to_idx.get(target)) {
			graph.add_edge(src, tgt, EdgeData::default());
		}
	}

	LayoutRun {
		state: RunState::Simulating {
			graph,
			remaining: job.params.iterations.max(1),
			viewport: job.viewport,
		},
	}
}

/// Shift positions so their centroid sits at the viewport centre.
fn recenter(positions: &mut Positions, viewport: Viewport) {
	if positions.is_empty() {
		return;
	}
	let n = positions.len() as f64;
	let (sx, sy) = positions
		.values()
		.fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
	let (cx, cy) = viewport.center();
	let (dx, dy) = (cx - sx / n, cy - sy / n);
	for p in positions.values_mut() {
		p.x += dx;
		p.y += dy;
	}
}

fn grid(snapshot: &Snapshot, params: &LayoutParams, viewport: Viewport) -> Positions {
	let n = snapshot.node_count();
	if n == 0 {
		return Positions::new();
	}
	let cols = (n as f64).sqrt().ceil() as usize;
	let rows = n.div_ceil(cols);
	let cell_w = (viewport.width - 2.0 * params.padding).max(0.0) / cols as f64;
	let cell_h = (viewport.height - 2.0 * params.padding).max(0.0) / rows as f64;
	snapshot
		.nodes()
		.enumerate()
		.map(|(i, node)| {
			let (row, col) = (i / cols, i % cols);
			let position = Position::new(
				params.padding + cell_w * (col as f64 + 0.5),
				params.padding + cell_h * (row as f64 + 0.5),
			);
			(node.id().to_string(), position)
		})
		.collect()
}

fn circle(snapshot: &Snapshot, params: &LayoutParams, viewport: Viewport) -> Positions {
	let n = snapshot.node_count();
	let (cx, cy) = viewport.center();
	let radius = if n > 1 {
		(viewport.width.min(viewport.height) / 2.0 - params.padding).max(0.0)
	} else {
		0.0
	};
	snapshot
		.nodes()
		.enumerate()
		.map(|(i, node)| {
			let angle = i as f64 * 2.0 * PI / n as f64;
			let position = Position::new(cx + radius * angle.cos(), cy + radius * angle.sin());
			(node.id().to_string(), position)
		})
		.collect()
}

/// Rings by degree, highest degree innermost.
fn concentric(snapshot: &Snapshot, params: &LayoutParams, viewport: Viewport) -> Positions {
	let mut nodes: Vec<(&str, usize)> = snapshot
		.nodes()
		.map(|n| (n.id(), snapshot.degree(n.id()).unwrap_or(0)))
		.collect();
	nodes.sort_by(|a, b| b.1.cmp(&a.1));

	let mut rings: Vec<Vec<&str>> = Vec::new();
	let mut last_degree = None;
	for (id, degree) in nodes {
		if last_degree != Some(degree) {
			rings.push(Vec::new());
			last_degree = Some(degree);
		}
		if let Some(ring) = rings.last_mut() {
			ring.push(id);
		}
	}

	let (cx, cy) = viewport.center();
	let spacing = params.ideal_edge_length;
	let mut positions = Positions::new();
	for (k, ring) in rings.iter().enumerate() {
		let radius = if k == 0 && ring.len() > 1 {
			spacing / 2.0
		} else {
			k as f64 * spacing
		};
		for (i, id) in ring.iter().enumerate() {
			let angle = i as f64 * 2.0 * PI / ring.len() as f64;
			positions.insert(
				id.to_string(),
				Position::new(cx + radius * angle.cos(), cy + radius * angle.sin()),
			);
		}
	}
	positions
}

/// Layers by breadth-first distance from the first node of each component.
fn breadthfirst(snapshot: &Snapshot, params: &LayoutParams, viewport: Viewport) -> Positions {
	let mut layers: Vec<Vec<&str>> = Vec::new();
	let mut visited: HashSet<&str> = HashSet::new();
	for root in snapshot.nodes() {
		if !visited.insert(root.id()) {
			continue;
		}
		let mut queue = VecDeque::from([(root.id(), 0usize)]);
		while let Some((current, depth)) = queue.pop_front() {
			if layers.len() <= depth {
				layers.resize_with(depth + 1, Vec::new);
			}
			layers[depth].push(current);
			for neighbor in snapshot.neighbors_of(current).unwrap_or_default() {
				if visited.insert(neighbor) {
					queue.push_back((neighbor, depth + 1));
				}
			}
		}
	}

	let usable = (viewport.width - 2.0 * params.padding).max(0.0);
	let mut positions = Positions::new();
	for (depth, layer) in layers.iter().enumerate() {
		let y = params.padding + depth as f64 * params.ideal_edge_length;
		for (i, id) in layer.iter().enumerate() {
			let x = params.padding + usable * (i + 1) as f64 / (layer.len() + 1) as f64;
			positions.insert(id.to_string(), Position::new(x, y));
		}
	}
	positions
}

fn random(snapshot: &Snapshot, params: &LayoutParams, viewport: Viewport) -> Positions {
	let usable_w = (viewport.width - 2.0 * params.padding).max(0.0);
	let usable_h = (viewport.height - 2.0 * params.padding).max(0.0);
	snapshot
		.nodes()
		.enumerate()
		.map(|(i, node)| {
			let position = Position::new(
				params.padding + rand_simple(2 * i) * usable_w,
				params.padding + rand_simple(2 * i + 1) * usable_h,
			);
			(node.id().to_string(), position)
		})
		.collect()
}
