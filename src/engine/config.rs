//! Engine configuration, loadable from partial JSON.

use serde::Deserialize;

use super::error::Result;
use super::layout::LayoutAlgorithm;

/// Parameters handed to the layout collaborator.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
	/// Margin kept around the laid-out graph.
	pub padding: f64,
	/// Preferred edge length in graph units.
	pub ideal_edge_length: f64,
	/// Simulation steps for force-directed algorithms.
	pub iterations: usize,
	/// Steps run per animation frame when a layout is stepped incrementally.
	pub iterations_per_frame: usize,
	/// Seed force layouts from random positions.
	pub randomize: bool,
}

impl Default for LayoutParams {
	fn default() -> Self {
		Self {
			padding: 30.0,
			ideal_edge_length: 100.0,
			iterations: 300,
			iterations_per_frame: 10,
			randomize: true,
		}
	}
}

/// Fade-in durations after a layout completes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FadeTimings {
	/// Node fade duration.
	pub node_ms: f64,
	/// Edge fade duration.
	pub edge_ms: f64,
}

impl Default for FadeTimings {
	fn default() -> Self {
		Self {
			node_ms: 800.0,
			edge_ms: 1000.0,
		}
	}
}

/// Drawing surface size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Viewport {
	/// Width.
	pub width: f64,
	/// Height.
	pub height: f64,
}

impl Viewport {
	/// Centre point.
	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			width: 800.0,
			height: 600.0,
		}
	}
}

/// Engine-wide settings. Missing JSON keys keep their defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	/// Initial viewport.
	pub viewport: Viewport,
	/// Algorithm used when none is named.
	pub default_layout: LayoutAlgorithm,
	/// Layout parameters.
	pub layout: LayoutParams,
	/// Fade-in timings.
	pub fade: FadeTimings,
	/// Opacity of faded elements.
	pub faded_opacity: FadedOpacity,
}

/// Opacity applied to `Faded` elements.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FadedOpacity(pub f64);

impl Default for FadedOpacity {
	fn default() -> Self {
		Self(0.2)
	}
}

impl EngineConfig {
	/// Parse a (possibly partial) JSON config.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Same config with a different viewport.
	pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
		self.viewport = Viewport { width, height };
		self
	}
}
