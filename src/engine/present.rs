//! UI presentation capability and the context-menu vocabulary.
//!
//! The engine decides what to say; a [`Presenter`] decides how it looks.

use super::snapshot::{ElementGroup, Position};

/// Message level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
	/// Neutral notice.
	Info,
	/// Positive outcome.
	Success,
	/// Nothing happened, or it was partial.
	Warning,
	/// The operation failed.
	Error,
}

/// What a context menu was opened on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuTarget {
	/// A node or edge.
	Element {
		/// Element id.
		id: String,
		/// Node or edge.
		group: ElementGroup,
	},
	/// Empty canvas.
	Background,
}

/// Context menu entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
	/// Show the node id.
	ShowId,
	/// Show the node label.
	ShowLabel,
	/// Table of all node fields.
	ShowProperties,
	/// List adjacent nodes.
	ShowNeighbors,
	/// Zoom to the node.
	CenterOn,
	/// Remove the node and its edges.
	DeleteNode,
	/// Table of the edge's fields.
	ShowEdgeInfo,
	/// Highlight the edge and its endpoints.
	HighlightPath,
	/// Remove the edge.
	DeleteEdge,
	/// Add a node at the click position.
	AddNode,
	/// Fit the whole graph.
	ResetView,
	/// Clear selection and highlight.
	ClearSelections,
	/// Show graph statistics.
	ShowNetworkInfo,
}

impl MenuAction {
	/// Menu text.
	pub fn label(self) -> &'static str {
		match self {
			Self::ShowId => "Show ID",
			Self::ShowLabel => "Show Label",
			Self::ShowProperties => "Show Properties",
			Self::ShowNeighbors => "Show Neighbors",
			Self::CenterOn => "Center on Node",
			Self::DeleteNode => "Delete Node",
			Self::ShowEdgeInfo => "Show Edge Info",
			Self::HighlightPath => "Highlight Path",
			Self::DeleteEdge => "Delete Edge",
			Self::AddNode => "Add Node",
			Self::ResetView => "Reset View",
			Self::ClearSelections => "Clear Selections",
			Self::ShowNetworkInfo => "Show Network Info",
		}
	}

	/// Entries offered for `target`, in display order.
	pub fn for_target(target: &MenuTarget) -> &'static [MenuAction] {
		match target {
			MenuTarget::Element {
				group: ElementGroup::Node,
				..
			} => &[
				Self::ShowId,
				Self::ShowLabel,
				Self::ShowProperties,
				Self::ShowNeighbors,
				Self::CenterOn,
				Self::DeleteNode,
			],
			MenuTarget::Element {
				group: ElementGroup::Edge,
				..
			} => &[Self::ShowEdgeInfo, Self::HighlightPath, Self::DeleteEdge],
			MenuTarget::Background => &[
				Self::AddNode,
				Self::ResetView,
				Self::ClearSelections,
				Self::ShowNetworkInfo,
			],
		}
	}
}

/// Viewport changes the host should perform after a menu action.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewCommand {
	/// Centre the viewport on a node.
	CenterOn {
		/// Node id.
		id: String,
		/// Target zoom factor.
		zoom: f64,
	},
	/// Fit every node into the viewport.
	Fit {
		/// Margin in pixels.
		padding: f64,
	},
}

/// Rows of a key/value table.
pub type Rows = Vec<(String, String)>;

/// Sink for user-facing output.
pub trait Presenter {
	/// Short notification.
	fn present_message(&self, text: &str, severity: Severity);
	/// Titled key/value table.
	fn present_structured_data(&self, title: &str, rows: &[(String, String)]);
	/// Menu of `actions` at `position`.
	fn present_context_menu(&self, position: Position, target: &MenuTarget, actions: &[MenuAction]);
}

/// Presenter that only logs; the default when no UI is attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
	fn present_message(&self, text: &str, severity: Severity) {
		match severity {
			Severity::Error => log::error!("{text}"),
			Severity::Warning => log::warn!("{text}"),
			_ => log::info!("{text}"),
		}
	}

	fn present_structured_data(&self, title: &str, rows: &[(String, String)]) {
		log::info!("{title}: {} rows", rows.len());
	}

	fn present_context_menu(&self, position: Position, _target: &MenuTarget, actions: &[MenuAction]) {
		log::debug!(
			"context menu at ({:.0}, {:.0}) with {} actions",
			position.x,
			position.y,
			actions.len()
		);
	}
}
