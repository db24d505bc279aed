//! Engine error type.

use thiserror::Error;

/// Errors raised by the annotation engine.
#[derive(Debug, Error)]
pub enum GraphError {
	/// Duplicate id, dangling edge endpoint or otherwise unusable element list.
	#[error("malformed graph: {0}")]
	MalformedGraph(String),

	/// Lookup by an id that is not present in the live snapshot.
	#[error("element not found: {id}")]
	NotFound {
		/// The missing id.
		id: String,
	},

	/// The layout collaborator cannot run the requested algorithm.
	#[error("layout algorithm unavailable: {0}")]
	LayoutUnavailable(String),

	/// The operation needs a loaded graph instance.
	#[error("no graph is loaded")]
	NoGraph,

	/// A field patch was attempted against a snapshot with a different id set.
	#[error("element ids changed, a full rebuild is required")]
	RebuildRequired,

	/// Raw input could not be parsed.
	#[error("invalid graph json: {0}")]
	Json(#[from] serde_json::Error),
}

impl GraphError {
	pub(crate) fn malformed(msg: impl Into<String>) -> Self {
		Self::MalformedGraph(msg.into())
	}

	pub(crate) fn not_found(id: impl Into<String>) -> Self {
		Self::NotFound { id: id.into() }
	}

	/// Parse failures count as malformed input at the load boundary.
	pub fn is_malformed(&self) -> bool {
		matches!(self, Self::MalformedGraph(_) | Self::Json(_))
	}
}

/// Engine result alias.
pub type Result<T> = std::result::Result<T, GraphError>;
