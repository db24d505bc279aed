//! Headless graph engine: snapshots, annotation composition, layout and the
//! render orchestrator that ties them together.
//!
//! Nothing in here touches the DOM, so the whole module is usable (and
//! tested) on native targets.

pub mod annotations;
pub mod config;
pub mod diff;
pub mod error;
pub mod export;
pub mod layout;
pub mod neighborhood;
pub mod orchestrator;
pub mod present;
pub mod search;
pub mod snapshot;
pub mod stats;

pub use annotations::{
	Annotation, AnnotationState, EdgeTypeFilter, ElementTypeFilter, FilterContext, LabelMode,
	SearchOutcome, Tag, compose,
};
pub use config::{EngineConfig, FadeTimings, FadedOpacity, LayoutParams, Viewport};
pub use diff::needs_full_rebuild;
pub use error::{GraphError, Result};
pub use export::{Exporter, JsonExporter};
pub use layout::{ForceLayout, LayoutAlgorithm, LayoutEngine, LayoutJob, LayoutRun, Positions};
pub use neighborhood::expand;
pub use orchestrator::{GraphInstance, LayoutCompletion, LoadOutcome, RenderOrchestrator, RenderPhase};
pub use present::{LogPresenter, MenuAction, MenuTarget, Presenter, Rows, Severity, ViewCommand};
pub use search::{MatchSet, find_matches, normalize_query};
pub use snapshot::{
	Element, ElementGroup, ElementKind, IdSet, Position, RawElement, Snapshot, parse_elements,
};
pub use stats::{GraphStats, compute_stats, shortest_path};
