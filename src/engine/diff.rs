//! Deciding whether a new snapshot needs a full rebuild.

use std::collections::HashSet;

use log::debug;

use super::snapshot::Snapshot;

/// Whether moving from `previous` to `next` needs a destroy-and-relayout.
///
/// Only the id sets are compared. Data-field changes on existing ids are
/// invisible here; they go through the field patch path instead.
pub fn needs_full_rebuild(previous: Option<&Snapshot>, next: &Snapshot) -> bool {
	let Some(previous) = previous else {
		debug!("no previous snapshot, rebuilding");
		return true;
	};
	if previous.len() != next.len() {
		debug!("element count changed {} -> {}", previous.len(), next.len());
		return true;
	}
	let before: HashSet<&str> = previous.ids().collect();
	let after: HashSet<&str> = next.ids().collect();
	let changed = before.symmetric_difference(&after).next().is_some();
	if changed {
		debug!("element ids changed with equal count");
	}
	changed
}
