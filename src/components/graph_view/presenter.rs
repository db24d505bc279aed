use leptos::prelude::*;

use crate::engine::{MenuAction, MenuTarget, Position, Presenter, Severity};

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
	pub text: String,
	pub severity: Severity,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
	pub title: String,
	pub rows: Vec<(String, String)>,
}

/// Context menu awaiting a choice. `position` is in graph space.
#[derive(Clone, Debug, PartialEq)]
pub struct OpenMenu {
	pub position: Position,
	pub target: MenuTarget,
	pub actions: Vec<MenuAction>,
}

/// Presenter backed by signals the page renders.
#[derive(Clone, Copy)]
pub struct SignalPresenter {
	pub toast: RwSignal<Option<Toast>>,
	pub panel: RwSignal<Option<Panel>>,
	pub menu: RwSignal<Option<OpenMenu>>,
	pub exported: RwSignal<Option<String>>,
}

impl SignalPresenter {
	pub fn new() -> Self {
		Self {
			toast: RwSignal::new(None),
			panel: RwSignal::new(None),
			menu: RwSignal::new(None),
			exported: RwSignal::new(None),
		}
	}

}

impl Default for SignalPresenter {
	fn default() -> Self {
		Self::new()
	}
}

impl Presenter for SignalPresenter {
	fn present_message(&self, text: &str, severity: Severity) {
		self.toast.set(Some(Toast {
			text: text.to_string(),
			severity,
		}));
	}

	fn present_structured_data(&self, title: &str, rows: &[(String, String)]) {
		self.panel.set(Some(Panel {
			title: title.to_string(),
			rows: rows.to_vec(),
		}));
	}

	fn present_context_menu(&self, position: Position, target: &MenuTarget, actions: &[MenuAction]) {
		self.menu.set(Some(OpenMenu {
			position,
			target: target.clone(),
			actions: actions.to_vec(),
		}));
	}
}

pub fn severity_class(severity: Severity) -> &'static str {
	match severity {
		Severity::Info => "toast toast-info",
		Severity::Success => "toast toast-success",
		Severity::Warning => "toast toast-warning",
		Severity::Error => "toast toast-error",
	}
}
