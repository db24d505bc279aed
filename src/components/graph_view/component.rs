use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window,
};

use super::presenter::{OpenMenu, SignalPresenter};
use super::render;
use super::state::{CanvasState, DragState};
use crate::engine::{
	ElementTypeFilter, GraphStats, JsonExporter, LabelMode, MenuAction, MenuTarget, Position,
	Presenter, RawElement, Severity,
};

type SharedState = Rc<RefCell<Option<CanvasState>>>;

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn window_size(window: &Window) -> (f64, f64) {
	let read = |v: Result<JsValue, JsValue>, fallback| v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback);
	(read(window.inner_width(), 800.0), read(window.inner_height(), 600.0))
}

/// Canvas view over a [`crate::engine::RenderOrchestrator`].
///
/// Every control signal becomes one orchestrator trigger; the canvas redraws
/// from the current annotations on each animation frame.
#[component]
pub fn GraphCanvas(
	#[prop(into)] elements: Signal<Vec<RawElement>>,
	#[prop(into)] search: Signal<String>,
	#[prop(into)] element_type: Signal<ElementTypeFilter>,
	#[prop(into)] edge_type: Signal<String>,
	#[prop(into)] label_mode: Signal<LabelMode>,
	#[prop(into)] layout: Signal<String>,
	presenter: SignalPresenter,
	#[prop(optional)] stats: Option<RwSignal<GraphStats>>,
	#[prop(optional)] export_requests: Option<RwSignal<u32>>,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let pending: RwSignal<Option<(MenuTarget, MenuAction, Position)>> = RwSignal::new(None);
	let menu_anchor = RwSignal::new((0.0, 0.0));

	let publish = move |s: &CanvasState| {
		if let Some(stats) = stats {
			stats.set(s.orchestrator.stats());
		}
	};

	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			let parent = canvas.parent_element();
			(
				parent.as_ref().map(|p| p.client_width() as f64).unwrap_or(800.0),
				parent.as_ref().map(|p| p.client_height() as f64).unwrap_or(600.0),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("2d canvas context unavailable");
			return;
		};

		let mut initial = CanvasState::new(Box::new(presenter), w, h);
		initial.orchestrator.set_element_type_filter(element_type.get_untracked());
		initial.orchestrator.set_edge_type_filter(&edge_type.get_untracked());
		initial.orchestrator.set_label_mode(label_mode.get_untracked());
		initial.load(elements.get_untracked(), &layout.get_untracked());
		initial.orchestrator.search(&search.get_untracked());
		publish(&initial);
		*state_init.borrow_mut() = Some(initial);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(16.0);
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_load = state.clone();
	Effect::new(move |_| {
		let raw = elements.get();
		if let Some(ref mut s) = *state_load.borrow_mut() {
			s.load(raw, &layout.get_untracked());
			publish(s);
		}
	});

	let state_search = state.clone();
	Effect::new(move |prev: Option<()>| {
		let term = search.get();
		// init already applied the first term
		if prev.is_some() {
			if let Some(ref mut s) = *state_search.borrow_mut() {
				s.orchestrator.search(&term);
			}
		}
	});

	let state_filters = state.clone();
	Effect::new(move |_| {
		let (mode, edge, labels) = (element_type.get(), edge_type.get(), label_mode.get());
		if let Some(ref mut s) = *state_filters.borrow_mut() {
			s.orchestrator.set_element_type_filter(mode);
			s.orchestrator.set_edge_type_filter(&edge);
			s.orchestrator.set_label_mode(labels);
		}
	});

	let state_layout = state.clone();
	Effect::new(move |prev: Option<String>| {
		let algorithm = layout.get();
		if prev.is_some() {
			if let Some(ref mut s) = *state_layout.borrow_mut() {
				s.relayout(&algorithm);
			}
		}
		algorithm
	});

	let state_export = state.clone();
	Effect::new(move |prev: Option<u32>| {
		let requests = export_requests.map(|r| r.get()).unwrap_or_default();
		if prev.is_some_and(|p| p != requests) {
			if let Some(ref s) = *state_export.borrow() {
				match s.orchestrator.export(&JsonExporter) {
					Ok(bytes) => presenter
						.exported
						.set(Some(String::from_utf8_lossy(&bytes).into_owned())),
					Err(err) => presenter.present_message(&err.to_string(), Severity::Error),
				}
			}
		}
		requests
	});

	let state_action = state.clone();
	Effect::new(move |_| {
		let Some((target, action, position)) = pending.get() else {
			return;
		};
		if let Some(ref mut s) = *state_action.borrow_mut() {
			match s.orchestrator.run_action(&target, action, position) {
				Ok(Some(command)) => s.apply(command),
				Ok(None) => {}
				Err(err) => presenter.present_message(&err.to_string(), Severity::Error),
			}
			publish(s);
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		presenter.menu.set(None);
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.press(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if let Some(id) = s.drag.node.clone() {
				let k = s.transform.k;
				let moved = Position::new(
					s.drag.node_start.x + (x - s.drag.start_x) / k,
					s.drag.node_start.y + (y - s.drag.start_y) / k,
				);
				if let Err(err) = s.orchestrator.move_node(&id, moved) {
					debug!("drag ignored: {err}");
				}
			} else if s.pan.active {
				s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
				s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.drag = DragState::default();
			s.pan.active = false;
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.drag = DragState::default();
			s.pan.active = false;
		}
	};

	let state_cm = state.clone();
	let on_contextmenu = move |ev: MouseEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref s) = *state_cm.borrow() {
			let target = s.element_at(x, y).unwrap_or(MenuTarget::Background);
			menu_anchor.set((x, y));
			s.orchestrator.open_context_menu(&target, s.screen_to_graph(x, y));
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (s.transform.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / s.transform.k;
			s.transform.x = x - (x - s.transform.x) * ratio;
			s.transform.y = y - (y - s.transform.y) * ratio;
			s.transform.k = new_k;
		}
	};

	let state_kd = state.clone();
	let on_keydown = move |ev: KeyboardEvent| {
		if ev.key() != "Escape" {
			return;
		}
		presenter.menu.set(None);
		if let Some(ref mut s) = *state_kd.borrow_mut() {
			s.orchestrator.clear_highlighting();
		}
	};

	let context_menu = move || {
		presenter.menu.get().map(|OpenMenu { position, target, actions }| {
			let (x, y) = menu_anchor.get();
			let items = actions
				.into_iter()
				.map(|action| {
					let target = target.clone();
					view! {
						<li on:click=move |_| {
							presenter.menu.set(None);
							pending.set(Some((target.clone(), action, position)));
						}>{action.label()}</li>
					}
				})
				.collect_view();
			view! {
				<ul class="context-menu" style=format!("position: absolute; left: {x}px; top: {y}px;")>
					{items}
				</ul>
			}
		})
	};

	view! {
		<div class="graph-view" style="position: relative;">
			<canvas
				node_ref=canvas_ref
				class="graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:contextmenu=on_contextmenu
				on:wheel=on_wheel
				on:keydown=on_keydown
				tabindex="0"
				style="display: block; cursor: grab;"
			/>
			{context_menu}
		</div>
	}
}
