use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{CanvasState, NODE_RADIUS};
use crate::engine::{Annotation, Element};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];
const SEARCH_COLOR: &str = "#ffd166";
const HIGHLIGHT_COLOR: &str = "#ef476f";
const FILTERED_COLOR: &str = "#555566";
const FILTERED_ALPHA: f64 = 0.35;

/// Stable palette colour from the node's `type` field.
fn node_color(node: &Element) -> &'static str {
	let key = node.field_text("type").unwrap_or_default();
	let hash = key.bytes().fold(0usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
	COLORS[hash % COLORS.len()]
}

pub fn render(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	let Some(instance) = state.instance() else {
		return;
	};
	let faded_opacity = state.orchestrator.config().faded_opacity.0;
	let alpha_of = |a: &Annotation, base: f64| {
		let faded = if a.faded { faded_opacity } else { 1.0 };
		let filtered = if a.filtered_out { FILTERED_ALPHA } else { 1.0 };
		base * faded * filtered
	};

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	let k = state.transform.k;
	let annotations = instance.annotations();
	let font = format!("{}px sans-serif", 10.0 / k.max(0.5));

	for edge in instance.snapshot().edges() {
		let Some(a) = annotations.get(edge.id()) else {
			continue;
		};
		let Some((source, target)) = edge.endpoints() else {
			continue;
		};
		let (Some(p1), Some(p2)) = (instance.position(source), instance.position(target)) else {
			continue;
		};
		let (dx, dy) = (p2.x - p1.x, p2.y - p1.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let alpha = alpha_of(a, instance.edge_opacity());
		let color = if a.filtered_out {
			FILTERED_COLOR.to_string()
		} else if a.highlighted {
			HIGHLIGHT_COLOR.to_string()
		} else if a.search_match {
			SEARCH_COLOR.to_string()
		} else {
			format!("rgba(100, 180, 255, {})", if a.connected { 0.9 } else { 0.6 })
		};
		let width = (if a.highlighted || a.selected { 3.0 } else { 1.5 }) / k;
		let arrow_size = 8.0 / k;

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(&color);
		ctx.set_line_width(width);
		if a.highlighted {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(6.0 / k),
				&JsValue::from_f64(3.0 / k),
			));
		}
		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(p1.x + ux * NODE_RADIUS, p1.y + uy * NODE_RADIUS);
		ctx.line_to(
			p2.x - ux * (NODE_RADIUS + arrow_size),
			p2.y - uy * (NODE_RADIUS + arrow_size),
		);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		ctx.set_fill_style_str(&color);
		let (tip_x, tip_y) = (p2.x - ux * NODE_RADIUS, p2.y - uy * NODE_RADIUS);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();

		if a.label_visible {
			ctx.set_fill_style_str("rgba(220, 220, 220, 0.9)");
			ctx.set_font(&font);
			let _ = ctx.fill_text(&edge.display_label(), (p1.x + p2.x) / 2.0, (p1.y + p2.y) / 2.0);
		}
	}

	for node in instance.snapshot().nodes() {
		let Some(a) = annotations.get(node.id()) else {
			continue;
		};
		let Some(p) = instance.position(node.id()) else {
			continue;
		};
		ctx.set_global_alpha(alpha_of(a, instance.node_opacity()));

		if a.search_match || a.highlighted {
			let glow = ctx.create_radial_gradient(p.x, p.y, NODE_RADIUS * 0.3, p.x, p.y, NODE_RADIUS * 2.5);
			if let Ok(gradient) = glow {
				let rgb = if a.highlighted { "239, 71, 111" } else { "255, 209, 102" };
				let _ = gradient.add_color_stop(0.0, &format!("rgba({rgb}, 0.45)"));
				let _ = gradient.add_color_stop(1.0, &format!("rgba({rgb}, 0)"));
				ctx.begin_path();
				let _ = ctx.arc(p.x, p.y, NODE_RADIUS * 2.5, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(if a.filtered_out { FILTERED_COLOR } else { node_color(node) });
		ctx.fill();

		if a.selected || a.connected {
			ctx.set_stroke_style_str(if a.selected { "white" } else { "rgba(255, 255, 255, 0.5)" });
			ctx.set_line_width((if a.selected { 2.5 } else { 1.0 }) / k);
			ctx.stroke();
		}

		if a.label_visible {
			ctx.set_fill_style_str("white");
			ctx.set_font(&font);
			let _ = ctx.fill_text(&node.display_label(), p.x + NODE_RADIUS + 3.0, p.y + 3.0);
		}
	}

	ctx.set_global_alpha(1.0);
	ctx.restore();
}
