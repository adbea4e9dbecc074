use std::f64::consts::PI;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::error::{GraphError, Result};
use super::scene::palette;
use super::state::GraphState;

const LABEL_FONT: &str = "16px \"Noto Sans JP\", \"Hiragino Kaku Gothic Pro\", sans-serif";

/// The drawable surface the engine owns.
///
/// The backing store is sized in device pixels; everything drawn on it is
/// in CSS pixels.
pub struct Surface {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	pixel_ratio: f64,
}

/// Falls back to 1 for missing or nonsensical device pixel ratios.
fn sanitize_ratio(ratio: f64) -> f64 {
	if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 }
}

/// Backing store length in device pixels for a CSS length.
fn backing_size(css: f64, ratio: f64) -> u32 {
	(css * ratio).round().max(1.0) as u32
}

impl Surface {
	/// Acquires the 2D context; fails instead of leaving a half-built engine.
	pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
		let ctx = canvas
			.get_context("2d")
			.map_err(|err| GraphError::Surface(format!("{err:?}")))?
			.ok_or_else(|| GraphError::Surface("2d context not supported".into()))?
			.dyn_into::<CanvasRenderingContext2d>()
			.map_err(|_| GraphError::Surface("unexpected context type".into()))?;
		Ok(Self {
			canvas,
			ctx,
			pixel_ratio: 1.0,
		})
	}

	/// Sizes the surface to `width`x`height` CSS pixels at the given device
	/// pixel ratio.
	pub fn resize(&mut self, width: f64, height: f64, pixel_ratio: f64) {
		let ratio = sanitize_ratio(pixel_ratio);
		self.pixel_ratio = ratio;
		self.canvas.set_width(backing_size(width, ratio));
		self.canvas.set_height(backing_size(height, ratio));
		let style = self.canvas.style();
		let _ = style.set_property("width", &format!("{width}px"));
		let _ = style.set_property("height", &format!("{height}px"));
	}

	/// False once the canvas has been removed from the document.
	pub fn is_attached(&self) -> bool {
		self.canvas.is_connected()
	}

	pub fn draw(&self, state: &GraphState) {
		render(state, &self.ctx, self.pixel_ratio);
	}
}

pub fn render(state: &GraphState, ctx: &CanvasRenderingContext2d, pixel_ratio: f64) {
	let camera = state.camera();
	let (width, height) = camera.size();
	let translation = camera.translation();

	let _ = ctx.set_transform(pixel_ratio, 0.0, 0.0, pixel_ratio, 0.0, 0.0);
	ctx.set_fill_style_str(&palette::BACKGROUND.rgba(1.0));
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	let _ = ctx.translate(translation.x, translation.y);
	let _ = ctx.scale(camera.scale(), camera.scale());
	draw_links(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: Option<f64>) {
	let pattern = match dash {
		Some(len) => js_sys::Array::of2(&JsValue::from_f64(len), &JsValue::from_f64(len)),
		None => js_sys::Array::new(),
	};
	let _ = ctx.set_line_dash(&pattern);
}

fn draw_links(state: &GraphState, ctx: &CanvasRenderingContext2d) {
	for link in state.scene().links() {
		ctx.set_stroke_style_str(&link.color.rgba(link.alpha));
		ctx.set_line_width(link.width);
		set_dash(ctx, link.dashed.then_some(4.0));
		ctx.begin_path();
		ctx.move_to(link.from.x, link.from.y);
		ctx.line_to(link.to.x, link.to.y);
		ctx.stroke();
	}
	set_dash(ctx, None);
}

fn draw_nodes(state: &GraphState, ctx: &CanvasRenderingContext2d) {
	let radius = state.config().node_radius;
	ctx.set_font(LABEL_FONT);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for visual in state.scene().visuals() {
		let (x, y) = (visual.position.x, visual.position.y);
		let style = &visual.style;

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&style.fill.rgba(1.0));
		ctx.fill();

		ctx.set_stroke_style_str(&style.stroke.rgba(style.alpha));
		ctx.set_line_width(style.stroke_width);
		set_dash(ctx, style.dashed.then_some(5.0));
		ctx.stroke();

		if style.label_visible {
			ctx.set_fill_style_str(&style.label.rgba(1.0));
			let _ = ctx.fill_text(&visual.id, x, y);
		}
	}
	set_dash(ctx, None);
}
