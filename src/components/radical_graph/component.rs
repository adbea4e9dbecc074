use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::GraphConfig;
use super::render::Surface;
use super::state::{GraphCommand, GraphEvent, GraphState};
use super::types::{ReferenceData, SelectedEntry, Vec2};

const FRAME_DT: f64 = 1.0 / 60.0;
const PRIMARY_BUTTON: i16 = 0;

struct Mounted {
	state: GraphState,
	surface: Surface,
}

type Shared = Rc<RefCell<Option<Mounted>>>;
type ClosureSlot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Host callbacks, invoked after the engine borrow is released.
#[derive(Clone)]
struct Hooks {
	on_select: Option<Callback<Option<SelectedEntry>>>,
	on_notice: Option<Callback<String>>,
}

impl Hooks {
	fn dispatch(&self, events: Vec<GraphEvent>) {
		for event in events {
			match event {
				GraphEvent::Selected(entry) => {
					if let Some(cb) = &self.on_select {
						cb.run(entry);
					}
				}
				GraphEvent::Notice(message) => {
					if let Some(cb) = &self.on_notice {
						cb.run(message);
					}
				}
			}
		}
	}
}

/// Runs an input handler; redraws immediately when it asks for it.
fn interact(mounted: &Shared, handler: impl FnOnce(&mut GraphState) -> bool) -> Vec<GraphEvent> {
	let mut guard = mounted.borrow_mut();
	let Some(m) = guard.as_mut() else {
		return Vec::new();
	};
	if handler(&mut m.state) {
		m.surface.draw(&m.state);
	}
	m.state.take_events()
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Vec2> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Vec2::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Unhooks the window resize listener and drops the frame loop, which holds
/// a reference to itself.
fn release(resize_cb: &ClosureSlot, animate: &ClosureSlot) {
	if let (Some(cb), Some(win)) = (resize_cb.borrow_mut().take(), web_sys::window()) {
		let _ = win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
	}
	animate.borrow_mut().take();
}

fn window_size(window: &Window) -> (f64, f64) {
	(
		window
			.inner_width()
			.ok()
			.and_then(|v| v.as_f64())
			.unwrap_or(800.0),
		window
			.inner_height()
			.ok()
			.and_then(|v| v.as_f64())
			.unwrap_or(600.0),
	)
}

/// Canvas explorer for a radical dataset.
///
/// The host drives it with [`GraphCommand`]s and hears back through
/// `on_select` and `on_notice`.
#[component]
pub fn RadicalGraphCanvas(
	#[prop(into)] data: Signal<ReferenceData>,
	/// Latest host request; applied once the surface exists.
	#[prop(into)]
	command: Signal<Option<GraphCommand>>,
	#[prop(optional)] on_select: Option<Callback<Option<SelectedEntry>>>,
	#[prop(optional)] on_notice: Option<Callback<String>>,
	#[prop(optional)] config: GraphConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let mounted: Shared = Rc::new(RefCell::new(None));
	let pending: Rc<RefCell<Vec<GraphCommand>>> = Rc::new(RefCell::new(Vec::new()));
	let animate: ClosureSlot = Rc::new(RefCell::new(None));
	let resize_cb: ClosureSlot = Rc::new(RefCell::new(None));
	let hooks = Hooks {
		on_select,
		on_notice,
	};
	let (mounted_init, pending_init, animate_init, resize_cb_init, hooks_init) = (
		mounted.clone(),
		pending.clone(),
		animate.clone(),
		resize_cb.clone(),
		hooks.clone(),
	);

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
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};

		let mut surface = match Surface::new(canvas.clone()) {
			Ok(surface) => surface,
			Err(err) => {
				error!("{err}");
				hooks_init.dispatch(vec![GraphEvent::Notice(err.to_string())]);
				return;
			}
		};
		surface.resize(w, h, window.device_pixel_ratio());

		let mut state = GraphState::new(data.get_untracked(), config.clone(), w, h);
		for command in pending_init.borrow_mut().drain(..) {
			state.apply(command);
		}
		let events = state.take_events();
		*mounted_init.borrow_mut() = Some(Mounted { state, surface });
		hooks_init.dispatch(events);

		if fullscreen {
			let mounted_resize = mounted_init.clone();
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				if let Some(ref mut m) = *mounted_resize.borrow_mut() {
					m.surface.resize(nw, nh, win.device_pixel_ratio());
					m.state.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (mounted_anim, animate_inner, resize_anim, hooks_anim) = (
			mounted_init.clone(),
			animate_init.clone(),
			resize_cb_init.clone(),
			hooks_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let events = {
				let mut guard = mounted_anim.borrow_mut();
				let Some(m) = guard.as_mut() else {
					return;
				};
				if !m.surface.is_attached() {
					m.state.teardown();
					*guard = None;
					drop(guard);
					release(&resize_anim, &animate_inner);
					return;
				}
				// input for this frame has already been applied by the handlers
				m.state.frame(FRAME_DT);
				m.surface.draw(&m.state);
				m.state.take_events()
			};
			hooks_anim.dispatch(events);
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
		info!("radical graph mounted at {w}x{h}");
	});

	let (mounted_cmd, hooks_cmd) = (mounted.clone(), hooks.clone());
	Effect::new(move |_| {
		let Some(command) = command.get() else {
			return;
		};
		let events = {
			let mut guard = mounted_cmd.borrow_mut();
			match guard.as_mut() {
				Some(m) => {
					m.state.apply(command);
					m.surface.draw(&m.state);
					m.state.take_events()
				}
				None => {
					pending.borrow_mut().push(command);
					Vec::new()
				}
			}
		};
		hooks_cmd.dispatch(events);
	});

	let (mounted_md, hooks_md) = (mounted.clone(), hooks.clone());
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != PRIMARY_BUTTON {
			return;
		}
		let Some(at) = pointer(canvas_ref, &ev) else {
			return;
		};
		hooks_md.dispatch(interact(&mounted_md, |s| s.pointer_down(at)));
	};

	let mounted_mm = mounted.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(at) = pointer(canvas_ref, &ev) else {
			return;
		};
		interact(&mounted_mm, |s| s.pointer_move(at));
	};

	let mounted_mu = mounted.clone();
	let on_mouseup = move |ev: MouseEvent| {
		if ev.button() != PRIMARY_BUTTON {
			return;
		}
		let Some(at) = pointer(canvas_ref, &ev) else {
			return;
		};
		interact(&mounted_mu, |s| s.pointer_up(at));
	};

	let mounted_ml = mounted.clone();
	let on_mouseleave = move |_: MouseEvent| {
		interact(&mounted_ml, GraphState::pointer_leave);
	};

	let mounted_wh = mounted.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(at) = pointer(canvas_ref, &ev) else {
			return;
		};
		let delta_y = ev.delta_y();
		interact(&mounted_wh, |s| s.wheel(at, delta_y));
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="radical-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
