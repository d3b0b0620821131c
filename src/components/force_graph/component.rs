use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::label::LabelCache;
use super::render;
use super::state::{ForceGraphState, CLICK_SLOP, MAX_ZOOM, MIN_ZOOM};
use crate::controller::GraphView;
use crate::graph::{AnnotatedNode, Dataset, NodeId};

/// Shared handle to the canvas' simulation state.
///
/// The controller drives the graph through this handle; the canvas component reads the
/// same state every animation frame. Cloning is cheap.
#[derive(Clone)]
pub struct GraphHandle {
	state: Rc<RefCell<ForceGraphState>>,
}

impl GraphHandle {
	/// Empty graph drawn on `background`.
	pub fn new(background: impl Into<String>) -> Self {
		Self {
			state: Rc::new(RefCell::new(ForceGraphState::new(800.0, 600.0, background))),
		}
	}
}

impl GraphView for GraphHandle {
	fn show(&mut self, data: &Dataset<AnnotatedNode>) {
		let mut state = self.state.borrow_mut();
		state.set_data(data);
		log::debug!("Canvas now shows {} nodes, {} edges", state.node_count(), state.edges().len());
	}

	fn zoom_to_fit(&mut self, duration_ms: f64) {
		self.state.borrow_mut().zoom_to_fit(duration_ms);
	}

	fn center_on(&mut self, id: &NodeId, zoom: f64, duration_ms: f64) {
		self.state.borrow_mut().center_on(id, zoom, duration_ms);
	}

	fn focus(&mut self, id: &NodeId) {
		self.state.borrow_mut().focus(id);
	}
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn local_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn set_cursor(canvas: &HtmlCanvasElement, cursor: &str) {
	let _ = web_sys::HtmlElement::style(canvas).set_property("cursor", cursor);
}

/// Force-directed canvas bound to a [`GraphHandle`].
#[component]
pub fn ForceGraphCanvas(
	handle: GraphHandle,
	/// Called with the id of a node that was clicked (pressed and released without dragging).
	on_node_click: Rc<dyn Fn(NodeId)>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state = handle.state.clone();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
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
			window_size(&window).unwrap_or((800.0, 600.0))
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
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				log::error!("Canvas 2d context unavailable");
				return;
			}
		};
		let Some(document) = window.document() else {
			return;
		};
		let mut labels = LabelCache::new(document);
		{
			let mut s = state_init.borrow_mut();
			s.resize(w, h);
			s.zoom_to_fit(0.0);
		}

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				state_resize.borrow_mut().resize(nw, nh);
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			{
				let mut s = state_anim.borrow_mut();
				s.tick(0.016);
				render::render(&s, &ctx, &mut labels);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_position(&canvas, &ev);
		let s = &mut *state_md.borrow_mut();
		s.cancel_camera();
		if let Some(idx) = s.node_at_position(x, y) {
			s.drag.active = true;
			s.drag.moved = false;
			s.drag.node_idx = Some(idx);
			s.drag.start_x = x;
			s.drag.start_y = y;
			s.graph.visit_nodes(|node| {
				if node.index() == idx {
					s.drag.node_start_x = node.x();
					s.drag.node_start_y = node.y();
				}
			});
		} else {
			s.pan.active = true;
			s.pan.start_x = x;
			s.pan.start_y = y;
			s.pan.transform_start_x = s.transform.x;
			s.pan.transform_start_y = s.transform.y;
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_position(&canvas, &ev);
		let s = &mut *state_mm.borrow_mut();

		if !s.drag.active {
			let hovered = s.node_at_position(x, y);
			set_cursor(&canvas, if hovered.is_some() { "pointer" } else { "grab" });
			s.set_hover(hovered);
		}

		if s.drag.active {
			let Some(idx) = s.drag.node_idx else {
				return;
			};
			let (sdx, sdy) = (x - s.drag.start_x, y - s.drag.start_y);
			if !s.drag.moved && (sdx * sdx + sdy * sdy).sqrt() <= CLICK_SLOP {
				return;
			}
			s.drag.moved = true;
			let (nx, ny) = (
				s.drag.node_start_x + (sdx / s.transform.k) as f32,
				s.drag.node_start_y + (sdy / s.transform.k) as f32,
			);
			s.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.x = nx;
					node.data.y = ny;
					node.data.is_anchor = true;
				}
			});
		} else if s.pan.active {
			s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
			s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let clicked = {
			let s = &mut *state_mu.borrow_mut();
			let clicked = match (s.drag.active, s.drag.moved, s.drag.node_idx) {
				(true, false, Some(idx)) => s.node_id(idx).cloned(),
				_ => None,
			};
			s.drag.active = false;
			s.drag.moved = false;
			s.drag.node_idx = None;
			s.pan.active = false;
			clicked
		};
		// The click handler drives the controller, which borrows the state again.
		if let Some(id) = clicked {
			on_node_click(id);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let s = &mut *state_ml.borrow_mut();
		s.drag.active = false;
		s.drag.node_idx = None;
		s.pan.active = false;
		s.set_hover(None);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_position(&canvas, &ev);
		let s = &mut *state_wh.borrow_mut();
		s.cancel_camera();
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		let new_k = (s.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / s.transform.k;
		s.transform.x = x - (x - s.transform.x) * ratio;
		s.transform.y = y - (y - s.transform.y) * ratio;
		s.transform.k = new_k;
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
