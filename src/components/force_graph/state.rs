use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use crate::graph::{AnnotatedNode, Dataset, NodeId};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Radius of a node of size 1, in graph units.
pub const NODE_RADIUS: f64 = 5.0;
/// Extra pick distance around a node.
pub const HIT_SLOP: f64 = 4.0;
/// Screen pixels a press may travel before it counts as a drag instead of a click.
pub const CLICK_SLOP: f64 = 3.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
const FIT_PADDING: f64 = 40.0;
const FOCUS_ZOOM: f64 = 2.0;
const FOCUS_DURATION_MS: f64 = 800.0;
const SEED_RADIUS: f64 = 100.0;

/// Cube-root growth keeps hubs visible without swamping the view.
pub fn node_radius(size: u32) -> f64 {
	NODE_RADIUS * f64::from(size.max(1)).cbrt()
}

/// Link stroke width before screen scaling.
pub fn link_width(weight: Option<f64>) -> f64 {
	(weight.unwrap_or(1.0) / 2.0).max(0.5)
}

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub label: String,
	pub color: String,
	pub radius: f64,
}

#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub width: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl ViewTransform {
	fn lerp(&self, to: &ViewTransform, t: f64) -> ViewTransform {
		ViewTransform {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

#[derive(Clone, Debug)]
pub struct CameraTween {
	from: ViewTransform,
	to: ViewTransform,
	elapsed_ms: f64,
	duration_ms: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub moved: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

/// Colours handed out per group in order of first appearance. Survives data replacement.
#[derive(Clone, Debug, Default)]
pub struct GroupPalette {
	assigned: HashMap<String, usize>,
}

impl GroupPalette {
	pub fn color_for(&mut self, group: &str) -> &'static str {
		let next = self.assigned.len();
		let slot = *self.assigned.entry(group.to_owned()).or_insert(next);
		COLORS[slot % COLORS.len()]
	}
}

fn simulation_parameters() -> SimulationParameters {
	SimulationParameters {
		force_charge: 150.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	}
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub background: String,
	pub animation_running: bool,
	camera: Option<CameraTween>,
	palette: GroupPalette,
	ids: HashMap<NodeId, DefaultNodeIdx>,
	node_ids: HashMap<DefaultNodeIdx, NodeId>,
	edges: Vec<EdgeInfo>,
}

impl ForceGraphState {
	pub fn new(width: f64, height: f64, background: impl Into<String>) -> Self {
		Self {
			graph: ForceGraph::new(simulation_parameters()),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			background: background.into(),
			animation_running: true,
			camera: None,
			palette: GroupPalette::default(),
			ids: HashMap::new(),
			node_ids: HashMap::new(),
			edges: Vec::new(),
		}
	}

	/// Rebuilds the simulation from `data`. Nodes whose id was already on screen keep their
	/// position and pin; new ones are seeded on a circle.
	pub fn set_data(&mut self, data: &Dataset<AnnotatedNode>) {
		let mut previous: HashMap<NodeId, (f32, f32, bool)> = HashMap::new();
		self.graph.visit_nodes(|node| {
			if let Some(id) = self.node_ids.get(&node.index()) {
				previous.insert(id.clone(), (node.x(), node.y(), node.data.is_anchor));
			}
		});

		let mut graph = ForceGraph::new(simulation_parameters());
		let mut ids = HashMap::new();
		let mut node_ids = HashMap::new();
		let mut edges = Vec::new();
		let count = data.nodes.len().max(1) as f64;

		for (i, node) in data.nodes.iter().enumerate() {
			let id = &node.node.id;
			if ids.contains_key(id) {
				continue;
			}
			let (x, y, is_anchor) = previous.get(id).copied().unwrap_or_else(|| {
				let angle = (i as f64) * 2.0 * PI / count;
				(
					(SEED_RADIUS * angle.cos()) as f32,
					(SEED_RADIUS * angle.sin()) as f32,
					false,
				)
			});
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor,
				user_data: NodeInfo {
					label: node.label.clone(),
					color: self.palette.color_for(&node.group).to_string(),
					radius: node_radius(node.size),
				},
			});
			ids.insert(id.clone(), idx);
			node_ids.insert(idx, id.clone());
		}

		for link in &data.links {
			// Dangling and self-referencing links are not drawn.
			if let (Some(&src), Some(&tgt)) = (ids.get(&link.source), ids.get(&link.target)) {
				if src == tgt {
					continue;
				}
				graph.add_edge(src, tgt, EdgeData::default());
				edges.push(EdgeInfo {
					source: src,
					target: tgt,
					width: link_width(link.weight),
				});
			}
		}

		self.graph = graph;
		self.ids = ids;
		self.node_ids = node_ids;
		self.edges = edges;
		self.drag = DragState::default();
		self.hover = HoverState::default();
		self.animation_running = true;
	}

	pub fn edges(&self) -> &[EdgeInfo] {
		&self.edges
	}

	pub fn node_count(&self) -> usize {
		self.ids.len()
	}

	pub fn node_id(&self, idx: DefaultNodeIdx) -> Option<&NodeId> {
		self.node_ids.get(&idx)
	}

	pub fn node_position(&self, id: &NodeId) -> Option<(f64, f64)> {
		let idx = *self.ids.get(id)?;
		let mut pos = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				pos = Some((node.x() as f64, node.y() as f64));
			}
		});
		pos
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < node.data.user_data.radius + HIT_SLOP {
				found = Some(node.index());
			}
		});
		found
	}

	/// World-space bounding box of all nodes including their radius.
	pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
		let mut bounds: Option<(f64, f64, f64, f64)> = None;
		self.graph.visit_nodes(|node| {
			let (x, y, r) = (node.x() as f64, node.y() as f64, node.data.user_data.radius);
			bounds = Some(match bounds {
				None => (x - r, y - r, x + r, y + r),
				Some((x0, y0, x1, y1)) => (x0.min(x - r), y0.min(y - r), x1.max(x + r), y1.max(y + r)),
			});
		});
		bounds
	}

	pub fn fit_transform(&self) -> ViewTransform {
		let Some((x0, y0, x1, y1)) = self.bounds() else {
			return ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
		};
		let (bw, bh) = ((x1 - x0).max(1.0), (y1 - y0).max(1.0));
		let k = ((self.width - 2.0 * FIT_PADDING).max(1.0) / bw)
			.min((self.height - 2.0 * FIT_PADDING).max(1.0) / bh)
			.clamp(MIN_ZOOM, MAX_ZOOM);
		let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
		ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		}
	}

	/// Moves the camera to `target`, eased over `duration_ms`; zero jumps.
	pub fn animate_to(&mut self, target: ViewTransform, duration_ms: f64) {
		if duration_ms <= 0.0 {
			self.transform = target;
			self.camera = None;
		} else {
			self.camera = Some(CameraTween {
				from: self.transform,
				to: target,
				elapsed_ms: 0.0,
				duration_ms,
			});
		}
	}

	pub fn cancel_camera(&mut self) {
		self.camera = None;
	}

	#[cfg(test)]
	pub fn is_camera_moving(&self) -> bool {
		self.camera.is_some()
	}

	pub fn zoom_to_fit(&mut self, duration_ms: f64) {
		let target = self.fit_transform();
		self.animate_to(target, duration_ms);
	}

	/// Centres `id` on screen at zoom `k`. Unknown ids are ignored.
	pub fn center_on(&mut self, id: &NodeId, k: f64, duration_ms: f64) {
		let Some((nx, ny)) = self.node_position(id) else {
			return;
		};
		let k = k.clamp(MIN_ZOOM, MAX_ZOOM);
		let target = ViewTransform {
			x: self.width / 2.0 - nx * k,
			y: self.height / 2.0 - ny * k,
			k,
		};
		self.animate_to(target, duration_ms);
	}

	pub fn focus(&mut self, id: &NodeId) {
		let k = self.transform.k.max(FOCUS_ZOOM);
		self.center_on(id, k, FOCUS_DURATION_MS);
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the previous highlight around while it fades out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in &self.edges {
				if edge.source == idx {
					self.hover.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.hover.neighbors.insert(edge.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		if self.animation_running {
			self.graph.update(dt);
		}
		self.tick_camera(dt as f64 * 1000.0);

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	fn tick_camera(&mut self, dt_ms: f64) {
		let Some(tween) = self.camera.as_mut() else {
			return;
		};
		tween.elapsed_ms += dt_ms;
		let t = (tween.elapsed_ms / tween.duration_ms).min(1.0);
		self.transform = tween.from.lerp(&tween.to, ease_in_out_quad(t));
		if t >= 1.0 {
			self.camera = None;
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

fn ease_in_out_quad(t: f64) -> f64 {
	if t < 0.5 {
		2.0 * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
	}
}
