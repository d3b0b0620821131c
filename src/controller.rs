//! The view controller: owns the current dataset and turns user and host events into
//! re-renders.
//!
//! Rendering goes through [`GraphView`], host notifications through an optional
//! [`HostBridge`]. Each operation reads the current dataset plus its input, updates the
//! status line and replaces what the view shows.

use crate::bridge::HostBridge;
use crate::config::ViewerConfig;
use crate::graph::{annotate, filter_by_weight, find_node, AnnotatedNode, Dataset, NodeId};
use crate::loader::LoadError;

/// What the controller needs from a renderer.
pub trait GraphView {
	/// Replaces everything on screen with `data`.
	fn show(&mut self, data: &Dataset<AnnotatedNode>);
	/// Frames all nodes. `duration_ms == 0` jumps.
	fn zoom_to_fit(&mut self, duration_ms: f64);
	/// Centres on a node and sets the zoom factor.
	fn center_on(&mut self, id: &NodeId, zoom: f64, duration_ms: f64);
	/// Moves the camera close to a clicked node.
	fn focus(&mut self, id: &NodeId);
}

/// Durations and zoom used by the controller's camera moves.
#[derive(Clone, Debug)]
struct CameraSettings {
	fit_duration_ms: f64,
	search_zoom: f64,
	search_duration_ms: f64,
}

/// Single-writer owner of the current dataset.
pub struct ViewController<V> {
	view: V,
	data: Option<Dataset<AnnotatedNode>>,
	bridge: Option<Box<dyn HostBridge>>,
	camera: CameraSettings,
	source: String,
	status: String,
}

impl<V: GraphView> ViewController<V> {
	/// Controller with no data yet.
	pub fn new(view: V, config: &ViewerConfig) -> Self {
		Self {
			view,
			data: None,
			bridge: None,
			camera: CameraSettings {
				fit_duration_ms: config.fit_duration_ms,
				search_zoom: config.search_zoom,
				search_duration_ms: config.search_duration_ms,
			},
			source: config.data_url.clone(),
			status: "Waiting for data".to_string(),
		}
	}

	/// Injects the host bridge notified on node clicks.
	pub fn with_bridge(mut self, bridge: impl HostBridge + 'static) -> Self {
		self.bridge = Some(Box::new(bridge));
		self
	}

	/// Latest status message.
	pub fn status(&self) -> &str {
		&self.status
	}

	/// The current annotated dataset, if any has been received.
	pub fn dataset(&self) -> Option<&Dataset<AnnotatedNode>> {
		self.data.as_ref()
	}

	/// The renderer.
	pub fn view(&self) -> &V {
		&self.view
	}

	/// Applies the outcome of the initial fetch. A failure is the normal "no data" case.
	pub fn finish_load(&mut self, result: Result<Dataset, LoadError>) {
		match result {
			Ok(data) => {
				self.replace(&data);
				self.status = format!("Loaded {}", self.source);
			}
			Err(e) => {
				log::info!("No initial dataset from {}: {}", self.source, e);
				self.status = format!("No {} (okay)", self.source);
			}
		}
	}

	/// Replaces the dataset wholesale, as pushed by the host.
	pub fn update(&mut self, data: Dataset) {
		self.replace(&data);
		self.status = "Graph updated".to_string();
	}

	fn replace(&mut self, data: &Dataset) {
		let annotated = annotate(data);
		log::info!(
			"Rendering {} nodes, {} links",
			annotated.nodes.len(),
			annotated.links.len()
		);
		self.view.show(&annotated);
		self.view.zoom_to_fit(0.0);
		self.data = Some(annotated);
	}

	/// Frames the whole graph.
	pub fn fit(&mut self) {
		self.view.zoom_to_fit(self.camera.fit_duration_ms);
	}

	/// Shows only links at or above `min_weight` and the nodes they touch.
	pub fn set_min_weight(&mut self, min_weight: f64) {
		let Some(data) = &self.data else {
			return;
		};
		let filtered = filter_by_weight(data, min_weight);
		log::debug!(
			"Weight >= {}: {} of {} links, {} of {} nodes",
			min_weight,
			filtered.links.len(),
			data.links.len(),
			filtered.nodes.len(),
			data.nodes.len()
		);
		self.view.show(&filtered);
	}

	/// Recentres on the first node matching `query`. A miss changes nothing.
	pub fn search(&mut self, query: &str) -> Option<NodeId> {
		let node = find_node(&self.data.as_ref()?.nodes, query)?;
		let id = node.node.id.clone();
		self.status = format!(
			"Found: {}",
			node.node.name.clone().unwrap_or_else(|| id.to_string())
		);
		self.view
			.center_on(&id, self.camera.search_zoom, self.camera.search_duration_ms);
		Some(id)
	}

	/// Reports a click and notifies the host bridge, ignoring any bridge failure.
	pub fn node_clicked(&mut self, id: &NodeId) {
		self.view.focus(id);
		let label = self
			.data
			.as_ref()
			.and_then(|d| d.nodes.iter().find(|n| &n.node.id == id))
			.map(|n| n.label.clone())
			.unwrap_or_else(|| id.to_string());
		self.status = format!("Clicked node: {}", label);
		if let Some(bridge) = &self.bridge {
			if let Err(e) = bridge.node_clicked(id) {
				log::debug!("Host bridge not notified: {}", e);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;
	use crate::bridge::{BridgeError, CallbackBridge};
	use crate::graph::{Link, Node};

	#[derive(Clone, Debug, PartialEq)]
	enum Call {
		Show(Vec<NodeId>, usize),
		Fit(f64),
		Center(NodeId, f64, f64),
		Focus(NodeId),
	}

	#[derive(Default)]
	struct RecordingView {
		calls: Vec<Call>,
	}

	impl GraphView for RecordingView {
		fn show(&mut self, data: &Dataset<AnnotatedNode>) {
			let ids = data.nodes.iter().map(|n| n.node.id.clone()).collect();
			self.calls.push(Call::Show(ids, data.links.len()));
		}

		fn zoom_to_fit(&mut self, duration_ms: f64) {
			self.calls.push(Call::Fit(duration_ms));
		}

		fn center_on(&mut self, id: &NodeId, zoom: f64, duration_ms: f64) {
			self.calls.push(Call::Center(id.clone(), zoom, duration_ms));
		}

		fn focus(&mut self, id: &NodeId) {
			self.calls.push(Call::Focus(id.clone()));
		}
	}

	struct FailingBridge;

	impl HostBridge for FailingBridge {
		fn node_clicked(&self, _: &NodeId) -> Result<(), BridgeError> {
			Err(BridgeError::Call("boom".into()))
		}
	}

	fn sample() -> Dataset {
		Dataset::new(
			vec![
				Node::new(1).with_name("A"),
				Node::new(2).with_name("B"),
				Node::new(3).with_name("C"),
			],
			vec![
				Link::new(1, 2).with_weight(5.0),
				Link::new(2, 3).with_weight(1.0),
			],
		)
	}

	fn controller() -> ViewController<RecordingView> {
		ViewController::new(RecordingView::default(), &ViewerConfig::default())
	}

	fn ids(raw: &[i64]) -> Vec<NodeId> {
		raw.iter().copied().map(NodeId::Int).collect()
	}

	#[test]
	fn load_success_renders_and_fits() {
		let mut c = controller();
		c.finish_load(Ok(sample()));
		assert_eq!(c.status(), "Loaded data.json");
		assert_eq!(
			c.view().calls,
			vec![Call::Show(ids(&[1, 2, 3]), 2), Call::Fit(0.0)]
		);
		let sizes: Vec<_> = c.dataset().unwrap().nodes.iter().map(|n| n.size).collect();
		assert_eq!(sizes, vec![1, 2, 1]);
	}

	#[test]
	fn load_failure_is_a_quiet_empty_state() {
		let mut c = controller();
		c.finish_load(Err(LoadError::Status(404)));
		assert_eq!(c.status(), "No data.json (okay)");
		assert!(c.dataset().is_none());
		assert!(c.view().calls.is_empty());
	}

	#[test]
	fn update_replaces_dataset() {
		let mut c = controller();
		c.finish_load(Ok(sample()));
		c.update(Dataset::new(vec![Node::new(9)], vec![]));
		assert_eq!(c.status(), "Graph updated");
		assert_eq!(c.dataset().unwrap().nodes.len(), 1);
		assert_eq!(c.view().calls[2], Call::Show(ids(&[9]), 0));
	}

	#[test]
	fn filter_rederives_from_current_dataset() {
		let mut c = controller();
		c.finish_load(Ok(sample()));
		c.set_min_weight(3.0);
		c.set_min_weight(0.0);
		let calls = &c.view().calls;
		assert_eq!(calls[2], Call::Show(ids(&[1, 2]), 1));
		assert_eq!(calls[3], Call::Show(ids(&[1, 2, 3]), 2));
		assert_eq!(c.dataset().unwrap().nodes.len(), 3);
	}

	#[test]
	fn filter_without_data_does_nothing() {
		let mut c = controller();
		c.set_min_weight(2.0);
		assert!(c.view().calls.is_empty());
	}

	#[test]
	fn search_hit_recenters() {
		let mut c = controller();
		c.finish_load(Ok(sample()));
		assert_eq!(c.search("b"), Some(NodeId::Int(2)));
		assert_eq!(c.status(), "Found: B");
		assert_eq!(
			c.view().calls.last(),
			Some(&Call::Center(NodeId::Int(2), 4.0, 1000.0))
		);
	}

	#[test]
	fn search_miss_leaves_state_unchanged() {
		let mut c = controller();
		c.finish_load(Ok(sample()));
		let calls = c.view().calls.len();
		assert_eq!(c.search("zzz"), None);
		assert_eq!(c.status(), "Loaded data.json");
		assert_eq!(c.view().calls.len(), calls);
	}

	#[test]
	fn fit_uses_configured_duration() {
		let mut c = controller();
		c.fit();
		assert_eq!(c.view().calls, vec![Call::Fit(400.0)]);
	}

	#[test]
	fn click_reports_and_notifies_bridge() {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = seen.clone();
		let mut c = controller()
			.with_bridge(CallbackBridge(move |id: &NodeId| sink.borrow_mut().push(id.clone())));
		c.finish_load(Ok(sample()));
		c.node_clicked(&NodeId::Int(3));
		assert_eq!(c.status(), "Clicked node: C");
		assert_eq!(*seen.borrow(), vec![NodeId::Int(3)]);
		assert_eq!(c.view().calls.last(), Some(&Call::Focus(NodeId::Int(3))));
	}

	#[test]
	fn bridge_failure_is_swallowed() {
		let mut c = controller().with_bridge(FailingBridge);
		c.finish_load(Ok(sample()));
		c.node_clicked(&NodeId::Int(1));
		assert_eq!(c.status(), "Clicked node: A");
	}

	#[test]
	fn click_without_bridge_still_reports() {
		let mut c = controller();
		c.node_clicked(&NodeId::from("ghost"));
		assert_eq!(c.status(), "Clicked node: ghost");
	}
}
