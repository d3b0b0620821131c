//! Glue between the viewer and whatever hosts the page.
//!
//! Two directions: the host may expose a bridge object that is told about node clicks, and
//! the viewer installs a global function the host (or a push channel) calls with a whole
//! replacement dataset.

use thiserror::Error;
use wasm_bindgen::prelude::*;

use crate::graph::{Dataset, GraphDocument, NodeId};

/// Failures talking to the host. Never surfaced to the user.
#[derive(Debug, Error)]
pub enum BridgeError {
	/// The page has no `window` (not running in a browser).
	#[error("no window available")]
	NoWindow,
	/// The bridge object or method is not present.
	#[error("host bridge `{0}` is not present")]
	Unavailable(String),
	/// The bridge call threw.
	#[error("host bridge call failed: {0}")]
	Call(String),
}

/// Receives node-click notifications. Fire and forget.
pub trait HostBridge {
	/// Called with the clicked node's id.
	fn node_clicked(&self, id: &NodeId) -> Result<(), BridgeError>;
}

/// Adapts a plain callback into a [`HostBridge`].
pub struct CallbackBridge<F>(pub F);

impl<F: Fn(&NodeId)> HostBridge for CallbackBridge<F> {
	fn node_clicked(&self, id: &NodeId) -> Result<(), BridgeError> {
		(self.0)(id);
		Ok(())
	}
}

/// Calls `window[object][method](id)`, resolved at call time so a bridge that appears after
/// startup (e.g. an embedding web channel) is still picked up.
pub struct WindowBridge {
	object: String,
	method: String,
}

impl WindowBridge {
	/// Bridge probing `window[object][method]`.
	pub fn new(object: impl Into<String>, method: impl Into<String>) -> Self {
		Self {
			object: object.into(),
			method: method.into(),
		}
	}
}

impl HostBridge for WindowBridge {
	fn node_clicked(&self, id: &NodeId) -> Result<(), BridgeError> {
		let window = web_sys::window().ok_or(BridgeError::NoWindow)?;
		let target = js_sys::Reflect::get(&window, &JsValue::from_str(&self.object))
			.ok()
			.filter(|v| v.is_object())
			.ok_or_else(|| BridgeError::Unavailable(self.object.clone()))?;
		let method: js_sys::Function = js_sys::Reflect::get(&target, &JsValue::from_str(&self.method))
			.ok()
			.and_then(|v| v.dyn_into().ok())
			.ok_or_else(|| BridgeError::Unavailable(format!("{}.{}", self.object, self.method)))?;
		method
			.call1(&target, &node_id_to_js(id))
			.map(|_| ())
			.map_err(|e| BridgeError::Call(format!("{:?}", e)))
	}
}

/// Numeric ids go out as JS numbers, the rest as strings.
pub fn node_id_to_js(id: &NodeId) -> JsValue {
	match id.as_number() {
		Some(n) => JsValue::from_f64(n),
		None => JsValue::from_str(&id.to_string()),
	}
}

/// Installs `window[name] = function(dataset)`. Invalid payloads are logged and dropped.
pub fn install_update_entry_point(
	name: &str,
	mut on_update: impl FnMut(Dataset) + 'static,
) -> Result<(), BridgeError> {
	let window = web_sys::window().ok_or(BridgeError::NoWindow)?;
	let entry = name.to_owned();
	let callback = Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
		match serde_wasm_bindgen::from_value::<GraphDocument>(payload) {
			Ok(doc) => on_update(doc.into()),
			Err(e) => log::warn!("{}: ignoring payload that is not a dataset: {}", entry, e),
		}
	});
	js_sys::Reflect::set(&window, &JsValue::from_str(name), callback.as_ref())
		.map_err(|e| BridgeError::Call(format!("{:?}", e)))?;
	// Lives as long as the page.
	callback.forget();
	log::info!("Live update entry point `{}` installed", name);
	Ok(())
}
