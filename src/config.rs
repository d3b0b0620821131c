//! Viewer configuration.
//!
//! The host page may define a global `RAVENEYE_CONFIG` object; any field it omits keeps its
//! default.

use serde::Deserialize;

/// Name of the optional global holding a [`ViewerConfig`].
pub const CONFIG_GLOBAL: &str = "RAVENEYE_CONFIG";

/// Runtime settings for the viewer page.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
	/// Document fetched on startup.
	pub data_url: String,
	/// Duration of the "fit view" transition.
	pub fit_duration_ms: f64,
	/// Zoom factor applied when a search hit is centred.
	pub search_zoom: f64,
	/// Duration of the search recentre transition.
	pub search_duration_ms: f64,
	/// Global function name installed for live updates.
	pub update_entry_point: String,
	/// Global object probed for the host bridge.
	pub bridge_object: String,
	/// Method called on the host bridge when a node is clicked.
	pub bridge_method: String,
	/// Canvas background colour.
	pub background: String,
	/// Upper bound of the minimum-weight control.
	pub max_weight: f64,
}

impl Default for ViewerConfig {
	fn default() -> Self {
		Self {
			data_url: "data.json".to_string(),
			fit_duration_ms: 400.0,
			search_zoom: 4.0,
			search_duration_ms: 1000.0,
			update_entry_point: "updateGraph".to_string(),
			bridge_object: "bridge".to_string(),
			bridge_method: "nodeClicked".to_string(),
			background: "#0b0b0f".to_string(),
			max_weight: 10.0,
		}
	}
}

impl ViewerConfig {
	/// Reads [`CONFIG_GLOBAL`] from the window, falling back to defaults.
	pub fn from_window() -> Self {
		let Some(window) = web_sys::window() else {
			return Self::default();
		};
		let value = match js_sys::Reflect::get(&window, &CONFIG_GLOBAL.into()) {
			Ok(v) if !v.is_undefined() && !v.is_null() => v,
			_ => return Self::default(),
		};
		match serde_wasm_bindgen::from_value(value) {
			Ok(config) => {
				log::info!("Using {} from page", CONFIG_GLOBAL);
				config
			}
			Err(e) => {
				log::warn!("Ignoring invalid {}: {}", CONFIG_GLOBAL, e);
				Self::default()
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_config_keeps_defaults() {
		let config: ViewerConfig =
			serde_json::from_str(r#"{"data_url":"graph/live.json","search_zoom":2}"#).unwrap();
		assert_eq!(config.data_url, "graph/live.json");
		assert_eq!(config.search_zoom, 2.0);
		assert_eq!(config.fit_duration_ms, 400.0);
		assert_eq!(config.update_entry_point, "updateGraph");
	}

	#[test]
	fn empty_config_is_default() {
		let config: ViewerConfig = serde_json::from_str("{}").unwrap();
		assert_eq!(config, ViewerConfig::default());
	}

	#[test]
	fn wrong_types_are_rejected() {
		assert!(serde_json::from_str::<ViewerConfig>(r#"{"max_weight":"ten"}"#).is_err());
	}
}
