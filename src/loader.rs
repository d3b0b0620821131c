//! Initial dataset fetch.

use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::graph::{parse_document, Dataset};

/// Why the initial dataset could not be loaded. Every variant means "no data yet".
#[derive(Debug, Error)]
pub enum LoadError {
	/// Not running in a browser.
	#[error("no window available")]
	NoWindow,
	/// The request could not be built or the fetch promise rejected.
	#[error("fetch failed: {0}")]
	Fetch(String),
	/// The server answered with a non-success status.
	#[error("HTTP {0}")]
	Status(u16),
	/// The body is not a dataset document.
	#[error("invalid dataset: {0}")]
	Decode(#[from] serde_json::Error),
}

/// Fetches and decodes the document at `url`. No retry, no timeout.
pub async fn fetch_dataset(url: &str) -> Result<Dataset, LoadError> {
	let opts = RequestInit::new();
	opts.set_method("GET");
	opts.set_mode(RequestMode::Cors);

	let request = Request::new_with_str_and_init(url, &opts)
		.map_err(|e| LoadError::Fetch(format!("{:?}", e)))?;

	let window = web_sys::window().ok_or(LoadError::NoWindow)?;
	let resp: Response = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(|e| LoadError::Fetch(format!("{:?}", e)))?
		.dyn_into()
		.map_err(|_| LoadError::Fetch("response is not a Response".into()))?;

	if !resp.ok() {
		return Err(LoadError::Status(resp.status()));
	}

	let text = JsFuture::from(resp.text().map_err(|e| LoadError::Fetch(format!("{:?}", e)))?)
		.await
		.map_err(|e| LoadError::Fetch(format!("{:?}", e)))?
		.as_string()
		.unwrap_or_default();

	let data = parse_document(&text)?;
	log::debug!(
		"Fetched {}: {} nodes, {} links",
		url,
		data.nodes.len(),
		data.links.len()
	);
	Ok(data)
}
