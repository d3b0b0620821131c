//! Text billboards for node labels.
//!
//! Each distinct label is rasterized once onto an offscreen canvas and then blitted next to
//! its node every frame.

use std::collections::HashMap;

use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

const FONT_SIZE: f64 = 48.0;
const FONT: &str = "48px Arial";
const PADDING: f64 = 10.0;

/// Pixel size of the billboard for text measuring `text_width` at [`FONT`].
pub fn sprite_size(text_width: f64) -> (u32, u32) {
	(
		(text_width.max(0.0).ceil() + 2.0 * PADDING) as u32,
		(FONT_SIZE + 30.0) as u32,
	)
}

pub struct LabelSprite {
	pub canvas: HtmlCanvasElement,
	pub width: f64,
	pub height: f64,
}

pub struct LabelCache {
	document: Document,
	sprites: HashMap<String, Option<LabelSprite>>,
}

impl LabelCache {
	pub fn new(document: Document) -> Self {
		Self {
			document,
			sprites: HashMap::new(),
		}
	}

	/// The sprite for `text`, rasterizing it on first use. A failed rasterization is
	/// remembered so it is not retried every frame.
	pub fn sprite(&mut self, text: &str) -> Option<&LabelSprite> {
		if !self.sprites.contains_key(text) {
			let sprite = rasterize(&self.document, text)
				.inspect_err(|e| log::debug!("Label {:?} not rendered: {:?}", text, e))
				.ok();
			self.sprites.insert(text.to_owned(), sprite);
		}
		self.sprites.get(text).and_then(Option::as_ref)
	}
}

fn rasterize(document: &Document, text: &str) -> Result<LabelSprite, JsValue> {
	let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")?
		.ok_or_else(|| JsValue::from_str("2d context unavailable"))?
		.dyn_into()?;

	ctx.set_font(FONT);
	let (w, h) = sprite_size(ctx.measure_text(text)?.width());
	canvas.set_width(w);
	canvas.set_height(h);
	// Resizing resets the context state.
	ctx.set_font(FONT);
	ctx.set_fill_style_str("white");
	ctx.fill_text(text, PADDING, FONT_SIZE)?;

	Ok(LabelSprite {
		canvas,
		width: w as f64,
		height: h as f64,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sprite_is_padded_text_box() {
		assert_eq!(sprite_size(100.0), (120, 78));
		assert_eq!(sprite_size(99.2), (120, 78));
		assert_eq!(sprite_size(0.0), (20, 78));
	}
}
