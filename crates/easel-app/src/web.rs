//! WebAssembly entry point and platform-specific code.

use easel_core::text::{GlyphBitmap, TextRasterizer};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, Node};

/// Id of the canvas winit renders into.
pub const CANVAS_ID: &str = "easel-canvas";

/// A child passed to [`elt`].
pub enum Child {
    Node(Node),
    /// Appended as a text node.
    Text(String),
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Child::Node(element.into())
    }
}

pub(crate) fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("No document"))
}

/// Create an element, set its attributes and append its children.
pub fn elt<I>(name: &str, attributes: &[(&str, &str)], children: I) -> Result<Element, JsValue>
where
    I: IntoIterator<Item = Child>,
{
    let document = document()?;
    let element = document.create_element(name)?;
    for (key, value) in attributes {
        element.set_attribute(key, value)?;
    }
    for child in children {
        match child {
            Child::Node(node) => element.append_child(&node)?,
            Child::Text(text) => element.append_child(&document.create_text_node(&text))?,
        };
    }
    Ok(element)
}

/// Build `div > (div.picturepanel > canvas)` under `#app` (or the body)
/// and return the canvas.
pub fn mount_canvas() -> Result<HtmlCanvasElement, JsValue> {
    let document = document()?;
    if let Some(existing) = document.get_element_by_id(CANVAS_ID) {
        return existing.dyn_into::<HtmlCanvasElement>().map_err(JsValue::from);
    }

    let canvas = elt("canvas", &[("id", CANVAS_ID)], std::iter::empty::<Child>())?;
    let panel = elt("div", &[("class", "picturepanel")], [Child::from(canvas.clone())])?;
    let root = elt("div", &[("class", "easel")], [Child::from(panel)])?;

    let parent: Node = match document.get_element_by_id("app") {
        Some(app) => app.into(),
        None => document
            .body()
            .ok_or_else(|| JsValue::from_str("No body"))?
            .into(),
    };
    parent.append_child(&root)?;

    if let Some(loading) = document.get_element_by_id("loading") {
        loading.remove();
    }
    canvas.dyn_into::<HtmlCanvasElement>().map_err(JsValue::from)
}

/// Rasterizes text with an offscreen 2D canvas, using the browser's
/// sans-serif face.
pub struct CanvasTextRasterizer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasTextRasterizer {
    pub fn new() -> Result<Self, JsValue> {
        let canvas = document()?
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(JsValue::from)?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2D context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        Ok(Self { canvas, ctx })
    }

    fn rasterize(&self, text: &str, size_px: f32) -> Result<Option<GlyphBitmap>, JsValue> {
        let font = format!("{}px sans-serif", size_px);
        self.ctx.set_font(&font);
        let metrics = self.ctx.measure_text(text)?;
        let ascent = metrics.actual_bounding_box_ascent().ceil().max(0.0);
        let descent = metrics.actual_bounding_box_descent().ceil().max(0.0);
        let width = metrics.width().ceil() as u32;
        let height = (ascent + descent) as u32;
        if width == 0 || height == 0 {
            return Ok(None);
        }

        // Resizing resets the context state.
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.ctx.set_font(&font);
        self.ctx.set_fill_style_str("white");
        self.ctx.fill_text(text, 0.0, ascent)?;

        let pixels = self
            .ctx
            .get_image_data(0.0, 0.0, width as f64, height as f64)?
            .data();
        let coverage = pixels.0.chunks_exact(4).map(|px| px[3]).collect();
        Ok(Some(GlyphBitmap {
            left: 0,
            top: -(ascent as i32),
            width: width as usize,
            height: height as usize,
            coverage,
        }))
    }
}

impl TextRasterizer for CanvasTextRasterizer {
    fn layout_line(&self, text: &str, size_px: f32) -> Vec<GlyphBitmap> {
        match self.rasterize(text, size_px) {
            Ok(glyphs) => glyphs.into_iter().collect(),
            Err(e) => {
                log::error!("Failed to rasterize text: {:?}", e);
                Vec::new()
            }
        }
    }
}

/// Initialize and run the WASM application.
#[wasm_bindgen(start)]
pub async fn run_wasm() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }

    log::info!("Starting Easel (WASM)");
    crate::App::run().await;
}
