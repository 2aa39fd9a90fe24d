//! MIME renderer: turns a notebook output bundle into a mounted graph view.
//!
//! [`MimeRenderer`] holds the host-independent part (bundle lookup,
//! validation, first layout). [`NetVisRenderer`] is the object handed to the
//! notebook front-end; it owns a detached DOM node and mounts the interactive
//! view into it.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use leptos::prelude::*;
use log::{error, info};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlElement;

use crate::components::graph_view::{GraphData, GraphView, GraphViewSvg, render_svg};
use crate::config::RenderConfig;
use crate::export::escape_html;
use crate::payload::{MIME_TYPE, MimeBundle, PayloadError, parse_bundle};

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

/// Text shown when the model carries nothing for our MIME type.
pub const NO_DATA_TEXT: &str = "No data to display";

/// Why a model could not be rendered.
#[derive(Debug, Error)]
pub enum RenderError {
	/// The graph payload was rejected.
	#[error(transparent)]
	Payload(#[from] PayloadError),
	/// The model or bundle object has the wrong shape.
	#[error("Invalid MIME model: {0}")]
	Model(String),
	/// There is no browser document to create nodes in.
	#[error("no document available")]
	NoDocument,
}

/// A notebook MIME model: MIME type to payload.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MimeModel {
	/// Payloads keyed by MIME type.
	#[serde(default)]
	pub data: HashMap<String, Value>,
}

/// Result of a successful render.
#[derive(Clone, Debug)]
pub enum Rendered {
	/// The model had no payload for this renderer.
	Empty,
	/// A graph ready to mount.
	Graph {
		/// Parsed payload.
		graph: GraphData,
		/// Effective settings.
		config: RenderConfig,
		/// Initial layout as SVG markup.
		svg: String,
	},
}

/// Host-independent renderer state.
#[derive(Debug)]
pub struct MimeRenderer {
	id: String,
	mime_type: String,
}

impl Default for MimeRenderer {
	fn default() -> Self {
		Self::new(MIME_TYPE)
	}
}

impl MimeRenderer {
	/// Renderer for `mime_type` with a fresh instance id.
	pub fn new(mime_type: impl Into<String>) -> Self {
		Self {
			id: format!("netvis-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed)),
			mime_type: mime_type.into(),
		}
	}

	/// Unique per instance.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// The MIME type this renderer reads from models.
	pub fn mime_type(&self) -> &str {
		&self.mime_type
	}

	/// Pull this renderer's bundle out of a model. `None` when absent.
	pub fn bundle_from_model(&self, model: &MimeModel) -> Result<Option<MimeBundle>, RenderError> {
		match model.data.get(&self.mime_type) {
			None | Some(Value::Null) => Ok(None),
			Some(value) => serde_json::from_value(value.clone())
				.map(Some)
				.map_err(|e| RenderError::Model(e.to_string())),
		}
	}

	/// Validate and lay out a bundle.
	pub fn render_bundle(&self, bundle: Option<&MimeBundle>) -> Result<Rendered, RenderError> {
		let Some(bundle) = bundle else {
			return Ok(Rendered::Empty);
		};
		let graph = parse_bundle(bundle)?;
		let config = bundle.config.clone().unwrap_or_default().sanitized();
		let svg = render_svg(&GraphView::new(&graph, &config));
		Ok(Rendered::Graph { graph, config, svg })
	}

	/// [`bundle_from_model`](Self::bundle_from_model) then
	/// [`render_bundle`](Self::render_bundle).
	pub fn render_model(&self, model: &MimeModel) -> Result<Rendered, RenderError> {
		let bundle = self.bundle_from_model(model)?;
		self.render_bundle(bundle.as_ref())
	}
}

/// User-visible error box for a failed render.
pub fn error_html(message: &str) -> String {
	format!(
		r#"<div class="netvis-error" style="color: red; padding: 10px; border: 1px solid red; border-radius: 4px;"><strong>NetVis Error:</strong><br/>{}</div>"#,
		escape_html(message)
	)
}

/// Renderer object for the notebook front-end.
#[wasm_bindgen]
pub struct NetVisRenderer {
	core: MimeRenderer,
	node: HtmlElement,
	mounted: Option<Box<dyn Any>>,
}

#[wasm_bindgen]
impl NetVisRenderer {
	/// Create a renderer with its own detached `<div>`. Defaults to
	/// [`MIME_TYPE`].
	#[wasm_bindgen(constructor)]
	pub fn new(mime_type: Option<String>) -> Result<NetVisRenderer, JsValue> {
		let core = MimeRenderer::new(mime_type.unwrap_or_else(|| MIME_TYPE.to_owned()));
		let document = web_sys::window()
			.and_then(|w| w.document())
			.ok_or_else(|| JsValue::from_str(&RenderError::NoDocument.to_string()))?;
		let node: HtmlElement = document.create_element("div")?.dyn_into()?;
		node.set_class_name("jp-NetVisRenderer");
		node.set_id(core.id());
		Ok(Self {
			core,
			node,
			mounted: None,
		})
	}

	/// The DOM node the view is rendered into.
	#[wasm_bindgen(getter)]
	pub fn node(&self) -> HtmlElement {
		self.node.clone()
	}

	/// The instance id, also the node's `id` attribute.
	#[wasm_bindgen(getter)]
	pub fn id(&self) -> String {
		self.core.id().to_owned()
	}

	/// Render `{ data: { [mimeType]: { data, version } } }`.
	///
	/// On failure the error text is written into the node and the error is
	/// returned to the caller as well.
	#[wasm_bindgen(js_name = renderModel)]
	pub fn render_model(&mut self, model: JsValue) -> Result<(), JsValue> {
		self.dispose();
		self.node.set_text_content(None);
		match self.try_render(model) {
			Ok(()) => Ok(()),
			Err(e) => {
				let message = e.to_string();
				error!("error rendering graph: {message}");
				self.node.set_inner_html(&error_html(&message));
				Err(JsValue::from_str(&message))
			}
		}
	}

	/// Unmount the current view, if any.
	pub fn dispose(&mut self) {
		self.mounted = None;
	}
}

impl NetVisRenderer {
	fn try_render(&mut self, model: JsValue) -> Result<(), RenderError> {
		let model: MimeModel =
			serde_wasm_bindgen::from_value(model).map_err(|e| RenderError::Model(e.to_string()))?;
		match self.core.render_model(&model)? {
			Rendered::Empty => {
				self.node.set_text_content(Some(NO_DATA_TEXT));
			}
			Rendered::Graph { graph, config, .. } => {
				info!(
					"mounting graph view {}: {} nodes, {} links",
					self.core.id(),
					graph.nodes.len(),
					graph.links.len()
				);
				let handle = leptos::mount::mount_to(self.node.clone(), move || {
					let data = Signal::derive(move || graph.clone());
					view! { <GraphViewSvg data=data config=config /> }
				});
				self.mounted = Some(Box::new(handle));
			}
		}
		Ok(())
	}
}

/// The MIME type the renderer should be registered for.
#[wasm_bindgen(js_name = mimeType)]
pub fn mime_type() -> String {
	MIME_TYPE.to_owned()
}
