//! NetVis: force-directed network view for notebook front-ends.
//!
//! The notebook side constructs a [`NetVisRenderer`] and hands it models of
//! type [`MIME_TYPE`]; the demo app renders a sample graph through the same
//! parsing path.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};
use wasm_bindgen::prelude::wasm_bindgen;

// Modules
pub mod components;
pub mod config;
pub mod export;
mod pages;
pub mod payload;
pub mod renderer;

pub use components::graph_view::{GraphData, GraphLink, GraphNode, GraphViewSvg};
pub use config::RenderConfig;
pub use payload::{MIME_TYPE, MimeBundle, PayloadError};
pub use renderer::{MimeRenderer, NetVisRenderer, RenderError};

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Demo app: renders a sample graph and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="NetVis" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
