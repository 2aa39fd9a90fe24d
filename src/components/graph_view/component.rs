use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlDivElement, MouseEvent, WheelEvent};

use super::layout::GraphView;
use super::svg::render_svg;
use super::types::GraphData;
use crate::config::RenderConfig;
use crate::export::export_graph;

const DOWNLOAD_ICON: &str = r#"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><path d="M21 15v4a2 2 0 01-2 2H5a2 2 0 01-2-2v-4"/><polyline points="7 10 12 15 17 10"/><line x1="12" y1="15" x2="12" y2="3"/></svg>"#;

type Shared<T> = Rc<RefCell<Option<T>>>;

/// Interactive force-directed view of `data`, drawn as SVG.
///
/// Drag a node to pin it, click a pinned node to release it, drag the
/// background to pan and scroll to zoom. The corner button downloads the
/// graph as a standalone HTML file.
#[component]
pub fn GraphViewSvg(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(optional)] config: RenderConfig,
) -> impl IntoView {
	let config = config.sanitized();
	let host_ref = NodeRef::<leptos::html::Div>::new();
	let initial = data.with_untracked(|d| GraphView::new(d, &config));
	let initial_svg = render_svg(&initial);
	let state: Shared<GraphView> = Rc::new(RefCell::new(Some(initial)));
	let running = Rc::new(Cell::new(false));
	let alive = Arc::new(AtomicBool::new(true));
	let (width, height) = (config.width, config.height);

	let alive_cleanup = alive.clone();
	on_cleanup(move || alive_cleanup.store(false, Ordering::Relaxed));

	let (state_init, alive_init, running_init) = (state.clone(), alive.clone(), running.clone());
	Effect::new(move |prev: Option<()>| {
		data.track();
		let Some(host) = host_ref.get() else {
			return;
		};
		if prev.is_some() {
			let graph = data.with_untracked(|d| GraphView::new(d, &config));
			host.set_inner_html(&render_svg(&graph));
			*state_init.borrow_mut() = Some(graph);
		}
		start_animation(&state_init, &host, &alive_init, &running_init);
	});

	// Pointer position relative to the host element.
	let local = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let host: HtmlDivElement = host_ref.get()?;
		let rect = host.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};
	// Apply an interaction, redraw, and wake the animation loop if the
	// interaction reheated a settled layout.
	let interact = move |f: &dyn Fn(&mut GraphView)| {
		let Some(host) = host_ref.get() else {
			return;
		};
		if let Some(ref mut s) = *state.borrow_mut() {
			f(s);
			host.set_inner_html(&render_svg(s));
		}
		start_animation(&state, &host, &alive, &running);
	};

	let (interact_md, interact_mm, interact_mu, interact_ml, interact_wh) = (
		interact.clone(),
		interact.clone(),
		interact.clone(),
		interact.clone(),
		interact,
	);
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = local(&ev) {
			interact_md(&|s: &mut GraphView| s.pointer_down(x, y));
		}
	};
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = local(&ev) {
			interact_mm(&|s: &mut GraphView| s.pointer_move(x, y));
		}
	};
	let on_mouseup = move |_: MouseEvent| interact_mu(&|s: &mut GraphView| s.pointer_up());
	let on_mouseleave = move |_: MouseEvent| interact_ml(&|s: &mut GraphView| s.pointer_leave());
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = local(ev.as_ref()) {
			let delta = ev.delta_y();
			interact_wh(&|s: &mut GraphView| s.zoom_at(x, y, delta));
		}
	};

	let on_download = move |ev: MouseEvent| {
		ev.prevent_default();
		ev.stop_propagation();
		export_graph(&data.get_untracked());
	};

	view! {
		<div class="netvis-container" style="position: relative;">
			<button
				class="netvis-download-btn"
				aria-label="Download HTML"
				title="Download HTML"
				on:click=on_download
				inner_html=DOWNLOAD_ICON
			/>
			<div
				node_ref=host_ref
				class="netvis-svg-host"
				inner_html=initial_svg
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style=format!("width: {width}px; height: {height}px; cursor: grab; user-select: none;")
			/>
		</div>
	}
}

/// Tick the layout on animation frames until it settles or the view is
/// unmounted. The frame callback drops itself when the loop ends, so an idle
/// view holds no closure.
fn start_animation(
	state: &Shared<GraphView>,
	host: &HtmlDivElement,
	alive: &Arc<AtomicBool>,
	running: &Rc<Cell<bool>>,
) {
	if running.get() || !alive.load(Ordering::Relaxed) {
		return;
	}
	if state.borrow().as_ref().is_none_or(GraphView::is_settled) {
		return;
	}

	let animate: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let (state_anim, host_anim, alive_anim, running_anim, animate_inner) = (
		state.clone(),
		host.clone(),
		alive.clone(),
		running.clone(),
		animate.clone(),
	);
	*animate.borrow_mut() = Some(Closure::new(move || {
		let moving = alive_anim.load(Ordering::Relaxed)
			&& match *state_anim.borrow_mut() {
				Some(ref mut s) => {
					let moved = s.tick();
					if moved {
						host_anim.set_inner_html(&render_svg(s));
					}
					moved
				}
				None => false,
			};
		if !(moving && request_frame(&animate_inner)) {
			running_anim.set(false);
			let _ = animate_inner.borrow_mut().take();
		}
	}));

	running.set(true);
	if !request_frame(&animate) {
		error!("could not request an animation frame, graph view not animated");
		running.set(false);
		let _ = animate.borrow_mut().take();
	}
}

fn request_frame(animate: &Shared<Closure<dyn FnMut()>>) -> bool {
	let Some(window) = web_sys::window() else {
		return false;
	};
	match *animate.borrow() {
		Some(ref cb) => window
			.request_animation_frame(cb.as_ref().unchecked_ref())
			.is_ok(),
		None => false,
	}
}
