use leptos::prelude::*;

use crate::components::graph_view::{Category, GraphData, GraphLink, GraphNode, GraphViewSvg};
use crate::payload::{MimeBundle, parse_bundle};
use crate::renderer::error_html;

/// Generate sample graph data (random tree).
fn generate_sample_data(n: usize) -> GraphData {
	let nodes: Vec<GraphNode> = (0..n)
		.map(|i| GraphNode {
			label: (i < 10).then(|| format!("Node {}", i)),
			size: Some(if i == 0 { 150.0 } else { 10.0 }),
			category: Some(Category::Index((i % 10) as i64)),
			..GraphNode::new(i.to_string())
		})
		.collect();

	let links: Vec<GraphLink> = (1..n)
		.map(|i| {
			let target = (rand_simple(i) * (i as f64)) as usize;
			GraphLink::new(&i.to_string(), &target.to_string())
		})
		.collect();

	GraphData { nodes, links }
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	// Round-trip the sample through the same payload path notebooks use.
	let parsed = serde_json::to_string(&generate_sample_data(60))
		.map_err(|e| e.to_string())
		.and_then(|json| parse_bundle(&MimeBundle::new(json)).map_err(|e| e.to_string()));

	match parsed {
		Ok(graph) => {
			let graph_data = Signal::derive(move || graph.clone());
			view! {
				<div class="netvis-demo">
					<h1>"Network Visualization"</h1>
					<p class="subtitle">
						"Drag nodes to pin them, click to release. Scroll to zoom. Drag background to pan."
					</p>
					<GraphViewSvg data=graph_data />
				</div>
			}
			.into_any()
		}
		Err(message) => view! { <div inner_html=error_html(&message) /> }.into_any(),
	}
}
