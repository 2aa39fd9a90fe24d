use std::fmt::Write;

use super::layout::GraphView;
use crate::export::escape_html;

const LINK_STROKE: &str = "black";

/// Render the current layout as a standalone `<svg>` element.
pub fn render_svg(view: &GraphView) -> String {
	let (w, h) = (view.width, view.height);
	let t = view.transform;
	let mut out = String::with_capacity(256 + 128 * view.node_count());

	let _ = write!(
		out,
		r#"<svg xmlns="http://www.w3.org/2000/svg" class="netvis-graph" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
	);
	let _ = write!(
		out,
		r#"<g class="netvis-viewport" transform="translate({},{}) scale({})">"#,
		t.x, t.y, t.k
	);

	out.push_str(r#"<g class="netvis-links">"#);
	view.graph.visit_edges(|n1, n2, _| {
		let _ = write!(
			out,
			r#"<line class="netvis-link" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{LINK_STROKE}"/>"#,
			n1.x(),
			n1.y(),
			n2.x(),
			n2.y()
		);
	});
	out.push_str("</g>");

	out.push_str(r#"<g class="netvis-nodes">"#);
	view.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		let (x, y) = (node.x(), node.y());
		let _ = write!(
			out,
			r#"<circle class="netvis-node circle" data-id="{}" cx="{x:.2}" cy="{y:.2}" r="{}" fill="{}"/>"#,
			escape_html(&info.id),
			info.radius,
			escape_html(&info.color),
		);
		if let Some(label) = &info.label {
			let _ = write!(
				out,
				r#"<text class="netvis-node-label" x="{:.2}" y="{:.2}">{}</text>"#,
				x as f64 + info.radius + 3.0,
				y as f64 + 4.0,
				escape_html(label),
			);
		}
	});
	out.push_str("</g></g></svg>");
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_view::{GraphData, GraphLink, GraphNode};
	use crate::config::RenderConfig;

	#[test]
	fn renders_one_element_per_record() {
		let data = GraphData {
			nodes: vec![GraphNode::new("A"), GraphNode::new("B"), GraphNode::new("C")],
			links: vec![GraphLink::new("A", "B"), GraphLink::new("B", "C")],
		};
		let svg = render_svg(&GraphView::new(&data, &RenderConfig::default()));
		assert!(svg.starts_with("<svg"));
		assert!(svg.ends_with("</svg>"));
		assert_eq!(svg.matches("<circle").count(), 3);
		assert_eq!(svg.matches("<line").count(), 2);
	}

	#[test]
	fn empty_graph_is_still_an_svg() {
		let svg = render_svg(&GraphView::new(&GraphData::default(), &RenderConfig::default()));
		assert!(svg.contains(r#"viewBox="0 0 800 800""#));
		assert!(!svg.contains("<circle"));
	}

	#[test]
	fn labels_and_ids_are_escaped() {
		let mut node = GraphNode::new("<a>");
		node.label = Some("x & y".into());
		let data = GraphData {
			nodes: vec![node],
			links: Vec::new(),
		};
		let svg = render_svg(&GraphView::new(&data, &RenderConfig::default()));
		assert!(svg.contains(r#"data-id="&lt;a&gt;""#));
		assert!(svg.contains(">x &amp; y</text>"));
	}

	#[test]
	fn radius_and_fill_come_from_style() {
		let mut node = GraphNode::new("A");
		node.size = Some(100.0);
		node.color = Some("#123456".into());
		let data = GraphData {
			nodes: vec![node],
			links: Vec::new(),
		};
		let svg = render_svg(&GraphView::new(&data, &RenderConfig::default()));
		assert!(svg.contains(r##"r="20" fill="#123456""##));
	}
}
