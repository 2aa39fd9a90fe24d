//! Standalone HTML export.
//!
//! The exported document embeds the graph JSON and a small inline renderer,
//! so it opens in any browser without the notebook or network access.

use log::{debug, error};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use crate::components::graph_view::GraphData;
use crate::config::{DEFAULT_EXPORT_HEIGHT, DEFAULT_EXPORT_TITLE, DEFAULT_EXPORT_WIDTH};

/// What to export and how to size it.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportConfig {
	/// Document title.
	pub title: String,
	/// CSS width of the graph container, e.g. `100%` or `800px`.
	pub width: String,
	/// Container height in pixels.
	pub height: u32,
	/// Graph to embed.
	pub graph_data: GraphData,
}

impl ExportConfig {
	/// Default sizing around `graph_data`.
	pub fn new(graph_data: GraphData) -> Self {
		Self {
			title: DEFAULT_EXPORT_TITLE.to_owned(),
			width: DEFAULT_EXPORT_WIDTH.to_owned(),
			height: DEFAULT_EXPORT_HEIGHT,
			graph_data,
		}
	}
}

/// `netvis_export_<date>.html` for an ISO `YYYY-MM-DD` date (anything after a
/// `T` is dropped, so full ISO timestamps work too).
pub fn export_filename_for(date: &str) -> String {
	let day = date.split('T').next().unwrap_or(date);
	format!("netvis_export_{day}.html")
}

/// Export filename stamped with today's date from the browser clock.
pub fn export_filename() -> String {
	let iso: String = js_sys::Date::new_0().to_iso_string().into();
	export_filename_for(&iso)
}

/// Escape the five HTML-significant characters.
pub fn escape_html(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			_ => out.push(c),
		}
	}
	out
}

/// Build the complete HTML document.
pub fn generate_standalone_html(config: &ExportConfig) -> Result<String, serde_json::Error> {
	let title = non_empty(&config.title, DEFAULT_EXPORT_TITLE);
	let width = non_empty(&config.width, DEFAULT_EXPORT_WIDTH);
	let height = if config.height == 0 {
		DEFAULT_EXPORT_HEIGHT
	} else {
		config.height
	};
	// `</` inside a script element would end it early.
	let json = serde_json::to_string(&config.graph_data)?.replace("</", r"<\/");

	Ok(format!(
		r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
    <div class="netvis-container">
        <div id="netvis-graph" style="width: {width}; height: {height}px;"></div>
    </div>
    <script>
{js}
    </script>
    <script>
        (function() {{
            var graphData = {json};
            if (typeof netvis !== 'undefined' && netvis.renderGraph) {{
                netvis.renderGraph(document.getElementById('netvis-graph'), graphData);
            }}
        }})();
    </script>
</body>
</html>"#,
		title = escape_html(title),
		width = escape_html(width),
		css = STANDALONE_CSS,
		js = STANDALONE_JS,
	))
}

/// Hand `html` to the browser as a file download.
pub fn download_html(html: &str, filename: &str) -> Result<(), JsValue> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;

	let parts = js_sys::Array::of1(&JsValue::from_str(html));
	let options = BlobPropertyBag::new();
	options.set_type("text/html");
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let link: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
	link.set_href(&url);
	link.set_download(filename);
	body.append_child(&link)?;
	link.click();
	body.remove_child(&link)?;
	Url::revoke_object_url(&url)?;
	debug!("exported {} bytes as {filename}", html.len());
	Ok(())
}

/// Export `graph` with default sizing and start the download.
pub fn export_graph(graph: &GraphData) {
	let html = match generate_standalone_html(&ExportConfig::new(graph.clone())) {
		Ok(html) => html,
		Err(e) => {
			error!("failed to serialize graph for export: {e}");
			return;
		}
	};
	if let Err(e) = download_html(&html, &export_filename()) {
		error!("HTML download failed: {e:?}");
	}
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
	if value.trim().is_empty() { fallback } else { value }
}

const STANDALONE_CSS: &str = r#"        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background-color: #f5f5f5;
        }
        .netvis-container { width: 100%; max-width: 100%; margin: 0 auto; padding: 20px; }
        #netvis-graph { background-color: #ffffff; border: 1px solid #e0e0e0; border-radius: 4px; }
        .netvis-node circle { stroke: #fff; stroke-width: 1.5px; }
        .netvis-link { stroke: #999; stroke-opacity: 0.6; }
        .netvis-node-label { font-size: 12px; pointer-events: none; }"#;

const STANDALONE_JS: &str = r#"        var netvis = (function() {
            var SVG_NS = 'http://www.w3.org/2000/svg';
            function el(name, attrs) {
                var e = document.createElementNS(SVG_NS, name);
                for (var k in attrs) e.setAttribute(k, attrs[k]);
                return e;
            }
            function endpoint(nodes, ref) {
                var id = ref !== null && typeof ref === 'object' ? ref.id : ref;
                for (var i = 0; i < nodes.length; i++) {
                    if (String(nodes[i].id) === String(id)) return nodes[i];
                }
                return null;
            }
            function renderGraph(container, data) {
                if (!container) return;
                var width = container.clientWidth || 800;
                var height = container.clientHeight || 600;
                var svg = el('svg', { width: width, height: height, viewBox: '0 0 ' + width + ' ' + height });
                container.appendChild(svg);

                var nodes = data.nodes || [];
                var links = data.links || [];
                nodes.forEach(function(node, i) {
                    var angle = (i / Math.max(nodes.length, 1)) * 2 * Math.PI;
                    if (typeof node.x !== 'number') node.x = width / 2 + 100 * Math.cos(angle);
                    if (typeof node.y !== 'number') node.y = height / 2 + 100 * Math.sin(angle);
                });

                var linkGroup = el('g', { 'class': 'netvis-links' });
                svg.appendChild(linkGroup);
                links.forEach(function(link) {
                    var s = endpoint(nodes, link.source);
                    var t = endpoint(nodes, link.target);
                    if (s && t) {
                        linkGroup.appendChild(el('line', {
                            'class': 'netvis-link', x1: s.x, y1: s.y, x2: t.x, y2: t.y,
                            stroke: '#999', 'stroke-opacity': '0.6'
                        }));
                    }
                });

                var nodeGroup = el('g', { 'class': 'netvis-nodes' });
                svg.appendChild(nodeGroup);
                nodes.forEach(function(node) {
                    var g = el('g', { 'class': 'netvis-node', transform: 'translate(' + node.x + ',' + node.y + ')' });
                    g.appendChild(el('circle', { r: 8, fill: node.color || '#69b3a2', stroke: '#fff', 'stroke-width': '1.5' }));
                    var label = node.label || node.name;
                    if (label) {
                        var text = el('text', { 'class': 'netvis-node-label', dx: '12', dy: '4' });
                        text.textContent = label;
                        g.appendChild(text);
                    }
                    nodeGroup.appendChild(g);
                });
            }
            return { renderGraph: renderGraph };
        })();"#;
