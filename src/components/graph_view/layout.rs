use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::style::{node_color, node_radius};
use super::types::GraphData;
use crate::config::{RenderConfig, SimulationConfig};

/// Extra world-space distance around a node that still counts as a hit.
pub const HIT_SLOP: f64 = 3.0;

/// Pointer travel, in pixels, below which a press-release is a click.
pub const CLICK_SLOP: f64 = 3.0;

const INITIAL_RING: f64 = 100.0;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: Option<String>,
	pub color: String,
	pub radius: f64,
}

/// Pan/zoom transform: screen = world * k + (x, y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal offset in pixels.
	pub x: f64,
	/// Vertical offset in pixels.
	pub y: f64,
	/// Scale factor.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
enum Gesture {
	#[default]
	Idle,
	Drag {
		node_idx: DefaultNodeIdx,
		start_x: f64,
		start_y: f64,
		node_start_x: f32,
		node_start_y: f32,
		moved: bool,
	},
	Pan {
		start_x: f64,
		start_y: f64,
		transform_start_x: f64,
		transform_start_y: f64,
	},
}

/// Simulation plus view state for one rendered graph.
pub struct GraphView {
	pub(super) graph: ForceGraph<NodeInfo, ()>,
	pub(super) transform: ViewTransform,
	pub(super) width: f64,
	pub(super) height: f64,
	gesture: Gesture,
	alpha: f64,
	sim: SimulationConfig,
	zoom_bounds: (f64, f64),
	extent: [[f64; 2]; 2],
	id_to_idx: HashMap<String, DefaultNodeIdx>,
	link_count: usize,
}

impl GraphView {
	/// Build the simulation for `data`. Unusable `config` values are replaced
	/// by their defaults.
	pub fn new(data: &GraphData, config: &RenderConfig) -> Self {
		let config = config.clone().sanitized();
		let sim = config.simulation.clone();
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: sim.force_charge,
			force_spring: sim.force_spring,
			force_max: sim.force_max,
			node_speed: sim.node_speed,
			damping_factor: sim.damping_factor,
		});
		let (width, height) = (config.width, config.height);
		let mut id_to_idx = HashMap::new();

		for (i, node) in data.nodes.iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / data.nodes.len() as f64;
			let x = node.x.unwrap_or(width / 2.0 + INITIAL_RING * angle.cos());
			let y = node.y.unwrap_or(height / 2.0 + INITIAL_RING * angle.sin());

			let idx = graph.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: sim.node_mass,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.display_label().map(str::to_owned),
					color: node_color(node),
					radius: node_radius(node.size),
				},
			});
			id_to_idx.insert(node.id.clone(), idx);
		}

		let mut link_count = 0;
		for link in &data.links {
			let (source, target) = (link.source.id(), link.target.id());
			match (id_to_idx.get(source), id_to_idx.get(target)) {
				(Some(&src), Some(&tgt)) => {
					graph.add_edge(src, tgt, EdgeData::default());
					link_count += 1;
				}
				_ => debug!("skipping link {source} -> {target}: unknown node"),
			}
		}

		Self {
			graph,
			transform: ViewTransform::default(),
			width,
			height,
			gesture: Gesture::Idle,
			alpha: 1.0,
			sim,
			zoom_bounds: config.zoom_bounds(),
			extent: config.extent(),
			id_to_idx,
			link_count,
		}
	}

	/// Number of nodes in the simulation, duplicates of an id included.
	pub fn node_count(&self) -> usize {
		let mut count = 0;
		self.graph.visit_nodes(|_| count += 1);
		count
	}

	/// Links whose endpoints both resolved.
	pub fn link_count(&self) -> usize {
		self.link_count
	}

	/// Current pan/zoom.
	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	/// Current simulation heat, 1.0 when freshly started.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// True once the simulation has cooled down.
	pub fn is_settled(&self) -> bool {
		self.alpha < self.sim.alpha_min
	}

	/// Restart the simulation at full heat.
	pub fn reheat(&mut self) {
		self.alpha = 1.0;
	}

	/// Advance one frame. Returns false when the layout is already settled.
	pub fn tick(&mut self) -> bool {
		if self.is_settled() {
			return false;
		}
		self.graph.update(self.sim.frame_dt * self.alpha as f32);
		self.alpha -= self.alpha * self.sim.alpha_decay;
		true
	}

	/// Map a screen position to world coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < node.data.user_data.radius + HIT_SLOP {
				found = Some(node.index());
			}
		});
		found
	}

	/// World position of the node with `id`.
	pub fn node_position(&self, id: &str) -> Option<(f64, f64)> {
		let idx = *self.id_to_idx.get(id)?;
		self.position_of(idx).map(|(x, y)| (x as f64, y as f64))
	}

	/// Whether the node with `id` is pinned by a drag.
	pub fn is_pinned(&self, id: &str) -> bool {
		let Some(&idx) = self.id_to_idx.get(id) else {
			return false;
		};
		let mut pinned = false;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				pinned = node.data.is_anchor;
			}
		});
		pinned
	}

	/// Press: grab the node under the pointer, or start panning.
	pub fn pointer_down(&mut self, x: f64, y: f64) {
		self.gesture = match self.node_at_position(x, y) {
			Some(idx) => {
				let (node_start_x, node_start_y) = self.position_of(idx).unwrap_or_default();
				Gesture::Drag {
					node_idx: idx,
					start_x: x,
					start_y: y,
					node_start_x,
					node_start_y,
					moved: false,
				}
			}
			None => Gesture::Pan {
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			},
		};
	}

	/// Move: drag the grabbed node (pinned, clamped to the viewport) or pan.
	pub fn pointer_move(&mut self, x: f64, y: f64) {
		match self.gesture {
			Gesture::Drag {
				node_idx,
				start_x,
				start_y,
				node_start_x,
				node_start_y,
				ref mut moved,
			} => {
				if !*moved && (x - start_x).hypot(y - start_y) < CLICK_SLOP {
					return;
				}
				*moved = true;
				let k = self.transform.k;
				let nx = (node_start_x as f64 + (x - start_x) / k).clamp(0.0, self.width);
				let ny = (node_start_y as f64 + (y - start_y) / k).clamp(0.0, self.height);
				self.pin(node_idx, nx as f32, ny as f32);
				self.reheat();
			}
			Gesture::Pan {
				start_x,
				start_y,
				transform_start_x,
				transform_start_y,
			} => {
				self.transform.x = transform_start_x + (x - start_x);
				self.transform.y = transform_start_y + (y - start_y);
				self.constrain();
			}
			Gesture::Idle => {}
		}
	}

	/// Release. A press-release on a node without movement unpins it.
	pub fn pointer_up(&mut self) {
		if let Gesture::Drag {
			node_idx,
			moved: false,
			..
		} = std::mem::take(&mut self.gesture)
		{
			self.unpin(node_idx);
			self.reheat();
		}
	}

	/// Pointer left the view: drop any gesture in progress.
	pub fn pointer_leave(&mut self) {
		self.gesture = Gesture::Idle;
	}

	/// Zoom about a screen position. Positive `delta_y` zooms out.
	pub fn zoom_at(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let (lo, hi) = self.zoom_bounds;
		let new_k = (self.transform.k * factor).clamp(lo, hi);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
		self.constrain();
	}

	/// Keep the visible world rectangle inside the translate extent.
	fn constrain(&mut self) {
		let [[x0, y0], [x1, y1]] = self.extent;
		let t = &mut self.transform;
		let dx0 = -t.x / t.k - x0;
		let dx1 = (self.width - t.x) / t.k - x1;
		let dy0 = -t.y / t.k - y0;
		let dy1 = (self.height - t.y) / t.k - y1;
		t.x += shift(dx0, dx1) * t.k;
		t.y += shift(dy0, dy1) * t.k;
	}

	fn position_of(&self, idx: DefaultNodeIdx) -> Option<(f32, f32)> {
		let mut pos = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				pos = Some((node.x(), node.y()));
			}
		});
		pos
	}

	fn pin(&mut self, idx: DefaultNodeIdx, x: f32, y: f32) {
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = x;
				node.data.y = y;
				node.data.is_anchor = true;
			}
		});
	}

	fn unpin(&mut self, idx: DefaultNodeIdx) {
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.is_anchor = false;
			}
		});
	}
}

fn shift(d0: f64, d1: f64) -> f64 {
	if d1 > d0 {
		(d0 + d1) / 2.0
	} else if d0 < 0.0 {
		d0
	} else {
		d1.max(0.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_view::{GraphLink, GraphNode};

	fn pair() -> GraphData {
		GraphData {
			nodes: vec![GraphNode::new("A"), GraphNode::new("B")],
			links: vec![GraphLink::new("A", "B")],
		}
	}

	fn placed(nodes: &[(&str, f64, f64)]) -> GraphData {
		GraphData {
			nodes: nodes
				.iter()
				.map(|&(id, x, y)| GraphNode {
					x: Some(x),
					y: Some(y),
					..GraphNode::new(id)
				})
				.collect(),
			links: Vec::new(),
		}
	}

	#[test]
	fn links_to_unknown_nodes_are_skipped() {
		let mut data = pair();
		data.links.push(GraphLink::new("A", "missing"));
		let view = GraphView::new(&data, &RenderConfig::default());
		assert_eq!(view.node_count(), 2);
		assert_eq!(view.link_count(), 1);
	}

	#[test]
	fn duplicate_ids_are_all_counted() {
		let data = GraphData {
			nodes: vec![GraphNode::new("A"), GraphNode::new("A")],
			links: Vec::new(),
		};
		assert_eq!(GraphView::new(&data, &RenderConfig::default()).node_count(), 2);
	}

	#[test]
	fn explicit_positions_are_kept() {
		let view = GraphView::new(&placed(&[("A", 10.0, 20.0)]), &RenderConfig::default());
		assert_eq!(view.node_position("A"), Some((10.0, 20.0)));
	}

	#[test]
	fn simulation_cools_down() {
		let mut view = GraphView::new(&pair(), &RenderConfig::default());
		let mut ticks = 0;
		while view.tick() {
			ticks += 1;
			assert!(ticks < 1000, "simulation never settled");
		}
		assert!(view.is_settled());
		let (x, y) = view.node_position("A").unwrap();
		assert!(x.is_finite() && y.is_finite());
	}

	#[test]
	fn reheat_restarts_a_settled_layout() {
		let mut view = GraphView::new(&pair(), &RenderConfig::default());
		while view.tick() {}
		assert!(!view.tick());

		view.reheat();
		assert!(!view.is_settled());
		assert!(view.tick());
	}

	#[test]
	fn runaway_cooling_settings_still_settle() {
		let config: RenderConfig =
			serde_json::from_str(r#"{"simulation": {"alpha_decay": -0.5, "frame_dt": -1}}"#).unwrap();
		let mut view = GraphView::new(&pair(), &config);
		let mut ticks = 0;
		while view.tick() {
			ticks += 1;
			assert!(ticks < 1000, "simulation never settled");
		}
		assert!(view.alpha() <= 1.0);
	}

	#[test]
	fn hit_test_respects_radius() {
		let view = GraphView::new(&placed(&[("A", 100.0, 100.0)]), &RenderConfig::default());
		assert!(view.node_at_position(104.0, 100.0).is_some());
		assert!(view.node_at_position(120.0, 100.0).is_none());
	}

	#[test]
	fn drag_pins_and_clamps() {
		let mut view = GraphView::new(&placed(&[("A", 100.0, 100.0)]), &RenderConfig::default());
		view.pointer_down(100.0, 100.0);
		view.pointer_move(-500.0, 150.0);
		view.pointer_up();
		assert!(view.is_pinned("A"));
		assert_eq!(view.node_position("A"), Some((0.0, 150.0)));
		assert_eq!(view.alpha(), 1.0);
	}

	#[test]
	fn negative_width_does_not_break_dragging() {
		let config: RenderConfig = serde_json::from_str(r#"{"width": -10}"#).unwrap();
		let mut view = GraphView::new(&placed(&[("A", 0.0, 0.0)]), &config);
		view.pointer_down(0.0, 0.0);
		view.pointer_move(50.0, 50.0);
		view.pointer_up();
		assert!(view.is_pinned("A"));
		assert_eq!(view.node_position("A"), Some((50.0, 50.0)));
	}

	#[test]
	fn click_releases_pin() {
		let mut view = GraphView::new(&placed(&[("A", 100.0, 100.0)]), &RenderConfig::default());
		view.pointer_down(100.0, 100.0);
		view.pointer_move(200.0, 200.0);
		view.pointer_up();
		assert!(view.is_pinned("A"));

		view.pointer_down(200.0, 200.0);
		view.pointer_move(201.0, 200.0);
		view.pointer_up();
		assert!(!view.is_pinned("A"));
	}

	#[test]
	fn pan_is_bounded_by_extent() {
		let mut view = GraphView::new(&GraphData::default(), &RenderConfig::default());
		view.pointer_down(400.0, 400.0);
		view.pointer_move(450.0, 430.0);
		assert_eq!(view.transform().x, 50.0);
		assert_eq!(view.transform().y, 30.0);

		view.pointer_move(4000.0, 400.0);
		assert_eq!(view.transform().x, 100.0);
		view.pointer_up();
	}

	#[test]
	fn pointer_leave_cancels_pan() {
		let mut view = GraphView::new(&GraphData::default(), &RenderConfig::default());
		view.pointer_down(400.0, 400.0);
		view.pointer_leave();
		view.pointer_move(450.0, 450.0);
		assert_eq!(view.transform(), ViewTransform::default());
	}

	#[test]
	fn zoom_is_clamped() {
		let mut view = GraphView::new(&GraphData::default(), &RenderConfig::default());
		view.zoom_at(400.0, 400.0, 1.0);
		assert_eq!(view.transform().k, 1.0);

		for _ in 0..100 {
			view.zoom_at(400.0, 400.0, -1.0);
		}
		assert_eq!(view.transform().k, 40.0);
		let (gx, gy) = view.screen_to_graph(400.0, 400.0);
		assert!((gx - 400.0).abs() < 1e-6 && (gy - 400.0).abs() < 1e-6);
	}
}
